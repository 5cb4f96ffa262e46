pub mod engine;
pub mod frequencies;
pub mod mutation;
pub mod mutation_walker;
pub mod operators;
pub mod random;

pub use engine::PicEvolve;
pub use frequencies::MutationFrequencyTable;
pub use mutation::Mutation;
pub use mutation_walker::mutate_tree;
pub use random::{ExpressionRandom, GeneticRandom};
