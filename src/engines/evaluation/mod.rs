pub mod argument;
pub mod evaluator;
pub mod renderer;

pub use argument::Argument;
pub use evaluator::Evaluator;
pub use renderer::{ConsoleProgressCallback, ProgressCallback, Renderer};
