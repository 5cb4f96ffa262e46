pub mod parser;
pub mod tree;

pub use parser::Parser;
pub use tree::{ExprTree, NodeId, NodeKind, Subtree};
