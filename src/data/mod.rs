pub mod library;

pub use library::ExpressionLibrary;
