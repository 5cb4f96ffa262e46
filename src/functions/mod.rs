pub mod bitwise;
pub mod convolution;
pub mod noise;
pub mod primitives;
pub mod registry;
pub mod traits;

pub use registry::FunctionRegistry;
pub use traits::{FunctionPrototype, Primitive};
