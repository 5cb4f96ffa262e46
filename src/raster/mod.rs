pub mod buffer;

pub use buffer::{Image, Pixel};
