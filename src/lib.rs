pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod functions;
pub mod raster;
pub mod types;

pub use engines::generation::PicEvolve;
pub use error::{PicEvolveError, Result};
