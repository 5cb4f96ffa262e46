pub mod traits;
pub mod evolution;
pub mod rendering;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use rendering::RenderingConfig;
