use super::{evolution::EvolutionConfig, rendering::RenderingConfig, traits::ConfigSection};
use crate::error::PicEvolveError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Prefix of environment variables overriding file settings,
/// e.g. `PICEVOLVE_EVOLUTION__SEED=7`
pub const ENV_PREFIX: &str = "PICEVOLVE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub rendering: RenderingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), PicEvolveError> {
        validate_section(&self.evolution)?;
        validate_section(&self.rendering)?;
        Ok(())
    }
}

/// Validate one section, naming it in the error
fn validate_section<S: ConfigSection>(section: &S) -> Result<(), PicEvolveError> {
    section.validate().map_err(|e| match e {
        PicEvolveError::Configuration(msg) => {
            PicEvolveError::Configuration(format!("[{}] {}", S::section_name(), msg))
        }
        other => other,
    })
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML file, then apply environment overrides on top
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PicEvolveError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Toml))
            .add_source(Self::environment())
            .build()?;
        self.install(settings.try_deserialize()?)
    }

    /// Defaults with environment overrides only
    pub fn load_from_env(&self) -> Result<(), PicEvolveError> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()?;
        self.install(settings.try_deserialize()?)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn install(&self, config: AppConfig) -> Result<(), PicEvolveError> {
        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PicEvolveError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| PicEvolveError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| PicEvolveError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), PicEvolveError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = config.clone();
        f(&mut updated);
        updated.validate()?;
        *config = updated;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
