use super::traits::ConfigSection;
use crate::error::PicEvolveError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Base per-node mutation probability, divided by the node's height
    pub global_mutation_frequency: f64,
    /// Deepest nesting of functions produced by random expression generation
    pub max_expression_depth: usize,
    /// Attempts allowed per requested individual before a population request fails
    pub max_attempts_per_individual: usize,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            global_mutation_frequency: 0.4,
            max_expression_depth: 6,
            max_attempts_per_individual: 1000,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), PicEvolveError> {
        if !(self.global_mutation_frequency > 0.0 && self.global_mutation_frequency <= 1.0) {
            return Err(PicEvolveError::Configuration(
                "Global mutation frequency must be in (0, 1]".to_string(),
            ));
        }
        if self.max_expression_depth == 0 {
            return Err(PicEvolveError::Configuration(
                "Max expression depth must be at least 1".to_string(),
            ));
        }
        if self.max_attempts_per_individual == 0 {
            return Err(PicEvolveError::Configuration(
                "Max attempts per individual must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
