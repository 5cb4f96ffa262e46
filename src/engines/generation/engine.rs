use std::sync::Arc;

use super::operators;
use super::random::{ExpressionRandom, GeneticRandom};
use crate::config::{traits::ConfigSection, EvolutionConfig};
use crate::engines::evaluation::Evaluator;
use crate::engines::expression::{ExprTree, Parser};
use crate::error::Result;
use crate::functions::FunctionRegistry;
use crate::raster::Image;

/// Entry point tying the parser, evaluator and genetic operators to one
/// registry and one source of randomness
pub struct PicEvolve {
    registry: Arc<FunctionRegistry>,
    parser: Parser,
    evaluator: Evaluator,
    random: Box<dyn GeneticRandom>,
    config: EvolutionConfig,
}

impl PicEvolve {
    /// Engine over the builtin functions
    pub fn new(config: EvolutionConfig) -> Result<Self> {
        Self::with_registry(Arc::new(FunctionRegistry::with_builtins()?), config)
    }

    pub fn with_registry(registry: Arc<FunctionRegistry>, config: EvolutionConfig) -> Result<Self> {
        config.validate()?;
        let random = ExpressionRandom::from_config(registry.clone(), &config);
        Ok(Self {
            parser: Parser::new(registry.clone()),
            evaluator: Evaluator::new(registry.clone()),
            random: Box::new(random),
            registry,
            config,
        })
    }

    /// Swap in another source of randomness
    pub fn with_random(mut self, random: Box<dyn GeneticRandom>) -> Self {
        self.random = random;
        self
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn parse(&self, input: &str) -> Result<ExprTree> {
        self.parser.parse(input)
    }

    pub fn deep_copy(&self, tree: &ExprTree) -> Result<ExprTree> {
        self.parser.deep_copy(tree)
    }

    pub fn initialize_population(&mut self, n: usize) -> Result<Vec<ExprTree>> {
        operators::initialize_population(self.random.as_mut(), n)
    }

    pub fn mutate(&mut self, parent: &ExprTree, n: usize) -> Result<Vec<ExprTree>> {
        operators::mutate_population(
            parent,
            n,
            self.random.as_mut(),
            &self.parser,
            self.config.max_attempts_per_individual,
        )
    }

    pub fn crossover(&mut self, mom: &ExprTree, dad: &ExprTree, n: usize) -> Result<Vec<ExprTree>> {
        operators::crossover(
            mom,
            dad,
            n,
            self.random.as_mut(),
            &self.parser,
            self.config.max_attempts_per_individual,
        )
    }

    pub fn evaluate(&self, tree: &ExprTree, width: usize, height: usize) -> Result<Image> {
        self.evaluator.evaluate(tree, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PicEvolve {
        PicEvolve::new(EvolutionConfig {
            seed: Some(99),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_generation_cycle() {
        let mut engine = engine();
        let population = engine.initialize_population(4).unwrap();
        assert_eq!(population.len(), 4);

        let mutants = engine.mutate(&population[0], 3).unwrap();
        assert_eq!(mutants.len(), 3);

        let children = engine.crossover(&population[1], &population[2], 3).unwrap();
        assert_eq!(children.len(), 3);
        for child in children.iter().chain(&mutants) {
            child.validate().unwrap();
            let image = engine.evaluate(child, 4, 4).unwrap();
            assert_eq!((image.width(), image.height()), (4, 4));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EvolutionConfig {
            max_attempts_per_individual: 0,
            ..Default::default()
        };
        assert!(PicEvolve::new(config).is_err());
    }

    #[test]
    fn test_seeded_engines_agree() {
        let a = engine().initialize_population(5).unwrap();
        let b = engine().initialize_population(5).unwrap();
        let a: Vec<String> = a.iter().map(ToString::to_string).collect();
        let b: Vec<String> = b.iter().map(ToString::to_string).collect();
        assert_eq!(a, b);
    }
}
