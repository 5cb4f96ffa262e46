use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use super::frequencies::MutationFrequencyTable;
use super::mutation::Mutation;
use crate::config::EvolutionConfig;
use crate::engines::expression::{ExprTree, NodeId};
use crate::error::{PicEvolveError, Result};
use crate::functions::{FunctionPrototype, FunctionRegistry};
use crate::types::{Axis, NodeClass, Terminal};

/// Every random decision the genetic operators make
pub trait GeneticRandom {
    fn next_scalar(&mut self) -> f64;
    fn next_vector(&mut self) -> [f64; 3];
    fn next_terminal(&mut self) -> Terminal;
    fn next_function(&mut self) -> Result<FunctionPrototype>;
    fn next_expression(&mut self) -> Result<ExprTree>;

    /// Node drawn uniformly from the subtree rooted at `from`
    fn next_node(&mut self, tree: &ExprTree, from: NodeId) -> NodeId;

    /// One of the node's immediate children, `None` for a terminal
    fn next_child(&mut self, tree: &ExprTree, node: NodeId) -> Option<NodeId>;

    /// Weighted choice among the variants configured for the class
    fn next_mutation(&mut self, class: NodeClass) -> Option<Mutation>;

    fn should_mutate(&mut self, tree: &ExprTree, node: NodeId) -> bool;
}

/// Production source of randomness backed by a `rand` generator
pub struct ExpressionRandom<R: Rng = StdRng> {
    rng: R,
    registry: Arc<FunctionRegistry>,
    function_names: Vec<String>,
    frequencies: MutationFrequencyTable,
    global_frequency: f64,
    max_depth: usize,
}

impl ExpressionRandom<StdRng> {
    /// Seeded from `config.seed` when present, from OS entropy otherwise
    pub fn from_config(registry: Arc<FunctionRegistry>, config: &EvolutionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rng, registry, config)
    }

    pub fn seeded(registry: Arc<FunctionRegistry>, seed: u64) -> Self {
        Self::with_rng(
            StdRng::seed_from_u64(seed),
            registry,
            &EvolutionConfig::default(),
        )
    }
}

impl<R: Rng> ExpressionRandom<R> {
    pub fn with_rng(rng: R, registry: Arc<FunctionRegistry>, config: &EvolutionConfig) -> Self {
        let function_names = registry.all_names().into_iter().collect();
        Self {
            rng,
            registry,
            function_names,
            frequencies: MutationFrequencyTable::default(),
            global_frequency: config.global_mutation_frequency,
            max_depth: config.max_expression_depth,
        }
    }

    pub fn with_frequencies(mut self, frequencies: MutationFrequencyTable) -> Self {
        self.frequencies = frequencies;
        self
    }

    pub fn frequencies(&self) -> &MutationFrequencyTable {
        &self.frequencies
    }

    /// Add a function node with random arguments; nesting stops at `max_depth`
    fn grow(&mut self, tree: &mut ExprTree, depth: usize) -> Result<NodeId> {
        let prototype = self.next_function()?;
        let node = tree.add_function(&prototype);

        let mut children = Vec::with_capacity(prototype.arity);
        for _ in 0..prototype.arity {
            let child = match self.rng.gen_range(0..4) {
                0 => tree.add_terminal(Terminal::Scalar(self.next_scalar())),
                1 => tree.add_terminal(Terminal::Vector(self.next_vector())),
                2 => tree.add_terminal(Terminal::Variable(self.next_axis())),
                _ if depth < self.max_depth => self.grow(tree, depth + 1)?,
                _ => {
                    let terminal = self.next_terminal();
                    tree.add_terminal(terminal)
                }
            };
            children.push(child);
        }
        tree.set_children(node, children)?;
        Ok(node)
    }

    fn next_axis(&mut self) -> Axis {
        if self.rng.gen_bool(0.5) {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

impl<R: Rng> GeneticRandom for ExpressionRandom<R> {
    fn next_scalar(&mut self) -> f64 {
        self.rng.gen()
    }

    fn next_vector(&mut self) -> [f64; 3] {
        [self.rng.gen(), self.rng.gen(), self.rng.gen()]
    }

    fn next_terminal(&mut self) -> Terminal {
        match self.rng.gen_range(0..3) {
            0 => Terminal::Scalar(self.next_scalar()),
            1 => Terminal::Vector(self.next_vector()),
            _ => Terminal::Variable(self.next_axis()),
        }
    }

    fn next_function(&mut self) -> Result<FunctionPrototype> {
        let name = self
            .function_names
            .choose(&mut self.rng)
            .ok_or_else(|| PicEvolveError::Configuration("function registry is empty".to_string()))?;
        self.registry
            .lookup(name)
            .ok_or_else(|| PicEvolveError::UnknownFunction(name.clone()))
    }

    fn next_expression(&mut self) -> Result<ExprTree> {
        let mut tree = ExprTree::with_capacity(16);
        let root = self.grow(&mut tree, 1)?;
        tree.set_root(root);
        Ok(tree)
    }

    fn next_node(&mut self, tree: &ExprTree, from: NodeId) -> NodeId {
        // reservoir of size one over a preorder walk
        let mut chosen = from;
        let mut seen = 0usize;
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            seen += 1;
            if self.rng.gen_range(0..seen) == 0 {
                chosen = id;
            }
            stack.extend(tree.children(id).iter().copied());
        }
        chosen
    }

    fn next_child(&mut self, tree: &ExprTree, node: NodeId) -> Option<NodeId> {
        tree.children(node).choose(&mut self.rng).copied()
    }

    fn next_mutation(&mut self, class: NodeClass) -> Option<Mutation> {
        let total = self.frequencies.total_weight(class);
        if total == 0 {
            return None;
        }
        let draw = self.rng.gen_range(0..total);
        self.frequencies.select(class, draw)
    }

    fn should_mutate(&mut self, tree: &ExprTree, node: NodeId) -> bool {
        self.rng.gen::<f64>() < self.global_frequency / tree.height(node) as f64
    }
}
