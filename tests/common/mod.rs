#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use picevolve::engines::expression::{ExprTree, NodeId, Parser};
use picevolve::engines::generation::{GeneticRandom, Mutation};
use picevolve::functions::{FunctionPrototype, FunctionRegistry};
use picevolve::types::{NodeClass, Terminal};
use picevolve::Result;

pub fn parser() -> Parser {
    Parser::new(Arc::new(FunctionRegistry::with_builtins().unwrap()))
}

/// Find a node by its serialized form, first match in preorder
pub fn find(tree: &ExprTree, text: &str) -> NodeId {
    tree.preorder(tree.root())
        .into_iter()
        .find(|&id| tree.to_sexpr(id) == text)
        .unwrap_or_else(|| panic!("{} not found in {}", text, tree))
}

/// Random source that replays queued answers and panics when one runs out.
///
/// `nodes` are positions in the preorder of the sampled subtree, `children`
/// are argument positions.
#[derive(Default)]
pub struct ScriptedRandom {
    pub scalars: VecDeque<f64>,
    pub vectors: VecDeque<[f64; 3]>,
    pub terminals: VecDeque<Terminal>,
    pub functions: VecDeque<FunctionPrototype>,
    pub expressions: VecDeque<ExprTree>,
    pub nodes: VecDeque<usize>,
    pub children: VecDeque<usize>,
    pub mutations: VecDeque<Mutation>,
    pub decisions: VecDeque<bool>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeneticRandom for ScriptedRandom {
    fn next_scalar(&mut self) -> f64 {
        self.scalars.pop_front().expect("no scalar scripted")
    }

    fn next_vector(&mut self) -> [f64; 3] {
        self.vectors.pop_front().expect("no vector scripted")
    }

    fn next_terminal(&mut self) -> Terminal {
        self.terminals.pop_front().expect("no terminal scripted")
    }

    fn next_function(&mut self) -> Result<FunctionPrototype> {
        Ok(self.functions.pop_front().expect("no function scripted"))
    }

    fn next_expression(&mut self) -> Result<ExprTree> {
        Ok(self.expressions.pop_front().expect("no expression scripted"))
    }

    fn next_node(&mut self, tree: &ExprTree, from: NodeId) -> NodeId {
        let position = self.nodes.pop_front().expect("no node scripted");
        tree.preorder(from)[position]
    }

    fn next_child(&mut self, tree: &ExprTree, node: NodeId) -> Option<NodeId> {
        let position = self.children.pop_front().expect("no child scripted");
        tree.children(node).get(position).copied()
    }

    fn next_mutation(&mut self, _class: NodeClass) -> Option<Mutation> {
        self.mutations.pop_front()
    }

    fn should_mutate(&mut self, _tree: &ExprTree, _node: NodeId) -> bool {
        self.decisions.pop_front().unwrap_or(false)
    }
}
