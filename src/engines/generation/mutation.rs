use std::fmt;

use super::random::GeneticRandom;
use crate::engines::expression::{ExprTree, NodeId, NodeKind, Parser};
use crate::error::{PicEvolveError, Result};
use crate::types::{NodeClass, Terminal};

/// Extra draws ChangeFunction makes while it keeps getting the node's own function
pub const MAX_FUNCTION_REDRAWS: usize = 64;

/// In-place rewrite of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// Replace the node with a freshly generated expression
    RandomExpression,
    AdjustScalar,
    AdjustVector,
    /// Wrap the node as the first argument of a random function
    BecomeArgument,
    /// Swap the function, keeping as many existing arguments as fit
    ChangeFunction,
    /// Promote one of the node's arguments into its place
    ReplaceWithArgument,
    /// Replace the node with a copy of a random node from the same tree
    BecomeNodeCopy,
}

impl Mutation {
    pub const ALL: [Mutation; 7] = [
        Mutation::RandomExpression,
        Mutation::AdjustScalar,
        Mutation::AdjustVector,
        Mutation::BecomeArgument,
        Mutation::ChangeFunction,
        Mutation::ReplaceWithArgument,
        Mutation::BecomeNodeCopy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::RandomExpression => "RandomExpression",
            Mutation::AdjustScalar => "AdjustScalar",
            Mutation::AdjustVector => "AdjustVector",
            Mutation::BecomeArgument => "BecomeArgument",
            Mutation::ChangeFunction => "ChangeFunction",
            Mutation::ReplaceWithArgument => "ReplaceWithArgument",
            Mutation::BecomeNodeCopy => "BecomeNodeCopy",
        }
    }

    /// Whether the variant rewrites the node's slot in its parent
    pub fn is_structural(&self) -> bool {
        !matches!(self, Mutation::AdjustScalar | Mutation::AdjustVector)
    }

    pub fn applies_to(&self, class: NodeClass) -> bool {
        match self {
            Mutation::AdjustScalar => class == NodeClass::Scalar,
            Mutation::AdjustVector => class == NodeClass::Vector,
            Mutation::ChangeFunction | Mutation::ReplaceWithArgument => {
                class == NodeClass::Function
            }
            Mutation::RandomExpression | Mutation::BecomeArgument | Mutation::BecomeNodeCopy => {
                true
            }
        }
    }

    /// Rewrite `node` inside `tree`.
    ///
    /// Structural variants need `node` to have a parent; on a root they fail
    /// with `StructuralInvariant` before drawing any randomness.
    pub fn apply(
        &self,
        tree: &mut ExprTree,
        node: NodeId,
        random: &mut dyn GeneticRandom,
        parser: &Parser,
    ) -> Result<()> {
        let class = tree.kind(node).class();
        if !self.applies_to(class) {
            return Err(PicEvolveError::StructuralInvariant(format!(
                "{} cannot be applied to a {:?} node",
                self, class
            )));
        }
        if self.is_structural() && tree.parent(node).is_none() {
            return Err(PicEvolveError::StructuralInvariant(format!(
                "{} needs a parent slot, node {} has none",
                self,
                node.index()
            )));
        }

        match self {
            Mutation::RandomExpression => {
                let expression = random.next_expression()?;
                let fresh = tree.graft(&expression, expression.root());
                tree.replace(node, fresh)
            }
            Mutation::AdjustScalar => {
                let value = random.next_scalar();
                tree.set_terminal(node, Terminal::Scalar(value))
            }
            Mutation::AdjustVector => {
                let value = random.next_vector();
                tree.set_terminal(node, Terminal::Vector(value))
            }
            Mutation::BecomeArgument => {
                let prototype = random.next_function()?;
                if prototype.arity == 0 {
                    return Err(PicEvolveError::StructuralInvariant(format!(
                        "function '{}' takes no arguments",
                        prototype.name
                    )));
                }
                let wrapper = tree.add_function(&prototype);
                let mut children = vec![node];
                for _ in 1..prototype.arity {
                    let terminal = random.next_terminal();
                    children.push(tree.add_terminal(terminal));
                }
                tree.replace(node, wrapper)?;
                tree.set_children(wrapper, children)
            }
            Mutation::ChangeFunction => {
                let current = match tree.kind(node) {
                    NodeKind::Function { name, .. } => name.clone(),
                    other => {
                        return Err(PicEvolveError::StructuralInvariant(format!(
                            "expected a function node, found {:?}",
                            other
                        )))
                    }
                };
                // a source with a single function keeps drawing it; rebuild it then
                let mut prototype = random.next_function()?;
                let mut redraws = 0;
                while prototype.name == current && redraws < MAX_FUNCTION_REDRAWS {
                    prototype = random.next_function()?;
                    redraws += 1;
                }

                let mut children = tree.take_children(node);
                children.truncate(prototype.arity);
                while children.len() < prototype.arity {
                    let terminal = random.next_terminal();
                    children.push(tree.add_terminal(terminal));
                }
                let changed = tree.add_function(&prototype);
                tree.set_children(changed, children)?;
                tree.replace(node, changed)
            }
            Mutation::ReplaceWithArgument => {
                let child = random.next_child(tree, node).ok_or_else(|| {
                    PicEvolveError::StructuralInvariant(format!(
                        "function node {} has no arguments to promote",
                        node.index()
                    ))
                })?;
                tree.replace(node, child)
            }
            Mutation::BecomeNodeCopy => {
                let top = tree.ultimate_root(node);
                let picked = random.next_node(tree, top);
                let copy = parser.parse(&tree.to_sexpr(picked))?;
                let fresh = tree.graft(&copy, copy.root());
                tree.replace(node, fresh)
            }
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
