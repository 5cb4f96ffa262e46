use std::collections::HashMap;

use super::mutation::Mutation;
use crate::error::{PicEvolveError, Result};
use crate::types::NodeClass;

/// Relative weights of the mutation variants available to each node class.
///
/// Built once and read-only afterwards. The order of each list matters:
/// `select` walks it accumulating weights.
#[derive(Debug, Clone)]
pub struct MutationFrequencyTable {
    entries: HashMap<NodeClass, Vec<(Mutation, u32)>>,
}

impl MutationFrequencyTable {
    pub fn with_weights<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeClass, Vec<(Mutation, u32)>)>,
    {
        let entries: HashMap<NodeClass, Vec<(Mutation, u32)>> = entries.into_iter().collect();
        for (class, variants) in &entries {
            for (mutation, weight) in variants {
                if *weight == 0 {
                    return Err(PicEvolveError::Configuration(format!(
                        "{} weight for {:?} nodes must be positive",
                        mutation, class
                    )));
                }
                if !mutation.applies_to(*class) {
                    return Err(PicEvolveError::Configuration(format!(
                        "{} cannot be applied to {:?} nodes",
                        mutation, class
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self, class: NodeClass) -> &[(Mutation, u32)] {
        self.entries.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_weight(&self, class: NodeClass) -> u32 {
        self.entries(class).iter().map(|(_, w)| w).sum()
    }

    /// First variant whose cumulative weight exceeds `draw`, a value in `[0, total_weight)`
    pub fn select(&self, class: NodeClass, draw: u32) -> Option<Mutation> {
        let mut cumulative = 0;
        for (mutation, weight) in self.entries(class) {
            cumulative += weight;
            if draw < cumulative {
                return Some(*mutation);
            }
        }
        None
    }
}

impl Default for MutationFrequencyTable {
    fn default() -> Self {
        use Mutation::*;
        let entries = [
            (
                NodeClass::Scalar,
                vec![RandomExpression, AdjustScalar, BecomeArgument, BecomeNodeCopy],
            ),
            (
                NodeClass::Vector,
                vec![RandomExpression, AdjustVector, BecomeArgument, BecomeNodeCopy],
            ),
            (
                NodeClass::Variable,
                vec![RandomExpression, BecomeArgument, BecomeNodeCopy],
            ),
            (
                NodeClass::Function,
                vec![
                    RandomExpression,
                    ChangeFunction,
                    ReplaceWithArgument,
                    BecomeArgument,
                    BecomeNodeCopy,
                ],
            ),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(class, variants)| (class, variants.into_iter().map(|m| (m, 1)).collect()))
                .collect(),
        }
    }
}
