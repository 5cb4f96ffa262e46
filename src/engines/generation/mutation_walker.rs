use super::random::GeneticRandom;
use crate::engines::expression::{ExprTree, Parser};
use crate::error::Result;

/// Visit every node of `tree` children-first and mutate each with
/// probability `global frequency / height(node)`.
///
/// The visiting order is fixed before the walk starts, so nodes created by a
/// mutation are not themselves visited. Nodes without a parent are never
/// mutated. Returns the number of mutations applied.
pub fn mutate_tree(
    tree: &mut ExprTree,
    random: &mut dyn GeneticRandom,
    parser: &Parser,
) -> Result<usize> {
    let mut applied = 0;
    for node in tree.postorder(tree.root()) {
        if tree.parent(node).is_none() {
            continue;
        }
        if !random.should_mutate(tree, node) {
            continue;
        }
        let class = tree.kind(node).class();
        let Some(mutation) = random.next_mutation(class) else {
            continue;
        };

        let before = log::log_enabled!(log::Level::Debug).then(|| tree.to_sexpr(node));
        mutation.apply(tree, node, random, parser)?;
        if let Some(before) = before {
            log::debug!("{} on {} ({:?})", mutation, before, class);
        }
        applied += 1;
    }
    Ok(applied)
}
