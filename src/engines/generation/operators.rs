use super::mutation_walker::mutate_tree;
use super::random::GeneticRandom;
use crate::engines::expression::{ExprTree, Parser};
use crate::error::{PicEvolveError, Result};

/// `n` freshly generated expressions
pub fn initialize_population(random: &mut dyn GeneticRandom, n: usize) -> Result<Vec<ExprTree>> {
    (0..n).map(|_| random.next_expression()).collect()
}

/// `n` mutants of `parent`, each differing textually from it
pub fn mutate_population(
    parent: &ExprTree,
    n: usize,
    random: &mut dyn GeneticRandom,
    parser: &Parser,
    max_attempts_per_individual: usize,
) -> Result<Vec<ExprTree>> {
    let original = parent.to_string();
    collect_distinct(n, max_attempts_per_individual, &original, || {
        let mut mutant = parser.deep_copy(parent)?;
        mutate_tree(&mut mutant, &mut *random, parser)?;
        Ok(mutant)
    })
}

/// `n` children made by grafting a random subtree of `dad` over a random
/// node of `mom`. Neither parent is modified.
pub fn crossover(
    mom: &ExprTree,
    dad: &ExprTree,
    n: usize,
    random: &mut dyn GeneticRandom,
    parser: &Parser,
    max_attempts_per_individual: usize,
) -> Result<Vec<ExprTree>> {
    log::debug!("Mom expression: {}", mom);
    log::debug!("Dad expression: {}", dad);

    let original = mom.to_string();
    collect_distinct(n, max_attempts_per_individual, &original, || {
        let mut mom_copy = parser.deep_copy(mom)?;
        let dad_copy = parser.deep_copy(dad)?;

        let mom_subtree = random.next_node(&mom_copy, mom_copy.root());
        let dad_subtree = random.next_node(&dad_copy, dad_copy.root());

        if mom_copy.is_root(mom_subtree) {
            return parser.parse(&dad_copy.to_sexpr(dad_subtree));
        }
        let grafted = mom_copy.graft(&dad_copy, dad_subtree);
        mom_copy.replace(mom_subtree, grafted)?;
        Ok(mom_copy)
    })
}

/// Run `attempt` until `n` candidates differ (ignoring case) from `original`,
/// giving up after `n * max_attempts_per_individual` tries.
fn collect_distinct<F>(
    n: usize,
    max_attempts_per_individual: usize,
    original: &str,
    mut attempt: F,
) -> Result<Vec<ExprTree>>
where
    F: FnMut() -> Result<ExprTree>,
{
    let limit = n.saturating_mul(max_attempts_per_individual);
    let mut accepted = Vec::with_capacity(n);
    let mut attempts = 0;

    while accepted.len() < n {
        if attempts >= limit {
            log::warn!(
                "Gave up after {} attempts with {} of {} distinct expressions",
                attempts,
                accepted.len(),
                n
            );
            return Err(PicEvolveError::RetryLimitExceeded {
                requested: n,
                produced: accepted.len(),
                attempts,
            });
        }
        attempts += 1;

        let candidate = attempt()?;
        if candidate.to_string().eq_ignore_ascii_case(original) {
            log::debug!("Rejected candidate identical to {}", original);
        } else {
            accepted.push(candidate);
        }
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::random::ExpressionRandom;
    use crate::functions::FunctionRegistry;
    use std::sync::Arc;

    fn setup(seed: u64) -> (Parser, ExpressionRandom) {
        let registry = Arc::new(FunctionRegistry::with_builtins().unwrap());
        (Parser::new(registry.clone()), ExpressionRandom::seeded(registry, seed))
    }

    #[test]
    fn test_initialize_population() {
        let (_, mut random) = setup(1);
        let population = initialize_population(&mut random, 12).unwrap();
        assert_eq!(population.len(), 12);
        for tree in &population {
            tree.validate().unwrap();
        }
    }

    #[test]
    fn test_mutants_differ_from_parent() {
        let (parser, mut random) = setup(2);
        let parent = parser.parse("(sin (+ x y))").unwrap();
        let mutants = mutate_population(&parent, 8, &mut random, &parser, 1000).unwrap();
        assert_eq!(mutants.len(), 8);
        for mutant in &mutants {
            assert_ne!(mutant.to_string(), "(sin (+ x y))");
            mutant.validate().unwrap();
        }
        assert_eq!(parent.to_string(), "(sin (+ x y))");
    }

    #[test]
    fn test_mutating_a_lone_terminal_gives_up() {
        let (parser, mut random) = setup(3);
        let parent = parser.parse("x").unwrap();
        let result = mutate_population(&parent, 2, &mut random, &parser, 5);
        match result {
            Err(PicEvolveError::RetryLimitExceeded {
                requested,
                produced,
                attempts,
            }) => {
                assert_eq!(requested, 2);
                assert_eq!(produced, 0);
                assert_eq!(attempts, 10);
            }
            other => panic!("expected retry limit, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn test_crossover_of_identical_leaves_gives_up() {
        let (parser, mut random) = setup(4);
        let mom = parser.parse("0.5").unwrap();
        let dad = parser.parse("0.5").unwrap();
        let result = crossover(&mom, &dad, 3, &mut random, &parser, 10);
        assert!(matches!(result, Err(PicEvolveError::RetryLimitExceeded { .. })));
    }

    #[test]
    fn test_zero_requested() {
        let (parser, mut random) = setup(5);
        let tree = parser.parse("x").unwrap();
        assert!(mutate_population(&tree, 0, &mut random, &parser, 1).unwrap().is_empty());
        assert!(crossover(&tree, &tree, 0, &mut random, &parser, 1).unwrap().is_empty());
    }
}
