use std::sync::Arc;

use super::tree::{ExprTree, NodeId};
use crate::error::{ParseError, Result};
use crate::functions::FunctionRegistry;
use crate::types::{Axis, Terminal};

pub const VECTOR_MARKER: char = '#';

/// Prefix s-expression parser. Parentheses only separate tokens; the
/// structure comes from each function's registered arity.
#[derive(Clone)]
pub struct Parser {
    registry: Arc<FunctionRegistry>,
}

impl Parser {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    pub fn parse(&self, input: &str) -> Result<ExprTree> {
        let cleaned = input.replace(['(', ')'], " ");
        let tokens: Vec<&str> = cleaned.split_whitespace().rev().collect();
        if tokens.is_empty() {
            return Err(ParseError::Empty.into());
        }

        let mut tree = ExprTree::with_capacity(tokens.len());
        let mut stack: Vec<NodeId> = Vec::with_capacity(tokens.len());

        for token in tokens {
            let node = if let Some(prototype) = self.registry.lookup(token) {
                if stack.len() < prototype.arity {
                    return Err(ParseError::MissingArguments {
                        function: prototype.name,
                        arity: prototype.arity,
                        available: stack.len(),
                    }
                    .into());
                }
                // first pop is the leftmost argument
                let children: Vec<NodeId> = (0..prototype.arity).filter_map(|_| stack.pop()).collect();
                let node = tree.add_function(&prototype);
                tree.set_children(node, children)?;
                node
            } else if let Some(axis) = Axis::from_token(token) {
                tree.add_terminal(Terminal::Variable(axis))
            } else if token.starts_with(VECTOR_MARKER) {
                tree.add_terminal(Terminal::Vector(parse_vector(token)?))
            } else {
                let value = token
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidToken(token.to_string()))?;
                tree.add_terminal(Terminal::Scalar(value))
            };
            stack.push(node);
        }

        match stack.as_slice() {
            [root] => {
                tree.set_root(*root);
                Ok(tree)
            }
            _ => Err(ParseError::Unbalanced {
                remaining: stack.len(),
            }
            .into()),
        }
    }

    /// Independent copy made by serializing and re-parsing
    pub fn deep_copy(&self, tree: &ExprTree) -> Result<ExprTree> {
        self.parse(&tree.to_string())
    }
}

fn parse_vector(token: &str) -> Result<[f64; 3]> {
    let invalid = || ParseError::InvalidVector(token.to_string());
    let parts: Vec<&str> = token.trim_start_matches(VECTOR_MARKER).split(',').collect();
    if parts.len() != 3 {
        return Err(invalid().into());
    }
    let mut values = [0.0; 3];
    for (value, part) in values.iter_mut().zip(parts) {
        *value = part.parse::<f64>().map_err(|_| invalid())?;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::expression::NodeKind;
    use crate::error::PicEvolveError;

    fn parser() -> Parser {
        Parser::new(Arc::new(FunctionRegistry::with_builtins().unwrap()))
    }

    #[test]
    fn test_parse_expression() {
        let tree = parser().parse("(abs (- x 0.3))").unwrap();
        let root = tree.root();
        assert!(tree.parent(root).is_none());
        assert_eq!(
            tree.kind(root),
            &NodeKind::Function { name: "abs".to_string(), arity: 1 }
        );

        let minus = tree.children(root)[0];
        assert_eq!(tree.parent(minus), Some(root));
        let args = tree.children(minus);
        assert_eq!(tree.kind(args[0]), &NodeKind::Variable(Axis::X));
        assert_eq!(tree.kind(args[1]), &NodeKind::Scalar(0.3));
    }

    #[test]
    fn test_variables_are_case_insensitive() {
        let tree = parser().parse("(+ X y)").unwrap();
        assert_eq!(tree.to_string(), "(+ x y)");
    }

    #[test]
    fn test_parse_vector() {
        let tree = parser().parse("(* #0.123456,0.678101,0.121315 x)").unwrap();
        let vector = tree.children(tree.root())[0];
        assert_eq!(tree.kind(vector), &NodeKind::Vector([0.123456, 0.678101, 0.121315]));
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let tree = parser().parse("  (min   x\n\t(sin y))  ").unwrap();
        assert_eq!(tree.to_string(), "(min x (sin y))");
    }

    #[test]
    fn test_invalid_token() {
        let result = parser().parse("(abs banana)");
        assert!(matches!(
            result,
            Err(PicEvolveError::Parse(ParseError::InvalidToken(t))) if t == "banana"
        ));
    }

    #[test]
    fn test_bad_vector_literal() {
        assert!(matches!(
            parser().parse("#0.1,0.2"),
            Err(PicEvolveError::Parse(ParseError::InvalidVector(_)))
        ));
        assert!(matches!(
            parser().parse("#0.1,zz,0.2"),
            Err(PicEvolveError::Parse(ParseError::InvalidVector(_)))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            parser().parse(" ( ) "),
            Err(PicEvolveError::Parse(ParseError::Empty))
        ));
    }

    #[test]
    fn test_missing_arguments() {
        assert!(matches!(
            parser().parse("(- x)"),
            Err(PicEvolveError::Parse(ParseError::MissingArguments { available: 1, .. }))
        ));
    }

    #[test]
    fn test_leftover_expressions() {
        assert!(matches!(
            parser().parse("x y"),
            Err(PicEvolveError::Parse(ParseError::Unbalanced { remaining: 2 }))
        ));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let parser = parser();
        let original = parser.parse("(abs (- x 0.3))").unwrap();
        let mut copy = parser.deep_copy(&original).unwrap();
        let minus = copy.children(copy.root())[0];
        let scalar = copy.children(minus)[1];
        copy.set_terminal(scalar, Terminal::Scalar(0.9)).unwrap();
        assert_eq!(original.to_string(), "(abs (- x 0.3))");
        assert_eq!(copy.to_string(), "(abs (- x 0.9))");
    }

    #[test]
    fn test_deeply_nested_round_trip() {
        let depth = 100_000;
        let text = format!("{}x{}", "(sin ".repeat(depth), ")".repeat(depth));
        let parser = parser();

        let tree = parser.parse(&text).unwrap();
        assert_eq!(tree.height(tree.root()), depth + 1);
        assert_eq!(tree.to_string(), text);

        let copy = parser.deep_copy(&tree).unwrap();
        assert_eq!(copy.to_string(), text);

        let inner = tree.children(tree.children(tree.root())[0])[0];
        assert_eq!(tree.to_sexpr(inner).len(), text.len() - 2 * "(sin ".len() - 2);
    }
}
