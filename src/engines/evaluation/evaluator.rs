use std::sync::Arc;

use super::argument::Argument;
use crate::engines::expression::{ExprTree, NodeId, NodeKind};
use crate::error::{PicEvolveError, Result};
use crate::functions::FunctionRegistry;
use crate::raster::Image;

/// Turns an expression tree into an image by post-order interpretation
#[derive(Clone)]
pub struct Evaluator {
    registry: Arc<FunctionRegistry>,
}

impl Evaluator {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self { registry }
    }

    /// Evaluate and normalize every channel into `[0, 1]`
    pub fn evaluate(&self, tree: &ExprTree, width: usize, height: usize) -> Result<Image> {
        Ok(self.interpret(tree, width, height)?.normalized())
    }

    /// Raw image produced at the root, before normalization
    pub fn interpret(&self, tree: &ExprTree, width: usize, height: usize) -> Result<Image> {
        let mut images: Vec<Image> = Vec::new();
        // Children are queued left to right so the rightmost one is evaluated
        // first; popping images then yields arguments in left-to-right order.
        let mut pending: Vec<(NodeId, bool)> = vec![(tree.root(), false)];

        while let Some((id, expanded)) = pending.pop() {
            match tree.kind(id) {
                NodeKind::Function { name, arity } => {
                    if !expanded {
                        pending.push((id, true));
                        pending.extend(tree.children(id).iter().map(|&c| (c, false)));
                        continue;
                    }
                    if images.len() < *arity {
                        return Err(PicEvolveError::StructuralInvariant(format!(
                            "function '{}' needs {} images but only {} are on the stack",
                            name,
                            arity,
                            images.len()
                        )));
                    }
                    let args: Vec<Argument> = (0..*arity)
                        .filter_map(|_| images.pop())
                        .map(Argument::Image)
                        .collect();
                    images.push(self.apply(name, width, height, &args)?);
                }
                terminal => {
                    if let Some(value) = terminal.as_terminal() {
                        let image = Argument::from(value).to_image(width, height).into_owned();
                        images.push(image);
                    }
                }
            }
        }

        if images.len() != 1 {
            return Err(PicEvolveError::StructuralInvariant(format!(
                "evaluation finished with {} images on the stack",
                images.len()
            )));
        }
        images
            .pop()
            .ok_or_else(|| PicEvolveError::StructuralInvariant("empty image stack".to_string()))
    }

    fn apply(&self, name: &str, width: usize, height: usize, args: &[Argument]) -> Result<Image> {
        let primitive = self
            .registry
            .get_primitive(name)
            .ok_or_else(|| PicEvolveError::UnknownFunction(name.to_string()))?;
        let image = primitive
            .interpret(width, height, args)
            .map_err(|source| PicEvolveError::FunctionFailed {
                name: name.to_string(),
                source,
            })?;
        if image.width() != width || image.height() != height {
            return Err(PicEvolveError::FunctionFailed {
                name: name.to_string(),
                source: anyhow::anyhow!(
                    "produced a {}x{} image, expected {}x{}",
                    image.width(),
                    image.height(),
                    width,
                    height
                ),
            });
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::expression::Parser;

    fn setup() -> (Parser, Evaluator) {
        let registry = Arc::new(FunctionRegistry::with_builtins().unwrap());
        (Parser::new(registry.clone()), Evaluator::new(registry))
    }

    #[test]
    fn test_x() {
        let (parser, evaluator) = setup();
        let image = evaluator.interpret(&parser.parse("x").unwrap(), 3, 3).unwrap();
        let row = [-1.0, -1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        assert_eq!(image.as_channels(), row.repeat(3));
    }

    #[test]
    fn test_y() {
        let (parser, evaluator) = setup();
        let image = evaluator.interpret(&parser.parse("y").unwrap(), 3, 3).unwrap();
        let mut expected = vec![1.0; 9];
        expected.extend([0.0; 9]);
        expected.extend([-1.0; 9]);
        assert_eq!(image.as_channels(), expected);
    }

    #[test]
    fn test_expression() {
        let (parser, evaluator) = setup();
        let tree = parser.parse("(abs (- x y))").unwrap();
        let image = evaluator.interpret(&tree, 3, 3).unwrap();
        assert_eq!(
            image.as_channels(),
            vec![
                2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0,
                1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0,
                0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0,
            ]
        );
    }

    #[test]
    fn test_arguments_keep_child_order() {
        let (parser, evaluator) = setup();
        let image = evaluator.interpret(&parser.parse("(- x 1.0)").unwrap(), 3, 1).unwrap();
        let reds: Vec<f64> = image.pixels().iter().map(|p| p.r).collect();
        assert_eq!(reds, vec![-2.0, -1.0, 0.0]);
    }

    #[test]
    fn test_evaluate_normalizes() {
        let (parser, evaluator) = setup();
        let image = evaluator.evaluate(&parser.parse("(* x 5.0)").unwrap(), 3, 1).unwrap();
        let reds: Vec<f64> = image.pixels().iter().map(|p| p.r).collect();
        assert_eq!(reds, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_unknown_function_reported() {
        let mut registry = FunctionRegistry::new();
        registry
            .register_fn("ghost", 1, |w, h, _| Ok(Image::new(w, h)))
            .unwrap();
        let parser = Parser::new(Arc::new(registry));
        let tree = parser.parse("(ghost x)").unwrap();

        let evaluator = Evaluator::new(Arc::new(FunctionRegistry::new()));
        assert!(matches!(
            evaluator.interpret(&tree, 2, 2),
            Err(PicEvolveError::UnknownFunction(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_wrong_size_output_rejected() {
        let mut registry = FunctionRegistry::new();
        registry
            .register_fn("shrink", 1, |_, _, _| Ok(Image::new(1, 1)))
            .unwrap();
        let registry = Arc::new(registry);
        let tree = Parser::new(registry.clone()).parse("(shrink x)").unwrap();
        let result = Evaluator::new(registry).interpret(&tree, 4, 4);
        assert!(matches!(result, Err(PicEvolveError::FunctionFailed { .. })));
    }
}
