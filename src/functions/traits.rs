use crate::engines::evaluation::Argument;
use crate::raster::Image;
use anyhow::Result;

/// Primitive image function usable as an interior node of an expression
pub trait Primitive: Send + Sync {
    /// Display name
    fn ui_name(&self) -> &'static str;

    /// Token naming the function in the textual expression format
    fn name(&self) -> &str;

    /// Number of arguments, intrinsic to the function
    fn arity(&self) -> usize;

    /// Produce the output image from exactly `arity` arguments
    fn interpret(&self, width: usize, height: usize, args: &[Argument]) -> Result<Image>;
}

/// Owned description of a registered function, detached from the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPrototype {
    pub name: String,
    pub arity: usize,
}

impl FunctionPrototype {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

pub(crate) fn check_arity(name: &str, expected: usize, args: &[Argument]) -> Result<()> {
    if args.len() != expected {
        anyhow::bail!(
            "{} expects {} arguments, got {}",
            name,
            expected,
            args.len()
        );
    }
    Ok(())
}
