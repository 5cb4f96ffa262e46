use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::{
    bitwise,
    convolution::Convolution,
    noise::{Noise, WarpedNoise},
    primitives,
    traits::{FunctionPrototype, Primitive},
};
use crate::engines::evaluation::Argument;
use crate::error::{PicEvolveError, Result};
use crate::raster::Image;

type Transform = dyn Fn(usize, usize, &[Argument]) -> anyhow::Result<Image> + Send + Sync;

/// Primitive backed by a closure, for functions registered at runtime
pub struct FnPrimitive {
    name: String,
    arity: usize,
    transform: Box<Transform>,
}

impl Primitive for FnPrimitive {
    fn ui_name(&self) -> &'static str {
        "Custom Function"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn interpret(&self, width: usize, height: usize, args: &[Argument]) -> anyhow::Result<Image> {
        super::traits::check_arity(&self.name, self.arity, args)?;
        (self.transform)(width, height, args)
    }
}

/// Table of named primitive functions, keyed by their expression token
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Primitive>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Registry holding the full built-in function set
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        registry.register_arithmetic()?;
        registry.register_bitwise()?;
        registry.register_noise()?;
        registry.register_convolutions()?;
        Ok(registry)
    }

    pub fn register(&mut self, primitive: Arc<dyn Primitive>) -> Result<()> {
        let name = primitive.name().to_string();
        if self.functions.contains_key(&name) {
            return Err(PicEvolveError::DuplicateFunction(name));
        }
        self.functions.insert(name, primitive);
        Ok(())
    }

    pub fn register_fn<F>(&mut self, name: &str, arity: usize, transform: F) -> Result<()>
    where
        F: Fn(usize, usize, &[Argument]) -> anyhow::Result<Image> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnPrimitive {
            name: name.to_string(),
            arity,
            transform: Box::new(transform),
        }))
    }

    pub fn lookup(&self, name: &str) -> Option<FunctionPrototype> {
        self.functions
            .get(name)
            .map(|f| FunctionPrototype::new(f.name(), f.arity()))
    }

    pub fn arity(&self, name: &str) -> Option<usize> {
        self.functions.get(name).map(|f| f.arity())
    }

    pub fn get_primitive(&self, name: &str) -> Option<Arc<dyn Primitive>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn all_names(&self) -> BTreeSet<String> {
        self.functions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn register_arithmetic(&mut self) -> Result<()> {
        for op in primitives::arithmetic() {
            self.register(Arc::new(op))?;
        }
        for op in primitives::elementary() {
            self.register(Arc::new(op))?;
        }
        Ok(())
    }

    fn register_bitwise(&mut self) -> Result<()> {
        for op in bitwise::all() {
            self.register(Arc::from(op))?;
        }
        Ok(())
    }

    fn register_noise(&mut self) -> Result<()> {
        self.register(Arc::new(Noise))?;
        self.register(Arc::new(WarpedNoise))
    }

    fn register_convolutions(&mut self) -> Result<()> {
        self.register(Arc::new(Convolution::blur()))?;
        self.register(Arc::new(Convolution::sharpen()))?;
        self.register(Arc::new(Convolution::emboss()))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = FunctionRegistry::with_builtins().unwrap();
        assert_eq!(registry.len(), 25);
        assert_eq!(registry.arity("warped-noise"), Some(5));
        assert_eq!(registry.arity("-"), Some(2));
        assert_eq!(registry.arity("abs"), Some(1));
    }

    #[test]
    fn test_lookup_returns_prototype() {
        let registry = FunctionRegistry::with_builtins().unwrap();
        let noise = registry.lookup("noise").unwrap();
        assert_eq!(noise, FunctionPrototype::new("noise", 3));
    }

    #[test]
    fn test_function_not_found() {
        let registry = FunctionRegistry::with_builtins().unwrap();
        assert!(registry.lookup("NonExistent").is_none());
        assert!(registry.get_primitive("NonExistent").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = FunctionRegistry::with_builtins().unwrap();
        let result = registry.register_fn("abs", 1, |w, h, _| Ok(Image::new(w, h)));
        assert!(matches!(result, Err(PicEvolveError::DuplicateFunction(name)) if name == "abs"));
    }

    #[test]
    fn test_all_names_sorted() {
        let mut registry = FunctionRegistry::new();
        registry.register_fn("zeta", 1, |w, h, _| Ok(Image::new(w, h))).unwrap();
        registry.register_fn("alpha", 2, |w, h, _| Ok(Image::new(w, h))).unwrap();
        let names: Vec<String> = registry.all_names().into_iter().collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
