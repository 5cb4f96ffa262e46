use anyhow::Result;
use std::f64::consts::E;

use crate::engines::evaluation::Argument;
use crate::functions::traits::{check_arity, Primitive};
use crate::raster::Image;

// --- Componentwise unary operators ---
pub struct UnaryOp {
    name: &'static str,
    ui_name: &'static str,
    op: fn(f64) -> f64,
}

impl UnaryOp {
    pub const fn new(name: &'static str, ui_name: &'static str, op: fn(f64) -> f64) -> Self {
        Self { name, ui_name, op }
    }
}

impl Primitive for UnaryOp {
    fn ui_name(&self) -> &'static str { self.ui_name }
    fn name(&self) -> &str { self.name }
    fn arity(&self) -> usize { 1 }
    fn interpret(&self, width: usize, height: usize, args: &[Argument]) -> Result<Image> {
        check_arity(self.name, 1, args)?;
        let op = self.op;
        Ok(args[0].to_image(width, height).map(|p| p.map(op)))
    }
}

// --- Componentwise binary operators ---
pub struct BinaryOp {
    name: &'static str,
    ui_name: &'static str,
    op: fn(f64, f64) -> f64,
}

impl BinaryOp {
    pub const fn new(name: &'static str, ui_name: &'static str, op: fn(f64, f64) -> f64) -> Self {
        Self { name, ui_name, op }
    }
}

impl Primitive for BinaryOp {
    fn ui_name(&self) -> &'static str { self.ui_name }
    fn name(&self) -> &str { self.name }
    fn arity(&self) -> usize { 2 }
    fn interpret(&self, width: usize, height: usize, args: &[Argument]) -> Result<Image> {
        check_arity(self.name, 2, args)?;
        let op = self.op;
        let left = args[0].to_image(width, height);
        let right = args[1].to_image(width, height);
        Ok(left.zip_map(&right, |a, b| a.zip(b, op)))
    }
}

fn divide(a: f64, b: f64) -> f64 {
    if b == 0.0 { 1.0 } else { a / b }
}

fn modulo(a: f64, b: f64) -> f64 {
    if b == 0.0 { 1.0 } else { a % b }
}

fn log_clamped(c: f64) -> f64 {
    if c <= 0.0 { E.ln() } else { c.ln() }
}

pub fn arithmetic() -> Vec<BinaryOp> {
    vec![
        BinaryOp::new("+", "Plus", |a, b| a + b),
        BinaryOp::new("-", "Minus", |a, b| a - b),
        BinaryOp::new("*", "Multiply", |a, b| a * b),
        BinaryOp::new("/", "Divide", divide),
        BinaryOp::new("min", "Minimum", f64::min),
        BinaryOp::new("max", "Maximum", f64::max),
        BinaryOp::new("mod", "Modulo", modulo),
    ]
}

pub fn elementary() -> Vec<UnaryOp> {
    vec![
        UnaryOp::new("abs", "Absolute Value", f64::abs),
        UnaryOp::new("expt", "Exponential", f64::exp),
        UnaryOp::new("log", "Natural Logarithm", log_clamped),
        UnaryOp::new("round", "Round", |c| (c + 0.5).floor()),
        UnaryOp::new("sin", "Sine", f64::sin),
        UnaryOp::new("cos", "Cosine", f64::cos),
        UnaryOp::new("tan", "Tangent", f64::tan),
    ]
}
