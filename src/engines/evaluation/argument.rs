use std::borrow::Cow;

use crate::raster::{Image, Pixel};
use crate::types::{Axis, Terminal};

/// An argument handed to a primitive function
#[derive(Debug, Clone)]
pub enum Argument {
    Scalar(f64),
    Vector([f64; 3]),
    Variable(Axis),
    Image(Image),
}

impl Argument {
    /// Coerce the argument into an image of the requested size
    pub fn to_image(&self, width: usize, height: usize) -> Cow<'_, Image> {
        match self {
            Argument::Scalar(value) => Cow::Owned(Image::filled(width, height, Pixel::gray(*value))),
            Argument::Vector([r, g, b]) => {
                Cow::Owned(Image::filled(width, height, Pixel::new(*r, *g, *b)))
            }
            Argument::Variable(axis) => Cow::Owned(gradient(*axis, width, height)),
            Argument::Image(image) => Cow::Borrowed(image),
        }
    }
}

impl From<Terminal> for Argument {
    fn from(terminal: Terminal) -> Self {
        match terminal {
            Terminal::Scalar(v) => Argument::Scalar(v),
            Terminal::Vector(v) => Argument::Vector(v),
            Terminal::Variable(axis) => Argument::Variable(axis),
        }
    }
}

/// Coordinate ramp over one axis, rescaled into `[-1, 1]`.
/// X rises left to right; Y falls top to bottom.
fn gradient(axis: Axis, width: usize, height: usize) -> Image {
    let x_start = -((width / 2) as f64);
    let y_start = (height / 2) as f64;
    Image::from_fn(width, height, |x, y| match axis {
        Axis::X => Pixel::gray(x_start + x as f64),
        Axis::Y => Pixel::gray(y_start - y as f64),
    })
    .scaled(-1.0, 1.0)
}
