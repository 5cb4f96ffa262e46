use anyhow::Result;

use crate::engines::evaluation::Argument;
use crate::functions::traits::{check_arity, Primitive};
use crate::raster::{Image, Pixel};

/// How pixels near the border, where the kernel does not fit, are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    /// Samples outside the image read as black
    ZeroPad,
    /// Border pixels are copied through unchanged
    Untouched,
}

/// Square convolution kernel applied to the input normalized to `[0, 1]`,
/// with the result clamped back into `[0, 1]`
pub struct Convolution {
    name: &'static str,
    ui_name: &'static str,
    size: usize,
    weights: Vec<f64>,
    edge: EdgeMode,
}

impl Convolution {
    pub fn new(
        name: &'static str,
        ui_name: &'static str,
        size: usize,
        weights: Vec<f64>,
        edge: EdgeMode,
    ) -> Self {
        debug_assert_eq!(weights.len(), size * size);
        Self { name, ui_name, size, weights, edge }
    }

    pub fn blur() -> Self {
        let size = 20;
        let weight = 1.0 / (size * size) as f64;
        Self::new("blur", "Box Blur", size, vec![weight; size * size], EdgeMode::ZeroPad)
    }

    pub fn sharpen() -> Self {
        let weights = vec![1.0, 1.0, 1.0, 1.0, -7.0, 1.0, 1.0, 1.0, 1.0];
        Self::new("sharpen", "Sharpen", 3, weights, EdgeMode::Untouched)
    }

    pub fn emboss() -> Self {
        #[rustfmt::skip]
        let weights = vec![
            -1.0, -1.0, -1.0, -1.0, 0.0,
            -1.0, -1.0, -1.0, 0.0, 1.0,
            -1.0, -1.0, 0.0, 1.0, 1.0,
            -1.0, 0.0, 1.0, 1.0, 1.0,
            0.0, 1.0, 1.0, 1.0, 1.0,
        ];
        Self::new("emboss", "Emboss", 5, weights, EdgeMode::Untouched)
    }

    fn convolve(&self, source: &Image) -> Image {
        let (width, height) = (source.width() as isize, source.height() as isize);
        let half = (self.size / 2) as isize;
        let size = self.size as isize;

        Image::from_fn(source.width(), source.height(), |x, y| {
            let (x, y) = (x as isize, y as isize);
            let fits = x - half >= 0
                && y - half >= 0
                && x - half + size <= width
                && y - half + size <= height;
            if self.edge == EdgeMode::Untouched && !fits {
                return source.get(x as usize, y as usize);
            }

            let mut acc = Pixel::default();
            for ky in 0..size {
                for kx in 0..size {
                    let sx = x - half + kx;
                    let sy = y - half + ky;
                    if sx < 0 || sy < 0 || sx >= width || sy >= height {
                        continue;
                    }
                    let w = self.weights[(ky * size + kx) as usize];
                    let p = source.get(sx as usize, sy as usize);
                    acc = Pixel::new(acc.r + w * p.r, acc.g + w * p.g, acc.b + w * p.b);
                }
            }
            acc.map(|c| c.clamp(0.0, 1.0))
        })
    }
}

impl Primitive for Convolution {
    fn ui_name(&self) -> &'static str { self.ui_name }
    fn name(&self) -> &str { self.name }
    fn arity(&self) -> usize { 1 }
    fn interpret(&self, width: usize, height: usize, args: &[Argument]) -> Result<Image> {
        check_arity(self.name, 1, args)?;
        let source = args[0].to_image(width, height).normalized();
        Ok(self.convolve(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    #[test]
    fn test_sharpen_leaves_border_untouched() {
        let source = Image::from_fn(4, 4, |x, y| Pixel::gray(((x + y) % 2) as f64));
        let sharpened = Convolution::sharpen().convolve(&source);
        assert_eq!(sharpened.get(0, 0), source.get(0, 0));
        assert_eq!(sharpened.get(3, 2), source.get(3, 2));
    }

    #[test]
    fn test_blur_output_stays_in_unit_range() {
        let image = Convolution::blur()
            .interpret(8, 8, &[Argument::Variable(Axis::X)])
            .unwrap();
        assert!(image.as_channels().iter().all(|&c| (0.0..=1.0).contains(&c)));
    }
}
