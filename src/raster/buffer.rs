use crate::error::Result;
use std::fmt;
use std::path::Path;

/// RGB triple with unbounded floating-point channels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Pixel {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Same value on every channel
    pub fn gray(value: f64) -> Self {
        Self::new(value, value, value)
    }

    pub fn map<F: Fn(f64) -> f64>(self, f: F) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    pub fn zip<F: Fn(f64, f64) -> f64>(self, other: Pixel, f: F) -> Self {
        Self::new(f(self.r, other.r), f(self.g, other.g), f(self.b, other.b))
    }
}

/// A 2D grid of pixels, stored row-major. The phenotype of an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Image {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Pixel::default())
    }

    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width * height],
        }
    }

    pub fn from_fn<F: FnMut(usize, usize) -> Pixel>(width: usize, height: usize, mut f: F) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) {
        self.pixels[y * self.width + x] = pixel;
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn map<F: Fn(Pixel) -> Pixel>(&self, f: F) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|&p| f(p)).collect(),
        }
    }

    /// Combine two images pixel by pixel. Both must share this image's dimensions.
    pub fn zip_map<F: Fn(Pixel, Pixel) -> Pixel>(&self, other: &Image, f: F) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self
                .pixels
                .iter()
                .zip(other.pixels.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Flattened channel values: r, g, b of each pixel, row by row
    pub fn as_channels(&self) -> Vec<f64> {
        self.pixels.iter().flat_map(|p| [p.r, p.g, p.b]).collect()
    }

    fn channel_bounds(&self) -> Option<(f64, f64)> {
        let mut channels = self.pixels.iter().flat_map(|p| [p.r, p.g, p.b]);
        let first = channels.next()?;
        Some(channels.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c))))
    }

    /// Copy with every channel linearly rescaled into `[minimum, maximum]`.
    /// A flat image collapses to `minimum`.
    pub fn scaled(&self, minimum: f64, maximum: f64) -> Self {
        let Some((old_min, old_max)) = self.channel_bounds() else {
            return self.clone();
        };
        let range = old_max - old_min;
        self.map(|p| {
            p.map(|c| {
                if range == 0.0 {
                    minimum
                } else {
                    (c - old_min) * (maximum - minimum) / range + minimum
                }
            })
        })
    }

    pub fn normalized(&self) -> Self {
        self.scaled(0.0, 1.0)
    }

    /// Quantize to 8-bit RGB. Channels are expected in `[0, 1]` and clamped otherwise.
    pub fn to_rgb8(&self) -> ::image::RgbImage {
        let quantize = |c: f64| {
            if c.is_nan() {
                0
            } else {
                (c.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        };
        ::image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let p = self.get(x as usize, y as usize);
            ::image::Rgb([quantize(p.r), quantize(p.g), quantize(p.b)])
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, format: ::image::ImageFormat) -> Result<()> {
        self.to_rgb8().save_with_format(path, format)?;
        Ok(())
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.pixels.chunks(self.width.max(1)) {
            let cells: Vec<String> = row
                .iter()
                .map(|p| format!("({}, {}, {})", p.r, p.g, p.b))
                .collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}
