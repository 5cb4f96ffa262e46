use anyhow::Result;

use crate::engines::evaluation::Argument;
use crate::functions::traits::{check_arity, Primitive};
use crate::raster::{Image, Pixel};

const PERMUTATION: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

fn perm(i: usize) -> usize {
    PERMUTATION[i & 255] as usize
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Ken Perlin's improved noise, in roughly `[-1, 1]`
pub fn perlin(x: f64, y: f64, z: f64) -> f64 {
    let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
    let xi = (fx as i64 & 255) as usize;
    let yi = (fy as i64 & 255) as usize;
    let zi = (fz as i64 & 255) as usize;
    let (x, y, z) = (x - fx, y - fy, z - fz);
    let (u, v, w) = (fade(x), fade(y), fade(z));

    let a = perm(xi) + yi;
    let aa = perm(a) + zi;
    let ab = perm(a + 1) + zi;
    let b = perm(xi + 1) + yi;
    let ba = perm(b) + zi;
    let bb = perm(b + 1) + zi;

    lerp(
        w,
        lerp(
            v,
            lerp(u, grad(perm(aa), x, y, z), grad(perm(ba), x - 1.0, y, z)),
            lerp(u, grad(perm(ab), x, y - 1.0, z), grad(perm(bb), x - 1.0, y - 1.0, z)),
        ),
        lerp(
            v,
            lerp(
                u,
                grad(perm(aa + 1), x, y, z - 1.0),
                grad(perm(ba + 1), x - 1.0, y, z - 1.0),
            ),
            lerp(
                u,
                grad(perm(ab + 1), x, y - 1.0, z - 1.0),
                grad(perm(bb + 1), x - 1.0, y - 1.0, z - 1.0),
            ),
        ),
    )
}

fn noise_pixel(a: Pixel, b: Pixel, c: Pixel) -> Pixel {
    Pixel::new(perlin(a.r, b.r, c.r), perlin(a.g, b.g, c.g), perlin(a.b, b.b, c.b))
}

pub struct Noise;

impl Primitive for Noise {
    fn ui_name(&self) -> &'static str { "Perlin Noise" }
    fn name(&self) -> &str { "noise" }
    fn arity(&self) -> usize { 3 }
    fn interpret(&self, width: usize, height: usize, args: &[Argument]) -> Result<Image> {
        check_arity(self.name(), 3, args)?;
        let a = args[0].to_image(width, height).normalized();
        let b = args[1].to_image(width, height).normalized();
        let c = args[2].to_image(width, height).normalized();
        Ok(Image::from_fn(width, height, |x, y| {
            noise_pixel(a.get(x, y), b.get(x, y), c.get(x, y))
        }))
    }
}

/// Noise from the first three arguments, scattered to the coordinates named by the last two
pub struct WarpedNoise;

impl Primitive for WarpedNoise {
    fn ui_name(&self) -> &'static str { "Warped Perlin Noise" }
    fn name(&self) -> &str { "warped-noise" }
    fn arity(&self) -> usize { 5 }
    fn interpret(&self, width: usize, height: usize, args: &[Argument]) -> Result<Image> {
        check_arity(self.name(), 5, args)?;
        let a = args[0].to_image(width, height).normalized();
        let b = args[1].to_image(width, height).normalized();
        let c = args[2].to_image(width, height).normalized();
        let max_x = width.saturating_sub(1) as f64;
        let max_y = height.saturating_sub(1) as f64;
        let warp_x = args[3].to_image(width, height).scaled(0.0, max_x);
        let warp_y = args[4].to_image(width, height).scaled(0.0, max_y);

        let mut image = Image::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let new_x = (warp_x.get(x, y).r.floor().max(0.0) as usize).min(width - 1);
                let new_y = (warp_y.get(x, y).g.floor().max(0.0) as usize).min(height - 1);
                image.set(new_x, new_y, noise_pixel(a.get(x, y), b.get(x, y), c.get(x, y)));
            }
        }
        Ok(image)
    }
}
