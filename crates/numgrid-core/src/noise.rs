//! Seeded noise sources: a sequential value-noise matrix for world generation
//! and a smooth lattice noise for the scrolling wave texture.

use crate::constants::{
    HASH_MODULUS, HASH_PRIME_X, HASH_PRIME_Y, LCG_INCREMENT, LCG_MODULUS, LCG_MULTIPLIER,
    TEXTURE_WIDTH_FACTOR,
};

/// Row-major matrix of noise samples in [0, 1).
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseMatrix {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl NoiseMatrix {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sample at (row, col); `None` outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }
}

/// Sequential linear congruential generator. Its state only advances, so a
/// matrix is reproducible only when generated in one uninterrupted pass.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        // Reducing first is equivalent modulo LCG_MODULUS and keeps the
        // multiplication far from overflow.
        Self {
            state: seed % LCG_MODULUS,
        }
    }

    fn next_unit(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }
}

/// Generate a `width` x `height` value-noise matrix from `seed`.
pub fn value_noise(width: usize, height: usize, seed: u64) -> NoiseMatrix {
    let mut lcg = Lcg::new(seed);
    let data = (0..width * height).map(|_| lcg.next_unit()).collect();
    NoiseMatrix {
        width,
        height,
        data,
    }
}

/// Quintic fade curve `t^3 (t (6t - 15) + 10)`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lattice_hash(i: i64, j: i64, seed: i64) -> f64 {
    let h = i
        .wrapping_mul(HASH_PRIME_X)
        .wrapping_add(j.wrapping_mul(HASH_PRIME_Y))
        .wrapping_add(seed)
        .rem_euclid(HASH_MODULUS);
    // h < 2^31 so the mix stays below 2^31 as well.
    (h ^ (h >> 13)) as f64 / (1u64 << 31) as f64
}

/// Smooth 2D lattice noise in [0, 1). Pure in `(x, y, seed)`.
pub fn smooth_noise_2d(x: f64, y: f64, seed: u64) -> f64 {
    let seed = (seed % HASH_MODULUS as u64) as i64;
    let x0 = x.floor();
    let y0 = y.floor();
    let (xi, yi) = (x0 as i64, y0 as i64);

    let a = lattice_hash(xi, yi, seed);
    let b = lattice_hash(xi + 1, yi, seed);
    let c = lattice_hash(xi, yi + 1, seed);
    let d = lattice_hash(xi + 1, yi + 1, seed);

    let u = fade(x - x0);
    let v = fade(y - y0);

    let top = a * (1.0 - u) + b * u;
    let bottom = c * (1.0 - u) + d * u;
    top * (1.0 - v) + bottom * v
}

/// Precomputed wave texture, `TEXTURE_WIDTH_FACTOR` grid widths wide.
#[derive(Clone, Debug)]
pub struct NoiseTexture {
    rows: usize,
    width: usize,
    data: Vec<f64>,
}

impl NoiseTexture {
    pub fn generate(rows: usize, cols: usize, scale_x: f64, scale_y: f64, seed: u64) -> Self {
        let width = cols * TEXTURE_WIDTH_FACTOR;
        let mut data = Vec::with_capacity(rows * width);
        for row in 0..rows {
            for col in 0..width {
                data.push(smooth_noise_2d(
                    col as f64 * scale_x,
                    row as f64 * scale_y,
                    seed,
                ));
            }
        }
        Self { rows, width, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Sample for grid cell (row, col) under a scroll offset (in cells).
    /// Wraps horizontally; `None` for rows outside the texture.
    pub fn sample(&self, row: usize, col: usize, offset: f64) -> Option<f64> {
        if row >= self.rows || self.width == 0 {
            return None;
        }
        let shift = offset.max(0.0).floor() as u64 % self.width as u64;
        let tex_col = (col as u64 % self.width as u64 + shift) % self.width as u64;
        Some(self.data[row * self.width + tex_col as usize])
    }
}
