// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector2f };

/// Uniform random stream consumed by integrators and sampling routines.
pub trait Sampler {
    /// A value in `[0, 1)`.
    fn next_1d(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let x = self.next_1d();
        let y = self.next_1d();
        Vector2f::new(x, y)
    }
}

/// 64-bit linear congruential stream, one per pixel.
#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Pixel stream seed: the low render-seed bits above the pixel coordinates.
    pub fn for_pixel(seed: u64, x: usize, y: usize) -> Self {
        Self::new(((seed & 0xFFF) << 32)
                  | (((y as u64) & 0xFFFF) << 16)
                  | ((x as u64) & 0xFFFF))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    pub fn next_f32(&mut self) -> Float {
        // 24 mantissa bits keep the result strictly below one.
        ((self.next_u32() >> 8) as Float) * (1.0 / 16777216.0)
    }
}

impl Sampler for LcgRng {
    fn next_1d(&mut self) -> Float {
        self.next_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::{ LcgRng, Sampler };

    #[test]
    fn test_lcg_range_and_determinism() {
        let mut a = LcgRng::new(42);
        let mut b = LcgRng::new(42);
        for _ in 0..10000 {
            let x = a.next_1d();
            assert!(x >= 0.0 && x < 1.0);
            assert_eq!(x, b.next_1d());
        }
    }

    #[test]
    fn test_lcg_mean() {
        let mut rng = LcgRng::for_pixel(3, 10, 20);
        let n = 100000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            sum += rng.next_2d().x as f64;
        }
        assert!((sum / n as f64 - 0.5).abs() < 0.01);
    }
}
