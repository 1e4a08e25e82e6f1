// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

/// Linear RGB radiometric quantity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_vector(rgb: Vector3f) -> Self {
        Self { rgb }
    }

    pub fn to_vector(&self) -> Vector3f {
        self.rgb
    }

    pub fn r(&self) -> Float { self.rgb[0] }
    pub fn g(&self) -> Float { self.rgb[1] }
    pub fn b(&self) -> Float { self.rgb[2] }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|c| *c == 0.0f32)
    }

    pub fn is_finite(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite())
    }

    pub fn max_value(&self) -> Float {
        self.rgb[0].max(self.rgb[1]).max(self.rgb[2])
    }

    pub fn mean(&self) -> Float {
        (self.rgb[0] + self.rgb[1] + self.rgb[2]) / 3.0
    }

    pub fn luminance(&self) -> Float {
        0.212671 * self.rgb[0] + 0.715160 * self.rgb[1] + 0.072169 * self.rgb[2]
    }

    pub fn exp(&self) -> Self {
        Self::new(self.rgb[0].exp(), self.rgb[1].exp(), self.rgb[2].exp())
    }

    pub fn clamp_negative(&self) -> Self {
        Self::new(self.rgb[0].max(0.0), self.rgb[1].max(0.0), self.rgb[2].max(0.0))
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, idx: usize) -> &Float {
        &self.rgb[idx]
    }
}

impl ops::IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, idx: usize) -> &mut Float {
        &mut self.rgb[idx]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Sub for RGBSpectrum {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { rgb: self.rgb - rhs.rgb }
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Self) {
        self.rgb.component_mul_assign(&rhs.rgb);
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = Self;
    fn mul(self, rhs: Float) -> Self {
        Self { rgb: self.rgb * rhs }
    }
}

impl ops::Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;
    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        rhs * self
    }
}

impl ops::MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        self.rgb *= rhs;
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = Self;
    fn div(self, rhs: Float) -> Self {
        Self { rgb: self.rgb / rhs }
    }
}

impl ops::DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, rhs: Float) {
        self.rgb /= rhs;
    }
}

// Channels divided by zero come out as zero.
impl ops::Div for RGBSpectrum {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let mut out = Self::zero();
        for idx in 0..3 {
            if rhs.rgb[idx] != 0.0 {
                out.rgb[idx] = self.rgb[idx] / rhs.rgb[idx];
            }
        }
        out
    }
}

impl ops::Neg for RGBSpectrum {
    type Output = Self;
    fn neg(self) -> Self {
        Self { rgb: -self.rgb }
    }
}

#[cfg(test)]
mod tests {
    use super::RGBSpectrum;

    #[test]
    fn test_spectrum_arithmetic() {
        let a = RGBSpectrum::new(1.0, 2.0, 3.0);
        let b = RGBSpectrum::splat(2.0);
        assert_eq!(a * b, RGBSpectrum::new(2.0, 4.0, 6.0));
        assert_eq!(a + b, RGBSpectrum::new(3.0, 4.0, 5.0));
        assert_eq!(a / 2.0, RGBSpectrum::new(0.5, 1.0, 1.5));
        assert_eq!(2.0 * a, a * 2.0);
        assert_eq!(a.max_value(), 3.0);
        assert!((a.mean() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_spectrum_black_and_division() {
        assert!(RGBSpectrum::zero().is_black());
        assert!(!RGBSpectrum::new(0.0, 1e-6, 0.0).is_black());

        let q = RGBSpectrum::new(1.0, 1.0, 1.0) / RGBSpectrum::new(2.0, 0.0, 4.0);
        assert_eq!(q, RGBSpectrum::new(0.5, 0.0, 0.25));
    }
}
