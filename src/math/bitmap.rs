// Copyright 2020 @TwoCookingMice

use super::spectrum::RGBSpectrum;

use std::ops;
use std::vec::Vec;

/// Row-major RGB film.
#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<RGBSpectrum>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = RGBSpectrum;

    fn index(&self, index: (usize, usize)) -> &RGBSpectrum {
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut RGBSpectrum {
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self { data: vec![RGBSpectrum::zero(); width * height],
               width: width,
               height: height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Flat `[r, g, b, r, g, b, ...]` copy for image writers.
    pub fn raw_copy(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.data.len() * 3);
        for px in &self.data {
            out.push(px.r());
            out.push(px.g());
            out.push(px.b());
        }
        out
    }

    pub fn mean(&self) -> RGBSpectrum {
        if self.data.is_empty() {
            return RGBSpectrum::zero();
        }
        let mut sum = RGBSpectrum::zero();
        for px in &self.data {
            sum += *px;
        }
        sum / self.data.len() as f32
    }
}

/* Test for Bitmap */
#[cfg(test)]
mod tests {
    use super::{ Bitmap, RGBSpectrum };

    #[test]
    fn test_bitmap_basic_functions() {
        let mut bitmap = Bitmap::new(256usize, 128usize);
        assert_eq!(bitmap.width(), 256);
        assert_eq!(bitmap.height(), 128);

        bitmap[(5, 6)] = RGBSpectrum::new(1.0, 0.5, 0.6);
        assert_eq!(bitmap[(5, 6)].r(), 1.0);
        assert!(bitmap[(2, 6)].is_black());

        let raw = bitmap.raw_copy();
        let offset = 3 * (5 + 256 * 6);
        assert_eq!(&raw[offset..offset + 3], &[1.0, 0.5, 0.6]);
    }
}
