// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::io::exr_utils;
use crate::math::constants::{Float, MatrixXF, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use image::io::Reader as ImageReader;
use image::GenericImageView;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Bilinear,
    Nearest,
}

impl FilterMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bilinear" => Some(FilterMode::Bilinear),
            "nearest" => Some(FilterMode::Nearest),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    Mirror,
    Clamp,
}

impl WrapMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "repeat" => Some(WrapMode::Repeat),
            "mirror" => Some(WrapMode::Mirror),
            "clamp" => Some(WrapMode::Clamp),
            _ => None,
        }
    }
}

/// Bitmap texture. Rows are stored top to bottom, `v = 1` is the top row.
pub struct ImageTexture {
    width: usize,
    height: usize,
    data: MatrixXF,
    filter_mode: FilterMode,
    wrap_mode: WrapMode,
    scale: Float,
}

fn srgb_to_linear(v: Float) -> Float {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

impl ImageTexture {
    /// Builds a texture from interleaved RGB rows.
    pub fn from_pixels(width: usize, height: usize, pixels: &[Float]) -> std::result::Result<Self, String> {
        if width == 0 || height == 0 || pixels.len() != width * height * 3 {
            return Err(format!("invalid pixel buffer for a {}x{} texture", width, height));
        }
        let data = MatrixXF::from_row_slice(height, width * 3, pixels);
        Ok(Self {
            width,
            height,
            data,
            filter_mode: FilterMode::Bilinear,
            wrap_mode: WrapMode::Repeat,
            scale: 1.0,
        })
    }

    /// Loads PNG/JPEG (optionally sRGB decoded) or EXR (always linear).
    pub fn from_file(path: &str, srgb: bool) -> std::result::Result<Self, String> {
        let ext = Path::new(path)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "exr" => {
                let (width, height, pixels) = exr_utils::read_exr_from_file(path)?;
                Self::from_pixels(width, height, &pixels)
            }
            "jpg" | "jpeg" | "png" => Self::from_image(path, srgb),
            _ => Err(format!("unsupported texture format: {}", ext)),
        }
    }

    fn from_image(path: &str, srgb: bool) -> std::result::Result<Self, String> {
        let img = ImageReader::open(path)
            .map_err(|e| format!("failed to open image {}: {}", path, e))?
            .decode()
            .map_err(|e| format!("failed to decode image {}: {}", path, e))?;

        let (width, height) = img.dimensions();
        let rgb = img.to_rgb32f();
        let decode = |v: Float| if srgb { srgb_to_linear(v) } else { v };
        let pixels: Vec<Float> = rgb.pixels()
            .flat_map(|p| vec![decode(p[0]), decode(p[1]), decode(p[2])])
            .collect();

        log::info!("Loaded texture {} ({}x{}).", path, width, height);
        Self::from_pixels(width as usize, height as usize, &pixels)
    }

    pub fn with_filter_mode(mut self, filter_mode: FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    pub fn with_wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }

    pub fn with_scale(mut self, scale: Float) -> Self {
        self.scale = scale;
        self
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn pixel_at(&self, x: usize, y: usize) -> RGBSpectrum {
        let base = x * 3;
        RGBSpectrum::new(self.data[(y, base)],
                         self.data[(y, base + 1)],
                         self.data[(y, base + 2)])
    }

    fn sample_bilinear(&self, uv: &Vector2f) -> RGBSpectrum {
        let x = uv.x * (self.width as Float) - 0.5;
        let y = (1.0 - uv.y) * (self.height as Float) - 0.5;

        let x0 = x.floor() as isize;
        let y0 = y.floor() as isize;
        let tx = x - x0 as Float;
        let ty = y - y0 as Float;

        let x0u = self.wrap_index(x0, self.width);
        let y0u = self.wrap_index(y0, self.height);
        let x1u = self.wrap_index(x0 + 1, self.width);
        let y1u = self.wrap_index(y0 + 1, self.height);

        let top = self.pixel_at(x0u, y0u) * (1.0 - tx) + self.pixel_at(x1u, y0u) * tx;
        let bottom = self.pixel_at(x0u, y1u) * (1.0 - tx) + self.pixel_at(x1u, y1u) * tx;
        top * (1.0 - ty) + bottom * ty
    }

    fn sample_nearest(&self, uv: &Vector2f) -> RGBSpectrum {
        let x = (uv.x * (self.width as Float)).floor() as isize;
        let y = ((1.0 - uv.y) * (self.height as Float)).floor() as isize;
        self.pixel_at(self.wrap_index(x, self.width), self.wrap_index(y, self.height))
    }

    fn wrap_coord(&self, value: Float) -> Float {
        match self.wrap_mode {
            WrapMode::Repeat => value.rem_euclid(1.0),
            WrapMode::Mirror => {
                let v = value.rem_euclid(2.0);
                if v > 1.0 { 2.0 - v } else { v }
            }
            WrapMode::Clamp => value.clamp(0.0, 1.0),
        }
    }

    fn wrap_index(&self, idx: isize, size: usize) -> usize {
        let n = size as isize;
        match self.wrap_mode {
            WrapMode::Repeat => idx.rem_euclid(n) as usize,
            WrapMode::Clamp => idx.clamp(0, n - 1) as usize,
            WrapMode::Mirror => {
                if n == 1 {
                    return 0;
                }
                let period = 2 * (n - 1);
                let mut i = idx.rem_euclid(period);
                if i >= n {
                    i = period - i;
                }
                i as usize
            }
        }
    }
}

impl Texture for ImageTexture {
    fn describe(&self) -> String {
        format!("ImageTexture[{}x{}, {:?}, {:?}]",
                self.width, self.height, self.filter_mode, self.wrap_mode)
    }

    fn eval(&self, uv: &Vector2f) -> RGBSpectrum {
        let uv = Vector2f::new(self.wrap_coord(uv.x), self.wrap_coord(uv.y));
        let value = match self.filter_mode {
            FilterMode::Bilinear => self.sample_bilinear(&uv),
            FilterMode::Nearest => self.sample_nearest(&uv),
        };
        value * self.scale
    }
}
