/* Copyright 2020 @TwoCookingMice */

use exr::prelude::*;

/// Writes an interleaved RGB film (`width * height * 3` floats, row major)
/// as a 32-bit float OpenEXR file.
pub fn write_exr_to_file(image: &[f32],
                         width: usize,
                         height: usize,
                         file_path: &str) -> std::result::Result<(), String> {
    if image.len() != width * height * 3 {
        return Err(format!("film holds {} floats, expected {}x{}x3",
                           image.len(), width, height));
    }

    log::info!("Writing OpenEXR image: {} ({}x{}).", file_path, width, height);
    write_rgb_file(file_path, width, height, |x, y| {
        let base = (y * width + x) * 3;
        (image[base], image[base + 1], image[base + 2])
    }).map_err(|e| e.to_string())
}

/// Reads the RGB channels of an OpenEXR file into an interleaved buffer.
pub fn read_exr_from_file(file_path: &str) -> std::result::Result<(usize, usize, Vec<f32>), String> {
    log::info!("Reading OpenEXR image: {}.", file_path);

    let image = read_first_rgba_layer_from_file(
        file_path,
        |resolution, _| {
            let width = resolution.width();
            let height = resolution.height();
            (width, height, vec![0.0f32; width * height * 3])
        },
        |(width, _, pixels), position, (r, g, b, _a): (f32, f32, f32, f32)| {
            let base = (position.y() * *width + position.x()) * 3;
            pixels[base] = r;
            pixels[base + 1] = g;
            pixels[base + 2] = b;
        },
    ).map_err(|e| e.to_string())?;

    let (width, height, pixels) = image.layer_data.channel_data.pixels;
    Ok((width, height, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_exr() {
        let path = std::env::temp_dir().join("brume_exr_utils_test.exr");
        let path = path.to_string_lossy().to_string();
        let width = 3;
        let height = 2;
        let data: Vec<f32> = (0..width * height * 3).map(|i| i as f32 * 0.25).collect();

        write_exr_to_file(&data, width, height, &path).expect("write failed");
        let (w, h, pixels) = read_exr_from_file(&path).expect("read failed");
        assert_eq!((w, h), (width, height));
        for (a, b) in data.iter().zip(pixels.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let data = vec![0.0f32; 5];
        assert!(write_exr_to_file(&data, 2, 2, "unused.exr").is_err());
    }
}
