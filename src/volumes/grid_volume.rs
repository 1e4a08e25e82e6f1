// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::error::VolumeLoadError;
use crate::core::volume::{Volume, VolumeDataType};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::volumes::VolumeFilterMode;

use std::fs;

const VOL_FLOAT32: i32 = 1;
const VOL_FLOAT16: i32 = 2;
const VOL_UINT8: i32 = 3;
const VOL_QUANTIZED_DIRECTIONS: i32 = 4;

// Density encoded by the largest uint8 voxel value.
const UINT8_DENSITY_RANGE: Float = 100.0;

enum GridPayload {
    /// Decoded values, `channels` per voxel.
    Values(Vec<Float>),
    /// One `(theta, phi)` byte pair per voxel.
    Directions(Vec<u8>),
}

/// Lookup tables for quantized directions; index 255 decodes to zero.
struct DirectionTables {
    cos_theta: [Float; 256],
    sin_theta: [Float; 256],
    cos_phi: [Float; 256],
    sin_phi: [Float; 256],
}

impl DirectionTables {
    fn new() -> Self {
        let mut tables = Self {
            cos_theta: [0.0; 256],
            sin_theta: [0.0; 256],
            cos_phi: [0.0; 256],
            sin_phi: [0.0; 256],
        };
        for i in 0..255 {
            let angle = i as Float * (PI / 255.0);
            tables.cos_phi[i] = (2.0 * angle).cos();
            tables.sin_phi[i] = (2.0 * angle).sin();
            tables.cos_theta[i] = angle.cos();
            tables.sin_theta[i] = angle.sin();
        }
        tables
    }

    fn decode(&self, theta: u8, phi: u8) -> Vector3f {
        let (theta, phi) = (theta as usize, phi as usize);
        Vector3f::new(self.cos_phi[phi] * self.sin_theta[theta],
                      self.sin_phi[phi] * self.sin_theta[theta],
                      self.cos_theta[theta])
    }
}

/// Regular voxel grid read from a VOL file. Voxel centres sit on the
/// corners of the data bounding box, so the grid spans `res - 1` cells.
pub struct GridVolume {
    id: String,
    data_type: VolumeDataType,
    format: &'static str,
    payload: GridPayload,
    res: [usize; 3],
    channels: usize,
    data_bbox: AABB,
    to_world: Transform,
    filter_mode: VolumeFilterMode,
    tables: DirectionTables,
    step_size: Float,
    max_value: Float,
}

impl GridVolume {
    pub fn from_file(path: &str, data_type: VolumeDataType, id: Option<String>) -> Result<Self, VolumeLoadError> {
        let bytes = fs::read(path)?;
        let volume = Self::from_bytes(&bytes, data_type, id)?;
        log::info!("Loaded {} grid {} ({}x{}x{}, {} channels).",
                   volume.format, path, volume.res[0], volume.res[1], volume.res[2], volume.channels);
        Ok(volume)
    }

    pub fn from_bytes(bytes: &[u8], data_type: VolumeDataType, id: Option<String>) -> Result<Self, VolumeLoadError> {
        if bytes.len() < 4 || &bytes[0..3] != b"VOL" {
            return Err(VolumeLoadError::Format("missing VOL header".to_string()));
        }
        if bytes[3] != 3 {
            return Err(VolumeLoadError::Format(format!("unsupported VOL version {}", bytes[3])));
        }

        let mut cursor = 4usize;
        let encoding = read_i32(bytes, &mut cursor)?;
        let xres = read_i32(bytes, &mut cursor)?;
        let yres = read_i32(bytes, &mut cursor)?;
        let zres = read_i32(bytes, &mut cursor)?;
        let channels = read_i32(bytes, &mut cursor)?;
        if xres <= 0 || yres <= 0 || zres <= 0 || channels <= 0 {
            return Err(VolumeLoadError::Format("resolution and channels must be positive".to_string()));
        }
        let channels = channels as usize;

        let format = match encoding {
            VOL_FLOAT32 | VOL_UINT8 => {
                if channels != 1 && channels != 3 {
                    return Err(VolumeLoadError::Unsupported(
                        format!("{} channels (only 1 and 3 are supported)", channels)));
                }
                if encoding == VOL_FLOAT32 { "float32" } else { "uint8" }
            }
            VOL_FLOAT16 => return Err(VolumeLoadError::Unsupported("float16 volumes".to_string())),
            VOL_QUANTIZED_DIRECTIONS => {
                if channels != 3 {
                    return Err(VolumeLoadError::Unsupported(
                        format!("quantized directions with {} channels", channels)));
                }
                "qdir"
            }
            other => return Err(VolumeLoadError::Format(format!("unknown data type {}", other))),
        };

        match data_type {
            VolumeDataType::Density if channels != 1 => {
                return Err(VolumeLoadError::Unsupported("density grids need a single channel".to_string()));
            }
            VolumeDataType::Albedo if channels != 3 || encoding == VOL_QUANTIZED_DIRECTIONS => {
                return Err(VolumeLoadError::Unsupported("albedo grids need three color channels".to_string()));
            }
            VolumeDataType::Orientation if channels != 3 => {
                return Err(VolumeLoadError::Unsupported("orientation grids need three channels".to_string()));
            }
            _ => {}
        }

        let mut corners = [0.0 as Float; 6];
        for value in corners.iter_mut() {
            *value = read_f32(bytes, &mut cursor)?;
        }
        let data_bbox = AABB::new(Vector3f::new(corners[0], corners[1], corners[2]),
                                  Vector3f::new(corners[3], corners[4], corners[5]));

        let res = [xres as usize, yres as usize, zres as usize];
        let voxels = res[0].checked_mul(res[1])
            .and_then(|v| v.checked_mul(res[2]))
            .ok_or_else(|| VolumeLoadError::Format("resolution overflows".to_string()))?;

        // Payload bytes per voxel; the size check happens before any allocation.
        let voxel_bytes = match encoding {
            VOL_FLOAT32 => 4 * channels,
            VOL_UINT8 => channels,
            _ => 2,
        };
        let payload_len = voxels.checked_mul(voxel_bytes)
            .ok_or_else(|| VolumeLoadError::Format("resolution overflows".to_string()))?;
        let raw = take(bytes, &mut cursor, payload_len)?;

        let payload = match encoding {
            VOL_FLOAT32 => GridPayload::Values(raw.chunks_exact(4)
                .map(|c| Float::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect()),
            VOL_UINT8 => {
                let range = if data_type == VolumeDataType::Density { UINT8_DENSITY_RANGE } else { 1.0 };
                GridPayload::Values(raw.iter().map(|v| *v as Float * range / 255.0).collect())
            }
            _ => GridPayload::Directions(raw.to_vec()),
        };

        let max_value = match &payload {
            GridPayload::Values(values) => values.iter().cloned().fold(0.0, Float::max),
            GridPayload::Directions(_) => 0.0,
        };

        let mut volume = Self {
            id: id.unwrap_or_else(|| generate_node_id("GridVolume")),
            data_type,
            format,
            payload,
            res,
            channels,
            data_bbox,
            to_world: Transform::default(),
            filter_mode: VolumeFilterMode::Trilinear,
            tables: DirectionTables::new(),
            step_size: Float::INFINITY,
            max_value,
        };
        volume.update_step_size();
        Ok(volume)
    }

    pub fn with_transform(mut self, to_world: Transform) -> Self {
        self.to_world = to_world;
        self.update_step_size();
        self
    }

    pub fn with_filter_mode(mut self, filter_mode: VolumeFilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.res
    }

    /// Half a voxel along the finest axis, measured in world space.
    fn update_step_size(&mut self) {
        let extent = self.data_bbox.diagonal();
        let mut step = Float::INFINITY;
        for axis in 0..3 {
            if self.res[axis] < 2 {
                continue;
            }
            let mut v = Vector3f::zeros();
            v[axis] = 0.5 * extent[axis] / (self.res[axis] - 1) as Float;
            let world = self.to_world.apply_vector(v).norm();
            if world > 0.0 {
                step = step.min(world);
            }
        }
        self.step_size = step;
    }

    /// Lower and upper voxel indices around `p` plus the interpolation
    /// weights; `None` outside the data bounds.
    fn grid_coords(&self, p: &Vector3f) -> Option<([usize; 3], [usize; 3], Vector3f)> {
        let local = self.to_world.inv_apply_point(*p);
        if !self.data_bbox.contains(&local) {
            return None;
        }
        let extent = self.data_bbox.diagonal();
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        let mut frac = Vector3f::zeros();
        for axis in 0..3 {
            let cells = (self.res[axis] - 1) as Float;
            let g = if extent[axis] > 0.0 {
                (local[axis] - self.data_bbox.p_min[axis]) / extent[axis] * cells
            } else {
                0.0
            };
            let i = (g.max(0.0).floor() as usize).min(self.res[axis] - 1);
            lo[axis] = i;
            hi[axis] = (i + 1).min(self.res[axis] - 1);
            frac[axis] = (g - i as Float).max(0.0).min(1.0);
        }
        Some((lo, hi, frac))
    }

    fn voxel_index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.res[1] + y) * self.res[0] + x
    }

    fn nearest_index(&self, lo: &[usize; 3], hi: &[usize; 3], frac: &Vector3f) -> usize {
        let pick = |axis: usize| if frac[axis] < 0.5 { lo[axis] } else { hi[axis] };
        self.voxel_index(pick(0), pick(1), pick(2))
    }

    fn interpolate(&self, values: &[Float], channel: usize, lo: &[usize; 3], hi: &[usize; 3], frac: &Vector3f) -> Float {
        if self.filter_mode == VolumeFilterMode::Nearest {
            return values[self.nearest_index(lo, hi, frac) * self.channels + channel];
        }
        let at = |x: usize, y: usize, z: usize| values[self.voxel_index(x, y, z) * self.channels + channel];
        let (fx, fy, fz) = (frac.x, frac.y, frac.z);

        let c00 = at(lo[0], lo[1], lo[2]) * (1.0 - fx) + at(hi[0], lo[1], lo[2]) * fx;
        let c10 = at(lo[0], hi[1], lo[2]) * (1.0 - fx) + at(hi[0], hi[1], lo[2]) * fx;
        let c01 = at(lo[0], lo[1], hi[2]) * (1.0 - fx) + at(hi[0], lo[1], hi[2]) * fx;
        let c11 = at(lo[0], hi[1], hi[2]) * (1.0 - fx) + at(hi[0], hi[1], hi[2]) * fx;

        let c0 = c00 * (1.0 - fy) + c10 * fy;
        let c1 = c01 * (1.0 - fy) + c11 * fy;
        c0 * (1.0 - fz) + c1 * fz
    }
}

impl ComputationNode for GridVolume {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("GridVolume[format = {}, resolution = {:?}, channels = {}, type = {:?}]",
                self.format, self.res, self.channels, self.data_type)
    }
}

impl Volume for GridVolume {
    fn bbox(&self) -> Option<AABB> {
        let min = self.data_bbox.p_min;
        let max = self.data_bbox.p_max;
        let mut out = AABB::default();
        for i in 0..8 {
            let corner = Vector3f::new(if i & 1 == 0 { min.x } else { max.x },
                                       if i & 2 == 0 { min.y } else { max.y },
                                       if i & 4 == 0 { min.z } else { max.z });
            out.expand_by_point(&self.to_world.apply_point(corner));
        }
        Some(out)
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn data_type(&self) -> VolumeDataType {
        self.data_type
    }

    fn lookup_float(&self, p: &Vector3f) -> Float {
        let values = match &self.payload {
            GridPayload::Values(values) if self.channels == 1 => values,
            _ => return 0.0,
        };
        match self.grid_coords(p) {
            Some((lo, hi, frac)) => self.interpolate(values, 0, &lo, &hi, &frac),
            None => 0.0,
        }
    }

    fn lookup_spectrum(&self, p: &Vector3f) -> RGBSpectrum {
        let values = match &self.payload {
            GridPayload::Values(values) => values,
            GridPayload::Directions(_) => return RGBSpectrum::zero(),
        };
        let (lo, hi, frac) = match self.grid_coords(p) {
            Some(coords) => coords,
            None => return RGBSpectrum::zero(),
        };
        if self.channels == 1 {
            return RGBSpectrum::splat(self.interpolate(values, 0, &lo, &hi, &frac));
        }
        RGBSpectrum::new(self.interpolate(values, 0, &lo, &hi, &frac),
                         self.interpolate(values, 1, &lo, &hi, &frac),
                         self.interpolate(values, 2, &lo, &hi, &frac))
    }

    fn lookup_vector(&self, p: &Vector3f) -> Vector3f {
        let (lo, hi, frac) = match self.grid_coords(p) {
            Some(coords) => coords,
            None => return Vector3f::zeros(),
        };
        let idx = self.nearest_index(&lo, &hi, &frac);
        let local = match &self.payload {
            GridPayload::Directions(bytes) => self.tables.decode(bytes[2 * idx], bytes[2 * idx + 1]),
            GridPayload::Values(values) if self.channels == 3 => {
                Vector3f::new(values[3 * idx], values[3 * idx + 1], values[3 * idx + 2])
            }
            GridPayload::Values(_) => return Vector3f::zeros(),
        };
        let world = self.to_world.apply_vector(local);
        if world.norm() > 0.0 { world.normalize() } else { Vector3f::zeros() }
    }

    fn step_size(&self) -> Float {
        self.step_size
    }

    fn maximum_float_value(&self) -> Float {
        self.max_value
    }
}

pub(super) fn take<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8], VolumeLoadError> {
    let end = cursor.checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| VolumeLoadError::Format("unexpected end of file".to_string()))?;
    let out = &bytes[*cursor..end];
    *cursor = end;
    Ok(out)
}

pub(super) fn read_i32(bytes: &[u8], cursor: &mut usize) -> Result<i32, VolumeLoadError> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(take(bytes, cursor, 4)?);
    Ok(i32::from_le_bytes(buf))
}

pub(super) fn read_f32(bytes: &[u8], cursor: &mut usize) -> Result<Float, VolumeLoadError> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(take(bytes, cursor, 4)?);
    Ok(Float::from_le_bytes(buf))
}

/// Serializes a VOL file; shared by the volume and medium tests.
#[cfg(test)]
pub(crate) fn encode_vol(encoding: i32, res: [i32; 3], channels: i32, bbox: [f32; 6], payload: &[u8]) -> Vec<u8> {
    let mut out = b"VOL".to_vec();
    out.push(3);
    for v in [encoding, res[0], res[1], res[2], channels].iter() {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in bbox.iter() {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
pub(crate) fn encode_float_payload(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bbox() -> [f32; 6] {
        [0.0, 0.0, 0.0, 1.0, 1.0, 1.0]
    }

    #[test]
    fn test_float32_density_lookup() {
        // Density grows along x: 0 on the x = 0 face, 2 on the x = 1 face.
        let values = [0.0, 2.0, 0.0, 2.0, 0.0, 2.0, 0.0, 2.0];
        let bytes = encode_vol(VOL_FLOAT32, [2, 2, 2], 1, unit_bbox(), &encode_float_payload(&values));
        let vol = GridVolume::from_bytes(&bytes, VolumeDataType::Density, None).expect("valid grid");

        assert!((vol.lookup_float(&Vector3f::new(0.25, 0.5, 0.5)) - 0.5).abs() < 1e-5);
        assert!((vol.lookup_float(&Vector3f::new(1.0, 1.0, 1.0)) - 2.0).abs() < 1e-5);
        assert_eq!(vol.lookup_float(&Vector3f::new(1.5, 0.5, 0.5)), 0.0);
        assert_eq!(vol.maximum_float_value(), 2.0);
        assert!((vol.step_size() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_transform_moves_the_domain() {
        let values = [1.0; 8];
        let bytes = encode_vol(VOL_FLOAT32, [2, 2, 2], 1, unit_bbox(), &encode_float_payload(&values));
        let vol = GridVolume::from_bytes(&bytes, VolumeDataType::Density, None)
            .expect("valid grid")
            .with_transform(Transform::translate(&Vector3f::new(5.0, 0.0, 0.0)));
        assert_eq!(vol.lookup_float(&Vector3f::new(0.5, 0.5, 0.5)), 0.0);
        assert_eq!(vol.lookup_float(&Vector3f::new(5.5, 0.5, 0.5)), 1.0);
        let bbox = vol.bbox().expect("grids are bounded");
        assert!((bbox.p_min - Vector3f::new(5.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_uint8_density_range() {
        let bytes = encode_vol(VOL_UINT8, [1, 1, 1], 1, unit_bbox(), &[255]);
        let vol = GridVolume::from_bytes(&bytes, VolumeDataType::Density, None).expect("valid grid");
        assert!((vol.lookup_float(&Vector3f::new(0.5, 0.5, 0.5)) - 100.0).abs() < 1e-4);
        assert!(vol.step_size().is_infinite());
    }

    #[test]
    fn test_quantized_directions() {
        // theta = 0 points along +z; theta = 255 is the "no direction" code.
        let bytes = encode_vol(VOL_QUANTIZED_DIRECTIONS, [2, 1, 1], 3, unit_bbox(), &[0, 0, 255, 255]);
        let vol = GridVolume::from_bytes(&bytes, VolumeDataType::Orientation, None).expect("valid grid");
        let up = vol.lookup_vector(&Vector3f::new(0.1, 0.5, 0.5));
        assert!((up - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-5);
        assert_eq!(vol.lookup_vector(&Vector3f::new(0.9, 0.5, 0.5)), Vector3f::zeros());
    }

    #[test]
    fn test_rejected_files() {
        let half = encode_vol(VOL_FLOAT16, [1, 1, 1], 1, unit_bbox(), &[0, 0]);
        assert!(matches!(GridVolume::from_bytes(&half, VolumeDataType::Density, None),
                         Err(VolumeLoadError::Unsupported(_))));

        let rgb = encode_vol(VOL_FLOAT32, [1, 1, 1], 3, unit_bbox(), &encode_float_payload(&[1.0, 1.0, 1.0]));
        assert!(matches!(GridVolume::from_bytes(&rgb, VolumeDataType::Density, None),
                         Err(VolumeLoadError::Unsupported(_))));

        let truncated = encode_vol(VOL_FLOAT32, [2, 2, 2], 1, unit_bbox(), &[0, 0, 0, 0]);
        assert!(matches!(GridVolume::from_bytes(&truncated, VolumeDataType::Density, None),
                         Err(VolumeLoadError::Format(_))));

        assert!(matches!(GridVolume::from_bytes(b"BAD!", VolumeDataType::Density, None),
                         Err(VolumeLoadError::Format(_))));
    }

    #[test]
    fn test_oversized_header_over_short_payload() {
        for &encoding in &[VOL_FLOAT32, VOL_UINT8] {
            let bytes = encode_vol(encoding, [1 << 20; 3], 1, unit_bbox(), &[]);
            assert!(matches!(GridVolume::from_bytes(&bytes, VolumeDataType::Density, None),
                             Err(VolumeLoadError::Format(_))));
        }
        let directions = encode_vol(VOL_QUANTIZED_DIRECTIONS, [1 << 20; 3], 3, unit_bbox(), &[0, 0]);
        assert!(matches!(GridVolume::from_bytes(&directions, VolumeDataType::Orientation, None),
                         Err(VolumeLoadError::Format(_))));

        let overflow = encode_vol(VOL_FLOAT32, [i32::MAX; 3], 1, unit_bbox(), &[]);
        assert!(matches!(GridVolume::from_bytes(&overflow, VolumeDataType::Density, None),
                         Err(VolumeLoadError::Format(_))));
    }

    #[test]
    fn test_from_file_reads_disk() {
        let path = std::env::temp_dir().join("brume_grid_volume_test.vol");
        let bytes = encode_vol(VOL_FLOAT32, [1, 1, 1], 1, unit_bbox(), &encode_float_payload(&[3.0]));
        std::fs::write(&path, &bytes).expect("temp dir is writable");
        let vol = GridVolume::from_file(path.to_str().expect("utf-8 temp path"), VolumeDataType::Density, None)
            .expect("valid grid");
        assert_eq!(vol.lookup_float(&Vector3f::new(0.5, 0.5, 0.5)), 3.0);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(GridVolume::from_file("/nonexistent/brume.vol", VolumeDataType::Density, None),
                         Err(VolumeLoadError::Io(_))));
    }
}
