// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::error::VolumeLoadError;
use crate::core::volume::{Volume, VolumeDataType};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::volumes::grid_volume::{read_f32, read_i32, GridVolume};

use std::collections::HashMap;
use std::fs;

/// Two-level grid: a coarse dictionary of cells, each optionally backed by
/// its own VOL block. Empty cells read as zero.
///
/// Dictionary layout (little endian): six floats for the bounding box,
/// three ints for the cell resolution, then `(x, y, z)` int triplets of the
/// occupied cells until the end of the file.
pub struct HierarchicalGridVolume {
    id: String,
    data_type: VolumeDataType,
    bbox: AABB,
    res: [usize; 3],
    blocks: HashMap<[usize; 3], GridVolume>,
    step_size: Float,
    max_value: Float,
}

/// Block file name for cell `(x, y, z)`: `prefix` + `%03i_%03i_%03i` + `postfix`.
pub fn block_file_name(prefix: &str, cell: [usize; 3], postfix: &str) -> String {
    format!("{}{:03}_{:03}_{:03}{}", prefix, cell[0], cell[1], cell[2], postfix)
}

impl HierarchicalGridVolume {
    pub fn from_file(dictionary: &str,
                     prefix: &str,
                     postfix: &str,
                     data_type: VolumeDataType,
                     id: Option<String>) -> Result<Self, VolumeLoadError> {
        log::info!("Loading hierarchical grid dictionary {}.", dictionary);
        let bytes = fs::read(dictionary)?;
        let volume = Self::from_dictionary(&bytes, data_type, id, |cell| {
            GridVolume::from_file(&block_file_name(prefix, cell, postfix), data_type, None)
        })?;
        log::info!("{} blocks total, resolution = {:?}, step size = {}.",
                   volume.block_count(), volume.res, volume.step_size);
        Ok(volume)
    }

    /// Parses a dictionary and asks `load_block` for every listed cell.
    pub fn from_dictionary<F>(bytes: &[u8],
                              data_type: VolumeDataType,
                              id: Option<String>,
                              mut load_block: F) -> Result<Self, VolumeLoadError>
        where F: FnMut([usize; 3]) -> Result<GridVolume, VolumeLoadError>
    {
        let mut cursor = 0usize;
        let mut corners = [0.0 as Float; 6];
        for value in corners.iter_mut() {
            *value = read_f32(bytes, &mut cursor)?;
        }
        let bbox = AABB::new(Vector3f::new(corners[0], corners[1], corners[2]),
                             Vector3f::new(corners[3], corners[4], corners[5]));

        let mut res = [0usize; 3];
        for axis in 0..3 {
            let r = read_i32(bytes, &mut cursor)?;
            if r <= 0 {
                return Err(VolumeLoadError::Format("dictionary resolution must be positive".to_string()));
            }
            res[axis] = r as usize;
        }

        // Only occupied cells are stored, so the header resolution never
        // drives an allocation.
        res[0].checked_mul(res[1])
            .and_then(|c| c.checked_mul(res[2]))
            .ok_or_else(|| VolumeLoadError::Format("dictionary resolution overflows".to_string()))?;

        let mut blocks = HashMap::new();
        let mut step_size = Float::INFINITY;
        let mut max_value: Float = 0.0;
        while cursor < bytes.len() {
            let mut cell = [0usize; 3];
            for axis in 0..3 {
                let c = read_i32(bytes, &mut cursor)?;
                if c < 0 || c as usize >= res[axis] {
                    return Err(VolumeLoadError::Format(format!("block index {} outside the dictionary", c)));
                }
                cell[axis] = c as usize;
            }

            if blocks.contains_key(&cell) {
                return Err(VolumeLoadError::Format(format!("block {:?} listed twice", cell)));
            }
            let block = load_block(cell)?;
            step_size = step_size.min(block.step_size());
            max_value = max_value.max(block.maximum_float_value());
            blocks.insert(cell, block);
        }

        Ok(Self {
            id: id.unwrap_or_else(|| generate_node_id("HierarchicalGridVolume")),
            data_type,
            bbox,
            res,
            blocks,
            step_size,
            max_value,
        })
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn block_at(&self, p: &Vector3f) -> Option<&GridVolume> {
        let extent = self.bbox.diagonal();
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            if extent[axis] <= 0.0 {
                return None;
            }
            let g = ((p[axis] - self.bbox.p_min[axis]) / extent[axis] * self.res[axis] as Float).floor();
            if g < 0.0 || g >= self.res[axis] as Float {
                return None;
            }
            cell[axis] = g as usize;
        }
        self.blocks.get(&cell)
    }
}

impl ComputationNode for HierarchicalGridVolume {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("HierarchicalGridVolume[resolution = {:?}, blocks = {}, type = {:?}]",
                self.res, self.blocks.len(), self.data_type)
    }
}

impl Volume for HierarchicalGridVolume {
    fn bbox(&self) -> Option<AABB> {
        Some(self.bbox)
    }

    fn channels(&self) -> usize {
        match self.data_type {
            VolumeDataType::Density => 1,
            _ => 3,
        }
    }

    fn data_type(&self) -> VolumeDataType {
        self.data_type
    }

    fn lookup_float(&self, p: &Vector3f) -> Float {
        self.block_at(p).map_or(0.0, |block| block.lookup_float(p))
    }

    fn lookup_spectrum(&self, p: &Vector3f) -> RGBSpectrum {
        self.block_at(p).map_or(RGBSpectrum::zero(), |block| block.lookup_spectrum(p))
    }

    fn lookup_vector(&self, p: &Vector3f) -> Vector3f {
        self.block_at(p).map_or(Vector3f::zeros(), |block| block.lookup_vector(p))
    }

    fn step_size(&self) -> Float {
        self.step_size
    }

    fn maximum_float_value(&self) -> Float {
        self.max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volumes::grid_volume::{encode_float_payload, encode_vol};

    fn dictionary(bbox: [f32; 6], res: [i32; 3], cells: &[[i32; 3]]) -> Vec<u8> {
        let mut out = encode_float_payload(&bbox);
        for v in res.iter().chain(cells.iter().flat_map(|c| c.iter())) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    fn block(cell: [usize; 3], value: f32) -> Result<GridVolume, VolumeLoadError> {
        // Each block covers one unit cell of the dictionary.
        let min = [cell[0] as f32, cell[1] as f32, cell[2] as f32];
        let bbox = [min[0], min[1], min[2], min[0] + 1.0, min[1] + 1.0, min[2] + 1.0];
        let bytes = encode_vol(1, [2, 2, 2], 1, bbox, &encode_float_payload(&[value; 8]));
        GridVolume::from_bytes(&bytes, VolumeDataType::Density, None)
    }

    #[test]
    fn test_lookups_delegate_to_blocks() {
        let dict = dictionary([0.0, 0.0, 0.0, 2.0, 1.0, 1.0], [2, 1, 1], &[[1, 0, 0]]);
        let vol = HierarchicalGridVolume::from_dictionary(&dict, VolumeDataType::Density, None,
                                                          |cell| block(cell, 4.0))
            .expect("valid dictionary");
        assert_eq!(vol.block_count(), 1);
        assert_eq!(vol.lookup_float(&Vector3f::new(0.5, 0.5, 0.5)), 0.0);
        assert!((vol.lookup_float(&Vector3f::new(1.5, 0.5, 0.5)) - 4.0).abs() < 1e-5);
        assert_eq!(vol.lookup_float(&Vector3f::new(2.5, 0.5, 0.5)), 0.0);
        assert_eq!(vol.maximum_float_value(), 4.0);
        assert!((vol.step_size() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bad_dictionaries() {
        let outside = dictionary([0.0, 0.0, 0.0, 1.0, 1.0, 1.0], [1, 1, 1], &[[3, 0, 0]]);
        assert!(matches!(HierarchicalGridVolume::from_dictionary(&outside, VolumeDataType::Density, None,
                                                                 |cell| block(cell, 1.0)),
                         Err(VolumeLoadError::Format(_))));

        let twice = dictionary([0.0, 0.0, 0.0, 1.0, 1.0, 1.0], [1, 1, 1], &[[0, 0, 0], [0, 0, 0]]);
        assert!(HierarchicalGridVolume::from_dictionary(&twice, VolumeDataType::Density, None,
                                                        |cell| block(cell, 1.0)).is_err());

        let truncated = dictionary([0.0, 0.0, 0.0, 1.0, 1.0, 1.0], [1, 1, 1], &[]);
        assert!(HierarchicalGridVolume::from_dictionary(&truncated[..truncated.len() - 2], VolumeDataType::Density,
                                                        None, |cell| block(cell, 1.0)).is_err());
    }

    #[test]
    fn test_huge_dictionary_resolution() {
        let sparse = dictionary([0.0, 0.0, 0.0, 1.0, 1.0, 1.0], [1 << 20; 3], &[]);
        let vol = HierarchicalGridVolume::from_dictionary(&sparse, VolumeDataType::Density, None,
                                                          |cell| block(cell, 1.0))
            .expect("an empty dictionary is valid");
        assert_eq!(vol.block_count(), 0);
        assert_eq!(vol.lookup_float(&Vector3f::new(0.5, 0.5, 0.5)), 0.0);

        let overflow = dictionary([0.0, 0.0, 0.0, 1.0, 1.0, 1.0], [i32::MAX; 3], &[]);
        assert!(matches!(HierarchicalGridVolume::from_dictionary(&overflow, VolumeDataType::Density, None,
                                                                 |cell| block(cell, 1.0)),
                         Err(VolumeLoadError::Format(_))));
    }

    #[test]
    fn test_block_names_and_files() {
        assert_eq!(block_file_name("smoke_", [1, 20, 300], ".vol"), "smoke_001_020_300.vol");

        let dir = std::env::temp_dir();
        let prefix = dir.join("brume_hgrid_").to_string_lossy().into_owned();
        let block_path = block_file_name(&prefix, [0, 0, 0], ".vol");
        let bytes = encode_vol(1, [1, 1, 1], 1, [0.0, 0.0, 0.0, 1.0, 1.0, 1.0], &encode_float_payload(&[2.0]));
        std::fs::write(&block_path, &bytes).expect("temp dir is writable");
        let dict_path = dir.join("brume_hgrid_dict.bin");
        std::fs::write(&dict_path, dictionary([0.0, 0.0, 0.0, 1.0, 1.0, 1.0], [1, 1, 1], &[[0, 0, 0]]))
            .expect("temp dir is writable");

        let vol = HierarchicalGridVolume::from_file(&dict_path.to_string_lossy(), &prefix, ".vol",
                                                    VolumeDataType::Density, None)
            .expect("valid hierarchical grid");
        assert_eq!(vol.lookup_float(&Vector3f::new(0.5, 0.5, 0.5)), 2.0);

        let _ = std::fs::remove_file(&block_path);
        let _ = std::fs::remove_file(&dict_path);
    }
}
