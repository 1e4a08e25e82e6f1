// Copyright @yucwang 2026

pub mod const_volume;
pub mod grid_volume;
pub mod hgrid_volume;

/// Reconstruction filter for scalar and color grid lookups. Orientation
/// lookups always use the nearest voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeFilterMode {
    Nearest,
    Trilinear,
}

impl VolumeFilterMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nearest" => Some(VolumeFilterMode::Nearest),
            "trilinear" | "linear" => Some(VolumeFilterMode::Trilinear),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::VolumeFilterMode;

    #[test]
    fn test_filter_names() {
        assert_eq!(VolumeFilterMode::from_name("nearest"), Some(VolumeFilterMode::Nearest));
        assert_eq!(VolumeFilterMode::from_name("linear"), Some(VolumeFilterMode::Trilinear));
        assert_eq!(VolumeFilterMode::from_name("cubic"), None);
    }
}
