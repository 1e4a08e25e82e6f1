// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// What a volume data source encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeDataType {
    Density,
    Albedo,
    Orientation,
}

impl VolumeDataType {
    /// Index used by hierarchical grid dictionaries.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(VolumeDataType::Density),
            1 => Some(VolumeDataType::Albedo),
            2 => Some(VolumeDataType::Orientation),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "density" => Some(VolumeDataType::Density),
            "albedo" => Some(VolumeDataType::Albedo),
            "orientation" => Some(VolumeDataType::Orientation),
            _ => None,
        }
    }
}

/// A field over world space. Lookups outside the domain return zero.
pub trait Volume: ComputationNode + Send + Sync {
    /// Domain of the field; `None` for unbounded sources.
    fn bbox(&self) -> Option<AABB> {
        None
    }

    fn channels(&self) -> usize;

    fn data_type(&self) -> VolumeDataType;

    fn lookup_float(&self, p: &Vector3f) -> Float;

    fn lookup_spectrum(&self, p: &Vector3f) -> RGBSpectrum;

    fn lookup_vector(&self, p: &Vector3f) -> Vector3f;

    /// Ray marching step; infinite for constant sources.
    fn step_size(&self) -> Float;

    /// Upper bound of `lookup_float` over the whole domain.
    fn maximum_float_value(&self) -> Float;
}
