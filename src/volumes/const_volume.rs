// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::volume::{Volume, VolumeDataType};
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// A field with the same value everywhere. Only the lookup that matches the
/// data type returns the stored value; the others return zero.
pub struct ConstantVolume {
    id: String,
    data_type: VolumeDataType,
    density: Float,
    albedo: RGBSpectrum,
    orientation: Vector3f,
}

impl ConstantVolume {
    pub fn density(value: Float, id: Option<String>) -> Self {
        Self::with_type(VolumeDataType::Density, id).with_density(value)
    }

    pub fn albedo(value: RGBSpectrum, id: Option<String>) -> Self {
        let mut volume = Self::with_type(VolumeDataType::Albedo, id);
        volume.albedo = value;
        volume
    }

    pub fn orientation(value: Vector3f, id: Option<String>) -> Self {
        let mut volume = Self::with_type(VolumeDataType::Orientation, id);
        volume.orientation = if value.norm() > 0.0 { value.normalize() } else { Vector3f::zeros() };
        volume
    }

    fn with_type(data_type: VolumeDataType, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("ConstantVolume")),
            data_type,
            density: 0.0,
            albedo: RGBSpectrum::zero(),
            orientation: Vector3f::zeros(),
        }
    }

    fn with_density(mut self, value: Float) -> Self {
        self.density = value.max(0.0);
        self
    }
}

impl ComputationNode for ConstantVolume {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        match self.data_type {
            VolumeDataType::Density => format!("ConstantVolume[density = {}]", self.density),
            VolumeDataType::Albedo => format!("ConstantVolume[albedo = {:?}]", self.albedo.to_vector()),
            VolumeDataType::Orientation => format!("ConstantVolume[orientation = {:?}]", self.orientation),
        }
    }
}

impl Volume for ConstantVolume {
    fn channels(&self) -> usize {
        match self.data_type {
            VolumeDataType::Density => 1,
            _ => 3,
        }
    }

    fn data_type(&self) -> VolumeDataType {
        self.data_type
    }

    fn lookup_float(&self, _p: &Vector3f) -> Float {
        self.density
    }

    fn lookup_spectrum(&self, _p: &Vector3f) -> RGBSpectrum {
        match self.data_type {
            VolumeDataType::Albedo => self.albedo,
            VolumeDataType::Density => RGBSpectrum::splat(self.density),
            VolumeDataType::Orientation => RGBSpectrum::zero(),
        }
    }

    fn lookup_vector(&self, _p: &Vector3f) -> Vector3f {
        self.orientation
    }

    fn step_size(&self) -> Float {
        Float::INFINITY
    }

    fn maximum_float_value(&self) -> Float {
        self.density
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_density() {
        let vol = ConstantVolume::density(2.0, None);
        assert_eq!(vol.channels(), 1);
        assert!(vol.bbox().is_none());
        assert_eq!(vol.lookup_float(&Vector3f::new(0.1, 0.2, 0.3)), 2.0);
        assert_eq!(vol.maximum_float_value(), 2.0);
        assert!(vol.step_size().is_infinite());
    }

    #[test]
    fn test_constant_albedo_and_orientation() {
        let albedo = ConstantVolume::albedo(RGBSpectrum::new(0.2, 0.4, 0.6), None);
        assert_eq!(albedo.data_type(), VolumeDataType::Albedo);
        assert_eq!(albedo.lookup_spectrum(&Vector3f::zeros()), RGBSpectrum::new(0.2, 0.4, 0.6));
        assert_eq!(albedo.lookup_float(&Vector3f::zeros()), 0.0);

        let dir = ConstantVolume::orientation(Vector3f::new(0.0, 2.0, 0.0), None);
        assert!((dir.lookup_vector(&Vector3f::zeros()) - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }
}
