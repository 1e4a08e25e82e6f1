// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::emitter::{Emitter, EmitterFlag, EmitterQueryRecord};
use crate::math::constants::{Float, Vector2f, Vector3f, INV_FOURPI};
use crate::math::spectrum::RGBSpectrum;

/// Isotropic point light. It can only be reached by explicit sampling.
pub struct PointEmitter {
    id: String,
    position: Vector3f,
    intensity: RGBSpectrum,
}

impl PointEmitter {
    pub fn new(position: Vector3f, intensity: RGBSpectrum, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("PointEmitter")),
            position,
            intensity,
        }
    }

    /// Light described by its total emitted power instead of its intensity.
    pub fn from_power(position: Vector3f, power: RGBSpectrum, id: Option<String>) -> Self {
        Self::new(position, power * INV_FOURPI, id)
    }

    pub fn position(&self) -> Vector3f {
        self.position
    }
}

impl ComputationNode for PointEmitter {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PointEmitter[position = {:?}, intensity = {:?}]", self.position, self.intensity.to_vector())
    }
}

impl Emitter for PointEmitter {
    fn flag(&self) -> EmitterFlag {
        EmitterFlag::DELTA
    }

    fn sample(&self, record: &mut EmitterQueryRecord, _u: &Vector2f) -> RGBSpectrum {
        *record = EmitterQueryRecord::from_hit(record.reference, self.position, Vector3f::zeros(), Vector2f::new(0.0, 0.0));
        record.n = -record.wi;
        if record.dist <= 0.0 {
            return RGBSpectrum::zero();
        }
        self.intensity / (record.dist * record.dist)
    }

    fn eval(&self, _record: &EmitterQueryRecord) -> RGBSpectrum {
        RGBSpectrum::zero()
    }

    fn pdf(&self, _record: &EmitterQueryRecord) -> Float {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::PI;

    #[test]
    fn test_inverse_square_falloff() {
        let light = PointEmitter::new(Vector3f::new(0.0, 2.0, 0.0), RGBSpectrum::splat(8.0), None);
        let mut rec = EmitterQueryRecord::new(Vector3f::zeros());
        let li = light.sample(&mut rec, &Vector2f::new(0.3, 0.7));
        assert!((li.r() - 2.0).abs() < 1e-6);
        assert!((rec.wi - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        assert!(light.is_delta());
        assert!(light.eval(&rec).is_black());
    }

    #[test]
    fn test_power_conversion() {
        let light = PointEmitter::from_power(Vector3f::zeros(), RGBSpectrum::splat(4.0 * PI), None);
        let mut rec = EmitterQueryRecord::new(Vector3f::new(1.0, 0.0, 0.0));
        assert!((light.sample(&mut rec, &Vector2f::new(0.0, 0.0)).r() - 1.0).abs() < 1e-5);
    }
}
