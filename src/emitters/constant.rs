// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::emitter::{Emitter, EmitterFlag, EmitterQueryRecord};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{square_to_uniform_sphere, square_to_uniform_sphere_pdf};

/// Uniform radiance arriving from every direction at infinity.
pub struct ConstantEnvironment {
    id: String,
    radiance: RGBSpectrum,
    center: Vector3f,
    radius: Float,
}

impl ConstantEnvironment {
    pub fn new(radiance: RGBSpectrum, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("ConstantEnvironment")),
            radiance,
            center: Vector3f::zeros(),
            radius: 1.0,
        }
    }

    pub fn radiance(&self) -> RGBSpectrum {
        self.radiance
    }
}

impl ComputationNode for ConstantEnvironment {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("ConstantEnvironment[radiance = {:?}]", self.radiance.to_vector())
    }
}

impl Emitter for ConstantEnvironment {
    fn flag(&self) -> EmitterFlag {
        EmitterFlag::ENVIRONMENT
    }

    fn set_scene_bounds(&mut self, bounds: &AABB) {
        if bounds.is_valid() {
            self.center = bounds.center();
            self.radius = (0.5 * bounds.diagonal().norm()).max(1.0);
        }
    }

    fn sample(&self, record: &mut EmitterQueryRecord, u: &Vector2f) -> RGBSpectrum {
        let wi = square_to_uniform_sphere(u);
        *record = EmitterQueryRecord::from_direction(record.reference, wi);
        // A finite stand-in point outside the scene's bounding sphere.
        let reach = 2.0 * (self.radius + (record.reference - self.center).norm());
        record.p = record.reference + wi * reach;
        self.radiance
    }

    fn eval(&self, _record: &EmitterQueryRecord) -> RGBSpectrum {
        self.radiance
    }

    fn pdf(&self, record: &EmitterQueryRecord) -> Float {
        square_to_uniform_sphere_pdf(&record.wi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::INV_FOURPI;

    #[test]
    fn test_environment_sampling() {
        let mut env = ConstantEnvironment::new(RGBSpectrum::splat(0.5), None);
        env.set_scene_bounds(&AABB::new(Vector3f::new(-4.0, -4.0, -4.0), Vector3f::new(4.0, 4.0, 4.0)));
        let mut rec = EmitterQueryRecord::new(Vector3f::zeros());
        let le = env.sample(&mut rec, &Vector2f::new(0.2, 0.9));
        assert_eq!(le, RGBSpectrum::splat(0.5));
        assert!(rec.dist.is_infinite());
        assert!((rec.wi.norm() - 1.0).abs() < 1e-5);
        assert!(rec.p.norm() > 4.0 * (3.0f32).sqrt());
        assert!((env.pdf(&rec) - INV_FOURPI).abs() < 1e-7);
        assert!(env.flag().contains(EmitterFlag::ENVIRONMENT));
    }
}
