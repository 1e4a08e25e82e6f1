// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::emitter::{Emitter, EmitterFlag, EmitterQueryRecord};
use crate::core::shape::Shape;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;

use std::sync::Arc;

/// Uniform radiance leaving the front side (along the geometric normal) of a
/// shape. Points are drawn uniformly by area and reported in solid angle.
pub struct AreaEmitter {
    id: String,
    shape: Arc<dyn Shape>,
    radiance: RGBSpectrum,
}

impl AreaEmitter {
    pub fn new(shape: Arc<dyn Shape>, radiance: RGBSpectrum, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("AreaEmitter")),
            shape,
            radiance,
        }
    }

    pub fn radiance(&self) -> RGBSpectrum {
        self.radiance
    }

    pub fn shape(&self) -> &Arc<dyn Shape> {
        &self.shape
    }

    /// Cosine at the emitter between its normal and the direction back to the reference.
    fn emitter_cos(record: &EmitterQueryRecord) -> Float {
        record.n.dot(&(-record.wi))
    }
}

impl ComputationNode for AreaEmitter {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("AreaEmitter[radiance = {:?}, shape = {}]", self.radiance.to_vector(), self.shape.to_string())
    }
}

impl Emitter for AreaEmitter {
    fn flag(&self) -> EmitterFlag {
        EmitterFlag::SURFACE
    }

    fn sample(&self, record: &mut EmitterQueryRecord, u: &Vector2f) -> RGBSpectrum {
        let sample = self.shape.sample(u);
        let its = sample.intersection();
        *record = EmitterQueryRecord::from_hit(record.reference, its.p(), its.geo_normal(), its.uv());
        self.eval(record)
    }

    fn eval(&self, record: &EmitterQueryRecord) -> RGBSpectrum {
        if Self::emitter_cos(record) > 0.0 {
            self.radiance
        } else {
            RGBSpectrum::zero()
        }
    }

    fn pdf(&self, record: &EmitterQueryRecord) -> Float {
        let cos = Self::emitter_cos(record);
        let area = self.shape.surface_area();
        if cos <= 0.0 || area <= 0.0 || record.dist <= 0.0 {
            return 0.0;
        }
        record.dist * record.dist / (cos * area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{ LcgRng, Sampler };
    use crate::math::constants::{Vector3f, PI};
    use crate::math::transform::Transform;
    use crate::shapes::rectangle::Rectangle;

    fn ceiling_light() -> AreaEmitter {
        // Unit-half-size quad at z = 1 facing down.
        let to_world = Transform::translate(&Vector3f::new(0.0, 0.0, 1.0))
            * Transform::rotate(&Vector3f::new(1.0, 0.0, 0.0), 180.0);
        AreaEmitter::new(Arc::new(Rectangle::new(to_world, None)), RGBSpectrum::splat(2.0), None)
    }

    #[test]
    fn test_sample_faces_reference() {
        let emitter = ceiling_light();
        let mut rec = EmitterQueryRecord::new(Vector3f::zeros());
        let le = emitter.sample(&mut rec, &Vector2f::new(0.5, 0.5));
        assert_eq!(le, RGBSpectrum::splat(2.0));
        assert!((rec.p - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-5);
        assert!((rec.dist - 1.0).abs() < 1e-5);
        // area 4, distance 1, cosine 1
        assert!((emitter.pdf(&rec) - 0.25).abs() < 1e-5);

        let mut above = EmitterQueryRecord::new(Vector3f::new(0.0, 0.0, 2.0));
        assert!(emitter.sample(&mut above, &Vector2f::new(0.5, 0.5)).is_black());
        assert_eq!(emitter.pdf(&above), 0.0);
    }

    #[test]
    fn test_irradiance_estimate() {
        // Irradiance at the origin from the quad [-1,1]² at height 1 with L = 2.
        let emitter = ceiling_light();
        let mut rng = LcgRng::new(5);
        let n = 20000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let mut rec = EmitterQueryRecord::new(Vector3f::zeros());
            let le = emitter.sample(&mut rec, &rng.next_2d());
            let pdf = emitter.pdf(&rec);
            if pdf > 0.0 {
                sum += (le.r() * rec.wi.z / pdf) as f64;
            }
        }
        // Four corner patches with a = h = 1, each of form factor atan(1/sqrt2) / (pi sqrt2).
        let expected = 4.0 / 2f64.sqrt() * (1.0 / 2f64.sqrt()).atan() * 2.0;
        assert!((sum / n as f64 - expected).abs() < 0.05 * expected);
        assert!(expected < PI as f64 * 2.0);
    }
}
