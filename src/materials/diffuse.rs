// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, Measure, BSDF};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::texture::Texture;
use crate::math::constants::{ Float, INV_PI, Vector2f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ square_to_cosine_hemisphere, square_to_cosine_hemisphere_pdf };
use crate::textures::constant::ConstantTexture;

use std::sync::Arc;

pub struct DiffuseBSDF {
    id: String,
    albedo: Arc<dyn Texture>,
}

impl ComputationNode for DiffuseBSDF {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("DiffuseBSDF[albedo = {}]", self.albedo.describe())
    }
}

impl BSDF for DiffuseBSDF {
    fn eval(&self, record: &BSDFSampleRecord) -> BSDFValue {
        if record.measure != Measure::SolidAngle || record.wi.z <= 0.0 || record.wo.z <= 0.0 {
            return RGBSpectrum::zero();
        }
        self.albedo.eval(&record.uv) * INV_PI
    }

    fn pdf(&self, record: &BSDFSampleRecord) -> Float {
        if record.measure != Measure::SolidAngle || record.wi.z <= 0.0 || record.wo.z <= 0.0 {
            return 0.0;
        }
        square_to_cosine_hemisphere_pdf(&record.wo)
    }

    fn sample(&self, record: &mut BSDFSampleRecord, u: &Vector2f) -> BSDFValue {
        if record.wi.z <= 0.0 {
            return RGBSpectrum::zero();
        }
        record.wo = square_to_cosine_hemisphere(u);
        record.measure = Measure::SolidAngle;
        record.eta = 1.0;

        // eval * cos / pdf reduces to the albedo.
        self.albedo.eval(&record.uv)
    }
}

impl DiffuseBSDF {
    pub fn new(albedo: Arc<dyn Texture>, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("DiffuseBSDF")),
            albedo,
        }
    }

    pub fn from_rgb(albedo: RGBSpectrum) -> Self {
        Self::new(Arc::new(ConstantTexture::new(albedo)), None)
    }
}

impl Default for DiffuseBSDF {
    fn default() -> Self {
        Self::from_rgb(RGBSpectrum::splat(0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{ LcgRng, Sampler };
    use crate::math::constants::Vector3f;

    #[test]
    fn test_sample_weight_matches_eval_over_pdf() {
        let bsdf = DiffuseBSDF::from_rgb(RGBSpectrum::new(0.2, 0.4, 0.6));
        let mut rng = LcgRng::new(11);
        for _ in 0..100 {
            let mut rec = BSDFSampleRecord::new(Vector3f::new(0.3, 0.1, 0.9).normalize(), Vector2f::zeros());
            let weight = bsdf.sample(&mut rec, &rng.next_2d());
            let pdf = bsdf.pdf(&rec);
            if pdf <= 0.0 {
                continue;
            }
            let expected = bsdf.eval(&rec) * rec.wo.z / pdf;
            assert!((weight - expected).to_vector().norm() < 1e-4);
        }
    }

    #[test]
    fn test_backside_and_discrete_are_zero() {
        let bsdf = DiffuseBSDF::default();
        let mut rec = BSDFSampleRecord::with_directions(Vector3f::new(0.0, 0.0, 1.0),
                                                        Vector3f::new(0.0, 0.0, -1.0),
                                                        Vector2f::zeros());
        assert!(bsdf.eval(&rec).is_black());
        rec.wo = Vector3f::new(0.0, 0.0, 1.0);
        assert!((bsdf.eval(&rec).r() - 0.5 * INV_PI).abs() < 1e-6);
        rec.measure = Measure::Discrete;
        assert!(bsdf.eval(&rec).is_black());
        assert_eq!(bsdf.pdf(&rec), 0.0);

        let mut below = BSDFSampleRecord::new(Vector3f::new(0.0, 0.0, -1.0), Vector2f::zeros());
        assert!(bsdf.sample(&mut below, &Vector2f::new(0.5, 0.5)).is_black());
    }
}
