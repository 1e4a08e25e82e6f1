// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, Measure, BSDF};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::math::constants::{Float, Vector2f, FLOAT_EPSILON};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::square_to_beckmann;
use crate::materials::microfacet::{beckmann_d, beckmann_g1, beckmann_pdf, fresnel_schlick, reflect};

/// Beckmann microfacet conductor with a Schlick Fresnel term.
pub struct RoughConductorBSDF {
    id: String,
    alpha: Float,
    r0: RGBSpectrum,
}

impl ComputationNode for RoughConductorBSDF {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("RoughConductorBSDF[alpha = {}, R0 = {:?}]", self.alpha, self.r0.to_vector())
    }
}

impl RoughConductorBSDF {
    pub fn new(alpha: Float, r0: RGBSpectrum, id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("RoughConductorBSDF")),
               alpha: alpha.max(1e-3), r0 }
    }
}

impl Default for RoughConductorBSDF {
    fn default() -> Self {
        Self::new(0.1, RGBSpectrum::splat(0.5), None)
    }
}

impl BSDF for RoughConductorBSDF {
    fn eval(&self, record: &BSDFSampleRecord) -> BSDFValue {
        let wi = record.wi;
        let wo = record.wo;
        if record.measure != Measure::SolidAngle || wi.z <= 0.0 || wo.z <= 0.0 {
            return RGBSpectrum::zero();
        }

        let h = (wi + wo).normalize();
        let d = beckmann_d(&h, self.alpha);
        let g = beckmann_g1(&wi, &h, self.alpha) * beckmann_g1(&wo, &h, self.alpha);
        let f = fresnel_schlick(self.r0, wi.dot(&h));
        f * (d * g / (4.0 * wi.z * wo.z))
    }

    fn pdf(&self, record: &BSDFSampleRecord) -> Float {
        let wi = record.wi;
        let wo = record.wo;
        if record.measure != Measure::SolidAngle || wi.z <= 0.0 || wo.z <= 0.0 {
            return 0.0;
        }

        let h = (wi + wo).normalize();
        beckmann_pdf(&h, self.alpha) / (4.0 * wo.dot(&h).abs())
    }

    fn sample(&self, record: &mut BSDFSampleRecord, u: &Vector2f) -> BSDFValue {
        if record.wi.z <= 0.0 {
            return RGBSpectrum::zero();
        }

        let m = square_to_beckmann(u, self.alpha);
        record.wo = reflect(&record.wi, &m);
        record.measure = Measure::SolidAngle;
        record.eta = 1.0;
        if record.wo.z <= 0.0 {
            return RGBSpectrum::zero();
        }

        let pdf = self.pdf(record);
        if pdf < FLOAT_EPSILON {
            return RGBSpectrum::zero();
        }
        self.eval(record) * record.wo.z / pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{ LcgRng, Sampler };
    use crate::math::constants::Vector3f;

    #[test]
    fn test_sampled_directions_have_density() {
        let bsdf = RoughConductorBSDF::new(0.3, RGBSpectrum::splat(0.8), None);
        let mut rng = LcgRng::new(5);
        let wi = Vector3f::new(0.4, -0.2, 0.8).normalize();
        for _ in 0..1000 {
            let mut rec = BSDFSampleRecord::new(wi, Vector2f::zeros());
            let weight = bsdf.sample(&mut rec, &rng.next_2d());
            if !weight.is_black() {
                assert!(bsdf.pdf(&rec) > 0.0);
                assert!(!bsdf.eval(&rec).is_black());
            }
        }
    }

    #[test]
    fn test_white_furnace_is_at_most_one() {
        let bsdf = RoughConductorBSDF::new(0.2, RGBSpectrum::splat(1.0), None);
        let mut rng = LcgRng::new(9);
        let wi = Vector3f::new(0.0, 0.3, 1.0).normalize();
        let n = 50000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let mut rec = BSDFSampleRecord::new(wi, Vector2f::zeros());
            sum += bsdf.sample(&mut rec, &rng.next_2d()).r() as f64;
        }
        let mean = sum / n as f64;
        // A perfect reflector loses a little energy to shadowing only.
        assert!(mean <= 1.01 && mean > 0.85, "mean = {}", mean);
    }

    #[test]
    fn test_backside_queries_are_zero() {
        let bsdf = RoughConductorBSDF::default();
        let rec = BSDFSampleRecord::with_directions(Vector3f::new(0.0, 0.0, 1.0),
                                                    Vector3f::new(0.0, 0.6, -0.8),
                                                    Vector2f::zeros());
        assert!(bsdf.eval(&rec).is_black());
        assert_eq!(bsdf.pdf(&rec), 0.0);
    }
}
