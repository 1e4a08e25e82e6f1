// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::phase::{PhaseFunction, PhaseFunctionQueryRecord};
use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{henyey_greenstein_pdf, square_to_henyey_greenstein_cos};

/// Henyey-Greenstein lobe. Positive `g` favours forward scattering, i.e.
/// directions close to `-wi`.
pub struct HenyeyGreensteinPhaseFunction {
    id: String,
    g: Float,
}

impl HenyeyGreensteinPhaseFunction {
    pub fn new(g: Float, id: Option<String>) -> Self {
        // |g| = 1 collapses the lobe to a delta.
        let g = g.max(-0.999).min(0.999);
        Self { id: id.unwrap_or_else(|| generate_node_id("HenyeyGreensteinPhaseFunction")), g }
    }

    pub fn g(&self) -> Float {
        self.g
    }
}

impl ComputationNode for HenyeyGreensteinPhaseFunction {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("HenyeyGreensteinPhaseFunction[g = {}]", self.g)
    }
}

impl PhaseFunction for HenyeyGreensteinPhaseFunction {
    fn eval(&self, record: &PhaseFunctionQueryRecord) -> RGBSpectrum {
        RGBSpectrum::splat(self.pdf(record))
    }

    fn pdf(&self, record: &PhaseFunctionQueryRecord) -> Float {
        let cos_theta = (-record.wi).dot(&record.wo);
        henyey_greenstein_pdf(cos_theta, self.g)
    }

    fn sample(&self, record: &mut PhaseFunctionQueryRecord, u: &Vector2f) -> RGBSpectrum {
        let cos_theta = square_to_henyey_greenstein_cos(u.x, self.g);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;

        let frame = Frame::from_normal(-record.wi);
        let local = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        record.wo = frame.to_world(&local).normalize();
        RGBSpectrum::splat(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{ LcgRng, Sampler };
    use crate::math::warp::square_to_uniform_sphere;

    #[test]
    fn test_eval_equals_pdf_and_weight_is_one() {
        let pf = HenyeyGreensteinPhaseFunction::new(0.6, None);
        let mut rng = LcgRng::new(11);
        let wi = Vector3f::new(0.3, -0.4, 0.5).normalize();
        for _ in 0..200 {
            let mut rec = PhaseFunctionQueryRecord::new(wi);
            let weight = pf.sample(&mut rec, &rng.next_2d());
            assert_eq!(weight, RGBSpectrum::splat(1.0));
            assert!((pf.eval(&rec).r() - pf.pdf(&rec)).abs() < 1e-6);
            assert!(pf.pdf(&rec) > 0.0);
        }
    }

    #[test]
    fn test_pdf_integrates_to_one() {
        let pf = HenyeyGreensteinPhaseFunction::new(-0.4, None);
        let mut rng = LcgRng::new(2);
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let n = 100000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let wo = square_to_uniform_sphere(&rng.next_2d());
            sum += (pf.pdf(&PhaseFunctionQueryRecord::with_directions(wi, wo)) * 4.0 * PI) as f64;
        }
        assert!((sum / n as f64 - 1.0).abs() < 0.03);
    }

    #[test]
    fn test_forward_scattering_follows_propagation() {
        let pf = HenyeyGreensteinPhaseFunction::new(0.9, None);
        let mut rng = LcgRng::new(8);
        let wi = Vector3f::new(0.0, 1.0, 0.0);
        let n = 5000;
        let mut mean_cos = 0.0f64;
        for _ in 0..n {
            let mut rec = PhaseFunctionQueryRecord::new(wi);
            pf.sample(&mut rec, &rng.next_2d());
            mean_cos += (-wi).dot(&rec.wo) as f64;
        }
        // The mean cosine of a HG lobe is g.
        assert!((mean_cos / n as f64 - 0.9).abs() < 0.03);
    }
}
