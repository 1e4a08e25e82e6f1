// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, Measure, BSDF};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::math::constants::{Float, Vector2f, Vector3f, FLOAT_EPSILON};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::square_to_beckmann;
use crate::materials::microfacet::{beckmann_d, beckmann_g1, beckmann_pdf, fresnel_dielectric, reflect, refract};

// Neither lobe may be starved, or the estimator loses paths that `eval` accepts.
const MIN_LOBE_PROBABILITY: Float = 0.05;

/// Rough glass: Beckmann reflection and refraction (Walter et al. 2007).
/// Both directions point away from the surface; the side of `wi` decides
/// which index of refraction is the incident one.
pub struct RoughDielectricBSDF {
    id: String,
    alpha: Float,
    int_ior: Float,
    ext_ior: Float,
    ka: RGBSpectrum,
}

struct OrientedQuery {
    wi: Vector3f,
    wo: Vector3f,
    eta_i: Float,
    eta_t: Float,
}

impl ComputationNode for RoughDielectricBSDF {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("RoughDielectricBSDF[alpha = {}, intIOR = {}, extIOR = {}]",
                self.alpha, self.int_ior, self.ext_ior)
    }
}

impl RoughDielectricBSDF {
    pub fn new(alpha: Float, int_ior: Float, ext_ior: Float, ka: RGBSpectrum, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("RoughDielectricBSDF")),
            alpha: alpha.max(1e-3),
            int_ior,
            ext_ior,
            ka,
        }
    }

    /// Mirrors the query so that `wi` lies in the upper hemisphere.
    fn orient(&self, record: &BSDFSampleRecord) -> OrientedQuery {
        if record.wi.z >= 0.0 {
            OrientedQuery { wi: record.wi, wo: record.wo, eta_i: self.ext_ior, eta_t: self.int_ior }
        } else {
            OrientedQuery { wi: -record.wi, wo: -record.wo, eta_i: self.int_ior, eta_t: self.ext_ior }
        }
    }

    fn reflect_probability(&self, q: &OrientedQuery) -> Float {
        fresnel_dielectric(q.wi.z, q.eta_i, q.eta_t)
            .max(MIN_LOBE_PROBABILITY)
            .min(1.0 - MIN_LOBE_PROBABILITY)
    }

    /// Half vector of a refraction pair, facing the `wi` side.
    fn refraction_half_vector(q: &OrientedQuery) -> Option<Vector3f> {
        let h = q.wi * q.eta_i + q.wo * q.eta_t;
        if h.norm_squared() <= 0.0 {
            return None;
        }
        let h = h.normalize();
        let h = if h.z < 0.0 { -h } else { h };
        if q.wi.dot(&h) <= 0.0 || q.wo.dot(&h) >= 0.0 {
            return None;
        }
        Some(h)
    }
}

impl BSDF for RoughDielectricBSDF {
    fn eval(&self, record: &BSDFSampleRecord) -> BSDFValue {
        if record.measure != Measure::SolidAngle || record.wi.z == 0.0 || record.wo.z == 0.0 {
            return RGBSpectrum::zero();
        }
        let q = self.orient(record);
        let cos_i = q.wi.z;
        let cos_o = q.wo.z;

        if cos_o > 0.0 {
            let h = (q.wi + q.wo).normalize();
            let f = fresnel_dielectric(q.wi.dot(&h), q.eta_i, q.eta_t);
            let g = beckmann_g1(&q.wi, &h, self.alpha) * beckmann_g1(&q.wo, &h, self.alpha);
            return self.ka * (f * beckmann_d(&h, self.alpha) * g / (4.0 * cos_i * cos_o));
        }

        let h = match Self::refraction_half_vector(&q) {
            Some(h) => h,
            None => return RGBSpectrum::zero(),
        };
        let i_dot_h = q.wi.dot(&h);
        let o_dot_h = q.wo.dot(&h);
        let f = fresnel_dielectric(i_dot_h, q.eta_i, q.eta_t);
        let g = beckmann_g1(&q.wi, &h, self.alpha) * beckmann_g1(&q.wo, &-h, self.alpha);
        let denom = q.eta_i * i_dot_h + q.eta_t * o_dot_h;
        if denom.abs() < FLOAT_EPSILON {
            return RGBSpectrum::zero();
        }
        // Radiance form: the eta_t^2 of the microfacet Jacobian and the
        // (eta_i / eta_t)^2 radiance scaling leave eta_i^2.
        let value = (1.0 - f) * beckmann_d(&h, self.alpha) * g
            * (i_dot_h * o_dot_h).abs() * q.eta_i * q.eta_i
            / (cos_i * cos_o.abs() * denom * denom);
        self.ka * value
    }

    fn pdf(&self, record: &BSDFSampleRecord) -> Float {
        if record.measure != Measure::SolidAngle || record.wi.z == 0.0 || record.wo.z == 0.0 {
            return 0.0;
        }
        let q = self.orient(record);
        let p_reflect = self.reflect_probability(&q);

        if q.wo.z > 0.0 {
            let h = (q.wi + q.wo).normalize();
            return p_reflect * beckmann_pdf(&h, self.alpha) / (4.0 * q.wo.dot(&h).abs());
        }

        match Self::refraction_half_vector(&q) {
            Some(h) => {
                let denom = q.eta_i * q.wi.dot(&h) + q.eta_t * q.wo.dot(&h);
                if denom.abs() < FLOAT_EPSILON {
                    return 0.0;
                }
                let jacobian = q.eta_t * q.eta_t * q.wo.dot(&h).abs() / (denom * denom);
                (1.0 - p_reflect) * beckmann_pdf(&h, self.alpha) * jacobian
            }
            None => 0.0,
        }
    }

    fn sample(&self, record: &mut BSDFSampleRecord, u: &Vector2f) -> BSDFValue {
        if record.wi.z == 0.0 {
            return RGBSpectrum::zero();
        }
        let q = self.orient(record);
        let flip: Float = if record.wi.z < 0.0 { -1.0 } else { 1.0 };
        let p_reflect = self.reflect_probability(&q);
        record.measure = Measure::SolidAngle;

        let wo = if u.x < p_reflect {
            let reused = Vector2f::new(u.x / p_reflect, u.y);
            let m = square_to_beckmann(&reused, self.alpha);
            record.eta = 1.0;
            reflect(&q.wi, &m)
        } else {
            let reused = Vector2f::new((u.x - p_reflect) / (1.0 - p_reflect), u.y);
            let m = square_to_beckmann(&reused, self.alpha);
            record.eta = q.eta_t / q.eta_i;
            match refract(&q.wi, &m, q.eta_i / q.eta_t) {
                Some(wt) => wt,
                None => return RGBSpectrum::zero(),
            }
        };
        record.wo = wo * flip;

        let pdf = self.pdf(record);
        if pdf < FLOAT_EPSILON {
            return RGBSpectrum::zero();
        }
        self.eval(record) * record.wo.z.abs() / pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{ LcgRng, Sampler };

    fn glass() -> RoughDielectricBSDF {
        RoughDielectricBSDF::new(0.2, 1.5046, 1.000277, RGBSpectrum::splat(1.0), None)
    }

    #[test]
    fn test_both_lobes_are_sampled_with_density() {
        let bsdf = glass();
        let mut rng = LcgRng::new(21);
        let wi = Vector3f::new(0.3, 0.0, 0.95).normalize();
        let (mut reflected, mut refracted) = (0, 0);
        for _ in 0..2000 {
            let mut rec = BSDFSampleRecord::new(wi, Vector2f::zeros());
            let weight = bsdf.sample(&mut rec, &rng.next_2d());
            if weight.is_black() {
                continue;
            }
            assert!(bsdf.pdf(&rec) > 0.0);
            if rec.wo.z > 0.0 { reflected += 1; } else { refracted += 1; }
        }
        assert!(reflected > 0 && refracted > reflected);
    }

    #[test]
    fn test_energy_is_bounded_from_both_sides() {
        let bsdf = glass();
        let mut rng = LcgRng::new(3);
        let n = 40000;
        for wi in [Vector3f::new(0.2, 0.1, 0.97).normalize(),
                   Vector3f::new(0.2, 0.1, -0.97).normalize()].iter() {
            let mut sum = 0.0f64;
            for _ in 0..n {
                let mut rec = BSDFSampleRecord::new(*wi, Vector2f::zeros());
                let w = bsdf.sample(&mut rec, &rng.next_2d());
                assert!(w.is_finite());
                // Radiance scaling can push a single refraction past one.
                if rec.wo.z * wi.z > 0.0 {
                    sum += w.r() as f64;
                } else if wi.z > 0.0 {
                    sum += (w.r() * (1.000277f32 / 1.5046).powi(-2)) as f64;
                } else {
                    sum += (w.r() * (1.5046f32 / 1.000277).powi(-2)) as f64;
                }
            }
            let mean = sum / n as f64;
            assert!(mean > 0.8 && mean < 1.05, "mean = {}", mean);
        }
    }
}
