// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, Measure, BSDF};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector2f, FLOAT_EPSILON, PI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{square_to_beckmann, square_to_cosine_hemisphere, square_to_cosine_hemisphere_pdf};
use crate::materials::microfacet::{beckmann_d, beckmann_g1, beckmann_pdf, fresnel_dielectric, reflect};
use crate::textures::constant::ConstantTexture;

use std::sync::Arc;

/// Diffuse base under a rough dielectric coating (Ashikhmin and Shirley 2000).
pub struct RoughSubstrateBSDF {
    id: String,
    alpha: Float,
    int_ior: Float,
    ext_ior: Float,
    kd: Arc<dyn Texture>,
}

impl ComputationNode for RoughSubstrateBSDF {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("RoughSubstrateBSDF[alpha = {}, intIOR = {}, extIOR = {}, kd = {}]",
                self.alpha, self.int_ior, self.ext_ior, self.kd.describe())
    }
}

impl RoughSubstrateBSDF {
    pub fn new(alpha: Float, int_ior: Float, ext_ior: Float, kd: Arc<dyn Texture>, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("RoughSubstrateBSDF")),
            alpha: alpha.max(1e-3),
            int_ior,
            ext_ior,
            kd,
        }
    }

    fn specular_probability(&self, cos_theta_i: Float) -> Float {
        fresnel_dielectric(cos_theta_i, self.ext_ior, self.int_ior)
    }
}

impl Default for RoughSubstrateBSDF {
    fn default() -> Self {
        Self::new(0.1, 1.5046, 1.000277,
                  Arc::new(ConstantTexture::new(RGBSpectrum::splat(0.5))), None)
    }
}

impl BSDF for RoughSubstrateBSDF {
    fn eval(&self, record: &BSDFSampleRecord) -> BSDFValue {
        let cos_i = record.wi.z;
        let cos_o = record.wo.z;
        if record.measure != Measure::SolidAngle || cos_i <= 0.0 || cos_o <= 0.0 {
            return RGBSpectrum::zero();
        }

        let r = (self.ext_ior - self.int_ior) / (self.ext_ior + self.int_ior);
        let diffuse = self.kd.eval(&record.uv)
            * (28.0 / (23.0 * PI) * (1.0 - r * r)
               * (1.0 - (1.0 - 0.5 * cos_i).powi(5))
               * (1.0 - (1.0 - 0.5 * cos_o).powi(5)));

        let h = (record.wi + record.wo).normalize();
        let specular = beckmann_d(&h, self.alpha)
            * fresnel_dielectric(record.wi.dot(&h), self.ext_ior, self.int_ior)
            * beckmann_g1(&record.wi, &h, self.alpha)
            * beckmann_g1(&record.wo, &h, self.alpha)
            / (4.0 * cos_i * cos_o);

        diffuse + RGBSpectrum::splat(specular)
    }

    fn pdf(&self, record: &BSDFSampleRecord) -> Float {
        if record.measure != Measure::SolidAngle || record.wi.z <= 0.0 || record.wo.z <= 0.0 {
            return 0.0;
        }

        let f = self.specular_probability(record.wi.z);
        let h = (record.wi + record.wo).normalize();
        let p_spec = beckmann_pdf(&h, self.alpha) / (4.0 * record.wo.dot(&h).abs());
        f * p_spec + (1.0 - f) * square_to_cosine_hemisphere_pdf(&record.wo)
    }

    fn sample(&self, record: &mut BSDFSampleRecord, u: &Vector2f) -> BSDFValue {
        if record.wi.z <= 0.0 {
            return RGBSpectrum::zero();
        }
        record.measure = Measure::SolidAngle;
        record.eta = 1.0;

        let f = self.specular_probability(record.wi.z);
        if u.x < f {
            let reused = Vector2f::new(u.x / f, u.y);
            let m = square_to_beckmann(&reused, self.alpha);
            record.wo = reflect(&record.wi, &m);
        } else {
            let reused = Vector2f::new((u.x - f) / (1.0 - f), u.y);
            record.wo = square_to_cosine_hemisphere(&reused);
        }
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
