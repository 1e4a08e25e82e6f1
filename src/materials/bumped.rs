// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, BSDF};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::materials::roughconductor::RoughConductorBSDF;

/// Wraps a BSDF and perturbs the shading normal with a displacement texture.
/// The scene applies the displacement when it builds the shading frame;
/// scattering itself is delegated unchanged.
pub struct BumpedBSDF {
    id: String,
    nested: Arc<dyn BSDF>,
    displacement: Arc<dyn Texture>,
}

impl ComputationNode for BumpedBSDF {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("BumpedBSDF[nested = {}, displacement = {}]",
                self.nested.to_string(), self.displacement.describe())
    }
}

impl BumpedBSDF {
    pub fn new(nested: Option<Arc<dyn BSDF>>, displacement: Arc<dyn Texture>, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("BumpedBSDF")),
            nested: nested.unwrap_or_else(|| Arc::new(RoughConductorBSDF::default())),
            displacement,
        }
    }

    pub fn nested(&self) -> &dyn BSDF {
        self.nested.as_ref()
    }
}

impl BSDF for BumpedBSDF {
    fn eval(&self, record: &BSDFSampleRecord) -> BSDFValue {
        self.nested.eval(record)
    }

    fn pdf(&self, record: &BSDFSampleRecord) -> Float {
        self.nested.pdf(record)
    }

    fn sample(&self, record: &mut BSDFSampleRecord, u: &Vector2f) -> BSDFValue {
        self.nested.sample(record, u)
    }

    fn displacement(&self, uv: &Vector2f) -> Option<Vector3f> {
        // Outside the unit square the surface is left flat.
        if uv.x > 1.0 || uv.y > 1.0 {
            return Some(Vector3f::zeros());
        }
        let c = self.displacement.eval(uv);
        Some(Vector3f::new(c.r() * 2.0 - 1.0, c.g() * 2.0 - 1.0, c.b() * 2.0 - 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::spectrum::RGBSpectrum;
    use crate::textures::constant::ConstantTexture;

    #[test]
    fn test_displacement_is_mapped_to_signed_range() {
        let tex = Arc::new(ConstantTexture::new(RGBSpectrum::new(0.5, 1.0, 0.0)));
        let bsdf = BumpedBSDF::new(None, tex, None);
        let d = bsdf.displacement(&Vector2f::new(0.2, 0.3)).expect("bumped BSDFs displace");
        assert!((d - Vector3f::new(0.0, 1.0, -1.0)).norm() < 1e-6);

        let flat = bsdf.displacement(&Vector2f::new(1.5, 0.3)).expect("bumped BSDFs displace");
        assert_eq!(flat, Vector3f::zeros());
    }

    #[test]
    fn test_scattering_is_delegated() {
        let tex = Arc::new(ConstantTexture::new(RGBSpectrum::splat(0.5)));
        let bsdf = BumpedBSDF::new(None, tex, None);
        let rec = BSDFSampleRecord::with_directions(Vector3f::new(0.0, 0.6, 0.8),
                                                    Vector3f::new(0.0, -0.6, 0.8),
                                                    Vector2f::zeros());
        assert_eq!(bsdf.eval(&rec), bsdf.nested().eval(&rec));
        assert_eq!(bsdf.pdf(&rec), bsdf.nested().pdf(&rec));
    }
}
