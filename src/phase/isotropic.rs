// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::phase::{PhaseFunction, PhaseFunctionQueryRecord};
use crate::math::constants::{Float, Vector2f, INV_FOURPI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{square_to_uniform_sphere, square_to_uniform_sphere_pdf};

/// Scatters uniformly over the sphere.
pub struct IsotropicPhaseFunction {
    id: String,
}

impl IsotropicPhaseFunction {
    pub fn new(id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("IsotropicPhaseFunction")) }
    }
}

impl Default for IsotropicPhaseFunction {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ComputationNode for IsotropicPhaseFunction {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        String::from("IsotropicPhaseFunction[]")
    }
}

impl PhaseFunction for IsotropicPhaseFunction {
    fn eval(&self, _record: &PhaseFunctionQueryRecord) -> RGBSpectrum {
        RGBSpectrum::splat(INV_FOURPI)
    }

    fn pdf(&self, record: &PhaseFunctionQueryRecord) -> Float {
        square_to_uniform_sphere_pdf(&record.wo)
    }

    fn sample(&self, record: &mut PhaseFunctionQueryRecord, u: &Vector2f) -> RGBSpectrum {
        record.wo = square_to_uniform_sphere(u);
        RGBSpectrum::splat(1.0)
    }
}
