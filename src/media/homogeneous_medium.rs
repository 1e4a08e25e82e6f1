// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::medium::{Medium, MediumInterval};
use crate::core::phase::PhaseFunction;
use crate::core::rng::Sampler;
use crate::core::shape::Shape;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::phase::isotropic::IsotropicPhaseFunction;

use std::sync::Arc;

/// Constant absorption and scattering coefficients. Distances are drawn
/// with the channel mean of `sigma_t`.
pub struct HomogeneousMedium {
    id: String,
    sigma_a: RGBSpectrum,
    sigma_s: RGBSpectrum,
    phase: Arc<dyn PhaseFunction>,
    shape: Option<Arc<dyn Shape>>,
}

impl HomogeneousMedium {
    pub fn new(sigma_a: RGBSpectrum, sigma_s: RGBSpectrum, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("HomogeneousMedium")),
            sigma_a: sigma_a.clamp_negative(),
            sigma_s: sigma_s.clamp_negative(),
            phase: Arc::new(IsotropicPhaseFunction::default()),
            shape: None,
        }
    }

    pub fn with_phase_function(mut self, phase: Arc<dyn PhaseFunction>) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_bounding_shape(mut self, shape: Arc<dyn Shape>) -> Self {
        self.shape = Some(shape);
        self
    }

    fn extinction(&self) -> RGBSpectrum {
        self.sigma_a + self.sigma_s
    }
}

impl ComputationNode for HomogeneousMedium {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("HomogeneousMedium[sigma_a = {:?}, sigma_s = {:?}, phase = {}]",
                self.sigma_a.to_vector(), self.sigma_s.to_vector(), self.phase.to_string())
    }
}

impl Medium for HomogeneousMedium {
    fn sigma_t(&self, _p: &Vector3f) -> RGBSpectrum {
        self.extinction()
    }

    fn albedo(&self, _p: &Vector3f) -> RGBSpectrum {
        // Channels without extinction have no albedo.
        let sigma_t = self.extinction().to_vector();
        RGBSpectrum::from_vector(self.sigma_s.to_vector()
            .zip_map(&sigma_t, |s, t| if t > 0.0 { s / t } else { 0.0 }))
    }

    fn sigma_s(&self, _p: &Vector3f) -> RGBSpectrum {
        self.sigma_s
    }

    fn sigma_a(&self, _p: &Vector3f) -> RGBSpectrum {
        self.sigma_a
    }

    fn transmittance(&self, a: &Vector3f, b: &Vector3f) -> RGBSpectrum {
        (self.extinction() * -(b - a).norm()).exp()
    }

    fn sample_between(&self, u: Float, interval: &mut MediumInterval) {
        let sigma_t = self.extinction();
        let mean = sigma_t.mean();
        if mean <= 0.0 {
            interval.set_survival(1.0, RGBSpectrum::splat(1.0));
            return;
        }

        let t = -(1.0 - u).ln() / mean;
        if interval.is_inside(t) {
            interval.set_event(t, mean * (-mean * t).exp(), (sigma_t * -t).exp());
        } else {
            let dist = interval.dist_z;
            interval.set_survival((-mean * dist).exp(), (sigma_t * -dist).exp());
        }
    }

    fn sample_free_flight(&self, sampler: &mut dyn Sampler, interval: &mut MediumInterval) {
        // A vacuum never scatters; skip the draw.
        if self.extinction().mean() <= 0.0 {
            interval.set_survival(1.0, RGBSpectrum::splat(1.0));
            return;
        }
        self.sample_between(sampler.next_1d(), interval);
    }

    fn phase_function(&self) -> &dyn PhaseFunction {
        self.phase.as_ref()
    }

    fn bounding_shape(&self) -> Option<&dyn Shape> {
        self.shape.as_deref()
    }
}
