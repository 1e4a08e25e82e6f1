// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Directions in the local frame of the scattering point. `wi` points back
/// along the incoming ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseFunctionQueryRecord {
    pub wi: Vector3f,
    pub wo: Vector3f,
}

impl PhaseFunctionQueryRecord {
    pub fn new(wi: Vector3f) -> Self {
        Self { wi, wo: Vector3f::zeros() }
    }

    pub fn with_directions(wi: Vector3f, wo: Vector3f) -> Self {
        Self { wi, wo }
    }
}

pub trait PhaseFunction: ComputationNode + Send + Sync {
    fn eval(&self, record: &PhaseFunctionQueryRecord) -> RGBSpectrum;

    fn pdf(&self, record: &PhaseFunctionQueryRecord) -> Float;

    /// Fills `wo`; returns `eval / pdf`.
    fn sample(&self, record: &mut PhaseFunctionQueryRecord, u: &Vector2f) -> RGBSpectrum;
}
