// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// Definitions of types used in BSDF sampling and eval 
// processes
pub type BSDFValue = RGBSpectrum;

/// Integration measure of a sampled direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Unknown,
    SolidAngle,
    Discrete,
}

/// Directions are in the local shading frame. `wi` points back along the
/// incoming ray, `wo` towards the next vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSampleRecord {
    pub wi: Vector3f,
    pub wo: Vector3f,
    pub uv: Vector2f,
    pub eta: Float,
    pub measure: Measure,
}

#[derive(Debug, PartialEq)]
pub struct BSDFEvalResult {
    pub value: BSDFValue,
    pub pdf: Float,
}

pub trait BSDF: ComputationNode + Send + Sync {
    /// `f(wi, wo)`; zero on the backside or when the measure is not solid angle.
    fn eval(&self, record: &BSDFSampleRecord) -> BSDFValue;

    /// Solid angle density of `sample` producing `record.wo`.
    fn pdf(&self, record: &BSDFSampleRecord) -> Float;

    /// Fills `wo` and `measure`; returns `f * cos / pdf`.
    fn sample(&self, record: &mut BSDFSampleRecord, u: &Vector2f) -> BSDFValue;

    fn eval_with_pdf(&self, record: &BSDFSampleRecord) -> BSDFEvalResult {
        BSDFEvalResult { value: self.eval(record), pdf: self.pdf(record) }
    }

    /// Tangent-space normal offset in `[-1, 1]^3` for bump mapping.
    fn displacement(&self, _uv: &Vector2f) -> Option<Vector3f> {
        None
    }
}

impl Default for BSDFSampleRecord {
    fn default() -> Self {
        Self {
            wi: Vector3f::zeros(),
            wo: Vector3f::zeros(),
            uv: Vector2f::new(0.0, 0.0),
            eta: 1.0,
            measure: Measure::Unknown,
        }
    }
}

impl BSDFSampleRecord {
    /// Record for sampling: `wo` is filled in by `BSDF::sample`.
    pub fn new(wi: Vector3f, uv: Vector2f) -> Self {
        Self { wi, uv, ..Default::default() }
    }

    /// Record for evaluating a known pair of directions.
    pub fn with_directions(wi: Vector3f, wo: Vector3f, uv: Vector2f) -> Self {
        Self { wi, wo, uv, eta: 1.0, measure: Measure::SolidAngle }
    }
}

impl Default for BSDFEvalResult {
    fn default() -> Self {
        Self {
            value: RGBSpectrum::default(),
            pdf: 0.0,
        }
    }
}
