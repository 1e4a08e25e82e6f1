// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::phase::PhaseFunction;
use crate::core::rng::Sampler;
use crate::core::shape::Shape;
use crate::math::constants::{ Float, Vector3f, EPSILON, FLOAT_EPSILON };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;

/// The part of a ray that overlaps a medium, and the distance sample drawn
/// on it.
///
/// `x` is the entry and `xz` the exit. After sampling, `xt` is either a
/// scattering point strictly inside `[x, xz]` (`is_event`) or equal to `xz`
/// (survival). `transmittance` is `T(x, xt)` and `prob` the density or
/// probability the sampler realised, so estimators weight by
/// `transmittance / prob` in both cases.
pub struct MediumInterval<'a> {
    pub o: Vector3f,
    pub dir: Vector3f,
    /// Surface hit that ends the ray, if any.
    pub p: Option<Vector3f>,
    pub x: Vector3f,
    pub xz: Vector3f,
    pub xt: Vector3f,
    pub dist_t: Float,
    /// Infinite when the ray leaves the scene inside an unbounded medium.
    pub dist_z: Float,
    pub prob: Float,
    pub transmittance: RGBSpectrum,
    pub frame: Frame,
    pub medium: &'a dyn Medium,
    pub is_event: bool,
}

impl<'a> MediumInterval<'a> {
    pub fn new(medium: &'a dyn Medium,
               o: Vector3f,
               dir: Vector3f,
               p: Option<Vector3f>,
               x: Vector3f,
               dist_z: Float) -> Self {
        let xz = if dist_z.is_finite() { x + dir * dist_z } else { x + dir * 1e30 };
        Self {
            o, dir, p, x, xz,
            xt: xz,
            dist_t: dist_z,
            dist_z,
            prob: 1.0,
            transmittance: RGBSpectrum::splat(1.0),
            frame: Frame::from_normal(dir),
            medium,
            is_event: false,
        }
    }

    /// `T(x, xt) / prob`, zero when the sample is degenerate.
    pub fn weight(&self) -> RGBSpectrum {
        if self.prob <= FLOAT_EPSILON || !self.prob.is_finite() {
            return RGBSpectrum::zero();
        }
        let w = self.transmittance / self.prob;
        if w.is_finite() { w } else { RGBSpectrum::zero() }
    }

    /// Whether a free-flight distance falls inside the segment.
    pub fn is_inside(&self, t: Float) -> bool {
        t < self.dist_z - EPSILON
    }

    pub fn set_event(&mut self, t: Float, prob: Float, transmittance: RGBSpectrum) {
        self.xt = self.x + self.dir * t;
        self.dist_t = t;
        self.prob = prob;
        self.transmittance = transmittance;
        self.is_event = true;
        self.frame = self.medium.local_frame(&self.xt, &self.dir);
    }

    pub fn set_survival(&mut self, prob: Float, transmittance: RGBSpectrum) {
        self.xt = self.xz;
        self.dist_t = self.dist_z;
        self.prob = prob;
        self.transmittance = transmittance;
        self.is_event = false;
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_local(v)
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_world(v)
    }
}

pub trait Medium: ComputationNode + Send + Sync {
    fn sigma_t(&self, p: &Vector3f) -> RGBSpectrum;

    fn albedo(&self, p: &Vector3f) -> RGBSpectrum;

    fn sigma_s(&self, p: &Vector3f) -> RGBSpectrum {
        self.sigma_t(p) * self.albedo(p)
    }

    fn sigma_a(&self, p: &Vector3f) -> RGBSpectrum {
        self.sigma_t(p) * (RGBSpectrum::splat(1.0) - self.albedo(p))
    }

    /// `T(a, b)`: symmetric, one at zero distance, non-increasing.
    fn transmittance(&self, a: &Vector3f, b: &Vector3f) -> RGBSpectrum;

    /// Draws a distance on `[x, xz]` from a single uniform number.
    fn sample_between(&self, u: Float, interval: &mut MediumInterval);

    /// Distance sampling that may consume several numbers.
    fn sample_free_flight(&self, sampler: &mut dyn Sampler, interval: &mut MediumInterval) {
        let u = sampler.next_1d();
        self.sample_between(u, interval);
    }

    fn phase_function(&self) -> &dyn PhaseFunction;

    /// Geometry enclosing the medium; `None` fills the whole scene.
    fn bounding_shape(&self) -> Option<&dyn Shape> {
        None
    }

    /// Frame in which phase-function directions are expressed at `p`.
    fn local_frame(&self, _p: &Vector3f, dir: &Vector3f) -> Frame {
        Frame::from_normal(*dir)
    }
}
