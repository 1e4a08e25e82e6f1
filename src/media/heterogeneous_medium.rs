// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::medium::{Medium, MediumInterval};
use crate::core::phase::PhaseFunction;
use crate::core::rng::Sampler;
use crate::core::shape::Shape;
use crate::core::volume::Volume;
use crate::math::constants::{Float, Vector3f};
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::phase::isotropic::IsotropicPhaseFunction;

use std::sync::Arc;

/// Gray extinction driven by a density volume, `sigma_t(p) = scale * density(p)`.
///
/// Distance samples report `transmittance` and `prob` with the common factor
/// `T(x, xt)` divided out: an event carries `(1, sigma_t(xt))`, a survival
/// `(1, 1)`. Their ratio is the usual `T / prob`.
pub struct HeterogeneousMedium {
    id: String,
    density: Arc<dyn Volume>,
    albedo: Option<Arc<dyn Volume>>,
    albedo_value: RGBSpectrum,
    orientation: Option<Arc<dyn Volume>>,
    scale: Float,
    phase: Arc<dyn PhaseFunction>,
    shape: Option<Arc<dyn Shape>>,
}

impl HeterogeneousMedium {
    pub fn new(density: Arc<dyn Volume>, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("HeterogeneousMedium")),
            density,
            albedo: None,
            albedo_value: RGBSpectrum::splat(1.0),
            orientation: None,
            scale: 1.0,
            phase: Arc::new(IsotropicPhaseFunction::default()),
            shape: None,
        }
    }

    pub fn with_scale(mut self, scale: Float) -> Self {
        self.scale = scale.max(0.0);
        self
    }

    pub fn with_albedo(mut self, albedo: RGBSpectrum) -> Self {
        self.albedo_value = albedo;
        self
    }

    pub fn with_albedo_volume(mut self, volume: Arc<dyn Volume>) -> Self {
        self.albedo = Some(volume);
        self
    }

    pub fn with_orientation_volume(mut self, volume: Arc<dyn Volume>) -> Self {
        self.orientation = Some(volume);
        self
    }

    pub fn with_phase_function(mut self, phase: Arc<dyn PhaseFunction>) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_bounding_shape(mut self, shape: Arc<dyn Shape>) -> Self {
        self.shape = Some(shape);
        self
    }

    fn density_at(&self, p: &Vector3f) -> Float {
        self.density.lookup_float(p).max(0.0) * self.scale
    }

    /// Part of `[0, dist]` along the ray where the density can be non-zero.
    fn overlap(&self, x: &Vector3f, dir: &Vector3f, dist: Float) -> Option<(Float, Float)> {
        match self.density.bbox() {
            Some(bbox) => {
                let ray = Ray3f::new(*x, *dir, Some(0.0), Some(dist));
                bbox.ray_intersect_range(&ray)
            }
            None => Some((0.0, dist)),
        }
    }

    /// Equal-length marching steps covering `[t0, t1]`.
    fn steps(&self, t0: Float, t1: Float) -> (usize, Float) {
        let length = t1 - t0;
        let step = self.density.step_size();
        if !step.is_finite() || step <= 0.0 || length <= 0.0 {
            return (1, length.max(0.0));
        }
        let n = (length / step).ceil().max(1.0) as usize;
        (n, length / n as Float)
    }

    fn optical_depth(&self, a: &Vector3f, b: &Vector3f) -> Float {
        let delta = b - a;
        let dist = delta.norm();
        if dist <= 0.0 {
            return 0.0;
        }
        let dir = delta / dist;
        let (t0, t1) = match self.overlap(a, &dir, dist) {
            Some(range) => range,
            None => return 0.0,
        };
        let (n, dt) = self.steps(t0, t1);
        (0..n).map(|i| self.density_at(&(a + dir * (t0 + (i as Float + 0.5) * dt))) * dt).sum()
    }
}

impl ComputationNode for HeterogeneousMedium {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("HeterogeneousMedium[density = {}, scale = {}, phase = {}]",
                self.density.to_string(), self.scale, self.phase.to_string())
    }
}

impl Medium for HeterogeneousMedium {
    fn sigma_t(&self, p: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::splat(self.density_at(p))
    }

    fn albedo(&self, p: &Vector3f) -> RGBSpectrum {
        match &self.albedo {
            Some(volume) => volume.lookup_spectrum(p),
            None => self.albedo_value,
        }
    }

    fn transmittance(&self, a: &Vector3f, b: &Vector3f) -> RGBSpectrum {
        // March in a fixed order so that T(a, b) == T(b, a) exactly.
        let swap = (a.x, a.y, a.z) > (b.x, b.y, b.z);
        let tau = if swap { self.optical_depth(b, a) } else { self.optical_depth(a, b) };
        RGBSpectrum::splat((-tau).exp())
    }

    /// Inverts the marched optical depth at `-ln(1 - u)`.
    fn sample_between(&self, u: Float, interval: &mut MediumInterval) {
        let target = -(1.0 - u).ln();
        let (t0, t1) = match self.overlap(&interval.x, &interval.dir, interval.dist_z) {
            Some(range) => range,
            None => {
                interval.set_survival(1.0, RGBSpectrum::splat(1.0));
                return;
            }
        };

        if !t1.is_finite() {
            // Unbounded sources are constant: invert analytically.
            let sigma = self.density_at(&(interval.x + interval.dir * t0));
            if sigma > 0.0 && interval.is_inside(t0 + target / sigma) {
                interval.set_event(t0 + target / sigma, sigma, RGBSpectrum::splat(1.0));
            } else {
                interval.set_survival(1.0, RGBSpectrum::splat(1.0));
            }
            return;
        }

        let (n, dt) = self.steps(t0, t1);
        let mut tau = 0.0;
        for i in 0..n {
            let t_a = t0 + i as Float * dt;
            let sigma = self.density_at(&(interval.x + interval.dir * (t_a + 0.5 * dt)));
            if sigma > 0.0 && tau + sigma * dt >= target {
                let t = t_a + (target - tau) / sigma;
                if interval.is_inside(t) {
                    interval.set_event(t, sigma, RGBSpectrum::splat(1.0));
                } else {
                    interval.set_survival(1.0, RGBSpectrum::splat(1.0));
                }
                return;
            }
            tau += sigma * dt;
        }
        interval.set_survival(1.0, RGBSpectrum::splat(1.0));
    }

    /// Delta tracking against the maximum density of the volume.
    fn sample_free_flight(&self, sampler: &mut dyn Sampler, interval: &mut MediumInterval) {
        let sigma_max = self.density.maximum_float_value() * self.scale;
        let (t0, t1) = match self.overlap(&interval.x, &interval.dir, interval.dist_z) {
            Some(range) if sigma_max > 0.0 => range,
            _ => {
                interval.set_survival(1.0, RGBSpectrum::splat(1.0));
                return;
            }
        };

        let mut t = t0;
        loop {
            t -= (1.0 - sampler.next_1d()).ln() / sigma_max;
            if !t.is_finite() || t >= t1 || !interval.is_inside(t) {
                interval.set_survival(1.0, RGBSpectrum::splat(1.0));
                return;
            }
            let sigma = self.density_at(&(interval.x + interval.dir * t));
            if sampler.next_1d() * sigma_max < sigma {
                interval.set_event(t, sigma, RGBSpectrum::splat(1.0));
                return;
            }
        }
    }

    fn phase_function(&self) -> &dyn PhaseFunction {
        self.phase.as_ref()
    }

    fn bounding_shape(&self) -> Option<&dyn Shape> {
        self.shape.as_deref()
    }

    fn local_frame(&self, p: &Vector3f, dir: &Vector3f) -> Frame {
        if let Some(volume) = &self.orientation {
            let n = volume.lookup_vector(p);
            if n.norm() > 0.0 {
                return Frame::from_normal(n.normalize());
            }
        }
        Frame::from_normal(*dir)
    }
}
