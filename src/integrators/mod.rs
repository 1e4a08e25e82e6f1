// Copyright @yucwang 2026

pub mod direct_ems;
pub mod direct_mats;
pub mod direct_mis;
pub mod path;
pub mod path_mis;
pub mod path_nee;
pub mod single_scat;
pub mod vol_path;

use crate::core::bsdf::{BSDFSampleRecord, BSDF};
use crate::core::emitter::EmitterQueryRecord;
use crate::core::interaction::SurfaceIntersection;
use crate::core::medium::MediumInterval;
use crate::core::phase::PhaseFunctionQueryRecord;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector3f, FLOAT_EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Balance heuristic weight of strategy `a` against strategy `b`.
pub fn mis_weight(pdf_a: Float, pdf_b: Float) -> Float {
    let sum = pdf_a + pdf_b;
    if sum < FLOAT_EPSILON || !sum.is_finite() {
        return 0.0;
    }
    pdf_a / sum
}

/// Path length cap and Russian roulette shared by the recursive integrators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSettings {
    /// Maximum number of scattering vertices; `None` is unlimited.
    pub max_depth: Option<u32>,
    pub rr: bool,
    /// Vertices after which roulette starts.
    pub rr_depth: u32,
}

impl PathSettings {
    pub fn new(rr_depth: u32) -> Self {
        Self { max_depth: None, rr: true, rr_depth }
    }

    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_rr(mut self, rr: bool) -> Self {
        self.rr = rr;
        self
    }

    /// Whether scattering vertex number `vertex` (1 for the first hit) may
    /// contribute.
    pub fn allows(&self, vertex: u32) -> bool {
        self.max_depth.map_or(true, |max| vertex <= max)
    }

    /// Russian roulette after `vertex` vertices. Survivors have their
    /// throughput divided by the continuation probability.
    pub fn survive(&self, vertex: u32, throughput: &mut RGBSpectrum, sampler: &mut dyn Sampler) -> bool {
        if throughput.is_black() || !throughput.is_finite() {
            return false;
        }
        if !self.rr || vertex < self.rr_depth {
            return true;
        }
        let q = throughput.max_value().min(0.9);
        if sampler.next_1d() >= q {
            return false;
        }
        *throughput /= q;
        true
    }

    pub fn describe(&self) -> String {
        format!("max_depth = {}, rr = {}, rr_depth = {}",
                self.max_depth.map_or("unlimited".to_string(), |d| d.to_string()),
                self.rr, self.rr_depth)
    }
}

/// An emitter point chosen for next-event estimation.
pub(crate) struct LightSample {
    pub rec: EmitterQueryRecord,
    /// Unoccluded radiance arriving from the emitter point.
    pub li: RGBSpectrum,
    /// Selection probability times the emitter density.
    pub pdf: Float,
    pub is_delta: bool,
}

impl LightSample {
    /// `li / pdf`, the unweighted light-sampling estimate.
    pub fn weight(&self) -> RGBSpectrum {
        self.li / self.pdf
    }
}

pub(crate) fn sample_light(scene: &Scene, reference: Vector3f, sampler: &mut dyn Sampler) -> Option<LightSample> {
    let (index, select_pdf) = scene.sample_emitter(sampler.next_1d())?;
    let emitter = scene.emitter(index)?;
    let mut rec = EmitterQueryRecord::new(reference);
    let li = emitter.sample(&mut rec, &sampler.next_2d());
    let pdf = emitter.pdf(&rec) * select_pdf;
    if li.is_black() || pdf <= FLOAT_EPSILON || !pdf.is_finite() {
        return None;
    }
    Some(LightSample { rec, li, pdf, is_delta: emitter.is_delta() })
}

/// Density with which light sampling from `origin` would have produced the
/// emitter point `its`.
pub(crate) fn hit_emitter_pdf(scene: &Scene, its: &SurfaceIntersection, origin: Vector3f) -> Float {
    match scene.emitter_of(its).and_then(|index| scene.emitter(index).map(|e| (index, e))) {
        Some((index, emitter)) => {
            let rec = EmitterQueryRecord::from_hit(origin, its.p(), its.geo_normal(), its.uv());
            emitter.pdf(&rec) * scene.pdf_emitter(index)
        }
        None => 0.0,
    }
}

/// Same as `hit_emitter_pdf` for a ray escaping to the environment. Flat
/// backgrounds are never light sampled.
pub(crate) fn environment_pdf(scene: &Scene, ray: &Ray3f) -> Float {
    match scene.environment().and_then(|index| scene.emitter(index).map(|e| (index, e))) {
        Some((index, emitter)) => {
            let rec = EmitterQueryRecord::from_direction(ray.origin(), ray.dir());
            emitter.pdf(&rec) * scene.pdf_emitter(index)
        }
        None => 0.0,
    }
}

/// Light-sampled direct illumination at a surface point. `wi` is the local
/// direction back along the incoming ray. With `mis` the estimate carries the
/// balance weight against BSDF sampling; `attenuate` multiplies by the medium
/// transmittance of the shadow segment.
pub(crate) fn surface_direct(scene: &Scene,
                             its: &SurfaceIntersection,
                             bsdf: &dyn BSDF,
                             wi: &Vector3f,
                             sampler: &mut dyn Sampler,
                             mis: bool,
                             attenuate: bool) -> RGBSpectrum {
    let ls = match sample_light(scene, its.p(), sampler) {
        Some(ls) => ls,
        None => return RGBSpectrum::zero(),
    };
    let wo = its.to_local(&ls.rec.wi);
    let rec = BSDFSampleRecord::with_directions(*wi, wo, its.uv());
    let f = bsdf.eval(&rec);
    if f.is_black() || !scene.visible(&ls.rec) {
        return RGBSpectrum::zero();
    }

    let tr = if attenuate { scene.transmittance(&ls.rec) } else { RGBSpectrum::splat(1.0) };
    let w = if mis && !ls.is_delta { mis_weight(ls.pdf, bsdf.pdf(&rec)) } else { 1.0 };
    f * ls.weight() * tr * (wo.z.abs() * w)
}

/// Light-sampled in-scattering at a medium event, MIS weighted against
/// phase-function sampling.
pub(crate) fn medium_direct(scene: &Scene,
                            interval: &MediumInterval,
                            sampler: &mut dyn Sampler) -> RGBSpectrum {
    let ls = match sample_light(scene, interval.xt, sampler) {
        Some(ls) => ls,
        None => return RGBSpectrum::zero(),
    };
    let phase = interval.medium.phase_function();
    let rec = PhaseFunctionQueryRecord::with_directions(interval.to_local(&(-interval.dir)),
                                                        interval.to_local(&ls.rec.wi));
    let value = phase.eval(&rec);
    if value.is_black() || !scene.visible(&ls.rec) {
        return RGBSpectrum::zero();
    }

    let w = if ls.is_delta { 1.0 } else { mis_weight(ls.pdf, phase.pdf(&rec)) };
    value * ls.weight() * scene.transmittance(&ls.rec) * w
}
