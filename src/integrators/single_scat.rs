// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, Measure};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::emitter::EmitterQueryRecord;
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::medium::MediumInterval;
use crate::core::phase::PhaseFunctionQueryRecord;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use super::{environment_pdf, hit_emitter_pdf, medium_direct, mis_weight, surface_direct};

/// Single scattering: one distance sample along the camera ray picks either
/// an in-scattering point in the medium or the surface behind it, and the
/// chosen vertex gathers MIS-weighted direct light through the medium.
pub struct SingleScatteringIntegrator {
    id: String,
}

impl SingleScatteringIntegrator {
    pub fn new(id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("SingleScatteringIntegrator")) }
    }

    fn in_scattering(&self, scene: &Scene, interval: &MediumInterval, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut result = medium_direct(scene, interval, sampler);

        let phase = interval.medium.phase_function();
        let mut rec = PhaseFunctionQueryRecord::new(interval.to_local(&(-interval.dir)));
        let weight = phase.sample(&mut rec, &sampler.next_2d());
        if weight.is_black() {
            return result;
        }
        let phase_pdf = phase.pdf(&rec);
        let wo = interval.to_world(&rec.wo);
        let ray = Ray3f::new(interval.xt, wo, None, None);
        match scene.intersect_surface(&ray) {
            Some(its) => {
                let le = its.le();
                if !le.is_black() {
                    let light = EmitterQueryRecord::from_hit(interval.xt, its.p(), its.geo_normal(), its.uv());
                    let w = mis_weight(phase_pdf, hit_emitter_pdf(scene, &its, interval.xt));
                    result += weight * le * scene.transmittance(&light) * w;
                }
            }
            None => {
                if scene.environment().is_some() {
                    let light = EmitterQueryRecord::from_direction(interval.xt, wo);
                    let w = mis_weight(phase_pdf, environment_pdf(scene, &ray));
                    result += weight * scene.background(&ray) * scene.transmittance(&light) * w;
                }
            }
        }
        result
    }

    fn surface(&self, scene: &Scene, ray: &Ray3f, its: &SurfaceIntersection, sampler: &mut dyn Sampler) -> RGBSpectrum {
        if scene.emitter_of(its).is_some() {
            return its.le();
        }
        let bsdf = match its.material() {
            Some(bsdf) => bsdf,
            None => return RGBSpectrum::zero(),
        };

        let wi = its.to_local(&(-ray.dir()));
        let mut result = surface_direct(scene, its, bsdf, &wi, sampler, true, true);

        let mut rec = BSDFSampleRecord::new(wi, its.uv());
        let weight = bsdf.sample(&mut rec, &sampler.next_2d());
        if weight.is_black() {
            return result;
        }
        let discrete = rec.measure == Measure::Discrete;
        let bsdf_pdf = bsdf.pdf(&rec);
        let next = Ray3f::spawn(its.p(), its.to_world(&rec.wo));
        match scene.intersect_surface(&next) {
            Some(light) => {
                let le = light.le();
                if !le.is_black() {
                    let q = EmitterQueryRecord::from_hit(its.p(), light.p(), light.geo_normal(), light.uv());
                    let w = if discrete { 1.0 } else { mis_weight(bsdf_pdf, hit_emitter_pdf(scene, &light, its.p())) };
                    result += weight * le * scene.transmittance(&q) * w;
                }
            }
            None => {
                let q = EmitterQueryRecord::from_direction(its.p(), next.dir());
                let w = match scene.environment() {
                    Some(_) if !discrete => mis_weight(bsdf_pdf, environment_pdf(scene, &next)),
                    _ => 1.0,
                };
                result += weight * scene.background(&next) * scene.transmittance(&q) * w;
            }
        }
        result
    }
}

impl ComputationNode for SingleScatteringIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        String::from("SingleScatteringIntegrator[]")
    }
}

impl Integrator for SingleScatteringIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let its = scene.intersect_surface(ray);
        let mut throughput = RGBSpectrum::splat(1.0);

        if let Some(mut interval) = scene.intersect_medium(ray, its.as_ref()) {
            let medium = interval.medium;
            medium.sample_free_flight(sampler, &mut interval);
            throughput = interval.weight();
            if interval.is_event {
                let sigma_s = medium.sigma_s(&interval.xt);
                return throughput * sigma_s * self.in_scattering(scene, &interval, sampler);
            }
        }

        let radiance = match &its {
            Some(its) => self.surface(scene, ray, its, sampler),
            None => scene.background(ray),
        };
        throughput * radiance
    }
}
