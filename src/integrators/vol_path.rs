// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, Measure};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::integrator::Integrator;
use crate::core::phase::PhaseFunctionQueryRecord;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use super::{environment_pdf, hit_emitter_pdf, medium_direct, mis_weight, surface_direct, PathSettings};

/// Volumetric path tracing. Each segment first samples a free-flight
/// distance in the medium; a scattering event continues the path through the
/// phase function, otherwise the surface (or the background) behind the
/// segment is shaded as in `PathMisIntegrator`, attenuated by the medium.
pub struct VolPathIntegrator {
    id: String,
    settings: PathSettings,
}

impl VolPathIntegrator {
    pub fn new(settings: PathSettings, id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("VolPathIntegrator")), settings }
    }
}

impl Default for VolPathIntegrator {
    fn default() -> Self {
        Self::new(PathSettings::new(3), None)
    }
}

impl ComputationNode for VolPathIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("VolPathIntegrator[{}]", self.settings.describe())
    }
}

impl Integrator for VolPathIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut ray = *ray;
        let mut result = RGBSpectrum::zero();
        let mut throughput = RGBSpectrum::splat(1.0);
        let mut bounces = 0u32;
        let mut last_pdf: Option<Float> = None;

        loop {
            let its = scene.intersect_surface(&ray);

            if let Some(mut interval) = scene.intersect_medium(&ray, its.as_ref()) {
                let medium = interval.medium;
                medium.sample_free_flight(sampler, &mut interval);
                throughput *= interval.weight();
                if throughput.is_black() {
                    break;
                }

                if interval.is_event {
                    if !self.settings.allows(bounces + 1) {
                        break;
                    }
                    throughput *= medium.sigma_s(&interval.xt);
                    result += throughput * medium_direct(scene, &interval, sampler);

                    let phase = medium.phase_function();
                    let mut rec = PhaseFunctionQueryRecord::new(interval.to_local(&(-interval.dir)));
                    throughput *= phase.sample(&mut rec, &sampler.next_2d());
                    last_pdf = Some(phase.pdf(&rec));
                    bounces += 1;
                    if !self.settings.survive(bounces, &mut throughput, sampler) {
                        break;
                    }
                    ray = Ray3f::new(interval.xt, interval.to_world(&rec.wo), None, None);
                    continue;
                }
            }

            let its = match its {
                Some(its) => its,
                None => {
                    let w = match last_pdf {
                        Some(pdf) if scene.environment().is_some() => mis_weight(pdf, environment_pdf(scene, &ray)),
                        _ => 1.0,
                    };
                    result += throughput * scene.background(&ray) * w;
                    break;
                }
            };
            if scene.emitter_of(&its).is_some() {
                let w = match last_pdf {
                    Some(pdf) => mis_weight(pdf, hit_emitter_pdf(scene, &its, ray.origin())),
                    None => 1.0,
                };
                result += throughput * its.le() * w;
                break;
            }
            let bsdf = match its.material() {
                Some(bsdf) => bsdf,
                None => break,
            };
            if !self.settings.allows(bounces + 1) {
                break;
            }

            let wi = its.to_local(&(-ray.dir()));
            result += throughput * surface_direct(scene, &its, bsdf, &wi, sampler, true, true);

            let mut rec = BSDFSampleRecord::new(wi, its.uv());
            throughput *= bsdf.sample(&mut rec, &sampler.next_2d());
            last_pdf = match rec.measure {
                Measure::Discrete => None,
                _ => Some(bsdf.pdf(&rec)),
            };
            bounces += 1;
            if !self.settings.survive(bounces, &mut throughput, sampler) {
                break;
            }
            ray = Ray3f::spawn(its.p(), its.to_world(&rec.wo));
        }
        result
    }
}
