// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, Measure};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::integrator::Integrator;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use super::{environment_pdf, hit_emitter_pdf, mis_weight, surface_direct, PathSettings};

/// Path tracing with next-event estimation and BSDF-sampled emission,
/// combined with the balance heuristic.
pub struct PathMisIntegrator {
    id: String,
    settings: PathSettings,
}

impl PathMisIntegrator {
    pub fn new(settings: PathSettings, id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("PathMisIntegrator")), settings }
    }
}

impl Default for PathMisIntegrator {
    fn default() -> Self {
        Self::new(PathSettings::new(3), None)
    }
}

impl ComputationNode for PathMisIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PathMisIntegrator[{}]", self.settings.describe())
    }
}

impl Integrator for PathMisIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut ray = *ray;
        let mut result = RGBSpectrum::zero();
        let mut throughput = RGBSpectrum::splat(1.0);
        let mut bounces = 0u32;
        // Sampling density of the last direction; `None` for camera rays and
        // discrete events, which always get full weight.
        let mut last_pdf: Option<Float> = None;

        loop {
            let its = match scene.intersect_surface(&ray) {
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
            result += throughput * surface_direct(scene, &its, bsdf, &wi, sampler, true, false);

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
