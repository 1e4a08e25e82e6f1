// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, Measure};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::integrator::Integrator;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use super::{surface_direct, PathSettings};

/// Path tracing with next-event estimation. Emission found by BSDF
/// sampling is only counted where emitter sampling could not have found it:
/// on camera rays and after discrete events.
pub struct PathNeeIntegrator {
    id: String,
    settings: PathSettings,
}

impl PathNeeIntegrator {
    pub fn new(settings: PathSettings, id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("PathNeeIntegrator")), settings }
    }
}

impl Default for PathNeeIntegrator {
    fn default() -> Self {
        Self::new(PathSettings::new(2), None)
    }
}

impl ComputationNode for PathNeeIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PathNeeIntegrator[{}]", self.settings.describe())
    }
}

impl Integrator for PathNeeIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut ray = *ray;
        let mut result = RGBSpectrum::zero();
        let mut throughput = RGBSpectrum::splat(1.0);
        let mut bounces = 0u32;
        let mut count_emission = true;

        loop {
            let its = match scene.intersect_surface(&ray) {
                Some(its) => its,
                None => {
                    if count_emission || scene.environment().is_none() {
                        result += throughput * scene.background(&ray);
                    }
                    break;
                }
            };
            if scene.emitter_of(&its).is_some() {
                if count_emission {
                    result += throughput * its.le();
                }
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
            result += throughput * surface_direct(scene, &its, bsdf, &wi, sampler, false, false);

            let mut rec = BSDFSampleRecord::new(wi, its.uv());
            throughput *= bsdf.sample(&mut rec, &sampler.next_2d());
            count_emission = rec.measure == Measure::Discrete;
            bounces += 1;
            if !self.settings.survive(bounces, &mut throughput, sampler) {
                break;
            }
            ray = Ray3f::spawn(its.p(), its.to_world(&rec.wo));
        }
        result
    }
}
