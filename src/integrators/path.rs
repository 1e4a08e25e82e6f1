// Copyright @yucwang 2026

use crate::core::bsdf::BSDFSampleRecord;
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::integrator::Integrator;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use super::PathSettings;

/// Path tracing by BSDF sampling alone. Emitters contribute only when a
/// path happens to hit them.
pub struct PathIntegrator {
    id: String,
    settings: PathSettings,
}

impl PathIntegrator {
    pub fn new(settings: PathSettings, id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("PathIntegrator")), settings }
    }
}

impl Default for PathIntegrator {
    fn default() -> Self {
        Self::new(PathSettings::new(2), None)
    }
}

impl ComputationNode for PathIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PathIntegrator[{}]", self.settings.describe())
    }
}

impl Integrator for PathIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut ray = *ray;
        let mut result = RGBSpectrum::zero();
        let mut throughput = RGBSpectrum::splat(1.0);
        let mut bounces = 0u32;

        loop {
            let its = match scene.intersect_surface(&ray) {
                Some(its) => its,
                None => {
                    result += throughput * scene.background(&ray);
                    break;
                }
            };
            if scene.emitter_of(&its).is_some() {
                result += throughput * its.le();
                break;
            }
            let bsdf = match its.material() {
                Some(bsdf) => bsdf,
                None => break,
            };
            if !self.settings.allows(bounces + 1) {
                break;
            }

            let mut rec = BSDFSampleRecord::new(its.to_local(&(-ray.dir())), its.uv());
            throughput *= bsdf.sample(&mut rec, &sampler.next_2d());
            bounces += 1;
            if !self.settings.survive(bounces, &mut throughput, sampler) {
                break;
            }
            ray = Ray3f::spawn(its.p(), its.to_world(&rec.wo));
        }
        result
    }
}
