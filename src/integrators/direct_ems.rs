// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::integrator::Integrator;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use super::surface_direct;

/// Direct illumination by emitter sampling only.
pub struct DirectEmsIntegrator {
    id: String,
}

impl DirectEmsIntegrator {
    pub fn new(id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("DirectEmsIntegrator")) }
    }
}

impl ComputationNode for DirectEmsIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        String::from("DirectEmsIntegrator[]")
    }
}

impl Integrator for DirectEmsIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let its = match scene.intersect_surface(ray) {
            Some(its) => its,
            None => return scene.background(ray),
        };
        if scene.emitter_of(&its).is_some() {
            return its.le();
        }
        let bsdf = match its.material() {
            Some(bsdf) => bsdf,
            None => return RGBSpectrum::zero(),
        };

        let wi = its.to_local(&(-ray.dir()));
        surface_direct(scene, &its, bsdf, &wi, sampler, false, false)
    }
}
