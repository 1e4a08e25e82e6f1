// Copyright @yucwang 2026

use crate::core::bsdf::BSDFSampleRecord;
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::integrator::Integrator;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Direct illumination by BSDF sampling only.
pub struct DirectMatsIntegrator {
    id: String,
}

impl DirectMatsIntegrator {
    pub fn new(id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("DirectMatsIntegrator")) }
    }
}

impl ComputationNode for DirectMatsIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        String::from("DirectMatsIntegrator[]")
    }
}

impl Integrator for DirectMatsIntegrator {
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

        let mut rec = BSDFSampleRecord::new(its.to_local(&(-ray.dir())), its.uv());
        let weight = bsdf.sample(&mut rec, &sampler.next_2d());
        if weight.is_black() {
            return RGBSpectrum::zero();
        }

        let next = Ray3f::spawn(its.p(), its.to_world(&rec.wo));
        match scene.intersect_surface(&next) {
            Some(light) => weight * light.le(),
            None => weight * scene.background(&next),
        }
    }
}
