// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, Measure};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::integrator::Integrator;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use super::{environment_pdf, hit_emitter_pdf, mis_weight, surface_direct};

/// Direct illumination combining emitter and BSDF sampling with the
/// balance heuristic.
pub struct DirectMisIntegrator {
    id: String,
}

impl DirectMisIntegrator {
    pub fn new(id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("DirectMisIntegrator")) }
    }
}

impl ComputationNode for DirectMisIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        String::from("DirectMisIntegrator[]")
    }
}

impl Integrator for DirectMisIntegrator {
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
        let mut result = surface_direct(scene, &its, bsdf, &wi, sampler, true, false);

        let mut rec = BSDFSampleRecord::new(wi, its.uv());
        let weight = bsdf.sample(&mut rec, &sampler.next_2d());
        if weight.is_black() {
            return result;
        }
        let bsdf_pdf = bsdf.pdf(&rec);
        let discrete = rec.measure == Measure::Discrete;

        let next = Ray3f::spawn(its.p(), its.to_world(&rec.wo));
        match scene.intersect_surface(&next) {
            Some(light) => {
                let le = light.le();
                if !le.is_black() {
                    let w = if discrete { 1.0 } else { mis_weight(bsdf_pdf, hit_emitter_pdf(scene, &light, its.p())) };
                    result += weight * le * w;
                }
            }
            None => {
                let w = match scene.environment() {
                    Some(_) if !discrete => mis_weight(bsdf_pdf, environment_pdf(scene, &next)),
                    _ => 1.0,
                };
                result += weight * scene.background(&next) * w;
            }
        }
        result
    }
}
