// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::rng::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub trait Integrator: ComputationNode + Send + Sync {
    /// Radiance arriving at the ray origin along `-ray.dir()`.
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum;
}
