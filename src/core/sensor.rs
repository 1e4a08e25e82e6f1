// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::math::constants::Vector2f;
use crate::math::ray::Ray3f;

pub trait Sensor: ComputationNode + Send + Sync {
    /// Film size as `(width, height)`.
    fn resolution(&self) -> (usize, usize);

    /// Primary ray through the raster position `pixel`, measured in pixels
    /// from the top-left corner of the film.
    fn sample_ray(&self, pixel: &Vector2f) -> Ray3f;
}
