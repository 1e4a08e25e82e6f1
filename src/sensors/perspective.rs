// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// Pinhole camera. Local +z looks forward, +y is up and +x points to the
/// left of the image, matching `Transform::look_at`.
pub struct PerspectiveCamera {
    id: String,
    to_world: Transform,
    tan_half_fov_x: Float,
    aspect: Float,
    width: usize,
    height: usize,
    near_clip: Float,
    far_clip: Float,
}

impl PerspectiveCamera {
    /// `fov_x_degrees` is the horizontal field of view.
    pub fn new(to_world: Transform,
               fov_x_degrees: Float,
               width: usize,
               height: usize,
               id: Option<String>) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            id: id.unwrap_or_else(|| generate_node_id("PerspectiveCamera")),
            to_world,
            tan_half_fov_x: (0.5 * fov_x_degrees.to_radians()).tan(),
            aspect: width as Float / height as Float,
            width,
            height,
            near_clip: 1e-2,
            far_clip: 1e4,
        }
    }

    pub fn with_clip_planes(mut self, near_clip: Float, far_clip: Float) -> Self {
        self.near_clip = near_clip.max(0.0);
        self.far_clip = far_clip.max(self.near_clip);
        self
    }
}

impl ComputationNode for PerspectiveCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PerspectiveCamera[resolution = {}x{}, fov_x = {}, near = {}, far = {}]",
                self.width, self.height,
                2.0 * self.tan_half_fov_x.atan().to_degrees(), self.near_clip, self.far_clip)
    }
}

impl Sensor for PerspectiveCamera {
    fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn sample_ray(&self, pixel: &Vector2f) -> Ray3f {
        let sx = 2.0 * pixel.x / self.width as Float - 1.0;
        let sy = 1.0 - 2.0 * pixel.y / self.height as Float;
        let d_local = Vector3f::new(-sx * self.tan_half_fov_x,
                                    sy * self.tan_half_fov_x / self.aspect,
                                    1.0);

        // Clip distances are along the optical axis, so scale by 1 / cos.
        let inv_z = 1.0 / d_local.normalize().z;
        let origin = self.to_world.apply_point(Vector3f::zeros());
        let dir = self.to_world.apply_vector(d_local);
        Ray3f::new(origin, dir, Some(self.near_clip * inv_z), Some(self.far_clip * inv_z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_looks_at_target() {
        let to_world = Transform::look_at(&Vector3f::new(0.0, 0.0, 5.0),
                                          &Vector3f::new(0.0, 0.0, 0.0),
                                          &Vector3f::new(0.0, 1.0, 0.0));
        let cam = PerspectiveCamera::new(to_world, 90.0, 4, 4, None);
        let ray = cam.sample_ray(&Vector2f::new(2.0, 2.0));
        assert!((ray.origin() - Vector3f::new(0.0, 0.0, 5.0)).norm() < 1e-5);
        assert!((ray.dir() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-5);
        assert!((ray.min_t - 1e-2).abs() < 1e-6);
    }

    #[test]
    fn test_image_orientation() {
        let to_world = Transform::look_at(&Vector3f::zeros(),
                                          &Vector3f::new(0.0, 0.0, 1.0),
                                          &Vector3f::new(0.0, 1.0, 0.0));
        let cam = PerspectiveCamera::new(to_world, 90.0, 200, 100, None);
        // The right edge of the image sits at 45 degrees, the top edge at atan(1/2).
        let right = cam.sample_ray(&Vector2f::new(200.0, 50.0)).dir();
        let top = cam.sample_ray(&Vector2f::new(100.0, 0.0)).dir();
        assert!((right.z - right.x.abs()).abs() < 1e-5);
        assert!(top.y > 0.0);
        assert!((top.y / top.z - 0.5).abs() < 1e-5);
        // Image right is world -x when looking down +z with +y up.
        assert!(right.x < 0.0);
    }
}
