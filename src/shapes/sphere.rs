// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f, INV_PI, INV_TWOPI, PI};
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_uniform_sphere;

pub struct Sphere {
    id: String,
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float, id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("Sphere")), center, radius: radius.abs() }
    }

    /// Both roots of `|o + t d - c|² = r²` that fall inside the ray segment,
    /// nearest first.
    fn intersect(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let d = ray.dir();
        let a = d.norm_squared();
        let half_b = oc.dot(&d);
        let c = oc.norm_squared() - self.radius * self.radius;

        // Computed in f64 to keep grazing hits stable.
        let disc = (half_b as f64) * (half_b as f64) - (a as f64) * (c as f64);
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let t0 = ((-(half_b as f64) - root) / a as f64) as Float;
        let t1 = ((-(half_b as f64) + root) / a as f64) as Float;

        if ray.test_segment(t0) {
            Some(t0)
        } else if ray.test_segment(t1) {
            Some(t1)
        } else {
            None
        }
    }

    fn surface_uv(n: &Vector3f) -> Vector2f {
        let mut phi = n.y.atan2(n.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let theta = n.z.max(-1.0).min(1.0).acos();
        Vector2f::new(phi * INV_TWOPI, theta * INV_PI)
    }
}

impl ComputationNode for Sphere {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Sphere[center = {:?}, radius = {}]", self.center, self.radius)
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let t = self.intersect(ray)?;
        let n = (ray.at(t) - self.center).normalize();
        // Project back onto the surface to remove the root's rounding error.
        let p = self.center + n * self.radius;
        Some(SurfaceIntersection::new(p, n, n, Self::surface_uv(&n), t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let n = square_to_uniform_sphere(u);
        let p = self.center + n * self.radius;
        let intersection = SurfaceIntersection::new(p, n, n, Self::surface_uv(&n), 0.0);
        SurfaceSampleRecord::new(intersection, 1.0 / self.surface_area())
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_and_inside_hits() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0, None);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = sphere.ray_intersection(&ray).expect("front hit");
        assert!((hit.t() - 4.0).abs() < 1e-4);
        assert!((hit.geo_normal() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-5);

        let inner = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&inner).expect("exit hit");
        assert!((hit.t() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_miss() {
        let sphere = Sphere::new(Vector3f::new(0.0, 3.0, 5.0), 1.0, None);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(!sphere.ray_intersection_t(&ray));
    }

    #[test]
    fn test_sample_on_surface() {
        let sphere = Sphere::new(Vector3f::new(1.0, 2.0, 3.0), 2.0, None);
        let rec = sphere.sample(&Vector2f::new(0.3, 0.7));
        let p = rec.intersection().p();
        assert!(((p - Vector3f::new(1.0, 2.0, 3.0)).norm() - 2.0).abs() < 1e-5);
        assert!((rec.pdf() * sphere.surface_area() - 1.0).abs() < 1e-5);
    }
}
