// Copyright @yucwang 2023

use crate::core::computation_node::{ generate_node_id, ComputationNode };
use crate::core::shape::Shape;
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_triangle;

use std::option::Option;

const DET_EPSILON: Float = 1e-8;

pub struct Triangle {
    id: String,
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f
}

impl ComputationNode for Triangle {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Triangle[{:?}, {:?}, {:?}]", self.p0, self.p1, self.p2)
    }
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.p0, self.p1);
        bound.expand_by_point(&self.p2);

        bound
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t, b1, b2) = self.intersect(ray)?;
        let p = ray.at(t);
        let n = self.geometric_normal();
        let uv = Vector2f::new(b1, b2);
        Some(SurfaceIntersection::new(p, n, n, uv, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let bary = square_to_triangle(u);
        let p = self.p0 * bary.x + self.p1 * bary.y + self.p2 * bary.z;
        let n = self.geometric_normal();

        let interaction = SurfaceIntersection::new(p, n, n, Vector2f::new(bary.y, bary.z), 0.0);

        SurfaceSampleRecord::new(interaction, 1.0 / self.surface_area())
    }

    fn surface_area(&self) -> Float {
        0.5 * ((self.p1 - self.p0).cross(&(self.p2 - self.p0))).norm()
    }
}

impl Triangle {
    pub fn new(new_p0: Vector3f, new_p1: Vector3f, new_p2: Vector3f) -> Self {
        Triangle {
            id: generate_node_id("Triangle"),
            p0: new_p0,
            p1: new_p1,
            p2: new_p2,
        }
    }

    /// Möller–Trumbore. Returns `(t, b1, b2)`, where the hit point is
    /// `(1 - b1 - b2) p0 + b1 p1 + b2 p2`.
    pub fn intersect(&self, ray: &Ray3f) -> Option<(Float, Float, Float)> {
        let edge1 = self.p1 - self.p0;
        let edge2 = self.p2 - self.p0;
        let pvec = ray.dir().cross(&edge2);
        let det = edge1.dot(&pvec);
        if det.abs() < DET_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - self.p0;
        let b1 = tvec.dot(&pvec) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }

        let qvec = tvec.cross(&edge1);
        let b2 = ray.dir().dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = edge2.dot(&qvec) * inv_det;
        if ray.test_segment(t) {
            Some((t, b1, b2))
        } else {
            None
        }
    }

    pub fn geometric_normal(&self) -> Vector3f {
        let edge0 = self.p1 - self.p0;
        let edge1 = self.p2 - self.p0;
        edge0.cross(&edge1).normalize()
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p0, self.p1, self.p2)
    }
}
