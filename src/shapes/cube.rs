// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// The box `[-1, 1]³` placed by `to_world`. Media use it as their bounds.
pub struct Cube {
    id: String,
    to_world: Transform,
    face_areas: [Float; 6],
    area: Float,
    inv_area: Float,
}

impl Cube {
    pub fn new(to_world: Transform, id: Option<String>) -> Self {
        let dx = to_world.apply_vector(Vector3f::new(2.0, 0.0, 0.0));
        let dy = to_world.apply_vector(Vector3f::new(0.0, 2.0, 0.0));
        let dz = to_world.apply_vector(Vector3f::new(0.0, 0.0, 2.0));
        let area_xy = dx.cross(&dy).norm();
        let area_xz = dx.cross(&dz).norm();
        let area_yz = dy.cross(&dz).norm();
        let face_areas = [area_xy, area_xy, area_xz, area_xz, area_yz, area_yz];
        let area = 2.0 * (area_xy + area_xz + area_yz);
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        Self { id: id.unwrap_or_else(|| generate_node_id("Cube")), to_world, face_areas, area, inv_area }
    }

    /// Axis-aligned box spanning `bbox`.
    pub fn from_aabb(bbox: &AABB, id: Option<String>) -> Self {
        let half = bbox.diagonal() * 0.5;
        let to_world = Transform::translate(&bbox.center()) * Transform::scale(&half);
        Self::new(to_world, id)
    }

    /// First boundary crossing inside the ray segment, in world-space `t`.
    /// The local direction is left unnormalized so both spaces share `t`.
    fn intersect_local(&self, ray: &Ray3f) -> Option<(Float, Vector3f, Vector3f)> {
        let o = self.to_world.inv_apply_point(ray.origin());
        let d = self.to_world.inv_apply_vector(ray.dir());

        let mut t_near = Float::NEG_INFINITY;
        let mut t_far = Float::INFINITY;
        for axis in 0..3 {
            if d[axis].abs() < 1e-8 {
                if o[axis] < -1.0 || o[axis] > 1.0 {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d[axis];
            let mut t0 = (-1.0 - o[axis]) * inv;
            let mut t1 = (1.0 - o[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_far < t_near {
                return None;
            }
        }

        let t_hit = if ray.test_segment(t_near) {
            t_near
        } else if ray.test_segment(t_far) {
            t_far
        } else {
            return None;
        };

        let p_local = o + d * t_hit;
        Some((t_hit, p_local, cube_normal(p_local)))
    }

    fn face_uv(p_local: Vector3f, n_local: Vector3f) -> Vector2f {
        let (u, v) = if n_local.z.abs() > 0.5 {
            (p_local.x, p_local.y)
        } else if n_local.y.abs() > 0.5 {
            (p_local.x, p_local.z)
        } else {
            (p_local.y, p_local.z)
        };
        Vector2f::new(0.5 * (u + 1.0), 0.5 * (v + 1.0))
    }

    fn sample_face(face: usize, u: Vector2f) -> (Vector3f, Vector3f) {
        let a = 2.0 * u.x - 1.0;
        let b = 2.0 * u.y - 1.0;
        match face {
            0 => (Vector3f::new(a, b, 1.0), Vector3f::new(0.0, 0.0, 1.0)),
            1 => (Vector3f::new(a, b, -1.0), Vector3f::new(0.0, 0.0, -1.0)),
            2 => (Vector3f::new(a, 1.0, b), Vector3f::new(0.0, 1.0, 0.0)),
            3 => (Vector3f::new(a, -1.0, b), Vector3f::new(0.0, -1.0, 0.0)),
            4 => (Vector3f::new(1.0, a, b), Vector3f::new(1.0, 0.0, 0.0)),
            _ => (Vector3f::new(-1.0, a, b), Vector3f::new(-1.0, 0.0, 0.0)),
        }
    }
}

impl ComputationNode for Cube {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Cube[area = {}]", self.area)
    }
}

impl Shape for Cube {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::default();
        for i in 0..8 {
            let corner = Vector3f::new(if i & 1 == 0 { -1.0 } else { 1.0 },
                                       if i & 2 == 0 { -1.0 } else { 1.0 },
                                       if i & 4 == 0 { -1.0 } else { 1.0 });
            bbox.expand_by_point(&self.to_world.apply_point(corner));
        }
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t, p_local, n_local) = self.intersect_local(ray)?;
        let n_world = self.to_world.apply_normal(n_local).normalize();
        let uv = Self::face_uv(p_local, n_local);
        Some(SurfaceIntersection::new(ray.at(t), n_world, n_world, uv, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_local(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        // Pick a face proportionally to its area, then reuse the remainder.
        let target = u.x * self.area;
        let mut accum = 0.0;
        let mut face = 5usize;
        for i in 0..6 {
            if target <= accum + self.face_areas[i] {
                face = i;
                break;
            }
            accum += self.face_areas[i];
        }
        let local_u = if self.face_areas[face] > 0.0 {
            ((target - accum) / self.face_areas[face]).clamp(0.0, 1.0)
        } else {
            0.5
        };

        let (p_local, n_local) = Self::sample_face(face, Vector2f::new(local_u, u.y));
        let p_world = self.to_world.apply_point(p_local);
        let n_world = self.to_world.apply_normal(n_local).normalize();
        let uv = Self::face_uv(p_local, n_local);
        let intersection = SurfaceIntersection::new(p_world, n_world, n_world, uv, 0.0);
        SurfaceSampleRecord::new(intersection, self.inv_area)
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

fn cube_normal(p: Vector3f) -> Vector3f {
    let ax = p.x.abs();
    let ay = p.y.abs();
    let az = p.z.abs();
    if ax >= ay && ax >= az {
        Vector3f::new(p.x.signum(), 0.0, 0.0)
    } else if ay >= az {
        Vector3f::new(0.0, p.y.signum(), 0.0)
    } else {
        Vector3f::new(0.0, 0.0, p.z.signum())
    }
}
