// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, FLOAT_MIN, FLOAT_MAX };
use super::ray::{ Ray3f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::new(FLOAT_MAX, FLOAT_MAX, FLOAT_MAX),
               p_max: Vector3f::new(FLOAT_MIN, FLOAT_MIN, FLOAT_MIN) }
    }
}

impl AABB {
    pub fn new(a: Vector3f, b: Vector3f) -> Self {
        Self { p_min: a.inf(&b), p_max: a.sup(&b) }
    }

    pub fn center(&self) -> Vector3f {
        0.5f32 * (self.p_min + self.p_max)
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        self.p_min = self.p_min.inf(p);
        self.p_max = self.p_max.sup(p);
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        self.p_min = self.p_min.inf(&other.p_min);
        self.p_max = self.p_max.sup(&other.p_max);
    }

    pub fn contains(&self, p: &Vector3f) -> bool {
        (0..3).all(|idx| p[idx] >= self.p_min[idx] && p[idx] <= self.p_max[idx])
    }

    pub fn ray_intersect(&self, ray: &Ray3f) -> bool {
        self.ray_intersect_range(ray).is_some()
    }

    /// Slab test clipped to the ray segment; returns the overlap `[t0, t1]`.
    pub fn ray_intersect_range(&self, ray: &Ray3f) -> Option<(Float, Float)> {
        if !self.is_valid() {
            return None;
        }

        let o = ray.origin();
        let d = ray.dir();
        let mut t_min = ray.min_t;
        let mut t_max = ray.max_t;

        for idx in 0..3 {
            if d[idx].abs() < 1e-8 {
                if o[idx] < self.p_min[idx] || o[idx] > self.p_max[idx] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d[idx];
            let mut t0 = (self.p_min[idx] - o[idx]) * inv;
            let mut t1 = (self.p_max[idx] - o[idx]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }

        Some((t_min, t_max))
    }

    pub fn surface_area(&self) -> Float {
        let d = self.diagonal();
        2.0f32 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    pub fn volume(&self) -> Float {
        let d = self.diagonal();
        d.x * d.y * d.z
    }

    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn max_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    pub fn is_valid(&self) -> bool {
        (0..3).all(|idx| self.p_min[idx] <= self.p_max[idx])
    }
}

/* Test for AABB */
#[cfg(test)]
mod tests {
    use super::AABB;
    use super::Ray3f;
    use super::Vector3f;

    #[test]
    fn test_aabb_geometry() {
        let min = Vector3f::new(1.0, 7.0, 3.0);
        let max = Vector3f::new(4.0, 4.0, 4.0);
        let mut bbox: AABB = AABB::new(min, max);

        let center = bbox.center();
        assert!((center[0] - 2.5f32).abs() < 1e-6);
        assert!((center[1] - 5.5f32).abs() < 1e-6);
        assert!((center[2] - 3.5f32).abs() < 1e-6);

        assert!((bbox.surface_area() - 30.0f32).abs() < 1e-5);
        assert!((bbox.volume() - 9.0f32).abs() < 1e-5);

        bbox.expand_by_point(&Vector3f::new(-1.0, 5.0, 6.0));
        assert_eq!(bbox.p_min[0], -1.0);
        assert_eq!(bbox.p_max[2], 6.0);
        assert_eq!(bbox.max_extent(), 0);

        let mut bbox1: AABB = AABB::default();
        assert!(!bbox1.is_valid());
        bbox1.expand_by_aabb(&bbox);
        assert_eq!(bbox1, bbox);
        assert!(bbox1.contains(&Vector3f::new(0.0, 5.0, 4.0)));
    }

    #[test]
    fn test_aabb_intersect() {
        let o1 = Vector3f::new(0.0, 0.0, 0.0);
        let d1 = Vector3f::new(1.0, 1.0, 1.0);

        let bbox = AABB::new(Vector3f::new(-1.0, -1.0, -1.0),
                             Vector3f::new(1.0, 1.0, 1.0));

        let r1 = Ray3f::new(o1, d1, Some(0.0), Some(1.0));
        let r2 = Ray3f::new(o1, d1, Some(0.0), Some(10.0));
        assert_eq!(bbox.ray_intersect(&r1), true);
        assert_eq!(bbox.ray_intersect(&r2), true);

        let o2 = Vector3f::new(-1.1, 0.0, 0.0);
        let d2 = Vector3f::new(-0.1, 10.0, 10.0);
        let r3 = Ray3f::new(o2, d2, None, None);
        assert_eq!(bbox.ray_intersect(&r3), false);

        let r4 = Ray3f::new(Vector3f::new(-5.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let (t0, t1) = bbox.ray_intersect_range(&r4).unwrap();
        assert!((t0 - 4.0).abs() < 1e-5);
        assert!((t1 - 6.0).abs() < 1e-5);
    }
}
