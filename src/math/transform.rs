// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Matrix4f, Vector3f };
use super::ray::Ray3f;

use nalgebra::Vector4;
use std::ops;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl ops::Mul for Transform {
    type Output = Transform;

    /// `a * b` applies `b` first.
    fn mul(self, rhs: Transform) -> Transform {
        Transform { matrix: self.matrix * rhs.matrix,
                    inv_matrix: rhs.inv_matrix * self.inv_matrix }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix: matrix,
               inv_matrix: matrix.try_inverse().unwrap_or(Matrix4f::identity())}
    }

    pub fn translate(t: &Vector3f) -> Self {
        Self::new(Matrix4f::new_translation(t))
    }

    pub fn scale(s: &Vector3f) -> Self {
        Self::new(Matrix4f::new_nonuniform_scaling(s))
    }

    /// Rotation of `angle_deg` degrees around `axis`.
    pub fn rotate(axis: &Vector3f, angle_deg: Float) -> Self {
        let axis = nalgebra::Unit::new_normalize(*axis);
        let rot = nalgebra::Rotation3::from_axis_angle(&axis, angle_deg.to_radians());
        Self::new(rot.to_homogeneous())
    }

    /// Camera-to-world look-at frame: local +z looks at `target`, +y is `up`.
    pub fn look_at(origin: &Vector3f, target: &Vector3f, up: &Vector3f) -> Self {
        let dir = (target - origin).normalize();
        let left = up.normalize().cross(&dir).normalize();
        let new_up = dir.cross(&left);
        let m = Matrix4f::new(left.x, new_up.x, dir.x, origin.x,
                              left.y, new_up.y, dir.y, origin.y,
                              left.z, new_up.z, dir.z, origin.z,
                              0.0, 0.0, 0.0, 1.0);
        Self::new(m)
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    pub fn inverse(&self) -> Transform {
        Transform { matrix: self.inv_matrix, inv_matrix: self.matrix }
    }

    fn mul_point(m: &Matrix4f, p: &Vector3f) -> Vector3f {
        let r = m * Vector4::new(p.x, p.y, p.z, 1.0);
        Vector3f::new(r.x / r.w, r.y / r.w, r.z / r.w)
    }

    fn mul_vector(m: &Matrix4f, v: &Vector3f) -> Vector3f {
        let r = m * Vector4::new(v.x, v.y, v.z, 0.0);
        Vector3f::new(r.x, r.y, r.z)
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        Self::mul_point(&self.matrix, &p)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        Self::mul_vector(&self.matrix, &v)
    }

    // Normals keep n^T x = 0 under M only when transformed with (M^{-1})^T.
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        Self::mul_vector(&self.inv_matrix.transpose(), &n)
    }

    pub fn apply_ray(&self, ray: &Ray3f) -> Ray3f {
        Ray3f::new(self.apply_point(ray.origin()), self.apply_vector(ray.dir()),
                   Some(ray.min_t), Some(ray.max_t))
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        Self::mul_point(&self.inv_matrix, &p)
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        Self::mul_vector(&self.inv_matrix, &v)
    }

    pub fn inv_apply_normal(&self, n: Vector3f) -> Vector3f {
        Self::mul_vector(&self.matrix.transpose(), &n)
    }

    /// Ray in local space. The direction is renormalized, so `t` values
    /// are not preserved; callers map hits back through `apply_point`.
    pub fn inv_apply_ray(&self, ray: &Ray3f) -> Ray3f {
        Ray3f::new(self.inv_apply_point(ray.origin()), self.inv_apply_vector(ray.dir()),
                   None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::{ Transform, Vector3f };

    #[test]
    fn test_translate_then_scale() {
        let t = Transform::translate(&Vector3f::new(1.0, 2.0, 3.0))
            * Transform::scale(&Vector3f::new(2.0, 2.0, 2.0));
        let p = t.apply_point(Vector3f::new(1.0, 1.0, 1.0));
        assert!((p - Vector3f::new(3.0, 4.0, 5.0)).norm() < 1e-5);

        let back = t.inv_apply_point(p);
        assert!((back - Vector3f::new(1.0, 1.0, 1.0)).norm() < 1e-5);

        let v = t.apply_vector(Vector3f::new(0.0, 1.0, 0.0));
        assert!((v - Vector3f::new(0.0, 2.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_look_at_maps_z_to_target() {
        let origin = Vector3f::new(0.0, 0.0, 5.0);
        let t = Transform::look_at(&origin, &Vector3f::zeros(), &Vector3f::new(0.0, 1.0, 0.0));
        let d = t.apply_vector(Vector3f::new(0.0, 0.0, 1.0));
        assert!((d - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-5);
        assert!((t.apply_point(Vector3f::zeros()) - origin).norm() < 1e-5);
    }
}
