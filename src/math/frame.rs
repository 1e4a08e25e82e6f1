// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector3f };

/// Orthonormal shading basis. Local coordinates use `z` as the normal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub s: Vector3f,
    pub t: Vector3f,
    pub n: Vector3f
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            s: Vector3f::new(1.0, 0.0, 0.0),
            t: Vector3f::new(0.0, 1.0, 0.0),
            n: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl Frame {
    pub fn new(s: Vector3f, t: Vector3f, n: Vector3f) -> Frame {
        Frame { s, t, n }
    }

    /// Builds a frame around a unit normal (Duff et al. branchless basis).
    pub fn from_normal(n: Vector3f) -> Frame {
        let sign: Float = if n.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;
        let s = Vector3f::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let t = Vector3f::new(b, sign + n.y * n.y * a, -n.y);
        Frame { s, t, n }
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        v.x * self.s + v.y * self.t + v.z * self.n
    }

    pub fn cos_theta(v: &Vector3f) -> Float {
        v.z
    }

    pub fn cos_theta2(v: &Vector3f) -> Float {
        v.z * v.z
    }

    pub fn sin_theta2(v: &Vector3f) -> Float {
        (1.0 - v.z * v.z).max(0.0)
    }

    pub fn tan_theta2(v: &Vector3f) -> Float {
        let c2 = Self::cos_theta2(v);
        if c2 <= 0.0 { return 0.0; }
        Self::sin_theta2(v) / c2
    }
}
