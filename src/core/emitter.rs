// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f, FLOAT_MAX};
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterFlag(u8);

impl EmitterFlag {
    pub const NONE: Self = Self(0);
    pub const SURFACE: Self = Self(1 << 0);
    pub const DELTA: Self = Self(1 << 1);
    pub const ENVIRONMENT: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for EmitterFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EmitterFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Query between a reference point and a point on an emitter.
/// `wi` is the unit direction from `reference` to `p`; `dist` is infinite
/// for environment emitters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterQueryRecord {
    pub reference: Vector3f,
    pub p: Vector3f,
    pub n: Vector3f,
    pub wi: Vector3f,
    pub dist: Float,
    pub uv: Vector2f,
}

impl EmitterQueryRecord {
    /// Record to be filled by `Emitter::sample`.
    pub fn new(reference: Vector3f) -> Self {
        Self {
            reference,
            p: Vector3f::zeros(),
            n: Vector3f::zeros(),
            wi: Vector3f::zeros(),
            dist: 0.0,
            uv: Vector2f::new(0.0, 0.0),
        }
    }

    /// Record for a point already found on an emitter surface.
    pub fn from_hit(reference: Vector3f, p: Vector3f, n: Vector3f, uv: Vector2f) -> Self {
        let delta = p - reference;
        let dist = delta.norm();
        let wi = if dist > 0.0 { delta / dist } else { Vector3f::zeros() };
        Self { reference, p, n, wi, dist, uv }
    }

    /// Record for a direction escaping to the environment.
    pub fn from_direction(reference: Vector3f, wi: Vector3f) -> Self {
        Self {
            reference,
            p: reference + wi * FLOAT_MAX.sqrt(),
            n: -wi,
            wi,
            dist: Float::INFINITY,
            uv: Vector2f::new(0.0, 0.0),
        }
    }
}

pub trait Emitter: ComputationNode + Send + Sync {
    fn flag(&self) -> EmitterFlag;

    fn set_scene_bounds(&mut self, _bounds: &AABB) {}

    /// Draws a point on the emitter as seen from `record.reference`, filling
    /// `p`, `n`, `wi`, `dist`. Returns the radiance arriving at the
    /// reference along `-wi` (unoccluded); `pdf` gives its density.
    fn sample(&self, record: &mut EmitterQueryRecord, u: &Vector2f) -> RGBSpectrum;

    /// Radiance leaving `record.p` towards `record.reference`.
    fn eval(&self, record: &EmitterQueryRecord) -> RGBSpectrum;

    /// Density of `sample` in solid angle at the reference point, or the
    /// discrete probability for delta emitters.
    fn pdf(&self, record: &EmitterQueryRecord) -> Float;

    fn is_delta(&self) -> bool {
        self.flag().contains(EmitterFlag::DELTA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_flags() {
        let mut flag = EmitterFlag::SURFACE;
        assert!(!flag.contains(EmitterFlag::DELTA));
        flag |= EmitterFlag::DELTA;
        assert!(flag.contains(EmitterFlag::DELTA));
        assert!(!EmitterFlag::NONE.contains(EmitterFlag::SURFACE));
    }

    #[test]
    fn test_query_record_from_hit() {
        let rec = EmitterQueryRecord::from_hit(Vector3f::zeros(),
                                               Vector3f::new(0.0, 3.0, 4.0),
                                               Vector3f::new(0.0, -1.0, 0.0),
                                               Vector2f::new(0.0, 0.0));
        assert!((rec.dist - 5.0).abs() < 1e-6);
        assert!((rec.wi - Vector3f::new(0.0, 0.6, 0.8)).norm() < 1e-6);
    }
}
