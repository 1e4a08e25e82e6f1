// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f, PI};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::square_to_beckmann_pdf;

/// Beckmann normal distribution `D(m)` in the local shading frame.
pub fn beckmann_d(m: &Vector3f, alpha: Float) -> Float {
    let cos_theta = m.z;
    if cos_theta <= 0.0 {
        return 0.0;
    }
    let alpha2 = alpha * alpha;
    let cos2 = cos_theta * cos_theta;
    let tan2 = (1.0 - cos2).max(0.0) / cos2;
    (-tan2 / alpha2).exp() / (PI * alpha2 * cos2 * cos2)
}

/// Smith shadowing for one direction, with the rational approximation of
/// the Beckmann integral.
pub fn beckmann_g1(v: &Vector3f, m: &Vector3f, alpha: Float) -> Float {
    if v.z.abs() <= 0.0 || v.dot(m) / v.z <= 0.0 {
        return 0.0;
    }
    let tan2 = Frame::tan_theta2(v);
    if tan2 <= 0.0 {
        return 1.0;
    }
    let b = 1.0 / (alpha * tan2.sqrt());
    if b >= 1.6 {
        return 1.0;
    }
    let b2 = b * b;
    (3.535 * b + 2.181 * b2) / (1.0 + 2.276 * b + 2.577 * b2)
}

/// Density of sampled normals, `D(m) cos(theta_m)`.
pub fn beckmann_pdf(m: &Vector3f, alpha: Float) -> Float {
    square_to_beckmann_pdf(m, alpha)
}

pub fn reflect(wi: &Vector3f, m: &Vector3f) -> Vector3f {
    2.0 * wi.dot(m) * m - wi
}

/// Refracts `wi` through the microfacet `m`; `eta` is `eta_i / eta_t`.
pub fn refract(wi: &Vector3f, m: &Vector3f, eta: Float) -> Option<Vector3f> {
    let cos_i = wi.dot(m).max(-1.0).min(1.0);
    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let wt = -eta * wi + (eta * cos_i - cos_t * cos_i.signum()) * m;
    Some(wt.normalize())
}

/// Unpolarized Fresnel reflectance; `cos_i < 0` means the ray arrives from
/// the interior side.
pub fn fresnel_dielectric(cos_i: Float, eta_ext: Float, eta_int: Float) -> Float {
    let mut cos_i = cos_i.max(-1.0).min(1.0);
    let (eta_i, eta_t) = if cos_i > 0.0 { (eta_ext, eta_int) } else { (eta_int, eta_ext) };
    cos_i = cos_i.abs();

    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let eta = eta_i / eta_t;
    let sin2_t = eta * eta * sin2_i;
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let r_parl = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_perp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    0.5 * (r_parl * r_parl + r_perp * r_perp)
}

pub fn fresnel_schlick(f0: RGBSpectrum, cos_theta: Float) -> RGBSpectrum {
    let cos_theta = cos_theta.max(0.0).min(1.0);
    let one_minus = (1.0 - cos_theta).powi(5);
    f0 + (RGBSpectrum::splat(1.0) - f0) * one_minus
}
