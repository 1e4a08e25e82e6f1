// Copyright @yucwang 2023

use super::constants::{ Float, Vector2f, Vector3f,
                        INV_FOURPI, INV_PI, INV_TWOPI, PI };

// Directions are unit length to within this tolerance.
const UNIT_TOLERANCE: Float = 1e-4;

fn is_unit(v: &Vector3f) -> bool {
    (v.norm() - 1.0).abs() < UNIT_TOLERANCE
}

pub fn square_to_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn square_to_uniform_sphere_pdf(v: &Vector3f) -> Float {
    if is_unit(v) { INV_FOURPI } else { 0.0 }
}

pub fn square_to_uniform_hemisphere(u: &Vector2f) -> Vector3f {
    let z: Float = u.x;
    let r: Float = (1. - z * z).max(0.0).sqrt();
    let phi: Float = 2. * PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn square_to_uniform_hemisphere_pdf(v: &Vector3f) -> Float {
    if v.z >= 0.0 && is_unit(v) { INV_TWOPI } else { 0.0 }
}

pub fn square_to_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        return Vector2f::new(0.0, 0.0);
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();
    Vector2f::new(r * cos_phi, r * sin_phi)
}

pub fn square_to_uniform_disk_pdf(p: &Vector2f) -> Float {
    if p.norm_squared() <= 1.0 { INV_PI } else { 0.0 }
}

pub fn square_to_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = square_to_uniform_disk_concentric(u);
    let z = (1. - p.x * p.x - p.y * p.y).max(0.0).sqrt();

    Vector3f::new(p.x, p.y, z)
}

pub fn square_to_cosine_hemisphere_pdf(v: &Vector3f) -> Float {
    if v.z >= 0.0 { v.z * INV_PI } else { 0.0 }
}

/// Barycentric coordinates `(1 - b1 - b2, b1, b2)` of a uniform point.
pub fn square_to_triangle(u: &Vector2f) -> Vector3f {
    let su = u.x.sqrt();
    let b1 = 1.0 - su;
    let b2 = u.y * su;
    Vector3f::new(1.0 - b1 - b2, b1, b2)
}

pub fn square_to_triangle_pdf(p: &Vector2f) -> Float {
    if p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 1.0 { 2.0 } else { 0.0 }
}

/// Beckmann-distributed microfacet normal, `tan^2 = -alpha^2 ln(1 - u)`.
pub fn square_to_beckmann(u: &Vector2f, alpha: Float) -> Vector3f {
    let phi = 2.0 * PI * u.x;
    let log_sample = (1.0 - u.y).max(0.0).ln();
    let tan2_theta = -alpha * alpha * log_sample;
    let cos_theta = 1.0 / (1.0 + tan2_theta).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Density of `square_to_beckmann` over the hemisphere of normals (`D(m) cos`).
pub fn square_to_beckmann_pdf(m: &Vector3f, alpha: Float) -> Float {
    let cos_theta = m.z;
    if cos_theta <= 0.0 || !is_unit(m) {
        return 0.0;
    }
    let alpha2 = alpha * alpha;
    let cos2 = cos_theta * cos_theta;
    let tan2_theta = (1.0 - cos2) / cos2;
    (-tan2_theta / alpha2).exp() / (PI * alpha2 * cos2 * cos_theta)
}

/// Henyey-Greenstein cosine measured against the propagation direction.
pub fn square_to_henyey_greenstein_cos(u: Float, g: Float) -> Float {
    if g.abs() < 1e-3 {
        return 1.0 - 2.0 * u;
    }
    let sqr = (1.0 - g * g) / (1.0 + g - 2.0 * g * u);
    ((1.0 + g * g - sqr * sqr) / (2.0 * g)).max(-1.0).min(1.0)
}

pub fn henyey_greenstein_pdf(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g - 2.0 * g * cos_theta;
    INV_FOURPI * (1.0 - g * g) / (denom * denom.max(0.0).sqrt())
}
