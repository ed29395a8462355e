// Copyright @yucwang 2023

use super::constants::{ INV_PI, PI, TWO_PI, Float, Vector2f, Vector3f };

pub fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    return Vector2f::new(r * cos_phi, r * sin_phi)
}

pub fn sample_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = sample_uniform_disk_concentric(&u);
    let z = (1. - p.x * p.x - p.y * p.y).max(0.0).sqrt();

    return Vector3f::new(p.x, p.y, z)
}

pub fn sample_cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    return cos_theta * INV_PI
}

pub fn sample_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z: Float = 1.0 - 2.0 * u.x;
    let r: Float = (1.0 - z * z).max(0.0).sqrt();
    let phi: Float = TWO_PI * u.y;

    return Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_sphere_pdf() -> Float {
    return 0.25 * INV_PI
}

// Uniform direction inside the cone around +z with half-angle
// acos(cos_theta_max).
pub fn sample_uniform_cone(u: &Vector2f, cos_theta_max: Float) -> Vector3f {
    let cos_theta = (1.0 - u.x) + u.x * cos_theta_max;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = TWO_PI * u.y;

    return Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

pub fn sample_uniform_cone_pdf(cos_theta_max: Float) -> Float {
    if cos_theta_max >= 1.0 {
        return 0.0;
    }

    return 1.0 / (TWO_PI * (1.0 - cos_theta_max))
}

// Power heuristic for two-strategy multiple importance sampling. `a` is the
// density of the strategy that produced the sample.
pub fn power_heuristic(a: Float, b: Float) -> Float {
    let a2 = a * a;
    let b2 = b * b;
    if a2 + b2 <= 0.0 {
        return 0.0;
    }

    return a2 / (a2 + b2)
}

/* Tests for sampling warps */
