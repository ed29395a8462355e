// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::light::{EmissionSample, Light, LightKind, LightSample};
use crate::core::shape::Shape;
use crate::core::tangent_frame::{build_tangent_frame, local_to_world};
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{
    sample_cosine_hemisphere, sample_cosine_hemisphere_pdf,
    sample_uniform_cone, sample_uniform_cone_pdf,
};
use crate::shapes::sphere::Sphere;

/// Sphere area light. Shading points outside the sphere sample the visible
/// cap with a uniform cone; points inside fall back to uniform area
/// sampling over the whole surface.
pub struct SphereLight {
    sphere: Sphere,
    emission: RGBSpectrum,
}

impl SphereLight {
    pub fn new(sphere: Sphere, emission: RGBSpectrum) -> Self {
        Self { sphere, emission }
    }

    fn cos_theta_max(&self, dist_to_center: Float) -> Float {
        let ratio = self.sphere.radius() / dist_to_center;
        (1.0 - ratio * ratio).max(0.0).sqrt()
    }

    fn sample_inside(&self, p: &Vector3f, u: &Vector2f) -> LightSample {
        let record = self.sphere.sample(u);
        let d = record.p() - p;
        let dist_sq = d.norm_squared();
        if dist_sq < EPSILON * EPSILON {
            return LightSample::invalid();
        }

        let distance = dist_sq.sqrt();
        let direction = d / distance;
        let cos_light = record.normal().dot(&direction).abs();
        if cos_light < EPSILON {
            return LightSample::invalid();
        }

        LightSample {
            p: record.p(),
            normal: record.normal(),
            direction,
            distance,
            emission: self.emission,
            pdf: record.pdf_area() * dist_sq / cos_light,
        }
    }
}

impl Light for SphereLight {
    fn kind(&self) -> LightKind {
        LightKind::Sphere
    }

    fn sample(&self, p: &Vector3f, _n: &Vector3f, u: &Vector2f) -> LightSample {
        let to_center = self.sphere.center() - p;
        let dist_center = to_center.norm();
        if dist_center < EPSILON {
            return LightSample::invalid();
        }

        if dist_center <= self.sphere.radius() {
            return self.sample_inside(p, u);
        }

        let w = to_center / dist_center;
        let cos_theta_max = self.cos_theta_max(dist_center);
        let pdf = sample_uniform_cone_pdf(cos_theta_max);
        if pdf <= 0.0 {
            return LightSample::invalid();
        }

        let local = sample_uniform_cone(u, cos_theta_max);
        let (tangent, bitangent) = build_tangent_frame(&w);
        let direction = local_to_world(&local, &tangent, &bitangent, &w);

        // distance to the cap along the sampled direction
        let cos_theta = local.z;
        let sin_sq = (1.0 - cos_theta * cos_theta).max(0.0);
        let r = self.sphere.radius();
        let under = (r * r - dist_center * dist_center * sin_sq).max(0.0);
        let distance = dist_center * cos_theta - under.sqrt();
        if distance < EPSILON {
            return LightSample::invalid();
        }

        let point = p + direction * distance;
        let normal = (point - self.sphere.center()) / r;

        LightSample {
            p: point,
            normal,
            direction,
            distance,
            emission: self.emission,
            pdf,
        }
    }

    fn pdf(&self, p: &Vector3f, _n: &Vector3f, direction: &Vector3f) -> Float {
        let len = direction.norm();
        if len <= 0.0 {
            return 0.0;
        }
        let dir = direction / len;

        let to_center = self.sphere.center() - p;
        let dist_center = to_center.norm();
        if dist_center < EPSILON {
            return 0.0;
        }

        if dist_center <= self.sphere.radius() {
            let ray = Ray3f::new(*p, dir, None, None);
            let hit = match self.sphere.ray_intersection(&ray) {
                Some(hit) => hit,
                None => return 0.0,
            };
            let distance = hit.t();
            if distance < EPSILON {
                return 0.0;
            }
            let cos_light = hit.geo_normal().dot(&dir).abs();
            if cos_light < EPSILON {
                return 0.0;
            }
            return (distance * distance)
                / (self.sphere.surface_area() * cos_light);
        }

        let cos_theta_max = self.cos_theta_max(dist_center);
        let cos_theta = dir.dot(&(to_center / dist_center));
        if cos_theta < cos_theta_max {
            return 0.0;
        }
        sample_uniform_cone_pdf(cos_theta_max)
    }

    fn sample_emission(&self, u1: &Vector2f, u2: &Vector2f) -> EmissionSample {
        let record = self.sphere.sample(u1);
        let n = record.normal();
        let local = sample_cosine_hemisphere(u2);
        let (tangent, bitangent) = build_tangent_frame(&n);
        let direction = local_to_world(&local, &tangent, &bitangent, &n);

        EmissionSample {
            p: record.p(),
            normal: n,
            direction,
            emission: self.emission,
            pdf_area: record.pdf_area(),
            pdf_dir: sample_cosine_hemisphere_pdf(local.z),
        }
    }

    fn emission_pdf(&self, _p: &Vector3f, n: &Vector3f, direction: &Vector3f) -> (Float, Float) {
        let cos_theta = n.dot(direction);
        let pdf_dir = if cos_theta > 0.0 {
            sample_cosine_hemisphere_pdf(cos_theta)
        } else {
            0.0
        };
        (1.0 / self.sphere.surface_area().max(EPSILON), pdf_dir)
    }

    fn emit(&self, _ray: &Ray3f, hit: Option<&SurfaceIntersection>) -> RGBSpectrum {
        match hit {
            Some(h) if !h.front_face() => RGBSpectrum::default(),
            _ => self.emission,
        }
    }
}

/* Tests for SphereLight */
