// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::light::{EmissionSample, Light, LightKind, LightSample};
use crate::core::shape::Shape;
use crate::core::tangent_frame::{build_tangent_frame, local_to_world};
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_cosine_hemisphere, sample_cosine_hemisphere_pdf};
use crate::shapes::quad::Quad;

/// Area light over a parallelogram.
pub struct QuadLight {
    quad: Quad,
    emission: RGBSpectrum,
}

impl QuadLight {
    pub fn new(quad: Quad, emission: RGBSpectrum) -> Self {
        Self { quad, emission }
    }

    pub fn emission(&self) -> RGBSpectrum {
        self.emission
    }
}

impl Light for QuadLight {
    fn kind(&self) -> LightKind {
        LightKind::Quad
    }

    fn sample(&self, p: &Vector3f, _n: &Vector3f, u: &Vector2f) -> LightSample {
        let record = self.quad.sample(u);
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

    fn pdf(&self, p: &Vector3f, _n: &Vector3f, direction: &Vector3f) -> Float {
        let len = direction.norm();
        if len <= 0.0 {
            return 0.0;
        }
        let dir = direction / len;

        let ray = Ray3f::new(*p, dir, None, None);
        let hit = match self.quad.ray_intersection(&ray) {
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

        (distance * distance) / (self.quad.surface_area() * cos_light)
    }

    fn sample_emission(&self, u1: &Vector2f, u2: &Vector2f) -> EmissionSample {
        let record = self.quad.sample(u1);
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
        (1.0 / self.quad.surface_area().max(EPSILON), pdf_dir)
    }

    fn emit(&self, _ray: &Ray3f, hit: Option<&SurfaceIntersection>) -> RGBSpectrum {
        match hit {
            Some(h) if !h.front_face() => RGBSpectrum::default(),
            _ => self.emission,
        }
    }
}

/* Tests for QuadLight */
