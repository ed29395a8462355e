// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::light::{EmissionSample, Light, LightKind, LightSample};
use crate::core::tangent_frame::{build_tangent_frame, local_to_world};
use crate::math::bounds::BoundingSphere;
use crate::math::constants::{EPSILON, PI, Float, Vector2f, Vector3f, FLOAT_MAX};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{
    sample_cosine_hemisphere, sample_cosine_hemisphere_pdf,
    sample_uniform_disk_concentric, sample_uniform_sphere, sample_uniform_sphere_pdf,
};

/// Procedural environment light, either a constant dome or a
/// horizon-to-zenith gradient. Needs the world bounding sphere before
/// emission sampling is meaningful.
pub struct InfiniteLight {
    kind: LightKind,
    horizon: RGBSpectrum,
    zenith: RGBSpectrum,
    bounds: BoundingSphere,
}

impl InfiniteLight {
    pub fn uniform(radiance: RGBSpectrum) -> Self {
        Self {
            kind: LightKind::InfiniteUniform,
            horizon: radiance,
            zenith: radiance,
            bounds: BoundingSphere::default(),
        }
    }

    pub fn gradient(horizon: RGBSpectrum, zenith: RGBSpectrum) -> Self {
        Self {
            kind: LightKind::InfiniteGradient,
            horizon,
            zenith,
            bounds: BoundingSphere::default(),
        }
    }

    fn radiance(&self, direction: &Vector3f) -> RGBSpectrum {
        match self.kind {
            LightKind::InfiniteUniform => self.horizon,
            _ => {
                let len = direction.norm();
                if len <= 0.0 {
                    return RGBSpectrum::default();
                }
                let t = 0.5 * (direction.y / len + 1.0);
                self.horizon * (1.0 - t) + self.zenith * t
            }
        }
    }
}

impl Light for InfiniteLight {
    fn kind(&self) -> LightKind {
        self.kind
    }

    fn set_world_bounds(&mut self, bounds: &BoundingSphere) {
        self.bounds = *bounds;
    }

    fn sample(&self, p: &Vector3f, n: &Vector3f, u: &Vector2f) -> LightSample {
        let local = sample_cosine_hemisphere(u);
        let pdf = sample_cosine_hemisphere_pdf(local.z);
        if pdf < EPSILON {
            return LightSample::invalid();
        }

        let (tangent, bitangent) = build_tangent_frame(n);
        let direction = local_to_world(&local, &tangent, &bitangent, n);

        LightSample {
            p: p + direction * (2.0 * self.bounds.radius),
            normal: -direction,
            direction,
            distance: FLOAT_MAX,
            emission: self.radiance(&direction),
            pdf,
        }
    }

    fn pdf(&self, _p: &Vector3f, n: &Vector3f, direction: &Vector3f) -> Float {
        let len = direction.norm();
        if len <= 0.0 {
            return 0.0;
        }
        let cos_theta = n.dot(direction) / len;
        if cos_theta < EPSILON {
            return 0.0;
        }
        sample_cosine_hemisphere_pdf(cos_theta)
    }

    fn sample_emission(&self, u1: &Vector2f, u2: &Vector2f) -> EmissionSample {
        // a ray parallel to the sampled direction, shot from a virtual disc
        // spanning the bounding sphere
        let direction = sample_uniform_sphere(u1);
        let (tangent, bitangent) = build_tangent_frame(&direction);
        let disk = sample_uniform_disk_concentric(u2) * self.bounds.radius;
        let p = self.bounds.center
            + tangent * disk.x + bitangent * disk.y
            - direction * self.bounds.radius;

        let r = self.bounds.radius;
        EmissionSample {
            p,
            normal: direction,
            direction,
            emission: self.radiance(&-direction),
            pdf_area: 1.0 / (PI * r * r),
            pdf_dir: sample_uniform_sphere_pdf(),
        }
    }

    fn emission_pdf(&self, _p: &Vector3f, _n: &Vector3f, _direction: &Vector3f) -> (Float, Float) {
        let r = self.bounds.radius;
        (1.0 / (PI * r * r), sample_uniform_sphere_pdf())
    }

    fn emit(&self, ray: &Ray3f, _hit: Option<&SurfaceIntersection>) -> RGBSpectrum {
        self.radiance(&ray.dir())
    }
}

/* Tests for InfiniteLight */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::math::constants::INV_PI;
    use crate::math::spectrum::Spectrum;

    #[test]
    fn test_infinite_sample_matches_pdf() {
        let light = InfiniteLight::uniform(RGBSpectrum::splat(0.6));
        let p = Vector3f::new(1.0, 2.0, 3.0);
        let n = Vector3f::new(0.0, 1.0, 0.0).normalize();
        let mut rng = LcgRng::new(31);

        for _ in 0..128 {
            let sample = light.sample(&p, &n, &rng.next_2d());
            if !sample.is_valid() {
                continue;
            }
            let pdf = light.pdf(&p, &n, &sample.direction);
            assert!((pdf - sample.pdf).abs() < 1e-4,
                    "sample pdf {} vs re-derived {}", sample.pdf, pdf);
            let cos_theta = n.dot(&sample.direction);
            assert!((sample.pdf - cos_theta * INV_PI).abs() < 1e-4);
        }
    }

    #[test]
    fn test_infinite_emission_rays_enter_bounds() {
        let mut light = InfiniteLight::uniform(RGBSpectrum::splat(1.0));
        let bounds = BoundingSphere::new(Vector3f::new(1.0, 0.0, 0.0), 3.0);
        light.set_world_bounds(&bounds);
        let mut rng = LcgRng::new(77);

        for _ in 0..128 {
            let sample = light.sample_emission(&rng.next_2d(), &rng.next_2d());
            assert!(sample.is_valid());
            // launch point sits on the far side of the bounding sphere and
            // the ray re-enters it
            let to_center = bounds.center - sample.p;
            assert!(to_center.dot(&sample.direction) > 0.0);
            assert!(to_center.norm() <= 2.0 * bounds.radius + 1e-4);

            let (pdf_area, pdf_dir) = light.emission_pdf(
                &sample.p, &sample.normal, &sample.direction);
            assert!((pdf_area - sample.pdf_area).abs() < 1e-6);
            assert!((pdf_dir - sample.pdf_dir).abs() < 1e-6);
        }
    }

    #[test]
    fn test_gradient_blends_colors() {
        let light = InfiniteLight::gradient(RGBSpectrum::new(1.0, 0.0, 0.0),
                                            RGBSpectrum::new(0.0, 0.0, 1.0));
        let up = light.radiance(&Vector3f::new(0.0, 1.0, 0.0));
        assert!((up[2] - 1.0).abs() < 1e-5 && up[0].abs() < 1e-5);

        let horizon = light.radiance(&Vector3f::new(1.0, 0.0, 0.0));
        assert!((horizon[0] - 0.5).abs() < 1e-5);
        assert!(horizon.value() > 0.0);
    }
}
