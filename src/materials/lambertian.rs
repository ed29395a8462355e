// Copyright @yucwang 2023

use crate::core::interaction::SurfaceIntersection;
use crate::core::material::{Material, ScatterRecord};
use crate::core::tangent_frame::{build_tangent_frame, local_to_world};
use crate::math::constants::{ INV_PI, SHADOW_EPSILON, Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

pub struct LambertianMaterial {
    albedo: RGBSpectrum,
}

impl LambertianMaterial {
    pub fn new(albedo: RGBSpectrum) -> Self {
        Self { albedo }
    }

    fn oriented_normal(hit: &SurfaceIntersection, wo: &Vector3f) -> Vector3f {
        let n = hit.sh_normal();
        if n.dot(wo) < 0.0 { -n } else { n }
    }
}

impl Material for LambertianMaterial {
    fn scatter(&self, ray: &Ray3f, hit: &SurfaceIntersection,
               u1: &Vector2f, _u2: &Vector2f) -> Option<ScatterRecord> {
        let wo = -ray.dir();
        let n = Self::oriented_normal(hit, &wo);

        let local = sample_cosine_hemisphere(u1);
        let pdf = sample_cosine_hemisphere_pdf(local.z);
        if pdf <= 0.0 {
            return None;
        }

        let (tangent, bitangent) = build_tangent_frame(&n);
        let wi = local_to_world(&local, &tangent, &bitangent, &n);
        let origin = hit.p() + n * SHADOW_EPSILON;

        Some(ScatterRecord {
            ray: Ray3f::new(origin, wi, None, None),
            attenuation: self.albedo * INV_PI,
            pdf,
            specular: false,
        })
    }

    fn eval(&self, hit: &SurfaceIntersection, wo: &Vector3f, wi: &Vector3f) -> RGBSpectrum {
        let n = Self::oriented_normal(hit, wo);
        if n.dot(wi) <= 0.0 {
            return RGBSpectrum::default();
        }
        self.albedo * INV_PI
    }

    fn pdf(&self, hit: &SurfaceIntersection, wo: &Vector3f, wi: &Vector3f) -> Float {
        let n = Self::oriented_normal(hit, wo);
        let cos_theta = n.dot(wi);
        if cos_theta <= 0.0 {
            return 0.0;
        }
        sample_cosine_hemisphere_pdf(cos_theta)
    }
}

/* Tests for LambertianMaterial */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    fn test_hit() -> SurfaceIntersection {
        SurfaceIntersection::new(
            Vector3f::zeros(),
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            1.0, true)
    }

    #[test]
    fn test_lambertian_scatter_upper_hemisphere() {
        let material = LambertianMaterial::new(RGBSpectrum::splat(0.7));
        let hit = test_hit();
        let ray = Ray3f::new(Vector3f::new(0.0, 1.0, 1.0),
                             Vector3f::new(0.0, -1.0, -1.0), None, None);
        let mut rng = LcgRng::new(2);

        for _ in 0..64 {
            let record = match material.scatter(&ray, &hit, &rng.next_2d(), &rng.next_2d()) {
                Some(r) => r,
                None => continue,
            };
            assert!(record.ray.dir().y > 0.0);
            assert!(!record.specular);

            // sampling pdf matches the queried pdf
            let wo = -ray.dir();
            let pdf = material.pdf(&hit, &wo, &record.ray.dir());
            assert!((pdf - record.pdf).abs() < 1e-4);
        }
    }

    #[test]
    fn test_lambertian_eval_zero_below_surface() {
        let material = LambertianMaterial::new(RGBSpectrum::splat(0.7));
        let hit = test_hit();
        let wo = Vector3f::new(0.0, 1.0, 0.0);
        let wi = Vector3f::new(0.0, -1.0, 0.0);
        assert!(material.eval(&hit, &wo, &wi).is_black());
        assert_eq!(material.pdf(&hit, &wo, &wi), 0.0);
    }
}
