// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::material::{Material, ScatterRecord};
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Surface material of emissive geometry: scatters nothing, radiates from
/// the front face. Pair it with the matching light variant so BRDF-sampled
/// paths see the same radiance the light sampler reports.
pub struct DiffuseLightMaterial {
    emission: RGBSpectrum,
}

impl DiffuseLightMaterial {
    pub fn new(emission: RGBSpectrum) -> Self {
        Self { emission }
    }
}

impl Material for DiffuseLightMaterial {
    fn scatter(&self, _ray: &Ray3f, _hit: &SurfaceIntersection,
               _u1: &Vector2f, _u2: &Vector2f) -> Option<ScatterRecord> {
        None
    }

    fn eval(&self, _hit: &SurfaceIntersection, _wo: &Vector3f, _wi: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn pdf(&self, _hit: &SurfaceIntersection, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }

    fn emit(&self, _ray: &Ray3f, hit: Option<&SurfaceIntersection>) -> RGBSpectrum {
        match hit {
            Some(h) if !h.front_face() => RGBSpectrum::default(),
            _ => self.emission,
        }
    }
}
