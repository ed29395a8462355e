// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub struct ScatterRecord {
    pub ray: Ray3f,
    pub attenuation: RGBSpectrum,
    pub pdf: Float,
    pub specular: bool,
}

pub trait Material: Send + Sync {
    /// Sample an outgoing ray at the hit point. None means the material does
    /// not scatter (pure emitter or absorber).
    fn scatter(&self, ray: &Ray3f, hit: &SurfaceIntersection,
               u1: &Vector2f, u2: &Vector2f) -> Option<ScatterRecord>;

    /// BRDF value for an arbitrary pair of directions at the hit point.
    /// `wo` points away from the surface toward the viewer, `wi` toward the
    /// sampled light.
    fn eval(&self, hit: &SurfaceIntersection, wo: &Vector3f, wi: &Vector3f) -> RGBSpectrum;

    /// Density the sampling strategy of `scatter` assigns to `wi`. Zero for
    /// specular (delta) materials.
    fn pdf(&self, hit: &SurfaceIntersection, wo: &Vector3f, wi: &Vector3f) -> Float;

    fn emit(&self, _ray: &Ray3f, _hit: Option<&SurfaceIntersection>) -> RGBSpectrum {
        RGBSpectrum::default()
    }
}
