// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::math::bounds::BoundingSphere;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Disc,
    Sphere,
    Quad,
    InfiniteUniform,
    InfiniteGradient,
    PointSpot,
    DiscSpot,
}

impl LightKind {
    /// Delta lights occupy a zero-measure set of directions; BRDF sampling
    /// can never hit them, so MIS treats them as a single-strategy case.
    pub fn is_delta(self) -> bool {
        self == LightKind::PointSpot
    }

    pub fn is_infinite(self) -> bool {
        self == LightKind::InfiniteUniform || self == LightKind::InfiniteGradient
    }
}

/// One direct-lighting sample toward an emitter.
///
/// `pdf` is a solid-angle density around the shading point and must agree
/// with what `Light::pdf` returns for `direction`. A pdf of zero marks the
/// sample invalid.
pub struct LightSample {
    pub p: Vector3f,
    pub normal: Vector3f,
    /// Unit vector from the shading point toward the sampled emitter point.
    pub direction: Vector3f,
    pub distance: Float,
    pub emission: RGBSpectrum,
    pub pdf: Float,
}

impl LightSample {
    pub fn invalid() -> Self {
        Self {
            p: Vector3f::zeros(),
            normal: Vector3f::zeros(),
            direction: Vector3f::zeros(),
            distance: 0.0,
            emission: RGBSpectrum::default(),
            pdf: 0.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.pdf > 0.0
    }
}

/// A sampled emission configuration for light-path generation. Position and
/// direction densities stay separate because light selection probability
/// folds only into the area term.
pub struct EmissionSample {
    pub p: Vector3f,
    pub normal: Vector3f,
    /// Outgoing direction of the emitted ray.
    pub direction: Vector3f,
    pub emission: RGBSpectrum,
    pub pdf_area: Float,
    pub pdf_dir: Float,
}

impl EmissionSample {
    pub fn is_valid(&self) -> bool {
        self.pdf_area > 0.0 && self.pdf_dir > 0.0
    }
}

pub trait Light: Send + Sync {
    fn kind(&self) -> LightKind;

    /// One-time preprocessing input; only the infinite variants care.
    fn set_world_bounds(&mut self, _bounds: &BoundingSphere) {}

    /// Sample a direction from the shading point toward the emitter,
    /// returning a solid-angle density consistent with `pdf`.
    fn sample(&self, p: &Vector3f, n: &Vector3f, u: &Vector2f) -> LightSample;

    /// Re-derive the solid-angle density an arbitrary direction would have
    /// received from `sample`, including the area-to-solid-angle Jacobian.
    /// Zero on miss or grazing incidence.
    fn pdf(&self, p: &Vector3f, n: &Vector3f, direction: &Vector3f) -> Float;

    /// Sample an emitted ray for light-path generation: area-uniform
    /// position, cosine-weighted (or cone-uniform) direction.
    fn sample_emission(&self, u1: &Vector2f, u2: &Vector2f) -> EmissionSample;

    /// (area, direction) densities for an emission configuration at a point
    /// on the light. Delta positions re-derive to zero.
    fn emission_pdf(&self, p: &Vector3f, n: &Vector3f, direction: &Vector3f) -> (Float, Float);

    /// Radiance emitted toward the ray origin. With a hit record, back-face
    /// hits emit nothing; without one the caller already knows the ray
    /// reaches the emitter and front/back is irrelevant.
    fn emit(&self, ray: &Ray3f, hit: Option<&SurfaceIntersection>) -> RGBSpectrum;
}
