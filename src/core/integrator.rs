// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::constants::Vector2f;
use crate::math::spectrum::RGBSpectrum;
use crate::renderers::splat::SplatQueue;

pub trait Integrator: Send + Sync {
    /// Estimate the radiance arriving at the film-plane coordinates. Splats
    /// produced along the way (contributions landing on other pixels) go
    /// into the queue instead of the return value.
    fn trace(&self, scene: &Scene, sensor: &dyn Sensor, pixel: Vector2f,
             rng: &mut LcgRng, splats: &SplatQueue) -> RGBSpectrum;

    /// Independent instance for a worker thread.
    fn box_clone(&self) -> Box<dyn Integrator>;
}
