// Copyright @yucwang 2026

use crate::math::constants::{Vector2f, Vector3f};
use crate::math::ray::Ray3f;

pub trait Sensor: Send + Sync {
    /// Generate a primary ray for film-plane coordinates in [0, 1)^2.
    fn sample_ray(&self, u: &Vector2f) -> Ray3f;

    /// Project a world-space point back onto the film. None when the point
    /// lies outside the frustum. Used to deposit light-path splats.
    fn project(&self, p: &Vector3f) -> Option<(usize, usize)>;

    fn position(&self) -> Vector3f;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
