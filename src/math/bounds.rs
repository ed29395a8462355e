// Copyright @yucwang 2026

use super::constants::{Float, Vector3f};

/// World bounding sphere handed to infinite emitters at scene setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vector3f,
    pub radius: Float,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self { center: Vector3f::zeros(), radius: 1.0 }
    }
}

impl BoundingSphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius: radius.max(1e-6) }
    }

    pub fn contains(&self, p: &Vector3f) -> bool {
        (p - self.center).norm_squared() <= self.radius * self.radius
    }

    pub fn expand_by_sphere(&mut self, other: &BoundingSphere) {
        let d = (other.center - self.center).norm();
        if d + other.radius <= self.radius {
            return;
        }
        if d + self.radius <= other.radius {
            *self = *other;
            return;
        }

        let radius = 0.5 * (d + self.radius + other.radius);
        let center = if d > 0.0 {
            self.center + (other.center - self.center) * ((radius - self.radius) / d)
        } else {
            self.center
        };
        self.center = center;
        self.radius = radius;
    }
}

/* Tests for BoundingSphere */
