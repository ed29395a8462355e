// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::bounds::BoundingSphere;
use crate::math::constants::{PI, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
    area: Float,
    inv_area: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        let area = 4.0 * PI * radius * radius;
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        Self { center, radius, area, inv_area }
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn contains(&self, p: &Vector3f) -> bool {
        (p - self.center).norm_squared() <= self.radius * self.radius
    }

    fn hit_t(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let b = oc.dot(&ray.dir());
        let c = oc.norm_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }

        let sqrt_disc = disc.sqrt();
        let t0 = -b - sqrt_disc;
        if ray.test_segment(t0) {
            return Some(t0);
        }
        let t1 = -b + sqrt_disc;
        if ray.test_segment(t1) {
            return Some(t1);
        }
        None
    }
}

impl Shape for Sphere {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let t = self.hit_t(ray)?;
        let p = ray.at(t);
        let normal = (p - self.center) / self.radius;
        let front_face = ray.dir().dot(&normal) < 0.0;
        Some(SurfaceIntersection::new(p, normal, normal, t, front_face))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_t(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let normal = sample_uniform_sphere(u);
        let p = self.center + normal * self.radius;
        SurfaceSampleRecord::new(p, normal, self.inv_area)
    }

    fn surface_area(&self) -> Float {
        self.area
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.radius)
    }
}

/* Tests for Sphere */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_intersection() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = sphere.ray_intersection(&ray).unwrap();
        assert!((hit.t() - 4.0).abs() < 1e-5);
        assert!(hit.front_face());
        assert!((hit.geo_normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_sphere_inside_hit_is_back_face() {
        let sphere = Sphere::new(Vector3f::zeros(), 2.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&ray).unwrap();
        assert!((hit.t() - 2.0).abs() < 1e-5);
        assert!(!hit.front_face());
    }

    #[test]
    fn test_sphere_sample_on_surface() {
        let sphere = Sphere::new(Vector3f::new(3.0, 0.0, 0.0), 0.5);
        let record = sphere.sample(&Vector2f::new(0.3, 0.8));
        assert!(((record.p() - sphere.center()).norm() - 0.5).abs() < 1e-5);
        assert!((record.pdf_area() - 1.0 / sphere.surface_area()).abs() < 1e-7);
    }
}
