// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::core::tangent_frame::build_tangent_frame;
use crate::math::bounds::BoundingSphere;
use crate::math::constants::{EPSILON, PI, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_disk_concentric;

pub struct Disc {
    center: Vector3f,
    normal: Vector3f,
    radius: Float,
    tangent: Vector3f,
    bitangent: Vector3f,
    area: Float,
    inv_area: Float,
}

impl Disc {
    pub fn new(center: Vector3f, normal: Vector3f, radius: Float) -> Self {
        let normal = normal.normalize();
        let (tangent, bitangent) = build_tangent_frame(&normal);
        let area = PI * radius * radius;
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        Self { center, normal, radius, tangent, bitangent, area, inv_area }
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    fn plane_hit(&self, ray: &Ray3f) -> Option<(Vector3f, Float)> {
        let denom = ray.dir().dot(&self.normal);
        if denom.abs() < EPSILON {
            return None;
        }

        let t = (self.center - ray.origin()).dot(&self.normal) / denom;
        if !ray.test_segment(t) {
            return None;
        }

        let p = ray.at(t);
        if (p - self.center).norm_squared() > self.radius * self.radius {
            return None;
        }
        Some((p, t))
    }
}

impl Shape for Disc {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (p, t) = self.plane_hit(ray)?;
        let front_face = ray.dir().dot(&self.normal) < 0.0;
        Some(SurfaceIntersection::new(p, self.normal, self.normal, t, front_face))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.plane_hit(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let disk = sample_uniform_disk_concentric(u) * self.radius;
        let p = self.center + self.tangent * disk.x + self.bitangent * disk.y;
        SurfaceSampleRecord::new(p, self.normal, self.inv_area)
    }

    fn surface_area(&self) -> Float {
        self.area
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.radius)
    }
}

/* Tests for Disc */
