// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::bounds::BoundingSphere;
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

/// Parallelogram spanned by `edge_u` and `edge_v` from `origin`.
pub struct Quad {
    origin: Vector3f,
    edge_u: Vector3f,
    edge_v: Vector3f,
    normal: Vector3f,
    area: Float,
    inv_area: Float,
}

impl Quad {
    pub fn new(origin: Vector3f, edge_u: Vector3f, edge_v: Vector3f) -> Self {
        let cross = edge_u.cross(&edge_v);
        let area = cross.norm();
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        let normal = if area > 0.0 {
            cross / area
        } else {
            Vector3f::new(0.0, 0.0, 1.0)
        };
        Self { origin, edge_u, edge_v, normal, area, inv_area }
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    fn plane_hit(&self, ray: &Ray3f) -> Option<(Vector3f, Float)> {
        let denom = ray.dir().dot(&self.normal);
        if denom.abs() < EPSILON {
            return None;
        }

        let t = (self.origin - ray.origin()).dot(&self.normal) / denom;
        if !ray.test_segment(t) {
            return None;
        }

        let p = ray.at(t);
        let offset = p - self.origin;

        // project onto the (possibly non-orthogonal) edge basis
        let uu = self.edge_u.dot(&self.edge_u);
        let uv = self.edge_u.dot(&self.edge_v);
        let vv = self.edge_v.dot(&self.edge_v);
        let ou = offset.dot(&self.edge_u);
        let ov = offset.dot(&self.edge_v);
        let det = uu * vv - uv * uv;
        if det.abs() < 1e-12 {
            return None;
        }

        let a = (ou * vv - ov * uv) / det;
        let b = (ov * uu - ou * uv) / det;
        if a < 0.0 || a > 1.0 || b < 0.0 || b > 1.0 {
            return None;
        }
        Some((p, t))
    }
}

impl Shape for Quad {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (p, t) = self.plane_hit(ray)?;
        let front_face = ray.dir().dot(&self.normal) < 0.0;
        Some(SurfaceIntersection::new(p, self.normal, self.normal, t, front_face))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.plane_hit(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let p = self.origin + self.edge_u * u.x + self.edge_v * u.y;
        SurfaceSampleRecord::new(p, self.normal, self.inv_area)
    }

    fn surface_area(&self) -> Float {
        self.area
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        let center = self.origin + (self.edge_u + self.edge_v) * 0.5;
        let radius = (self.edge_u + self.edge_v).norm().max((self.edge_u - self.edge_v).norm()) * 0.5;
        BoundingSphere::new(center, radius)
    }
}

/* Tests for Quad */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_intersection() {
        let quad = Quad::new(Vector3f::new(-1.0, 0.0, -1.0),
                             Vector3f::new(2.0, 0.0, 0.0),
                             Vector3f::new(0.0, 0.0, 2.0));
        assert!((quad.surface_area() - 4.0).abs() < 1e-5);

        let ray = Ray3f::new(Vector3f::new(0.5, 3.0, 0.5),
                             Vector3f::new(0.0, -1.0, 0.0), None, None);
        let hit = quad.ray_intersection(&ray).unwrap();
        assert!((hit.t() - 3.0).abs() < 1e-5);

        let miss = Ray3f::new(Vector3f::new(1.5, 3.0, 0.0),
                              Vector3f::new(0.0, -1.0, 0.0), None, None);
        assert!(!quad.ray_intersection_t(&miss));
    }

    #[test]
    fn test_quad_sample_inside() {
        let quad = Quad::new(Vector3f::new(0.0, 5.0, 0.0),
                             Vector3f::new(1.0, 0.0, 0.0),
                             Vector3f::new(0.0, 0.0, 3.0));
        let record = quad.sample(&Vector2f::new(0.25, 0.75));
        assert_eq!(record.p(), Vector3f::new(0.25, 5.0, 2.25));
        assert!((record.pdf_area() - 1.0 / 3.0).abs() < 1e-6);
    }
}
