// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::light::{EmissionSample, Light, LightKind, LightSample};
use crate::core::shape::Shape;
use crate::core::tangent_frame::{build_tangent_frame, local_to_world};
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_uniform_cone, sample_uniform_cone_pdf};
use crate::shapes::disc::Disc;

/// Quartic smoothstep between the inner (full intensity) and outer
/// (extinction) cone.
fn spot_falloff(cos_theta: Float, cos_inner: Float, cos_outer: Float) -> Float {
    if cos_theta >= cos_inner {
        return 1.0;
    }
    if cos_theta <= cos_outer {
        return 0.0;
    }
    let delta = (cos_theta - cos_outer) / (cos_inner - cos_outer);
    (delta * delta) * (delta * delta)
}

/// Delta spot light: a point with a directional falloff cone.
pub struct PointSpotLight {
    position: Vector3f,
    axis: Vector3f,
    intensity: RGBSpectrum,
    cos_inner: Float,
    cos_outer: Float,
}

impl PointSpotLight {
    pub fn new(position: Vector3f, axis: Vector3f, intensity: RGBSpectrum,
               inner_angle: Float, outer_angle: Float) -> Self {
        let outer_angle = outer_angle.max(inner_angle);
        Self {
            position,
            axis: axis.normalize(),
            intensity,
            cos_inner: inner_angle.cos(),
            cos_outer: outer_angle.cos(),
        }
    }
}

impl Light for PointSpotLight {
    fn kind(&self) -> LightKind {
        LightKind::PointSpot
    }

    fn sample(&self, p: &Vector3f, _n: &Vector3f, _u: &Vector2f) -> LightSample {
        let d = self.position - p;
        let dist_sq = d.norm_squared();
        if dist_sq < EPSILON * EPSILON {
            return LightSample::invalid();
        }

        let distance = dist_sq.sqrt();
        let direction = d / distance;
        let falloff = spot_falloff(self.axis.dot(&-direction),
                                   self.cos_inner, self.cos_outer);

        LightSample {
            p: self.position,
            normal: self.axis,
            direction,
            distance,
            emission: self.intensity * (falloff / dist_sq),
            pdf: 1.0,
        }
    }

    fn pdf(&self, _p: &Vector3f, _n: &Vector3f, _direction: &Vector3f) -> Float {
        // a scattered ray never hits a point
        0.0
    }

    fn sample_emission(&self, u1: &Vector2f, _u2: &Vector2f) -> EmissionSample {
        let local = sample_uniform_cone(u1, self.cos_outer);
        let (tangent, bitangent) = build_tangent_frame(&self.axis);
        let direction = local_to_world(&local, &tangent, &bitangent, &self.axis);
        let falloff = spot_falloff(local.z, self.cos_inner, self.cos_outer);

        EmissionSample {
            p: self.position,
            normal: self.axis,
            direction,
            emission: self.intensity * falloff,
            pdf_area: 1.0,
            pdf_dir: sample_uniform_cone_pdf(self.cos_outer),
        }
    }

    fn emission_pdf(&self, _p: &Vector3f, _n: &Vector3f, direction: &Vector3f) -> (Float, Float) {
        // the position is a delta distribution and cannot be re-derived
        let len = direction.norm();
        if len <= 0.0 {
            return (0.0, 0.0);
        }
        let cos_theta = self.axis.dot(direction) / len;
        if cos_theta < self.cos_outer {
            return (0.0, 0.0);
        }
        (0.0, sample_uniform_cone_pdf(self.cos_outer))
    }

    fn emit(&self, _ray: &Ray3f, hit: Option<&SurfaceIntersection>) -> RGBSpectrum {
        match hit {
            Some(_) => RGBSpectrum::default(),
            None => self.intensity,
        }
    }
}

/// Spot light over a disc emitter. The falloff is evaluated per sampled
/// point so broad emitters do not band at the cone boundary.
pub struct DiscSpotLight {
    disc: Disc,
    emission: RGBSpectrum,
    cos_inner: Float,
    cos_outer: Float,
}

impl DiscSpotLight {
    pub fn new(disc: Disc, emission: RGBSpectrum,
               inner_angle: Float, outer_angle: Float) -> Self {
        let outer_angle = outer_angle.max(inner_angle);
        Self {
            disc,
            emission,
            cos_inner: inner_angle.cos(),
            cos_outer: outer_angle.cos(),
        }
    }

    fn falloff_toward(&self, from: &Vector3f, to: &Vector3f) -> Float {
        let d = to - from;
        let len = d.norm();
        if len <= 0.0 {
            return 0.0;
        }
        spot_falloff(self.disc.normal().dot(&(d / len)),
                     self.cos_inner, self.cos_outer)
    }
}

impl Light for DiscSpotLight {
    fn kind(&self) -> LightKind {
        LightKind::DiscSpot
    }

    fn sample(&self, p: &Vector3f, _n: &Vector3f, u: &Vector2f) -> LightSample {
        let record = self.disc.sample(u);
        let d = record.p() - p;
        let dist_sq = d.norm_squared();
        if dist_sq < EPSILON * EPSILON {
            return LightSample::invalid();
        }

        let distance = dist_sq.sqrt();
        let direction = d / distance;
        let cos_light = record.normal().dot(&direction).abs();
        if cos_light < EPSILON {
            return LightSample::invalid();
        }

        // falloff from the actual emission point, not the disc center
        let falloff = self.falloff_toward(&record.p(), p);

        LightSample {
            p: record.p(),
            normal: record.normal(),
            direction,
            distance,
            emission: self.emission * falloff,
            pdf: record.pdf_area() * dist_sq / cos_light,
        }
    }

    fn pdf(&self, p: &Vector3f, _n: &Vector3f, direction: &Vector3f) -> Float {
        let len = direction.norm();
        if len <= 0.0 {
            return 0.0;
        }
        let dir = direction / len;

        let ray = Ray3f::new(*p, dir, None, None);
        let hit = match self.disc.ray_intersection(&ray) {
            Some(hit) => hit,
            None => return 0.0,
        };

        let distance = hit.t();
        if distance < EPSILON {
            return 0.0;
        }
        let cos_light = hit.geo_normal().dot(&dir).abs();
        if cos_light < EPSILON {
            return 0.0;
        }

        (distance * distance) / (self.disc.surface_area() * cos_light)
    }

    fn sample_emission(&self, u1: &Vector2f, u2: &Vector2f) -> EmissionSample {
        let record = self.disc.sample(u1);
        let n = record.normal();
        let local = sample_uniform_cone(u2, self.cos_outer);
        let (tangent, bitangent) = build_tangent_frame(&n);
        let direction = local_to_world(&local, &tangent, &bitangent, &n);
        let falloff = spot_falloff(local.z, self.cos_inner, self.cos_outer);

        EmissionSample {
            p: record.p(),
            normal: n,
            direction,
            emission: self.emission * falloff,
            pdf_area: record.pdf_area(),
            pdf_dir: sample_uniform_cone_pdf(self.cos_outer),
        }
    }

    fn emission_pdf(&self, _p: &Vector3f, n: &Vector3f, direction: &Vector3f) -> (Float, Float) {
        let pdf_area = 1.0 / self.disc.surface_area().max(EPSILON);
        let len = direction.norm();
        if len <= 0.0 {
            return (pdf_area, 0.0);
        }
        let cos_theta = n.dot(direction) / len;
        if cos_theta < self.cos_outer {
            return (pdf_area, 0.0);
        }
        (pdf_area, sample_uniform_cone_pdf(self.cos_outer))
    }

    fn emit(&self, ray: &Ray3f, hit: Option<&SurfaceIntersection>) -> RGBSpectrum {
        if let Some(h) = hit {
            if !h.front_face() {
                return RGBSpectrum::default();
            }
        }
        let falloff = spot_falloff(self.disc.normal().dot(&-ray.dir()),
                                   self.cos_inner, self.cos_outer);
        self.emission * falloff
    }
}

/* Tests for spot lights */
