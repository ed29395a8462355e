// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::light::Light;
use crate::core::light_sampler::LightSampler;
use crate::core::material::Material;
use crate::core::shape::Shape;
use crate::math::bounds::BoundingSphere;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use std::sync::Arc;

pub struct SceneObject {
    pub shape: Arc<dyn Shape>,
    pub material: Arc<dyn Material>,
}

impl SceneObject {
    pub fn new(shape: Arc<dyn Shape>, material: Arc<dyn Material>) -> Self {
        Self { shape, material }
    }
}

/// Geometry, lights and the one-time world preprocessing the estimator
/// consumes. Construction pushes the world bounding sphere into every light
/// before they are frozen behind Arcs.
pub struct Scene {
    objects: Vec<SceneObject>,
    sampler: LightSampler,
    bounds: BoundingSphere,
}

impl Scene {
    pub fn new(objects: Vec<SceneObject>, lights: Vec<Box<dyn Light>>) -> Self {
        let (lights, bounds) = Self::preprocess_lights(&objects, lights);
        Self::assemble(objects, LightSampler::uniform(lights), bounds)
    }

    pub fn with_weighted_lights(objects: Vec<SceneObject>,
                                lights: Vec<Box<dyn Light>>,
                                weights: Vec<Float>) -> Result<Self, String> {
        let (lights, bounds) = Self::preprocess_lights(&objects, lights);
        let sampler = LightSampler::with_weights(lights, &weights)?;
        Ok(Self::assemble(objects, sampler, bounds))
    }

    /// One-time preprocessing: derive the world bounding sphere from the
    /// geometry and push it into every light before freezing them.
    fn preprocess_lights(objects: &[SceneObject],
                         mut lights: Vec<Box<dyn Light>>)
                         -> (Vec<Arc<dyn Light>>, BoundingSphere) {
        let mut bounds: Option<BoundingSphere> = None;
        for object in objects.iter() {
            let sphere = object.shape.bounding_sphere();
            match bounds.as_mut() {
                Some(bounds) => bounds.expand_by_sphere(&sphere),
                None => bounds = Some(sphere),
            }
        }
        let bounds = bounds.unwrap_or_default();

        for light in lights.iter_mut() {
            light.set_world_bounds(&bounds);
        }
        (lights.into_iter().map(Arc::from).collect(), bounds)
    }

    fn assemble(objects: Vec<SceneObject>, sampler: LightSampler,
                bounds: BoundingSphere) -> Self {
        log::info!("scene: {} objects, {} lights, world radius {:.3}",
                   objects.len(), sampler.len(), bounds.radius);
        Self { objects, sampler, bounds }
    }

    pub fn sampler(&self) -> &LightSampler {
        &self.sampler
    }

    pub fn lights(&self) -> &[Arc<dyn Light>] {
        self.sampler.lights()
    }

    pub fn bounds(&self) -> &BoundingSphere {
        &self.bounds
    }

    /// Closest intersection along the ray, with the owning object's material
    /// attached.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let mut closest: Option<(SurfaceIntersection, &Arc<dyn Material>)> = None;
        for object in self.objects.iter() {
            if let Some(hit) = object.shape.ray_intersection(ray) {
                let nearer = match closest.as_ref() {
                    Some((best, _)) => hit.t() < best.t(),
                    None => true,
                };
                if nearer {
                    closest = Some((hit, &object.material));
                }
            }
        }

        closest.map(|(hit, material)| hit.with_material(Arc::clone(material)))
    }

    /// Any-hit occlusion query over the ray segment.
    pub fn occluded(&self, ray: &Ray3f) -> bool {
        self.objects.iter().any(|object| object.shape.ray_intersection_t(ray))
    }
}

/* Tests for Scene */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::infinite::InfiniteLight;
    use crate::materials::lambertian::LambertianMaterial;
    use crate::math::constants::Vector3f;
    use crate::math::spectrum::RGBSpectrum;
    use crate::shapes::sphere::Sphere;

    fn gray() -> Arc<dyn Material> {
        Arc::new(LambertianMaterial::new(RGBSpectrum::splat(0.5)))
    }

    #[test]
    fn test_scene_closest_hit() {
        let objects = vec![
            SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, -5.0), 1.0)), gray()),
            SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, -9.0), 1.0)), gray()),
        ];
        let scene = Scene::new(objects, Vec::new());

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = scene.ray_intersection(&ray).unwrap();
        assert!((hit.t() - 4.0).abs() < 1e-4);
        assert!(hit.material().is_some());
    }

    #[test]
    fn test_scene_occlusion_respects_segment() {
        let objects = vec![
            SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, -5.0), 1.0)), gray()),
        ];
        let scene = Scene::new(objects, Vec::new());

        let blocked = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0),
                                 None, None);
        assert!(scene.occluded(&blocked));

        let short = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0),
                               None, Some(2.0));
        assert!(!scene.occluded(&short));
    }

    #[test]
    fn test_scene_pushes_bounds_into_lights() {
        let objects = vec![
            SceneObject::new(Arc::new(Sphere::new(Vector3f::new(2.0, 0.0, 0.0), 1.0)), gray()),
        ];
        let sky: Box<dyn Light> = Box::new(InfiniteLight::uniform(RGBSpectrum::splat(1.0)));
        let scene = Scene::new(objects, vec![sky]);

        assert!((scene.bounds().radius - 1.0).abs() < 1e-5);
        let sample = scene.lights()[0].sample_emission(
            &crate::math::constants::Vector2f::new(0.3, 0.4),
            &crate::math::constants::Vector2f::new(0.6, 0.7));
        // launch point inherits the pushed-down bounds
        assert!((sample.p - Vector3f::new(2.0, 0.0, 0.0)).norm() <= 2.0 + 1e-4);
    }
}
