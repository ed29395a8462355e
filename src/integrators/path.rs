// Copyright @yucwang 2026

use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::constants::{EPSILON, SHADOW_EPSILON, Float, Vector2f, Vector3f, FLOAT_MAX};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::power_heuristic;
use crate::renderers::splat::{SplatQueue, SplatXY};

/// Unidirectional path tracer with next-event estimation. Light sampling and
/// BRDF sampling are combined with the power heuristic; an optional
/// light-particle pass feeds the splat channel.
#[derive(Clone)]
pub struct PathIntegrator {
    max_depth: u32,
    rr_depth: u32,
    light_path_probability: Float,
}

impl PathIntegrator {
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            rr_depth: 4,
            light_path_probability: 0.0,
        }
    }

    /// Enable the bidirectional splat channel: each camera sample also
    /// traces one light particle with the given probability.
    pub fn with_light_paths(mut self, probability: Float) -> Self {
        self.light_path_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_rr_depth(mut self, rr_depth: u32) -> Self {
        self.rr_depth = rr_depth;
        self
    }
}

/// Selection-weighted sum of the solid-angle densities every light assigns
/// to the direction; the mixture density of the light-sampling strategy.
fn light_strategy_pdf(scene: &Scene, p: &Vector3f, n: &Vector3f, direction: &Vector3f) -> Float {
    let sampler = scene.sampler();
    let mut pdf = 0.0;
    for (index, light) in scene.lights().iter().enumerate() {
        if light.kind().is_delta() {
            continue;
        }
        let selection = sampler.light_probability(index, p, n);
        if selection > 0.0 {
            pdf += selection * light.pdf(p, n, direction);
        }
    }
    pdf
}

/// One-light direct illumination estimate at a shading point.
fn direct_light(scene: &Scene, hit: &SurfaceIntersection, wo: &Vector3f,
                rng: &mut LcgRng) -> RGBSpectrum {
    let material = match hit.material() {
        Some(material) => material,
        None => return RGBSpectrum::default(),
    };

    let p = hit.p();
    let mut n = hit.sh_normal();
    if n.dot(wo) < 0.0 {
        n = -n;
    }
    let (light, selection, _index) =
        match scene.sampler().sample_light(&p, &n, rng.next_f32()) {
            Some(choice) => choice,
            None => return RGBSpectrum::default(),
        };

    let sample = light.sample(&p, &n, &rng.next_2d());
    if !sample.is_valid() || sample.emission.is_black() {
        return RGBSpectrum::default();
    }

    let cos_surface = n.dot(&sample.direction);
    if cos_surface <= 0.0 {
        return RGBSpectrum::default();
    }

    let f = material.eval(hit, wo, &sample.direction);
    if f.is_black() {
        return RGBSpectrum::default();
    }

    let max_t = if sample.distance >= FLOAT_MAX {
        FLOAT_MAX
    } else {
        sample.distance - 2.0 * SHADOW_EPSILON
    };
    let shadow_ray = Ray3f::new(p + n * SHADOW_EPSILON, sample.direction,
                                Some(0.0), Some(max_t));
    if scene.occluded(&shadow_ray) {
        return RGBSpectrum::default();
    }

    let light_pdf = sample.pdf * selection;
    if light_pdf <= 0.0 {
        return RGBSpectrum::default();
    }

    // delta lights cannot be found by BRDF sampling, single-strategy case
    let weight = if light.kind().is_delta() {
        1.0
    } else {
        let brdf_pdf = material.pdf(hit, wo, &sample.direction);
        power_heuristic(light_pdf, brdf_pdf)
    };

    f * sample.emission * (cos_surface * weight / light_pdf)
}

impl PathIntegrator {
    fn trace_camera_path(&self, scene: &Scene, ray: Ray3f, rng: &mut LcgRng) -> RGBSpectrum {
        let mut radiance = RGBSpectrum::default();
        let mut throughput = RGBSpectrum::splat(1.0);
        let mut ray = ray;

        // MIS state of the previous bounce
        let mut specular_bounce = true;
        let mut prev_point = Vector3f::zeros();
        let mut prev_normal = Vector3f::zeros();
        let mut prev_brdf_pdf = 0.0;

        for depth in 0..self.max_depth {
            let hit = match scene.ray_intersection(&ray) {
                Some(hit) => hit,
                None => {
                    let mut background = RGBSpectrum::default();
                    for light in scene.lights().iter() {
                        if light.kind().is_infinite() {
                            background += light.emit(&ray, None);
                        }
                    }
                    if !background.is_black() {
                        let weight = if specular_bounce {
                            1.0
                        } else {
                            let light_pdf = light_strategy_pdf(
                                scene, &prev_point, &prev_normal, &ray.dir());
                            power_heuristic(prev_brdf_pdf, light_pdf)
                        };
                        radiance += throughput * background * weight;
                    }
                    break;
                }
            };

            if let Some(material) = hit.material() {
                let emitted = material.emit(&ray, Some(&hit));
                if !emitted.is_black() {
                    let weight = if specular_bounce {
                        1.0
                    } else {
                        let light_pdf = light_strategy_pdf(
                            scene, &prev_point, &prev_normal, &ray.dir());
                        power_heuristic(prev_brdf_pdf, light_pdf)
                    };
                    radiance += throughput * emitted * weight;
                }
            }

            let wo = -ray.dir();
            radiance += throughput * direct_light(scene, &hit, &wo, rng);

            let material = match hit.material() {
                Some(material) => material,
                None => break,
            };
            let scatter = match material.scatter(&ray, &hit, &rng.next_2d(), &rng.next_2d()) {
                Some(scatter) => scatter,
                None => break,
            };

            if scatter.specular {
                specular_bounce = true;
                throughput = throughput * scatter.attenuation;
            } else {
                if scatter.pdf <= 0.0 {
                    break;
                }
                let cos_theta = hit.sh_normal().dot(&scatter.ray.dir()).abs();
                throughput = throughput * scatter.attenuation * (cos_theta / scatter.pdf);
                specular_bounce = false;
            }

            if throughput.is_black() {
                break;
            }

            prev_point = hit.p();
            prev_normal = hit.sh_normal();
            if prev_normal.dot(&wo) < 0.0 {
                prev_normal = -prev_normal;
            }
            prev_brdf_pdf = scatter.pdf;
            ray = scatter.ray;

            if depth + 1 >= self.rr_depth {
                let q = (1.0 - throughput.max_component()).max(0.05);
                if rng.next_f32() < q {
                    break;
                }
                throughput = throughput / (1.0 - q);
            }
        }

        radiance
    }

    /// Trace one particle from a light and connect its first surface hit to
    /// the sensor. The contribution lands on whatever pixel the hit projects
    /// to, so it goes through the splat queue instead of the return value.
    fn trace_light_particle(&self, scene: &Scene, sensor: &dyn Sensor,
                            rng: &mut LcgRng, splats: &SplatQueue) {
        let (light, selection, _index) =
            match scene.sampler().sample_light_emission(rng.next_f32()) {
                Some(choice) => choice,
                None => return,
            };

        let sample = light.sample_emission(&rng.next_2d(), &rng.next_2d());
        if !sample.is_valid() || sample.emission.is_black() {
            return;
        }

        let cos_emit = sample.normal.dot(&sample.direction).abs().max(EPSILON);
        let weight = cos_emit / (selection * sample.pdf_area * sample.pdf_dir);
        let beta = sample.emission * weight;

        let origin = sample.p + sample.direction * SHADOW_EPSILON;
        let ray = Ray3f::new(origin, sample.direction, None, None);
        let hit = match scene.ray_intersection(&ray) {
            Some(hit) => hit,
            None => return,
        };
        let material = match hit.material() {
            Some(material) => material,
            None => return,
        };

        let pixel = match sensor.project(&hit.p()) {
            Some(pixel) => pixel,
            None => return,
        };

        let to_camera = sensor.position() - hit.p();
        let dist_sq = to_camera.norm_squared();
        if dist_sq < EPSILON * EPSILON {
            return;
        }
        let dist = dist_sq.sqrt();
        let wi = to_camera / dist;
        let wo = -ray.dir();
        let mut n = hit.sh_normal();
        if n.dot(&wo) < 0.0 {
            n = -n;
        }
        let cos_hit = n.dot(&wi);
        if cos_hit <= 0.0 {
            return;
        }

        let f = material.eval(&hit, &wo, &wi);
        if f.is_black() {
            return;
        }

        let connect_ray = Ray3f::new(hit.p() + n * SHADOW_EPSILON, wi,
                                     Some(0.0), Some(dist - 2.0 * SHADOW_EPSILON));
        if scene.occluded(&connect_ray) {
            return;
        }

        let contribution = beta * f * (cos_hit / dist_sq)
            / self.light_path_probability;
        splats.push(SplatXY {
            x: pixel.0 as u32,
            y: pixel.1 as u32,
            color: contribution.to_vector(),
        });
    }
}

impl Integrator for PathIntegrator {
    fn trace(&self, scene: &Scene, sensor: &dyn Sensor, pixel: Vector2f,
             rng: &mut LcgRng, splats: &SplatQueue) -> RGBSpectrum {
        if self.light_path_probability > 0.0
            && rng.next_f32() < self.light_path_probability {
            self.trace_light_particle(scene, sensor, rng, splats);
        }

        let ray = sensor.sample_ray(&pixel);
        self.trace_camera_path(scene, ray, rng)
    }

    fn box_clone(&self) -> Box<dyn Integrator> {
        Box::new(self.clone())
    }
}

/* Tests for the path integrator */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneObject;
    use crate::core::light::Light;
    use crate::lights::quad::QuadLight;
    use crate::math::spectrum::Spectrum;
    use crate::materials::diffuse_light::DiffuseLightMaterial;
    use crate::materials::lambertian::LambertianMaterial;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::shapes::quad::Quad;
    use std::sync::Arc;

    fn panel() -> Quad {
        // 1x1 panel at y = 2 facing down
        Quad::new(Vector3f::new(-0.5, 2.0, -0.5),
                  Vector3f::new(1.0, 0.0, 0.0),
                  Vector3f::new(0.0, 0.0, 1.0))
    }

    fn floor() -> Quad {
        // facing up
        Quad::new(Vector3f::new(-50.0, 0.0, -50.0),
                  Vector3f::new(0.0, 0.0, 100.0),
                  Vector3f::new(100.0, 0.0, 0.0))
    }

    fn test_scene() -> Scene {
        let emission = RGBSpectrum::splat(10.0);
        let objects = vec![
            SceneObject::new(Arc::new(floor()),
                             Arc::new(LambertianMaterial::new(RGBSpectrum::splat(0.6)))),
            SceneObject::new(Arc::new(panel()),
                             Arc::new(DiffuseLightMaterial::new(emission))),
        ];
        let lights: Vec<Box<dyn Light>> = vec![
            Box::new(QuadLight::new(panel(), emission)),
        ];
        Scene::new(objects, lights)
    }

    fn test_camera() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Vector3f::new(0.0, 1.0, 4.0),
            Vector3f::new(0.0, 0.5, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_2,
            32, 32, 1e-3, FLOAT_MAX)
    }

    #[test]
    fn test_direct_light_lit_point() {
        let scene = test_scene();
        let mut rng = LcgRng::new(10);
        let hit = scene.ray_intersection(&Ray3f::new(
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, -1.0, 0.0), None, None)).unwrap();

        let wo = Vector3f::new(0.0, 1.0, 0.0);
        let mut total = RGBSpectrum::default();
        for _ in 0..256 {
            total += direct_light(&scene, &hit, &wo, &mut rng);
        }
        let mean = total / 256.0;
        assert!(mean.value() > 0.0, "lit point got no direct light");
        assert!(mean.value().is_finite());
    }

    #[test]
    fn test_direct_light_occluded_point() {
        // a second panel blocks the light from below
        let emission = RGBSpectrum::splat(10.0);
        let blocker = Quad::new(Vector3f::new(-5.0, 1.0, -5.0),
                                Vector3f::new(10.0, 0.0, 0.0),
                                Vector3f::new(0.0, 0.0, 10.0));
        let objects = vec![
            SceneObject::new(Arc::new(floor()),
                             Arc::new(LambertianMaterial::new(RGBSpectrum::splat(0.6)))),
            SceneObject::new(Arc::new(blocker),
                             Arc::new(LambertianMaterial::new(RGBSpectrum::splat(0.6)))),
        ];
        let lights: Vec<Box<dyn Light>> = vec![
            Box::new(QuadLight::new(panel(), emission)),
        ];
        let scene = Scene::new(objects, lights);

        let mut rng = LcgRng::new(10);
        let hit = scene.ray_intersection(&Ray3f::new(
            Vector3f::new(0.0, 0.5, 0.0),
            Vector3f::new(0.0, -1.0, 0.0), None, None)).unwrap();

        let wo = Vector3f::new(0.0, 1.0, 0.0);
        for _ in 0..64 {
            assert!(direct_light(&scene, &hit, &wo, &mut rng).is_black());
        }
    }

    #[test]
    fn test_trace_is_finite_and_nonnegative() {
        let scene = test_scene();
        let camera = test_camera();
        let integrator = PathIntegrator::new(5);
        let splats = SplatQueue::with_capacity(16);
        let mut rng = LcgRng::new(7);

        for i in 0..64 {
            let uv = Vector2f::new(((i % 8) as Float + 0.5) / 8.0,
                                   ((i / 8) as Float + 0.5) / 8.0);
            let color = integrator.trace(&scene, &camera, uv, &mut rng, &splats);
            for c in 0..3 {
                assert!(color[c].is_finite());
                assert!(color[c] >= 0.0);
            }
        }
    }

    #[test]
    fn test_light_particles_feed_splat_queue() {
        let scene = test_scene();
        let camera = test_camera();
        let integrator = PathIntegrator::new(5).with_light_paths(1.0);
        let splats = SplatQueue::with_capacity(16);
        let mut rng = LcgRng::new(19);

        for _ in 0..512 {
            integrator.trace(&scene, &camera, Vector2f::new(0.5, 0.5),
                             &mut rng, &splats);
        }
        let batch = splats.snapshot();
        assert!(!batch.is_empty(), "no splats recorded");
        for splat in batch.iter() {
            assert!((splat.x as usize) < camera.width());
            assert!((splat.y as usize) < camera.height());
            assert!(splat.color.x.is_finite());
        }
    }
}
