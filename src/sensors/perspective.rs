// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f, FLOAT_MAX};
use crate::math::ray::Ray3f;

pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    near_clip: Float,
    far_clip: Float,
    width: usize,
    height: usize,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize,
               near_clip: Float,
               far_clip: Float) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();
        let aspect = (width as Float) / (height.max(1) as Float);

        Self {
            origin,
            forward,
            right,
            up,
            tan_half_fov_y: (0.5 * fov_y_radians).tan(),
            aspect,
            near_clip,
            far_clip,
            width,
            height,
        }
    }
}

impl Sensor for PerspectiveCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let px = (2.0 * u.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * u.y) * self.tan_half_fov_y;

        let d_camera = Vector3f::new(px, py, 1.0).normalize();
        let dir = (self.right * d_camera.x + self.up * d_camera.y + self.forward * d_camera.z).normalize();

        let inv_z = if d_camera.z != 0.0 { 1.0 / d_camera.z } else { FLOAT_MAX };
        let near_t = self.near_clip * inv_z;
        let far_t = self.far_clip * inv_z;
        let origin = self.origin + dir * near_t;
        let max_t = far_t - near_t;
        Ray3f::new(origin, dir, Some(0.0), Some(max_t))
    }

    fn project(&self, p: &Vector3f) -> Option<(usize, usize)> {
        let v = p - self.origin;
        let z = v.dot(&self.forward);
        if z <= self.near_clip.max(1e-6) || z >= self.far_clip {
            return None;
        }

        let px = v.dot(&self.right) / (z * self.aspect * self.tan_half_fov_y);
        let py = v.dot(&self.up) / (z * self.tan_half_fov_y);
        let u = 0.5 * (px + 1.0);
        let v_img = 0.5 * (1.0 - py);
        if u < 0.0 || u >= 1.0 || v_img < 0.0 || v_img >= 1.0 {
            return None;
        }

        let x = ((u * self.width as Float) as usize).min(self.width - 1);
        let y = ((v_img * self.height as Float) as usize).min(self.height - 1);
        Some((x, y))
    }

    fn position(&self) -> Vector3f {
        self.origin
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn describe(&self) -> String {
        String::from("PerspectiveCamera")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Vector3f::zeros(),
            Vector3f::new(0.0, 0.0, -1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_2,
            64, 64, 1e-3, FLOAT_MAX)
    }

    #[test]
    fn test_perspective_camera_center_ray() {
        let cam = test_camera();
        let ray = cam.sample_ray(&Vector2f::new(0.5, 0.5));
        let dir = ray.dir();

        assert!((dir.x - 0.0).abs() < 1e-6);
        assert!((dir.y - 0.0).abs() < 1e-6);
        assert!((dir.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_project_inverts_sample_ray() {
        let cam = test_camera();
        for (x, y) in [(0usize, 0usize), (13, 50), (32, 32), (63, 63)].iter() {
            let u = Vector2f::new((*x as Float + 0.5) / 64.0,
                                  (*y as Float + 0.5) / 64.0);
            let ray = cam.sample_ray(&u);
            let p = ray.at(3.0);
            let (px, py) = cam.project(&p).unwrap();
            assert_eq!((px, py), (*x, *y));
        }
    }

    #[test]
    fn test_project_rejects_behind_camera() {
        let cam = test_camera();
        assert!(cam.project(&Vector3f::new(0.0, 0.0, 5.0)).is_none());
    }
}
