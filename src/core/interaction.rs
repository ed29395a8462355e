// Copyright @yucwang 2023

use crate::core::material::Material;
use crate::math::constants::{ Float, Vector3f };
use std::sync::Arc;

pub struct SurfaceIntersection {
    p: Vector3f,
    geo_normal: Vector3f,
    sh_normal: Vector3f,
    t: Float,
    front_face: bool,
    material: Option<Arc<dyn Material>>,
}

impl SurfaceIntersection {
    pub fn new(new_p: Vector3f,
               new_geo_normal: Vector3f,
               new_sh_normal: Vector3f,
               new_t: Float,
               new_front_face: bool) -> Self {
        Self { p: new_p, geo_normal: new_geo_normal, sh_normal: new_sh_normal,
               t: new_t, front_face: new_front_face, material: None }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn geo_normal(&self) -> Vector3f {
        self.geo_normal
    }

    pub fn sh_normal(&self) -> Vector3f {
        self.sh_normal
    }

    pub fn front_face(&self) -> bool {
        self.front_face
    }

    pub fn material(&self) -> Option<&dyn Material> {
        self.material.as_deref()
    }

    pub fn with_material(&self, new_material: Arc<dyn Material>) -> Self {
        Self {
            p: self.p,
            geo_normal: self.geo_normal,
            sh_normal: self.sh_normal,
            t: self.t,
            front_face: self.front_face,
            material: Some(new_material),
        }
    }
}

/// A uniformly sampled point on a surface together with its area density.
pub struct SurfaceSampleRecord {
    p: Vector3f,
    normal: Vector3f,
    pdf_area: Float,
}

impl SurfaceSampleRecord {
    pub fn new(new_p: Vector3f, new_normal: Vector3f, new_pdf_area: Float) -> Self {
        Self { p: new_p, normal: new_normal, pdf_area: new_pdf_area }
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn pdf_area(&self) -> Float {
        self.pdf_area
    }
}
