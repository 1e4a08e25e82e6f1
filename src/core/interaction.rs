// Copyright @yucwang 2023

use crate::core::bsdf::BSDF;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

#[derive(Clone)]
pub struct SurfaceIntersection {
    p: Vector3f,
    geo_normal: Vector3f,
    sh_frame: Frame,
    uv: Vector2f,
    t: Float,
    le: RGBSpectrum,
    material: Option<Arc<dyn BSDF>>,
    object_index: Option<usize>,
}

/// A point drawn on a surface, with its density in area measure.
pub struct SurfaceSampleRecord {
    intersection: SurfaceIntersection,
    pdf: Float,
}

impl SurfaceIntersection {
    pub fn new(new_p: Vector3f, 
               new_geo_normal: Vector3f, 
               new_sh_normal: Vector3f, 
               new_uv: Vector2f,
               new_t: Float) -> Self {
        Self { p: new_p, geo_normal: new_geo_normal,
               sh_frame: Frame::from_normal(new_sh_normal),
               uv: new_uv, t: new_t, le: RGBSpectrum::zero(), material: None,
               object_index: None }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn le(&self) -> RGBSpectrum {
        self.le
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn uv(&self) -> Vector2f {
        self.uv
    }

    pub fn geo_normal(&self) -> Vector3f {
        self.geo_normal
    }

    pub fn sh_normal(&self) -> Vector3f {
        self.sh_frame.n
    }

    pub fn sh_frame(&self) -> &Frame {
        &self.sh_frame
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_local(v)
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_world(v)
    }

    pub fn material(&self) -> Option<&dyn BSDF> {
        self.material.as_deref()
    }

    pub fn object_index(&self) -> Option<usize> {
        self.object_index
    }

    pub fn with_le(mut self, new_le: RGBSpectrum) -> Self {
        self.le = new_le;
        self
    }

    pub fn with_material(mut self, new_material: Arc<dyn BSDF>) -> Self {
        self.material = Some(new_material);
        self
    }

    pub fn with_object_index(mut self, object_index: Option<usize>) -> Self {
        self.object_index = object_index;
        self
    }

    pub fn with_shading_frame(mut self, frame: Frame) -> Self {
        self.sh_frame = frame;
        self
    }
}

impl SurfaceSampleRecord {
    pub fn new(new_intersection: SurfaceIntersection,
               new_pdf: Float) -> Self {
        Self { intersection: new_intersection, pdf: new_pdf }
    }

    pub fn intersection(&self) -> &SurfaceIntersection {
        &self.intersection
    }

    pub fn pdf(&self) -> Float {
        self.pdf
    }

    pub fn set_pdf(&mut self, pdf: Float) {
        self.pdf = pdf;
    }
}
