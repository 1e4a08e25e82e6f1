// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::bvh::BVH;
use crate::core::emitter::{Emitter, EmitterFlag, EmitterQueryRecord};
use crate::core::interaction::SurfaceIntersection;
use crate::core::medium::{Medium, MediumInterval};
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::emitters::area::AreaEmitter;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f, EPSILON, FLOAT_EPSILON, SHADOW_EPSILON };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// A shape with its surface description. `emitter` indexes into the scene
/// emitters when the shape is an area light.
pub struct SceneObject {
    shape: Arc<dyn Shape>,
    material: Option<Arc<dyn BSDF>>,
    emitter: Option<usize>,
}

impl SceneObject {
    pub fn shape(&self) -> &Arc<dyn Shape> {
        &self.shape
    }

    pub fn material(&self) -> Option<&Arc<dyn BSDF>> {
        self.material.as_ref()
    }

    pub fn emitter(&self) -> Option<usize> {
        self.emitter
    }
}

pub struct Scene {
    objects: Vec<SceneObject>,
    emitters: Vec<Box<dyn Emitter>>,
    environment: Option<usize>,
    medium: Option<Arc<dyn Medium>>,
    background: RGBSpectrum,
    sensor: Option<Arc<dyn Sensor>>,
    bounds: AABB,
    bvh: Option<BVH>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            emitters: Vec::new(),
            environment: None,
            medium: None,
            background: RGBSpectrum::zero(),
            sensor: None,
            bounds: AABB::default(),
            bvh: None,
        }
    }

    /// Adds a shape; a non-black `radiance` also turns it into an area light.
    pub fn add_shape(&mut self,
                     shape: Arc<dyn Shape>,
                     material: Option<Arc<dyn BSDF>>,
                     radiance: Option<RGBSpectrum>) -> usize {
        let emitter = match radiance {
            Some(radiance) if !radiance.is_black() => {
                Some(self.add_emitter(Box::new(AreaEmitter::new(shape.clone(), radiance, None))))
            }
            _ => None,
        };
        self.objects.push(SceneObject { shape, material, emitter });
        self.bvh = None;
        self.objects.len() - 1
    }

    /// Adds a point or environment emitter. Only the last environment is kept
    /// as the background source.
    pub fn add_emitter(&mut self, emitter: Box<dyn Emitter>) -> usize {
        let index = self.emitters.len();
        if emitter.flag().contains(EmitterFlag::ENVIRONMENT) {
            if self.environment.is_some() {
                log::warn!("Scene has several environment emitters, using {}.", emitter.id());
            }
            self.environment = Some(index);
        }
        self.emitters.push(emitter);
        index
    }

    pub fn set_medium(&mut self, medium: Arc<dyn Medium>) {
        self.medium = Some(medium);
    }

    pub fn set_background(&mut self, background: RGBSpectrum) {
        self.background = background;
    }

    pub fn set_sensor(&mut self, sensor: Arc<dyn Sensor>) {
        self.sensor = Some(sensor);
    }

    /// Builds the acceleration structure and hands the scene bounds to the
    /// emitters. Queries return misses until this has run.
    pub fn activate(&mut self) {
        let mut prim_bounds = Vec::with_capacity(self.objects.len());
        let mut prim_centroids = Vec::with_capacity(self.objects.len());
        let mut bounds = AABB::default();
        for obj in &self.objects {
            let b = obj.shape.bounding_box();
            prim_centroids.push(b.center());
            prim_bounds.push(b);
            bounds.expand_by_aabb(&b);
        }
        self.bvh = Some(BVH::new(prim_bounds, prim_centroids));
        self.bounds = bounds;

        for emitter in &mut self.emitters {
            emitter.set_scene_bounds(&bounds);
        }
        log::info!("Scene activated: {} objects, {} emitters, medium: {}.",
                   self.objects.len(), self.emitters.len(),
                   self.medium.as_ref().map_or("none".to_string(), |m| m.to_string()));
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn sensor(&self) -> Option<&Arc<dyn Sensor>> {
        self.sensor.as_ref()
    }

    pub fn medium(&self) -> Option<&dyn Medium> {
        self.medium.as_deref()
    }

    /// Nearest hit in `[ray.min_t, ray.max_t]`. The hit carries the object's
    /// material, its emitted radiance towards the ray origin, and a shading
    /// frame perturbed by the material's displacement.
    pub fn intersect_surface(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let bvh = self.bvh.as_ref()?;
        let (idx, hit) = bvh.ray_intersection(ray, |prim_idx, ray| {
            self.objects[prim_idx].shape.ray_intersection(ray).map(|h| {
                let t = h.t();
                (h, t)
            })
        })?;

        let object = &self.objects[idx];
        let mut its = hit.with_object_index(Some(idx));
        if let Some(emitter) = object.emitter {
            let rec = EmitterQueryRecord::from_hit(ray.origin(), its.p(), its.geo_normal(), its.uv());
            let le = self.emitters[emitter].eval(&rec);
            its = its.with_le(le);
        }
        if let Some(material) = &object.material {
            let bumped = material.displacement(&its.uv()).and_then(|d| {
                let n = its.to_world(&(Vector3f::new(0.0, 0.0, 1.0) + d));
                let len = n.norm();
                if len > FLOAT_EPSILON && len.is_finite() {
                    Some(Frame::from_normal(n / len))
                } else {
                    None
                }
            });
            its = its.with_material(material.clone());
            if let Some(frame) = bumped {
                its = its.with_shading_frame(frame);
            }
        }
        Some(its)
    }

    pub fn intersect_surface_boolean(&self, ray: &Ray3f) -> bool {
        match &self.bvh {
            Some(bvh) => bvh.ray_intersection_t(ray, |prim_idx, ray| {
                self.objects[prim_idx].shape.ray_intersection_t(ray)
            }),
            None => false,
        }
    }

    /// Ray distances `(entry, exit)` of the medium part of `ray` that lies
    /// before `far_t`.
    fn medium_segment(&self, medium: &dyn Medium, ray: &Ray3f, far_t: Float) -> Option<(Float, Float)> {
        let shape = match medium.bounding_shape() {
            Some(shape) => shape,
            None => return Some((0.0, far_t)),
        };

        let probe = Ray3f::new(ray.origin(), ray.dir(), Some(ray.min_t), None);
        let first = shape.ray_intersection(&probe)?;
        let (entry, exit) = match shape.ray_intersection(&Ray3f::spawn(first.p(), ray.dir())) {
            Some(second) => (first.t(), first.t() + second.t()),
            // No second crossing: the ray started inside.
            None => (0.0, first.t()),
        };
        if far_t < entry {
            return None;
        }
        Some((entry, exit.min(far_t)))
    }

    /// The medium interval crossed by `ray` before it reaches `hit` (or
    /// escapes). `None` when there is no medium or the ray misses it.
    pub fn intersect_medium(&self, ray: &Ray3f, hit: Option<&SurfaceIntersection>) -> Option<MediumInterval<'_>> {
        let medium = self.medium.as_deref()?;
        let far_t = hit.map_or(Float::INFINITY, |h| h.t());
        let (entry, exit) = self.medium_segment(medium, ray, far_t)?;
        let x = ray.origin() + ray.dir() * entry;
        Some(MediumInterval::new(medium, ray.origin(), ray.dir(), hit.map(|h| h.p()), x, exit - entry))
    }

    /// Radiance of an escaping ray, before any medium attenuation.
    pub fn background(&self, ray: &Ray3f) -> RGBSpectrum {
        match self.environment {
            Some(index) => {
                let rec = EmitterQueryRecord::from_direction(ray.origin(), ray.dir());
                self.emitters[index].eval(&rec)
            }
            None => self.background,
        }
    }

    pub fn environment(&self) -> Option<usize> {
        self.environment
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    pub fn emitter(&self, index: usize) -> Option<&dyn Emitter> {
        self.emitters.get(index).map(|e| e.as_ref())
    }

    /// Emitter attached to the object that was hit.
    pub fn emitter_of(&self, its: &SurfaceIntersection) -> Option<usize> {
        its.object_index().and_then(|idx| self.objects.get(idx)).and_then(|obj| obj.emitter)
    }

    /// Uniform emitter selection: `(index, probability)`.
    pub fn sample_emitter(&self, u: Float) -> Option<(usize, Float)> {
        if self.emitters.is_empty() {
            return None;
        }
        let count = self.emitters.len();
        let index = ((u * count as Float) as usize).min(count - 1);
        Some((index, 1.0 / count as Float))
    }

    pub fn pdf_emitter(&self, index: usize) -> Float {
        if index < self.emitters.len() {
            1.0 / self.emitters.len() as Float
        } else {
            0.0
        }
    }

    /// Whether nothing blocks the segment from `reference` to the emitter
    /// point in `rec`. Environment samples test the open ray.
    pub fn visible(&self, rec: &EmitterQueryRecord) -> bool {
        let ray = if rec.dist.is_finite() {
            Ray3f::between(rec.reference, rec.p, SHADOW_EPSILON)
        } else {
            Ray3f::spawn(rec.reference, rec.wi)
        };
        !self.intersect_surface_boolean(&ray)
    }

    /// Medium transmittance between the reference and the emitter point;
    /// one when the scene has no medium.
    pub fn transmittance(&self, rec: &EmitterQueryRecord) -> RGBSpectrum {
        let medium = match self.medium.as_deref() {
            Some(medium) => medium,
            None => return RGBSpectrum::splat(1.0),
        };
        let ray = Ray3f::new(rec.reference, rec.wi, Some(EPSILON), None);
        match self.medium_segment(medium, &ray, rec.dist) {
            Some((entry, exit)) => {
                let x = rec.reference + rec.wi * entry;
                let interval = MediumInterval::new(medium, rec.reference, rec.wi, None, x, exit - entry);
                medium.transmittance(&interval.x, &interval.xz)
            }
            None => RGBSpectrum::splat(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::constant::ConstantEnvironment;
    use crate::emitters::point::PointEmitter;
    use crate::materials::diffuse::DiffuseBSDF;
    use crate::media::homogeneous_medium::HomogeneousMedium;
    use crate::math::transform::Transform;
    use crate::shapes::cube::Cube;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;

    fn plane_at(z: Float) -> Arc<dyn Shape> {
        Arc::new(Rectangle::new(Transform::translate(&Vector3f::new(0.0, 0.0, z))
                                * Transform::scale(&Vector3f::new(10.0, 10.0, 1.0)), None))
    }

    fn up_ray() -> Ray3f {
        Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None)
    }

    #[test]
    fn test_closest_hit_and_boolean() {
        let mut scene = Scene::new();
        scene.add_shape(plane_at(5.0), None, None);
        scene.add_shape(plane_at(2.0), Some(Arc::new(DiffuseBSDF::default())), None);
        scene.add_shape(plane_at(10.0), None, None);
        scene.activate();

        let hit = scene.intersect_surface(&up_ray()).expect("expected intersection");
        assert!((hit.t() - 2.0).abs() < 1e-5);
        assert_eq!(hit.object_index(), Some(1));
        assert!(hit.material().is_some());

        let short = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, Some(1.5));
        assert!(scene.intersect_surface(&short).is_none());
        assert!(!scene.intersect_surface_boolean(&short));
        assert!(scene.intersect_surface_boolean(&up_ray()));
    }

    #[test]
    fn test_area_light_is_one_sided() {
        let mut scene = Scene::new();
        // The quad normal is +z, so it shines away from the origin.
        let light = scene.add_shape(plane_at(2.0), None, Some(RGBSpectrum::splat(3.0)));
        scene.activate();
        let hit = scene.intersect_surface(&up_ray()).expect("expected intersection");
        assert_eq!(light, 0);
        assert_eq!(scene.emitter_of(&hit), Some(0));
        assert!(hit.le().is_black());

        let down = Ray3f::new(Vector3f::new(0.0, 0.0, 4.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = scene.intersect_surface(&down).expect("expected intersection");
        assert_eq!(hit.le(), RGBSpectrum::splat(3.0));
    }

    #[test]
    fn test_unbounded_medium_interval() {
        let mut scene = Scene::new();
        assert!(scene.intersect_medium(&up_ray(), None).is_none());

        scene.set_medium(Arc::new(HomogeneousMedium::new(RGBSpectrum::splat(0.1), RGBSpectrum::splat(0.1), None)));
        scene.add_shape(plane_at(3.0), None, None);
        scene.activate();

        let hit = scene.intersect_surface(&up_ray());
        let interval = scene.intersect_medium(&up_ray(), hit.as_ref()).expect("medium fills the scene");
        assert_eq!(interval.x, Vector3f::zeros());
        assert!((interval.dist_z - 3.0).abs() < 1e-5);
        assert!(interval.p.is_some());

        let sideways = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let escaping = scene.intersect_medium(&sideways, None).expect("medium fills the scene");
        assert!(escaping.dist_z.is_infinite());
        assert!(escaping.p.is_none());
    }

    #[test]
    fn test_bounded_medium_interval() {
        let mut scene = Scene::new();
        let bounds = AABB::new(Vector3f::new(-1.0, -1.0, 1.0), Vector3f::new(1.0, 1.0, 3.0));
        let medium = HomogeneousMedium::new(RGBSpectrum::splat(0.5), RGBSpectrum::zero(), None)
            .with_bounding_shape(Arc::new(Cube::from_aabb(&bounds, None)));
        scene.set_medium(Arc::new(medium));
        scene.activate();

        // Entry and exit from outside.
        let interval = scene.intersect_medium(&up_ray(), None).expect("ray crosses the box");
        assert!((interval.x - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-4);
        assert!((interval.dist_z - 2.0).abs() < 1e-3);

        // Origin inside.
        let inside = Ray3f::new(Vector3f::new(0.0, 0.0, 2.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let interval = scene.intersect_medium(&inside, None).expect("origin is inside");
        assert_eq!(interval.x, Vector3f::new(0.0, 0.0, 2.0));
        assert!((interval.dist_z - 1.0).abs() < 1e-3);

        // Missing the box entirely.
        let miss = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert!(scene.intersect_medium(&miss, None).is_none());

        // Transmittance to a point light behind the box covers only the inside.
        let rec = EmitterQueryRecord::from_hit(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 5.0),
                                               Vector3f::zeros(), crate::math::constants::Vector2f::new(0.0, 0.0));
        assert!((scene.transmittance(&rec).r() - (-1.0f32).exp()).abs() < 1e-3);
    }

    #[test]
    fn test_surface_before_medium_and_inside_medium() {
        let mut scene = Scene::new();
        let bounds = AABB::new(Vector3f::new(-1.0, -1.0, 2.0), Vector3f::new(1.0, 1.0, 4.0));
        let medium = HomogeneousMedium::new(RGBSpectrum::splat(0.5), RGBSpectrum::zero(), None)
            .with_bounding_shape(Arc::new(Cube::from_aabb(&bounds, None)));
        scene.set_medium(Arc::new(medium));
        scene.add_shape(plane_at(1.0), None, None);
        scene.activate();

        let hit = scene.intersect_surface(&up_ray());
        assert!(scene.intersect_medium(&up_ray(), hit.as_ref()).is_none());

        let mut scene = Scene::new();
        let medium = HomogeneousMedium::new(RGBSpectrum::splat(0.5), RGBSpectrum::zero(), None)
            .with_bounding_shape(Arc::new(Cube::from_aabb(&bounds, None)));
        scene.set_medium(Arc::new(medium));
        scene.add_shape(Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, 3.5), 0.25, None)), None, None);
        scene.activate();
        let hit = scene.intersect_surface(&up_ray());
        let interval = scene.intersect_medium(&up_ray(), hit.as_ref()).expect("surface lies inside");
        assert!((interval.dist_z - 1.25).abs() < 1e-3);
    }

    #[test]
    fn test_emitter_selection_and_background() {
        let mut scene = Scene::new();
        assert!(scene.sample_emitter(0.5).is_none());
        assert_eq!(scene.background(&up_ray()), RGBSpectrum::zero());

        scene.add_emitter(Box::new(PointEmitter::new(Vector3f::new(0.0, 0.0, 1.0), RGBSpectrum::splat(1.0), None)));
        scene.add_emitter(Box::new(ConstantEnvironment::new(RGBSpectrum::splat(0.25), None)));
        scene.activate();

        assert_eq!(scene.sample_emitter(0.1), Some((0, 0.5)));
        assert_eq!(scene.sample_emitter(0.9999), Some((1, 0.5)));
        assert_eq!(scene.pdf_emitter(1), 0.5);
        assert_eq!(scene.pdf_emitter(7), 0.0);
        assert_eq!(scene.environment(), Some(1));
        assert_eq!(scene.background(&up_ray()), RGBSpectrum::splat(0.25));
    }

    #[test]
    fn test_visibility() {
        let mut scene = Scene::new();
        scene.add_shape(plane_at(1.0), None, None);
        scene.activate();
        let blocked = EmitterQueryRecord::from_hit(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 2.0),
                                                   Vector3f::new(0.0, 0.0, -1.0),
                                                   crate::math::constants::Vector2f::new(0.0, 0.0));
        assert!(!scene.visible(&blocked));
        let clear = EmitterQueryRecord::from_hit(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 0.5),
                                                 Vector3f::new(0.0, 0.0, -1.0),
                                                 crate::math::constants::Vector2f::new(0.0, 0.0));
        assert!(scene.visible(&clear));
        let sky = EmitterQueryRecord::from_direction(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0));
        assert!(scene.visible(&sky));
    }
}
