// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::bsdf::BSDF;
use crate::core::error::SceneLoadError;
use crate::core::integrator::Integrator;
use crate::core::medium::Medium;
use crate::core::properties::{parse_boolean, parse_color, parse_float, parse_integer, parse_vec3,
                              Property, PropertyList};
use crate::core::registry::{PluginArgs, PluginChildren, Registry};
use crate::core::scene::Scene;
use crate::core::texture::Texture;
use crate::core::volume::{Volume, VolumeDataType};
use crate::math::constants::{Float, Matrix4f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;

const DEFAULT_SPP: u32 = 16;

/// A loaded, activated scene together with how it asks to be rendered.
pub struct SceneDescription {
    pub scene: Scene,
    pub integrator: Arc<dyn Integrator>,
    pub spp: u32,
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneDescription, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    load_scene_from_str(&xml, base_dir)
}

/// File names inside `xml` are resolved relative to `base_dir`.
pub fn load_scene_from_str(xml: &str, base_dir: &Path) -> Result<SceneDescription, SceneLoadError> {
    load_scene_with_registry(xml, base_dir, &Registry::default())
}

pub fn load_scene_with_registry(xml: &str,
                                base_dir: &Path,
                                registry: &Registry) -> Result<SceneDescription, SceneLoadError> {
    let root = parse_xml(xml)?;
    if root.tag != "scene" {
        return Err(SceneLoadError::Parse(format!("root element is <{}>, expected <scene>", root.tag)));
    }
    SceneBuilder::new(registry, base_dir).build(&root)
}

/// One element of the scene file, with `$name` defaults substituted.
#[derive(Debug, Clone, Default)]
struct XmlElement {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn required(&self, key: &str) -> Result<&str, SceneLoadError> {
        self.attr(key).ok_or_else(|| SceneLoadError::MissingField(format!("{}.{}", self.tag, key)))
    }

    fn id(&self) -> Option<String> {
        self.attr("id").map(|s| s.to_string())
    }

    fn label(&self) -> String {
        match (self.attr("type"), self.attr("id")) {
            (Some(t), Some(id)) => format!("{}[type = {}, id = {}]", self.tag, t, id),
            (Some(t), None) => format!("{}[type = {}]", self.tag, t),
            (None, Some(id)) => format!("{}[id = {}]", self.tag, id),
            (None, None) => self.tag.clone(),
        }
    }
}

/// Longer names first so `$spp` never clobbers `$spp_max`.
fn resolve_value(raw: &str, defaults: &[(String, String)]) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn read_element(e: &BytesStart, defaults: &mut Vec<(String, String)>) -> Result<XmlElement, SceneLoadError> {
    let mut element = XmlElement {
        tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ..XmlElement::default()
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SceneLoadError::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = resolve_value(&attr.unescape_value()?, defaults);
        element.attrs.push((key, value));
    }

    if element.tag == "default" {
        let name = element.required("name")?.to_string();
        let value = element.required("value")?.to_string();
        // The first definition wins, later ones only fill gaps.
        if !defaults.iter().any(|(k, _)| *k == name) {
            defaults.push((name, value));
            defaults.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        }
    }
    Ok(element)
}

fn attach(stack: &mut Vec<XmlElement>,
          root: &mut Option<XmlElement>,
          element: XmlElement) -> Result<(), SceneLoadError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(SceneLoadError::Parse("more than one root element".to_string())),
    }
    Ok(())
}

fn parse_xml(xml: &str) -> Result<XmlElement, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut defaults: Vec<(String, String)> = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => stack.push(read_element(&e, &mut defaults)?),
            Event::Empty(e) => {
                let element = read_element(&e, &mut defaults)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(e) => {
                let element = stack.pop()
                    .ok_or_else(|| SceneLoadError::Parse("unbalanced closing tag".to_string()))?;
                if element.tag.as_bytes() != e.name().as_ref() {
                    return Err(SceneLoadError::Parse(format!("<{}> closed by </{}>", element.tag,
                                                             String::from_utf8_lossy(e.name().as_ref()))));
                }
                attach(&mut stack, &mut root, element)?;
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(SceneLoadError::Parse(format!("<{}> is never closed", open.tag)));
    }
    root.ok_or_else(|| SceneLoadError::Parse("empty scene file".to_string()))
}

fn is_property(tag: &str) -> bool {
    matches!(tag, "float" | "integer" | "boolean" | "string" | "rgb" | "color" | "spectrum"
                  | "point" | "vector" | "transform" | "default")
}

/// `value="x, y, z"` or separate `x`, `y`, `z` attributes defaulting to `fill`.
fn vec3_attr(element: &XmlElement, fill: Float) -> Result<Vector3f, SceneLoadError> {
    if let Some(value) = element.attr("value") {
        return parse_vec3(value);
    }
    let mut v = Vector3f::new(fill, fill, fill);
    for (axis, key) in ["x", "y", "z"].iter().enumerate() {
        if let Some(value) = element.attr(key) {
            v[axis] = parse_float(value)?;
        }
    }
    Ok(v)
}

/// Each listed operation is applied after the ones before it.
fn parse_transform(element: &XmlElement) -> Result<Transform, SceneLoadError> {
    let mut transform = Transform::default();
    for op in &element.children {
        let next = match op.tag.as_str() {
            "translate" => Transform::translate(&vec3_attr(op, 0.0)?),
            "scale" => Transform::scale(&vec3_attr(op, 1.0)?),
            "rotate" => {
                let axis = match op.attr("axis") {
                    Some(axis) => parse_vec3(axis)?,
                    None => vec3_attr(op, 0.0)?,
                };
                if axis.norm() <= 0.0 {
                    return Err(SceneLoadError::Parse("rotation axis must be non-zero".to_string()));
                }
                Transform::rotate(&axis, parse_float(op.required("angle")?)?)
            }
            "lookat" => {
                let origin = parse_vec3(op.required("origin")?)?;
                let target = parse_vec3(op.required("target")?)?;
                let up = match op.attr("up") {
                    Some(up) => parse_vec3(up)?,
                    None => Vector3f::new(0.0, 1.0, 0.0),
                };
                Transform::look_at(&origin, &target, &up)
            }
            "matrix" => {
                let values = op.required("value")?
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .map(parse_float)
                    .collect::<Result<Vec<Float>, SceneLoadError>>()?;
                if values.len() != 16 {
                    return Err(SceneLoadError::Parse(format!("matrix needs 16 values, found {}", values.len())));
                }
                Transform::new(Matrix4f::from_row_slice(&values))
            }
            other => {
                return Err(SceneLoadError::UnsupportedChild { parent: "transform".to_string(),
                                                              child: other.to_string() });
            }
        };
        transform = next * transform;
    }
    Ok(transform)
}

fn parse_property(element: &XmlElement) -> Result<Property, SceneLoadError> {
    Ok(match element.tag.as_str() {
        "float" => Property::Float(parse_float(element.required("value")?)?),
        "integer" => Property::Integer(parse_integer(element.required("value")?)?),
        "boolean" => Property::Boolean(parse_boolean(element.required("value")?)?),
        "string" => Property::String(element.required("value")?.to_string()),
        "rgb" | "color" | "spectrum" => Property::Color(parse_color(element.required("value")?)?),
        "point" => Property::Point(vec3_attr(element, 0.0)?),
        "vector" => Property::Vector(vec3_attr(element, 0.0)?),
        "transform" => Property::Transform(parse_transform(element)?),
        other => return Err(SceneLoadError::Parse(format!("<{}> is not a property", other))),
    })
}

/// Splits the children of `element` into its property list and the nested
/// objects still to be built.
fn split_children(element: &XmlElement) -> Result<(PropertyList, Vec<&XmlElement>), SceneLoadError> {
    let mut props = PropertyList::new(&element.label());
    let mut objects = Vec::new();
    for child in &element.children {
        if child.tag == "default" {
            continue;
        }
        if is_property(&child.tag) {
            props.set(child.required("name")?, parse_property(child)?)?;
        } else {
            objects.push(child);
        }
    }
    Ok((props, objects))
}

fn unsupported(parent: &XmlElement, child: &XmlElement) -> SceneLoadError {
    SceneLoadError::UnsupportedChild { parent: parent.label(), child: child.label() }
}

fn set_once<T>(slot: &mut Option<T>, value: T, parent: &XmlElement, child: &'static str) -> Result<(), SceneLoadError> {
    if slot.is_some() {
        return Err(SceneLoadError::DuplicateChild { parent: parent.label(), child });
    }
    *slot = Some(value);
    Ok(())
}

fn insert_once<T>(map: &mut HashMap<String, T>,
                  name: &str,
                  value: T,
                  parent: &XmlElement,
                  child: &'static str) -> Result<(), SceneLoadError> {
    if map.contains_key(name) {
        return Err(SceneLoadError::DuplicateChild { parent: format!("{}.{}", parent.label(), name), child });
    }
    map.insert(name.to_string(), value);
    Ok(())
}

struct SceneBuilder<'r> {
    registry: &'r Registry,
    base_dir: PathBuf,
    scene: Scene,
    bsdfs: HashMap<String, Arc<dyn BSDF>>,
    textures: HashMap<String, Arc<dyn Texture>>,
    volumes: HashMap<String, Arc<dyn Volume>>,
}

impl<'r> SceneBuilder<'r> {
    fn new(registry: &'r Registry, base_dir: &Path) -> Self {
        Self {
            registry,
            base_dir: base_dir.to_path_buf(),
            scene: Scene::new(),
            bsdfs: HashMap::new(),
            textures: HashMap::new(),
            volumes: HashMap::new(),
        }
    }

    fn args<'a>(&'a self, element: &XmlElement, props: &'a PropertyList, children: &'a PluginChildren) -> PluginArgs<'a> {
        PluginArgs::new(props, children, &self.base_dir).with_id(element.id())
    }

    fn build(mut self, root: &XmlElement) -> Result<SceneDescription, SceneLoadError> {
        let (props, objects) = split_children(root)?;
        self.scene.set_background(props.color("background", RGBSpectrum::zero())?);

        let mut integrator: Option<Arc<dyn Integrator>> = None;
        let mut sensor_seen: Option<()> = None;
        let mut medium_seen: Option<()> = None;
        let mut spp: Option<u32> = None;

        for element in objects {
            match element.tag.as_str() {
                "integrator" => {
                    let built = self.build_integrator(element)?;
                    set_once(&mut integrator, built, root, "integrator")?;
                }
                "sensor" | "camera" => {
                    set_once(&mut sensor_seen, (), root, "sensor")?;
                    spp = self.build_sensor(element)?;
                }
                "medium" => {
                    set_once(&mut medium_seen, (), root, "medium")?;
                    let medium = self.build_medium(element)?;
                    self.scene.set_medium(medium);
                }
                "bsdf" => {
                    let id = element.required("id")?.to_string();
                    let bsdf = self.build_bsdf(element)?;
                    insert_once(&mut self.bsdfs, &id, bsdf, root, "bsdf")?;
                }
                "texture" => {
                    let id = element.required("id")?.to_string();
                    let texture = self.build_texture(element)?;
                    insert_once(&mut self.textures, &id, texture, root, "texture")?;
                }
                "volume" => {
                    let id = element.required("id")?.to_string();
                    let volume = self.build_volume(element, VolumeDataType::Density)?;
                    insert_once(&mut self.volumes, &id, volume, root, "volume")?;
                }
                "shape" | "mesh" => self.build_shape(element)?,
                "emitter" => {
                    let kind = element.required("type")?;
                    if kind == "area" {
                        return Err(unsupported(root, element));
                    }
                    let (props, _) = split_children(element)?;
                    let children = PluginChildren::default();
                    let emitter = self.registry.create_emitter(kind, &self.args(element, &props, &children))?;
                    log::info!("Created {}.", emitter.to_string());
                    self.scene.add_emitter(emitter);
                }
                _ => return Err(unsupported(root, element)),
            }
        }

        if sensor_seen.is_none() {
            return Err(SceneLoadError::MissingField("scene.sensor".to_string()));
        }
        let integrator = match integrator {
            Some(integrator) => integrator,
            None => {
                log::warn!("No integrator given, falling back to path_mis.");
                let props = PropertyList::new("integrator");
                let children = PluginChildren::default();
                self.registry.create_integrator("path_mis", &PluginArgs::new(&props, &children, &self.base_dir))?
            }
        };

        self.scene.activate();
        Ok(SceneDescription { scene: self.scene, integrator, spp: spp.unwrap_or(DEFAULT_SPP) })
    }

    fn build_integrator(&self, element: &XmlElement) -> Result<Arc<dyn Integrator>, SceneLoadError> {
        let (props, objects) = split_children(element)?;
        if let Some(child) = objects.first() {
            return Err(unsupported(element, child));
        }
        let children = PluginChildren::default();
        self.registry.create_integrator(element.required("type")?, &self.args(element, &props, &children))
    }

    /// Returns the sample count of a nested sampler, if any.
    fn build_sensor(&mut self, element: &XmlElement) -> Result<Option<u32>, SceneLoadError> {
        let (props, objects) = split_children(element)?;
        let mut children = PluginChildren::default();
        let mut sampler: Option<PropertyList> = None;
        for child in objects {
            match child.tag.as_str() {
                "film" => {
                    let (film, _) = split_children(child)?;
                    set_once(&mut children.film, film, element, "film")?;
                }
                "sampler" => {
                    let (sampler_props, _) = split_children(child)?;
                    set_once(&mut sampler, sampler_props, element, "sampler")?;
                }
                _ => return Err(unsupported(element, child)),
            }
        }

        let kind = element.attr("type").unwrap_or("perspective");
        let sensor = self.registry.create_sensor(kind, &self.args(element, &props, &children))?;
        log::info!("Created {} with resolution {:?}.", sensor.to_string(), sensor.resolution());
        self.scene.set_sensor(sensor);

        match sampler {
            Some(sampler) => {
                let count = sampler.integer("sampleCount", DEFAULT_SPP as i64)?;
                if count <= 0 {
                    return Err(SceneLoadError::Parse(format!("sampleCount must be positive, found {}", count)));
                }
                Ok(Some(count as u32))
            }
            None => Ok(None),
        }
    }

    fn build_texture(&self, element: &XmlElement) -> Result<Arc<dyn Texture>, SceneLoadError> {
        let (props, objects) = split_children(element)?;
        if let Some(child) = objects.first() {
            return Err(unsupported(element, child));
        }
        let children = PluginChildren::default();
        self.registry.create_texture(element.required("type")?, &self.args(element, &props, &children))
    }

    fn build_bsdf(&self, element: &XmlElement) -> Result<Arc<dyn BSDF>, SceneLoadError> {
        let (props, objects) = split_children(element)?;
        let mut children = PluginChildren::default();
        for child in objects {
            match child.tag.as_str() {
                "texture" => {
                    let name = child.attr("name").unwrap_or("reflectance");
                    let texture = self.build_texture(child)?;
                    insert_once(&mut children.textures, name, texture, element, "texture")?;
                }
                "bsdf" => {
                    let nested = self.build_bsdf(child)?;
                    set_once(&mut children.bsdf, nested, element, "bsdf")?;
                }
                "ref" => {
                    let id = child.required("id")?;
                    if let Some(texture) = self.textures.get(id) {
                        let name = child.attr("name").unwrap_or("reflectance");
                        insert_once(&mut children.textures, name, texture.clone(), element, "texture")?;
                    } else if let Some(bsdf) = self.bsdfs.get(id) {
                        set_once(&mut children.bsdf, bsdf.clone(), element, "bsdf")?;
                    } else {
                        return Err(SceneLoadError::Parse(format!("{}: unknown reference \"{}\"", element.label(), id)));
                    }
                }
                _ => return Err(unsupported(element, child)),
            }
        }
        self.registry.create_bsdf(element.required("type")?, &self.args(element, &props, &children))
    }

    fn build_volume(&self, element: &XmlElement, default_type: VolumeDataType) -> Result<Arc<dyn Volume>, SceneLoadError> {
        let (props, objects) = split_children(element)?;
        if let Some(child) = objects.first() {
            return Err(unsupported(element, child));
        }
        let children = PluginChildren::default();
        let volume = self.registry.create_volume(element.required("type")?,
                                                 &self.args(element, &props, &children),
                                                 default_type)?;
        log::info!("Created {}.", volume.to_string());
        Ok(volume)
    }

    fn build_medium(&self, element: &XmlElement) -> Result<Arc<dyn Medium>, SceneLoadError> {
        let (props, objects) = split_children(element)?;
        let mut children = PluginChildren::default();
        for child in objects {
            match child.tag.as_str() {
                "phase" => {
                    let (phase_props, _) = split_children(child)?;
                    let empty = PluginChildren::default();
                    let phase = self.registry.create_phase(child.required("type")?,
                                                           &self.args(child, &phase_props, &empty))?;
                    set_once(&mut children.phase, phase, element, "phase")?;
                }
                "volume" => {
                    let name = child.attr("name").unwrap_or("density");
                    let data_type = VolumeDataType::from_name(name).unwrap_or(VolumeDataType::Density);
                    let volume = self.build_volume(child, data_type)?;
                    insert_once(&mut children.volumes, name, volume, element, "volume")?;
                }
                "ref" => {
                    let id = child.required("id")?;
                    let volume = self.volumes.get(id).cloned().ok_or_else(|| {
                        SceneLoadError::Parse(format!("{}: unknown reference \"{}\"", element.label(), id))
                    })?;
                    insert_once(&mut children.volumes, child.attr("name").unwrap_or("density"), volume,
                                element, "volume")?;
                }
                "shape" => {
                    let (shape_props, _) = split_children(child)?;
                    let empty = PluginChildren::default();
                    let shape = self.registry.create_shape(child.required("type")?,
                                                           &self.args(child, &shape_props, &empty))?;
                    set_once(&mut children.shape, shape, element, "shape")?;
                }
                _ => return Err(unsupported(element, child)),
            }
        }
        self.registry.create_medium(element.required("type")?, &self.args(element, &props, &children))
    }

    fn build_shape(&mut self, element: &XmlElement) -> Result<(), SceneLoadError> {
        let (props, objects) = split_children(element)?;
        let mut material: Option<Arc<dyn BSDF>> = None;
        let mut radiance: Option<RGBSpectrum> = None;
        for child in objects {
            match child.tag.as_str() {
                "bsdf" => {
                    let bsdf = self.build_bsdf(child)?;
                    set_once(&mut material, bsdf, element, "bsdf")?;
                }
                "ref" => {
                    let id = child.required("id")?;
                    let bsdf = self.bsdfs.get(id).cloned().ok_or_else(|| {
                        SceneLoadError::Parse(format!("{}: unknown bsdf reference \"{}\"", element.label(), id))
                    })?;
                    set_once(&mut material, bsdf, element, "bsdf")?;
                }
                "emitter" => {
                    if child.required("type")? != "area" {
                        return Err(unsupported(element, child));
                    }
                    let (emitter_props, _) = split_children(child)?;
                    let value = emitter_props.color("radiance", RGBSpectrum::splat(1.0))?;
                    set_once(&mut radiance, value, element, "emitter")?;
                }
                _ => return Err(unsupported(element, child)),
            }
        }

        let children = PluginChildren::default();
        let shape = self.registry.create_shape(element.required("type")?, &self.args(element, &props, &children))?;
        log::info!("Created {}{}.", shape.to_string(),
                   radiance.map_or(String::new(), |r| format!(" emitting {:?}", r.to_vector())));
        self.scene.add_shape(shape, material, radiance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector2f;
    use crate::math::ray::Ray3f;

    fn load(xml: &str) -> Result<SceneDescription, SceneLoadError> {
        load_scene_from_str(xml, Path::new("."))
    }

    const CAMERA: &str = r#"
        <sensor type="perspective">
            <float name="fov" value="40"/>
            <transform name="to_world">
                <lookat origin="0, 0, -5" target="0, 0, 0" up="0, 1, 0"/>
            </transform>
            <sampler type="independent"><integer name="sampleCount" value="$spp"/></sampler>
            <film type="hdrfilm">
                <integer name="width" value="32"/>
                <integer name="height" value="24"/>
            </film>
        </sensor>"#;

    fn scene_with(body: &str) -> String {
        format!(r#"<?xml version="1.0"?>
            <scene version="0.6.0">
                <default name="spp" value="8"/>
                {}
                {}
            </scene>"#, CAMERA, body)
    }

    #[test]
    fn test_full_scene() {
        let xml = scene_with(r#"
            <integrator type="path_mis"><integer name="maxDepth" value="5"/></integrator>
            <bsdf type="diffuse" id="white"><rgb name="reflectance" value="0.8, 0.8, 0.8"/></bsdf>
            <shape type="rectangle">
                <transform name="to_world"><scale value="2"/><translate z="1"/></transform>
                <ref id="white"/>
            </shape>
            <shape type="sphere">
                <point name="center" x="0" y="3" z="0"/>
                <float name="radius" value="0.5"/>
                <emitter type="area"><rgb name="radiance" value="10"/></emitter>
            </shape>
            <emitter type="point"><point name="position" value="0, 2, 0"/></emitter>
            <medium type="homogeneous">
                <rgb name="sigma_a" value="0.1"/>
                <rgb name="sigma_s" value="0.2"/>
                <phase type="hg"><float name="g" value="0.3"/></phase>
            </medium>"#);
        let desc = load(&xml).expect("valid scene");
        assert_eq!(desc.spp, 8);
        assert!(desc.integrator.to_string().contains("max_depth = 5"));
        assert_eq!(desc.scene.objects().len(), 2);
        assert_eq!(desc.scene.emitter_count(), 2);
        assert!(desc.scene.medium().is_some());

        let sensor = desc.scene.sensor().expect("sensor");
        assert_eq!(sensor.resolution(), (32, 24));

        // The rectangle was scaled by 2 and then moved to z = 1.
        let ray = Ray3f::new(Vector3f::new(1.5, 1.5, -3.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let its = desc.scene.intersect_surface(&ray).expect("hits the rectangle");
        assert!((its.p().z - 1.0).abs() < 1e-4);
        assert!(sensor.sample_ray(&Vector2f::new(16.0, 12.0)).dir().z > 0.99);
    }

    #[test]
    fn test_defaults_and_fallbacks() {
        let desc = load(&scene_with("")).expect("camera only");
        assert!(desc.integrator.to_string().starts_with("PathMisIntegrator"));
        assert_eq!(desc.scene.objects().len(), 0);

        assert_eq!(resolve_value("$a_b/$a", &[("a_b".to_string(), "x".to_string()),
                                               ("a".to_string(), "y".to_string())]), "x/y");
    }

    #[test]
    fn test_configuration_errors() {
        assert!(matches!(load(&scene_with(r#"<integrator type="bidir"/>"#)),
                         Err(SceneLoadError::UnknownPlugin { family: "integrator", .. })));
        assert!(matches!(load(&scene_with(r#"<integrator type="path"/><integrator type="path"/>"#)),
                         Err(SceneLoadError::DuplicateChild { child: "integrator", .. })));
        assert!(matches!(load(&scene_with(r#"<shape type="cube"><bsdf type="diffuse"/><bsdf type="diffuse"/></shape>"#)),
                         Err(SceneLoadError::DuplicateChild { child: "bsdf", .. })));
        assert!(matches!(load(&scene_with(r#"<medium type="homogeneous"><phase type="isotropic"/><phase type="hg"/></medium>"#)),
                         Err(SceneLoadError::DuplicateChild { child: "phase", .. })));
        assert!(matches!(load(&scene_with(r#"<integrator type="path"><bsdf type="diffuse"/></integrator>"#)),
                         Err(SceneLoadError::UnsupportedChild { .. })));
        assert!(matches!(load(&scene_with(r#"<emitter type="area"/>"#)),
                         Err(SceneLoadError::UnsupportedChild { .. })));
        assert!(matches!(load(&scene_with(r#"<float name="x" value="abc"/>"#)),
                         Err(SceneLoadError::Parse(_))));
        assert!(matches!(load(&scene_with(r#"<shape type="obj"><string name="filename" value="missing.obj"/></shape>"#)),
                         Err(SceneLoadError::Obj(_))));
        assert!(matches!(load(r#"<scene><integrator type="path"/></scene>"#),
                         Err(SceneLoadError::MissingField(_))));
        assert!(load("<scene><shape type=\"cube\"></scene>").is_err());
        assert!(load("<film/>").is_err());
    }

    #[test]
    fn test_heterogeneous_medium_with_volumes() {
        let xml = scene_with(r#"
            <volume type="constvolume" id="fog"><float name="value" value="0.5"/></volume>
            <medium type="heterogeneous">
                <ref name="density" id="fog"/>
                <volume type="constvolume" name="albedo"><rgb name="value" value="0.9"/></volume>
                <float name="scale" value="4"/>
                <shape type="cube"/>
            </medium>"#);
        let desc = load(&xml).expect("valid medium");
        let medium = desc.scene.medium().expect("medium");
        assert!((medium.sigma_t(&Vector3f::zeros()).r() - 2.0).abs() < 1e-5);
        assert!((medium.albedo(&Vector3f::zeros()).g() - 0.9).abs() < 1e-5);
        assert!(medium.bounding_shape().is_some());
    }

    #[test]
    fn test_transform_order() {
        let element = XmlElement {
            tag: "transform".to_string(),
            attrs: vec![],
            children: vec![
                XmlElement { tag: "translate".to_string(), attrs: vec![("x".to_string(), "1".to_string())],
                             children: vec![] },
                XmlElement { tag: "scale".to_string(), attrs: vec![("value".to_string(), "2".to_string())],
                             children: vec![] },
            ],
        };
        let t = parse_transform(&element).expect("valid transform");
        let p = t.apply_point(Vector3f::zeros());
        assert!((p - Vector3f::new(2.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
