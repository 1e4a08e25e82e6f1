// Copyright @yucwang 2026

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::core::bsdf::BSDF;
use crate::core::emitter::Emitter;
use crate::core::error::SceneLoadError;
use crate::core::integrator::Integrator;
use crate::core::medium::Medium;
use crate::core::phase::PhaseFunction;
use crate::core::properties::PropertyList;
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::core::texture::Texture;
use crate::core::volume::{Volume, VolumeDataType};
use crate::emitters::constant::ConstantEnvironment;
use crate::emitters::point::PointEmitter;
use crate::integrators::direct_ems::DirectEmsIntegrator;
use crate::integrators::direct_mats::DirectMatsIntegrator;
use crate::integrators::direct_mis::DirectMisIntegrator;
use crate::integrators::path::PathIntegrator;
use crate::integrators::path_mis::PathMisIntegrator;
use crate::integrators::path_nee::PathNeeIntegrator;
use crate::integrators::single_scat::SingleScatteringIntegrator;
use crate::integrators::vol_path::VolPathIntegrator;
use crate::integrators::PathSettings;
use crate::materials::bumped::BumpedBSDF;
use crate::materials::diffuse::DiffuseBSDF;
use crate::materials::roughconductor::RoughConductorBSDF;
use crate::materials::roughdielectric::RoughDielectricBSDF;
use crate::materials::roughsubstrate::RoughSubstrateBSDF;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::media::heterogeneous_medium::HeterogeneousMedium;
use crate::media::homogeneous_medium::HomogeneousMedium;
use crate::phase::henyey_greenstein::HenyeyGreensteinPhaseFunction;
use crate::phase::isotropic::IsotropicPhaseFunction;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::cube::Cube;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;
use crate::shapes::triangle_mesh::TriangleMesh;
use crate::textures::constant::ConstantTexture;
use crate::textures::image::{FilterMode, ImageTexture, WrapMode};
use crate::volumes::const_volume::ConstantVolume;
use crate::volumes::grid_volume::GridVolume;
use crate::volumes::hgrid_volume::HierarchicalGridVolume;
use crate::volumes::VolumeFilterMode;

/// Objects already built from the nested elements of the one being created.
/// Textures and volumes are keyed by their `name` attribute.
#[derive(Clone, Default)]
pub struct PluginChildren {
    pub textures: HashMap<String, Arc<dyn Texture>>,
    pub volumes: HashMap<String, Arc<dyn Volume>>,
    pub bsdf: Option<Arc<dyn BSDF>>,
    pub phase: Option<Arc<dyn PhaseFunction>>,
    pub shape: Option<Arc<dyn Shape>>,
    pub film: Option<PropertyList>,
}

/// Everything a constructor may read.
pub struct PluginArgs<'a> {
    pub id: Option<String>,
    pub props: &'a PropertyList,
    pub children: &'a PluginChildren,
    pub base_dir: &'a Path,
}

impl<'a> PluginArgs<'a> {
    pub fn new(props: &'a PropertyList, children: &'a PluginChildren, base_dir: &'a Path) -> Self {
        Self { id: None, props, children, base_dir }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Scene-relative file names are resolved against the scene directory.
    pub fn path(&self, name: &str) -> Result<String, SceneLoadError> {
        let file = self.props.string_required(name)?;
        if Path::new(&file).is_absolute() {
            return Ok(file);
        }
        Ok(self.base_dir.join(&file).to_string_lossy().into_owned())
    }

    /// A nested texture called `name`, else a color property, else `default`.
    fn texture(&self, name: &str, default: RGBSpectrum) -> Result<Arc<dyn Texture>, SceneLoadError> {
        if let Some(texture) = self.children.textures.get(name) {
            return Ok(texture.clone());
        }
        Ok(Arc::new(ConstantTexture::new(self.props.color(name, default)?)))
    }
}

pub type BsdfFactory = fn(&PluginArgs) -> Result<Arc<dyn BSDF>, SceneLoadError>;
pub type PhaseFactory = fn(&PluginArgs) -> Result<Arc<dyn PhaseFunction>, SceneLoadError>;
pub type MediumFactory = fn(&PluginArgs) -> Result<Arc<dyn Medium>, SceneLoadError>;
pub type VolumeFactory = fn(&PluginArgs, VolumeDataType) -> Result<Arc<dyn Volume>, SceneLoadError>;
pub type IntegratorFactory = fn(&PluginArgs) -> Result<Arc<dyn Integrator>, SceneLoadError>;
pub type EmitterFactory = fn(&PluginArgs) -> Result<Box<dyn Emitter>, SceneLoadError>;
pub type ShapeFactory = fn(&PluginArgs) -> Result<Arc<dyn Shape>, SceneLoadError>;
pub type TextureFactory = fn(&PluginArgs) -> Result<Arc<dyn Texture>, SceneLoadError>;
pub type SensorFactory = fn(&PluginArgs) -> Result<Arc<dyn Sensor>, SceneLoadError>;

/// Maps the `type` attribute of every scene element family to a constructor.
pub struct Registry {
    bsdfs: HashMap<&'static str, BsdfFactory>,
    phases: HashMap<&'static str, PhaseFactory>,
    media: HashMap<&'static str, MediumFactory>,
    volumes: HashMap<&'static str, VolumeFactory>,
    integrators: HashMap<&'static str, IntegratorFactory>,
    emitters: HashMap<&'static str, EmitterFactory>,
    shapes: HashMap<&'static str, ShapeFactory>,
    textures: HashMap<&'static str, TextureFactory>,
    sensors: HashMap<&'static str, SensorFactory>,
}

fn lookup<F: Copy>(table: &HashMap<&'static str, F>, family: &'static str, name: &str) -> Result<F, SceneLoadError> {
    table.get(name).copied()
        .ok_or_else(|| SceneLoadError::UnknownPlugin { family, name: name.to_string() })
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            bsdfs: HashMap::new(),
            phases: HashMap::new(),
            media: HashMap::new(),
            volumes: HashMap::new(),
            integrators: HashMap::new(),
            emitters: HashMap::new(),
            shapes: HashMap::new(),
            textures: HashMap::new(),
            sensors: HashMap::new(),
        }
    }

    pub fn register_bsdf(&mut self, name: &'static str, factory: BsdfFactory) {
        self.bsdfs.insert(name, factory);
    }

    pub fn register_phase(&mut self, name: &'static str, factory: PhaseFactory) {
        self.phases.insert(name, factory);
    }

    pub fn register_medium(&mut self, name: &'static str, factory: MediumFactory) {
        self.media.insert(name, factory);
    }

    pub fn register_volume(&mut self, name: &'static str, factory: VolumeFactory) {
        self.volumes.insert(name, factory);
    }

    pub fn register_integrator(&mut self, name: &'static str, factory: IntegratorFactory) {
        self.integrators.insert(name, factory);
    }

    pub fn register_emitter(&mut self, name: &'static str, factory: EmitterFactory) {
        self.emitters.insert(name, factory);
    }

    pub fn register_shape(&mut self, name: &'static str, factory: ShapeFactory) {
        self.shapes.insert(name, factory);
    }

    pub fn register_texture(&mut self, name: &'static str, factory: TextureFactory) {
        self.textures.insert(name, factory);
    }

    pub fn register_sensor(&mut self, name: &'static str, factory: SensorFactory) {
        self.sensors.insert(name, factory);
    }

    pub fn create_bsdf(&self, name: &str, args: &PluginArgs) -> Result<Arc<dyn BSDF>, SceneLoadError> {
        let bsdf = lookup(&self.bsdfs, "bsdf", name)?(args)?;
        log::debug!("Created {}.", bsdf.to_string());
        Ok(bsdf)
    }

    pub fn create_phase(&self, name: &str, args: &PluginArgs) -> Result<Arc<dyn PhaseFunction>, SceneLoadError> {
        lookup(&self.phases, "phase", name)?(args)
    }

    pub fn create_medium(&self, name: &str, args: &PluginArgs) -> Result<Arc<dyn Medium>, SceneLoadError> {
        let medium = lookup(&self.media, "medium", name)?(args)?;
        log::info!("Created {}.", medium.to_string());
        Ok(medium)
    }

    /// `default_type` applies when the element carries no `voltype`.
    pub fn create_volume(&self,
                         name: &str,
                         args: &PluginArgs,
                         default_type: VolumeDataType) -> Result<Arc<dyn Volume>, SceneLoadError> {
        let data_type = volume_data_type(args.props, default_type)?;
        lookup(&self.volumes, "volume", name)?(args, data_type)
    }

    pub fn create_integrator(&self, name: &str, args: &PluginArgs) -> Result<Arc<dyn Integrator>, SceneLoadError> {
        let integrator = lookup(&self.integrators, "integrator", name)?(args)?;
        log::info!("Created {}.", integrator.to_string());
        Ok(integrator)
    }

    pub fn create_emitter(&self, name: &str, args: &PluginArgs) -> Result<Box<dyn Emitter>, SceneLoadError> {
        lookup(&self.emitters, "emitter", name)?(args)
    }

    pub fn create_shape(&self, name: &str, args: &PluginArgs) -> Result<Arc<dyn Shape>, SceneLoadError> {
        lookup(&self.shapes, "shape", name)?(args)
    }

    pub fn create_texture(&self, name: &str, args: &PluginArgs) -> Result<Arc<dyn Texture>, SceneLoadError> {
        lookup(&self.textures, "texture", name)?(args)
    }

    pub fn create_sensor(&self, name: &str, args: &PluginArgs) -> Result<Arc<dyn Sensor>, SceneLoadError> {
        lookup(&self.sensors, "sensor", name)?(args)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register_bsdf("diffuse", create_diffuse);
        registry.register_bsdf("roughconductor", create_roughconductor);
        registry.register_bsdf("roughdielectric", create_roughdielectric);
        registry.register_bsdf("roughsubstrate", create_roughsubstrate);
        registry.register_bsdf("bumped", create_bumped);

        registry.register_phase("isotropic", create_isotropic);
        registry.register_phase("pf_fog", create_isotropic);
        registry.register_phase("hg", create_hg);

        registry.register_medium("homogeneous", create_homogeneous);
        registry.register_medium("heterogeneous", create_heterogeneous);

        registry.register_volume("constvolume", create_const_volume);
        registry.register_volume("constVolume", create_const_volume);
        registry.register_volume("gridvolume", create_grid_volume);
        registry.register_volume("gridVolume", create_grid_volume);
        registry.register_volume("Grid data source", create_grid_volume);
        registry.register_volume("hgridvolume", create_hgrid_volume);
        registry.register_volume("HgridVolume", create_hgrid_volume);

        registry.register_integrator("direct_ems", |args| Ok(Arc::new(DirectEmsIntegrator::new(args.id.clone()))));
        registry.register_integrator("direct_mats", |args| Ok(Arc::new(DirectMatsIntegrator::new(args.id.clone()))));
        registry.register_integrator("direct_mis", |args| Ok(Arc::new(DirectMisIntegrator::new(args.id.clone()))));
        registry.register_integrator("single_scat",
                                     |args| Ok(Arc::new(SingleScatteringIntegrator::new(args.id.clone()))));
        registry.register_integrator("path", |args| {
            Ok(Arc::new(PathIntegrator::new(path_settings(args.props, 2)?, args.id.clone())))
        });
        registry.register_integrator("path_nee", |args| {
            Ok(Arc::new(PathNeeIntegrator::new(path_settings(args.props, 2)?, args.id.clone())))
        });
        registry.register_integrator("path_mis", |args| {
            Ok(Arc::new(PathMisIntegrator::new(path_settings(args.props, 3)?, args.id.clone())))
        });
        registry.register_integrator("vol_path", create_vol_path);
        registry.register_integrator("vol_path_integrator", create_vol_path);

        registry.register_emitter("point", create_point);
        registry.register_emitter("constant", create_constant_environment);

        registry.register_shape("obj", create_obj);
        registry.register_shape("rectangle", |args| {
            Ok(Arc::new(Rectangle::new(args.props.transform("to_world")?, args.id.clone())))
        });
        registry.register_shape("cube", |args| {
            Ok(Arc::new(Cube::new(args.props.transform("to_world")?, args.id.clone())))
        });
        registry.register_shape("sphere", create_sphere);

        registry.register_texture("constant", |args| {
            Ok(Arc::new(ConstantTexture::new(args.props.color("value", RGBSpectrum::splat(0.5))?)))
        });
        registry.register_texture("bitmap", create_bitmap);
        registry.register_texture("image", create_bitmap);

        registry.register_sensor("perspective", create_perspective);

        registry
    }
}

fn volume_data_type(props: &PropertyList, default: VolumeDataType) -> Result<VolumeDataType, SceneLoadError> {
    if let Some(index) = props.integer_opt("voltype").ok().flatten() {
        return VolumeDataType::from_index(index as i32)
            .ok_or_else(|| SceneLoadError::Parse(format!("{}: invalid voltype {}", props.owner(), index)));
    }
    match props.string_opt("voltype")? {
        Some(name) => VolumeDataType::from_name(&name)
            .ok_or_else(|| SceneLoadError::Parse(format!("{}: invalid voltype \"{}\"", props.owner(), name))),
        None => Ok(default),
    }
}

/// `maxDepth` of -1 (the default) leaves the path length unbounded.
fn path_settings(props: &PropertyList, rr_depth: u32) -> Result<PathSettings, SceneLoadError> {
    let max_depth = match props.integer_opt("maxDepth")? {
        Some(depth) => depth,
        None => props.integer("max_depth", -1)?,
    };
    let rr_depth = props.integer("rrDepth", rr_depth as i64)?.max(0) as u32;
    Ok(PathSettings::new(rr_depth)
        .with_max_depth(if max_depth < 0 { None } else { Some(max_depth as u32) })
        .with_rr(props.boolean("rr", true)?))
}

fn create_vol_path(args: &PluginArgs) -> Result<Arc<dyn Integrator>, SceneLoadError> {
    Ok(Arc::new(VolPathIntegrator::new(path_settings(args.props, 3)?, args.id.clone())))
}

fn alpha(props: &PropertyList) -> Result<Float, SceneLoadError> {
    props.float("alpha", 0.1)
}

fn create_diffuse(args: &PluginArgs) -> Result<Arc<dyn BSDF>, SceneLoadError> {
    let name = if args.children.textures.contains_key("albedo") || args.props.contains("albedo") {
        "albedo"
    } else {
        "reflectance"
    };
    Ok(Arc::new(DiffuseBSDF::new(args.texture(name, RGBSpectrum::splat(0.5))?, args.id.clone())))
}

fn create_roughconductor(args: &PluginArgs) -> Result<Arc<dyn BSDF>, SceneLoadError> {
    let r0 = args.props.color("R0", RGBSpectrum::splat(0.5))?;
    Ok(Arc::new(RoughConductorBSDF::new(alpha(args.props)?, r0, args.id.clone())))
}

fn create_roughdielectric(args: &PluginArgs) -> Result<Arc<dyn BSDF>, SceneLoadError> {
    let props = args.props;
    Ok(Arc::new(RoughDielectricBSDF::new(alpha(props)?,
                                         props.float("intIOR", 1.5046)?,
                                         props.float("extIOR", 1.000277)?,
                                         props.color("ka", RGBSpectrum::splat(1.0))?,
                                         args.id.clone())))
}

fn create_roughsubstrate(args: &PluginArgs) -> Result<Arc<dyn BSDF>, SceneLoadError> {
    let props = args.props;
    Ok(Arc::new(RoughSubstrateBSDF::new(alpha(props)?,
                                        props.float("intIOR", 1.5046)?,
                                        props.float("extIOR", 1.000277)?,
                                        args.texture("kd", RGBSpectrum::splat(0.5))?,
                                        args.id.clone())))
}

fn create_bumped(args: &PluginArgs) -> Result<Arc<dyn BSDF>, SceneLoadError> {
    let displacement = args.children.textures.get("displacement")
        .or_else(|| args.children.textures.values().next())
        .cloned()
        .ok_or_else(|| SceneLoadError::MissingField(format!("{}.displacement", args.props.owner())))?;
    Ok(Arc::new(BumpedBSDF::new(args.children.bsdf.clone(), displacement, args.id.clone())))
}

fn create_isotropic(args: &PluginArgs) -> Result<Arc<dyn PhaseFunction>, SceneLoadError> {
    Ok(Arc::new(IsotropicPhaseFunction::new(args.id.clone())))
}

fn create_hg(args: &PluginArgs) -> Result<Arc<dyn PhaseFunction>, SceneLoadError> {
    let g = args.props.float("g", 0.0)?;
    if g <= -1.0 || g >= 1.0 {
        return Err(SceneLoadError::Parse(format!("{}: g = {} is outside (-1, 1)", args.props.owner(), g)));
    }
    Ok(Arc::new(HenyeyGreensteinPhaseFunction::new(g, args.id.clone())))
}

fn default_phase(args: &PluginArgs) -> Arc<dyn PhaseFunction> {
    args.children.phase.clone().unwrap_or_else(|| Arc::new(IsotropicPhaseFunction::default()))
}

fn create_homogeneous(args: &PluginArgs) -> Result<Arc<dyn Medium>, SceneLoadError> {
    let props = args.props;
    let sigma_a = match props.color_opt("sigma_a")? {
        Some(sigma_a) => sigma_a,
        None => props.color("mu_a", RGBSpectrum::splat(0.1))?,
    };
    let sigma_s = match props.color_opt("sigma_s")? {
        Some(sigma_s) => sigma_s,
        None => props.color("mu_s", RGBSpectrum::splat(0.6))?,
    };
    let scale = props.float("scale", 1.0)?;

    let mut medium = HomogeneousMedium::new(sigma_a * scale, sigma_s * scale, args.id.clone())
        .with_phase_function(default_phase(args));
    if let Some(shape) = args.children.shape.clone() {
        medium = medium.with_bounding_shape(shape);
    }
    Ok(Arc::new(medium))
}

fn create_heterogeneous(args: &PluginArgs) -> Result<Arc<dyn Medium>, SceneLoadError> {
    let props = args.props;
    let density: Arc<dyn Volume> = match args.children.volumes.get("density") {
        Some(volume) => volume.clone(),
        None => match props.float_opt("density")? {
            Some(value) => Arc::new(ConstantVolume::density(value, None)),
            None => return Err(SceneLoadError::MissingField(format!("{}.density", props.owner()))),
        },
    };
    if density.data_type() != VolumeDataType::Density {
        return Err(SceneLoadError::Parse(format!("{}: density volume holds {:?} data",
                                                 props.owner(), density.data_type())));
    }

    let mut medium = HeterogeneousMedium::new(density, args.id.clone())
        .with_scale(props.float("scale", 1.0)?)
        .with_albedo(props.color("albedo", RGBSpectrum::splat(1.0))?)
        .with_phase_function(default_phase(args));
    if let Some(albedo) = args.children.volumes.get("albedo") {
        if albedo.data_type() == VolumeDataType::Orientation {
            return Err(SceneLoadError::Parse(format!("{}: albedo lookups on an orientation volume", props.owner())));
        }
        medium = medium.with_albedo_volume(albedo.clone());
    }
    if let Some(orientation) = args.children.volumes.get("orientation") {
        medium = medium.with_orientation_volume(orientation.clone());
    }
    if let Some(shape) = args.children.shape.clone() {
        medium = medium.with_bounding_shape(shape);
    }
    Ok(Arc::new(medium))
}

fn create_const_volume(args: &PluginArgs, data_type: VolumeDataType) -> Result<Arc<dyn Volume>, SceneLoadError> {
    let props = args.props;
    let id = args.id.clone();
    Ok(match data_type {
        VolumeDataType::Density => Arc::new(ConstantVolume::density(props.float("value", 1.0)?, id)),
        VolumeDataType::Albedo => Arc::new(ConstantVolume::albedo(props.color("value", RGBSpectrum::splat(1.0))?, id)),
        VolumeDataType::Orientation => {
            Arc::new(ConstantVolume::orientation(props.vector("value", Vector3f::new(0.0, 0.0, 1.0))?, id))
        }
    })
}

fn filter_mode(props: &PropertyList) -> Result<VolumeFilterMode, SceneLoadError> {
    let name = props.string("filter", "trilinear")?;
    VolumeFilterMode::from_name(&name)
        .ok_or_else(|| SceneLoadError::Parse(format!("{}: unknown filter \"{}\"", props.owner(), name)))
}

fn create_grid_volume(args: &PluginArgs, data_type: VolumeDataType) -> Result<Arc<dyn Volume>, SceneLoadError> {
    let grid = GridVolume::from_file(&args.path("filename")?, data_type, args.id.clone())?
        .with_filter_mode(filter_mode(args.props)?);
    let grid = if args.props.contains("to_world") {
        grid.with_transform(args.props.transform("to_world")?)
    } else {
        grid
    };
    Ok(Arc::new(grid))
}

fn create_hgrid_volume(args: &PluginArgs, data_type: VolumeDataType) -> Result<Arc<dyn Volume>, SceneLoadError> {
    let dictionary = if args.props.contains("dictionary") { args.path("dictionary")? } else { args.path("filename")? };
    let prefix = args.path("prefix")?;
    let postfix = args.props.string("postfix", ".vol")?;
    Ok(Arc::new(HierarchicalGridVolume::from_file(&dictionary, &prefix, &postfix, data_type, args.id.clone())?))
}

fn create_point(args: &PluginArgs) -> Result<Box<dyn Emitter>, SceneLoadError> {
    let props = args.props;
    let position = props.point("position", Vector3f::zeros())?;
    if let Some(power) = props.color_opt("power")? {
        return Ok(Box::new(PointEmitter::from_power(position, power, args.id.clone())));
    }
    let intensity = props.color("intensity", RGBSpectrum::splat(1.0))?;
    Ok(Box::new(PointEmitter::new(position, intensity, args.id.clone())))
}

fn create_constant_environment(args: &PluginArgs) -> Result<Box<dyn Emitter>, SceneLoadError> {
    let radiance = args.props.color("radiance", RGBSpectrum::splat(1.0))?;
    Ok(Box::new(ConstantEnvironment::new(radiance, args.id.clone())))
}

fn create_obj(args: &PluginArgs) -> Result<Arc<dyn Shape>, SceneLoadError> {
    let to_world = args.props.transform("to_world")?;
    Ok(Arc::new(TriangleMesh::from_obj(&args.path("filename")?, &to_world, args.id.clone())?))
}

fn create_sphere(args: &PluginArgs) -> Result<Arc<dyn Shape>, SceneLoadError> {
    let props = args.props;
    let radius = props.float("radius", 1.0)?;
    if radius <= 0.0 {
        return Err(SceneLoadError::Parse(format!("{}: sphere radius must be positive", props.owner())));
    }
    Ok(Arc::new(Sphere::new(props.point("center", Vector3f::zeros())?, radius, args.id.clone())))
}

fn create_bitmap(args: &PluginArgs) -> Result<Arc<dyn Texture>, SceneLoadError> {
    let props = args.props;
    let path = args.path("filename")?;
    let srgb = !props.boolean("raw", false)?;
    let mut texture = ImageTexture::from_file(&path, srgb).map_err(SceneLoadError::Texture)?
        .with_scale(props.float("scale", 1.0)?);
    if let Some(name) = props.string_opt("filter_type")? {
        let mode = FilterMode::from_name(&name)
            .ok_or_else(|| SceneLoadError::Parse(format!("{}: unknown filter_type \"{}\"", props.owner(), name)))?;
        texture = texture.with_filter_mode(mode);
    }
    if let Some(name) = props.string_opt("wrap_mode")? {
        let mode = WrapMode::from_name(&name)
            .ok_or_else(|| SceneLoadError::Parse(format!("{}: unknown wrap_mode \"{}\"", props.owner(), name)))?;
        texture = texture.with_wrap_mode(mode);
    }
    Ok(Arc::new(texture))
}

fn create_perspective(args: &PluginArgs) -> Result<Arc<dyn Sensor>, SceneLoadError> {
    let props = args.props;
    let (width, height) = match args.children.film.as_ref() {
        Some(film) => (film.integer("width", 768)?, film.integer("height", 576)?),
        None => (768, 576),
    };
    if width <= 0 || height <= 0 {
        return Err(SceneLoadError::Parse(format!("{}: film size must be positive", props.owner())));
    }
    let camera = PerspectiveCamera::new(props.transform("to_world")?,
                                        props.float("fov", 45.0)?,
                                        width as usize,
                                        height as usize,
                                        args.id.clone())
        .with_clip_planes(props.float("nearClip", 1e-2)?, props.float("farClip", 1e4)?);
    Ok(Arc::new(camera))
}
