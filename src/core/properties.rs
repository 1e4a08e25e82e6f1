// Copyright @yucwang 2026

use std::collections::HashMap;

use crate::core::error::SceneLoadError;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Float(Float),
    Integer(i64),
    Boolean(bool),
    String(String),
    Color(RGBSpectrum),
    Point(Vector3f),
    Vector(Vector3f),
    Transform(Transform),
}

impl Property {
    fn kind(&self) -> &'static str {
        match self {
            Property::Float(_) => "float",
            Property::Integer(_) => "integer",
            Property::Boolean(_) => "boolean",
            Property::String(_) => "string",
            Property::Color(_) => "color",
            Property::Point(_) => "point",
            Property::Vector(_) => "vector",
            Property::Transform(_) => "transform",
        }
    }
}

/// Named, typed parameters of one scene object. Every plug-in constructor
/// reads its configuration from here, with its own defaults.
#[derive(Debug, Clone, Default)]
pub struct PropertyList {
    owner: String,
    props: HashMap<String, Property>,
}

impl PropertyList {
    pub fn new(owner: &str) -> Self {
        Self { owner: owner.to_string(), props: HashMap::new() }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn set(&mut self, name: &str, value: Property) -> Result<(), SceneLoadError> {
        if self.props.contains_key(name) {
            return Err(SceneLoadError::Parse(
                format!("{}: property \"{}\" was specified twice", self.owner, name)));
        }
        self.props.insert(name.to_string(), value);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    fn mismatch(&self, name: &str, expected: &str, found: &Property) -> SceneLoadError {
        SceneLoadError::Parse(format!("{}: property \"{}\" should be {}, found {}",
                                      self.owner, name, expected, found.kind()))
    }

    fn missing(&self, name: &str) -> SceneLoadError {
        SceneLoadError::MissingField(format!("{}.{}", self.owner, name))
    }

    pub fn float_opt(&self, name: &str) -> Result<Option<Float>, SceneLoadError> {
        match self.props.get(name) {
            None => Ok(None),
            Some(Property::Float(v)) => Ok(Some(*v)),
            Some(Property::Integer(v)) => Ok(Some(*v as Float)),
            Some(other) => Err(self.mismatch(name, "float", other)),
        }
    }

    pub fn float(&self, name: &str, default: Float) -> Result<Float, SceneLoadError> {
        Ok(self.float_opt(name)?.unwrap_or(default))
    }

    pub fn integer_opt(&self, name: &str) -> Result<Option<i64>, SceneLoadError> {
        match self.props.get(name) {
            None => Ok(None),
            Some(Property::Integer(v)) => Ok(Some(*v)),
            Some(other) => Err(self.mismatch(name, "integer", other)),
        }
    }

    pub fn integer(&self, name: &str, default: i64) -> Result<i64, SceneLoadError> {
        Ok(self.integer_opt(name)?.unwrap_or(default))
    }

    pub fn boolean(&self, name: &str, default: bool) -> Result<bool, SceneLoadError> {
        match self.props.get(name) {
            None => Ok(default),
            Some(Property::Boolean(v)) => Ok(*v),
            Some(other) => Err(self.mismatch(name, "boolean", other)),
        }
    }

    pub fn string_opt(&self, name: &str) -> Result<Option<String>, SceneLoadError> {
        match self.props.get(name) {
            None => Ok(None),
            Some(Property::String(v)) => Ok(Some(v.clone())),
            Some(other) => Err(self.mismatch(name, "string", other)),
        }
    }

    pub fn string(&self, name: &str, default: &str) -> Result<String, SceneLoadError> {
        Ok(self.string_opt(name)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn string_required(&self, name: &str) -> Result<String, SceneLoadError> {
        self.string_opt(name)?.ok_or_else(|| self.missing(name))
    }

    /// Colors also accept a bare float, which is splatted to grey.
    pub fn color_opt(&self, name: &str) -> Result<Option<RGBSpectrum>, SceneLoadError> {
        match self.props.get(name) {
            None => Ok(None),
            Some(Property::Color(v)) => Ok(Some(*v)),
            Some(Property::Float(v)) => Ok(Some(RGBSpectrum::splat(*v))),
            Some(other) => Err(self.mismatch(name, "color", other)),
        }
    }

    pub fn color(&self, name: &str, default: RGBSpectrum) -> Result<RGBSpectrum, SceneLoadError> {
        Ok(self.color_opt(name)?.unwrap_or(default))
    }

    pub fn point(&self, name: &str, default: Vector3f) -> Result<Vector3f, SceneLoadError> {
        match self.props.get(name) {
            None => Ok(default),
            Some(Property::Point(v)) | Some(Property::Vector(v)) => Ok(*v),
            Some(other) => Err(self.mismatch(name, "point", other)),
        }
    }

    pub fn vector(&self, name: &str, default: Vector3f) -> Result<Vector3f, SceneLoadError> {
        self.point(name, default)
    }

    pub fn transform(&self, name: &str) -> Result<Transform, SceneLoadError> {
        match self.props.get(name) {
            None => Ok(Transform::default()),
            Some(Property::Transform(t)) => Ok(*t),
            Some(other) => Err(self.mismatch(name, "transform", other)),
        }
    }
}

pub fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>()
        .map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

pub fn parse_integer(value: &str) -> Result<i64, SceneLoadError> {
    value.trim().parse::<i64>()
        .map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

pub fn parse_boolean(value: &str) -> Result<bool, SceneLoadError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(SceneLoadError::Parse(format!("invalid boolean: {}", value))),
    }
}

/// Accepts `"x, y, z"`, `"x y z"` and a single value that fills all three.
pub fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let parts: Vec<&str> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    match parts.len() {
        1 => {
            let v = parse_float(parts[0])?;
            Ok(Vector3f::new(v, v, v))
        }
        3 => Ok(Vector3f::new(parse_float(parts[0])?,
                              parse_float(parts[1])?,
                              parse_float(parts[2])?)),
        _ => Err(SceneLoadError::Parse(format!("invalid vec3: {}", value))),
    }
}

pub fn parse_color(value: &str) -> Result<RGBSpectrum, SceneLoadError> {
    Ok(RGBSpectrum::from_vector(parse_vec3(value)?))
}
