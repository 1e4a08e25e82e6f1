// Copyright @yucwang 2026

use std::fmt;

use wavefront_obj::ParseError;

#[derive(Debug)]
pub enum ObjLoadError {
    Io(std::io::Error),
    Parse(ParseError),
}

impl From<std::io::Error> for ObjLoadError {
    fn from(err: std::io::Error) -> Self {
        ObjLoadError::Io(err)
    }
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

impl fmt::Display for ObjLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjLoadError::Io(err) => write!(f, "io error: {}", err),
            ObjLoadError::Parse(err) => write!(f, "parse error: {}", err),
        }
    }
}

impl std::error::Error for ObjLoadError {}

/// Errors raised while reading VOL grids and hierarchical grid dictionaries.
#[derive(Debug)]
pub enum VolumeLoadError {
    Io(std::io::Error),
    Format(String),
    Unsupported(String),
}

impl From<std::io::Error> for VolumeLoadError {
    fn from(err: std::io::Error) -> Self {
        VolumeLoadError::Io(err)
    }
}

impl fmt::Display for VolumeLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeLoadError::Io(err) => write!(f, "io error: {}", err),
            VolumeLoadError::Format(msg) => write!(f, "malformed volume: {}", msg),
            VolumeLoadError::Unsupported(msg) => write!(f, "unsupported volume: {}", msg),
        }
    }
}

impl std::error::Error for VolumeLoadError {}

/// Everything that can abort scene construction. Rendering never starts
/// once one of these has been produced.
#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(String),
    UnknownPlugin { family: &'static str, name: String },
    DuplicateChild { parent: String, child: &'static str },
    UnsupportedChild { parent: String, child: String },
    Volume(VolumeLoadError),
    Obj(ObjLoadError),
    Texture(String),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl From<VolumeLoadError> for SceneLoadError {
    fn from(err: VolumeLoadError) -> Self {
        SceneLoadError::Volume(err)
    }
}

impl From<ObjLoadError> for SceneLoadError {
    fn from(err: ObjLoadError) -> Self {
        SceneLoadError::Obj(err)
    }
}

impl From<quick_xml::Error> for SceneLoadError {
    fn from(err: quick_xml::Error) -> Self {
        SceneLoadError::Parse(err.to_string())
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(err) => write!(f, "io error: {}", err),
            SceneLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            SceneLoadError::MissingField(name) => write!(f, "missing field: {}", name),
            SceneLoadError::UnknownPlugin { family, name } => {
                write!(f, "unknown {} type: \"{}\"", family, name)
            }
            SceneLoadError::DuplicateChild { parent, child } => {
                write!(f, "{} already has a {} child", parent, child)
            }
            SceneLoadError::UnsupportedChild { parent, child } => {
                write!(f, "{} does not accept a {} child", parent, child)
            }
            SceneLoadError::Volume(err) => write!(f, "volume error: {}", err),
            SceneLoadError::Obj(err) => write!(f, "obj error: {}", err),
            SceneLoadError::Texture(msg) => write!(f, "texture error: {}", msg),
        }
    }
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneLoadError::Io(err) => Some(err),
            SceneLoadError::Volume(err) => Some(err),
            SceneLoadError::Obj(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_volume_error_converts() {
        let err: SceneLoadError = VolumeLoadError::Unsupported("float16".to_string()).into();
        assert!(matches!(err, SceneLoadError::Volume(VolumeLoadError::Unsupported(_))));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("float16"));
    }

    #[test]
    fn test_unknown_plugin_message() {
        let err = SceneLoadError::UnknownPlugin { family: "bsdf", name: "velvet".to_string() };
        assert_eq!(err.to_string(), "unknown bsdf type: \"velvet\"");
    }
}
