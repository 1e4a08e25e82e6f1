use std::fs;
use std::path::Path;

use wavefront_obj::{obj, ParseError};

use crate::core::error::ObjLoadError;
use crate::math::constants::{ Vector2f, Vector3f };

/// One corner of a triangle: position index plus optional uv and normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceVertex {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

/// Flattened triangle soup shared by every object of an OBJ file.
#[derive(Debug, Default)]
pub struct MeshData {
    pub positions: Vec<Vector3f>,
    pub normals: Vec<Vector3f>,
    pub uvs: Vec<Vector2f>,
    pub faces: Vec<[FaceVertex; 3]>,
}

impl MeshData {
    pub fn from_obj_set(obj_set: obj::ObjSet) -> Self {
        let mut data = MeshData::default();
        for object in obj_set.objects {
            // Indices are local to each object.
            let p_offset = data.positions.len();
            let uv_offset = data.uvs.len();
            let n_offset = data.normals.len();

            data.positions.extend(object.vertices.iter()
                .map(|v| Vector3f::new(v.x as f32, v.y as f32, v.z as f32)));
            data.normals.extend(object.normals.iter()
                .map(|n| Vector3f::new(n.x as f32, n.y as f32, n.z as f32)));
            data.uvs.extend(object.tex_vertices.iter()
                .map(|t| Vector2f::new(t.u as f32, t.v as f32)));

            for geom in object.geometry {
                for shape in geom.shapes {
                    if let obj::Primitive::Triangle(a, b, c) = shape.primitive {
                        let corner = |idx: obj::VTNIndex| FaceVertex {
                            position: idx.0 + p_offset,
                            uv: idx.1.map(|i| i + uv_offset),
                            normal: idx.2.map(|i| i + n_offset),
                        };
                        data.faces.push([corner(a), corner(b), corner(c)]);
                    }
                }
            }
        }
        data
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }
}

pub fn load_mesh_data<P: AsRef<Path>>(path: P) -> Result<MeshData, ObjLoadError> {
    let obj_set = load_obj_from_file(path)?;
    Ok(MeshData::from_obj_set(obj_set))
}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ParseError> {
    let triangulated = triangulate_faces(input.as_ref());
    obj::parse(triangulated)
}

pub fn load_obj_from_file<P: AsRef<Path>>(path: P) -> Result<obj::ObjSet, ObjLoadError> {
    let data = fs::read_to_string(path)?;
    let obj_set = load_obj_from_str(data)?;
    Ok(obj_set)
}

fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("f ") || trimmed.starts_with("f\t") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() > 4 {
                let base = parts[1];
                for i in 2..(parts.len() - 1) {
                    out.push_str("f ");
                    out.push_str(base);
                    out.push(' ');
                    out.push_str(parts[i]);
                    out.push(' ');
                    out.push_str(parts[i + 1]);
                    out.push('\n');
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
