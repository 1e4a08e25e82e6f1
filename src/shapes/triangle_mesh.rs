// Copyright @yucwang 2023

use super::triangle::Triangle;

use crate::core::computation_node::{ ComputationNode, generate_node_id };
use crate::core::error::ObjLoadError;
use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::core::bvh::BVH;
use crate::io::obj_utils::{ self, FaceVertex, MeshData };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use crate::math::warp::square_to_triangle;

use std::vec::Vec;

pub struct TriangleMesh {
    id: String,
    normals: Vec<Vector3f>,
    uvs: Vec<Vector2f>,
    faces: Vec<[FaceVertex; 3]>,
    triangles: Vec<Triangle>,
    // Running sum of triangle areas, used to pick a triangle by area.
    area_cdf: Vec<Float>,
    total_area: Float,
    bvh: BVH,
}

impl TriangleMesh {
    pub fn from_obj(path: &str, to_world: &Transform, id: Option<String>) -> Result<Self, ObjLoadError> {
        let data = obj_utils::load_mesh_data(path)?;
        log::info!("Loaded mesh {} with {} triangles.", path, data.triangle_count());
        Ok(Self::from_mesh_data(data, to_world, id))
    }

    pub fn from_mesh_data(data: MeshData, to_world: &Transform, id: Option<String>) -> Self {
        let positions: Vec<Vector3f> = data.positions.iter()
            .map(|p| to_world.apply_point(*p))
            .collect();
        let normals: Vec<Vector3f> = data.normals.iter()
            .map(|n| to_world.apply_normal(*n).normalize())
            .collect();

        let triangles: Vec<Triangle> = data.faces.iter()
            .map(|f| Triangle::new(positions[f[0].position],
                                   positions[f[1].position],
                                   positions[f[2].position]))
            .collect();

        let mut area_cdf = Vec::with_capacity(triangles.len());
        let mut total_area = 0.0;
        for tri in &triangles {
            total_area += tri.surface_area();
            area_cdf.push(total_area);
        }

        let prim_bounds: Vec<AABB> = triangles.iter().map(|t| t.bounding_box()).collect();
        let prim_centroids: Vec<Vector3f> = prim_bounds.iter().map(|b| b.center()).collect();
        let bvh = BVH::new(prim_bounds, prim_centroids);

        Self {
            id: id.unwrap_or_else(|| generate_node_id("TriangleMesh")),
            normals,
            uvs: data.uvs,
            faces: data.faces,
            triangles,
            area_cdf,
            total_area,
            bvh,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Builds the surface record for triangle `idx` at barycentrics `(b0, b1, b2)`.
    fn surface_at(&self, idx: usize, bary: &Vector3f, p: Vector3f, t: Float) -> SurfaceIntersection {
        let face = &self.faces[idx];
        let geo_n = self.triangles[idx].geometric_normal();

        let sh_n = match (face[0].normal, face[1].normal, face[2].normal) {
            (Some(a), Some(b), Some(c)) => {
                let n = self.normals[a] * bary.x + self.normals[b] * bary.y + self.normals[c] * bary.z;
                if n.norm() > 0.0 { n.normalize() } else { geo_n }
            }
            _ => geo_n,
        };
        // Keep the geometric normal on the side the mesh author meant.
        let geo_n = if geo_n.dot(&sh_n) < 0.0 { -geo_n } else { geo_n };

        let uv = match (face[0].uv, face[1].uv, face[2].uv) {
            (Some(a), Some(b), Some(c)) => {
                self.uvs[a] * bary.x + self.uvs[b] * bary.y + self.uvs[c] * bary.z
            }
            _ => Vector2f::new(bary.y, bary.z),
        };

        SurfaceIntersection::new(p, geo_n, sh_n, uv, t)
    }
}

impl ComputationNode for TriangleMesh {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("TriangleMesh[triangles = {}, area = {}]", self.triangles.len(), self.total_area)
    }
}

impl Shape for TriangleMesh {
    fn bounding_box(&self) -> AABB {
        self.bvh.bounds()
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (idx, (t, b1, b2)) = self.bvh.ray_intersection(ray, |prim_idx, ray| {
            self.triangles[prim_idx].intersect(ray).map(|hit| (hit, hit.0))
        })?;
        let bary = Vector3f::new(1.0 - b1 - b2, b1, b2);
        Some(self.surface_at(idx, &bary, ray.at(t), t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.bvh.ray_intersection_t(ray, |prim_idx, ray| {
            self.triangles[prim_idx].intersect(ray).is_some()
        })
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        if self.triangles.is_empty() || self.total_area <= 0.0 {
            let n = Vector3f::new(0.0, 0.0, 1.0);
            let intersection = SurfaceIntersection::new(Vector3f::zeros(), n, n, Vector2f::zeros(), 0.0);
            return SurfaceSampleRecord::new(intersection, 0.0);
        }

        // Select by area, then stretch the used part of u.x back to [0, 1).
        let target = u.x * self.total_area;
        let idx = self.area_cdf.partition_point(|c| *c < target).min(self.triangles.len() - 1);
        let start = if idx == 0 { 0.0 } else { self.area_cdf[idx - 1] };
        let tri_area = self.area_cdf[idx] - start;
        let reused = if tri_area > 0.0 {
            ((target - start) / tri_area).max(0.0).min(0.999_999)
        } else {
            0.5
        };

        let bary = square_to_triangle(&Vector2f::new(reused, u.y));
        let (p0, p1, p2) = self.triangles[idx].vertices();
        let p = p0 * bary.x + p1 * bary.y + p2 * bary.z;

        SurfaceSampleRecord::new(self.surface_at(idx, &bary, p, 0.0), 1.0 / self.total_area)
    }

    fn surface_area(&self) -> Float {
        self.total_area
    }
}
