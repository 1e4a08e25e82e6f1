// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

const SAH_BUCKETS: usize = 12;
const TRAVERSAL_COST: Float = 1.0;

#[derive(Clone, Copy)]
enum NodeKind {
    /// `indices[start..start + count]`.
    Leaf { start: usize, count: usize },
    /// The first child follows its parent directly.
    Interior { second: usize, axis: usize },
}

#[derive(Clone, Copy)]
struct BVHNode {
    bounds: AABB,
    kind: NodeKind,
}

/// Bounding volume hierarchy over opaque primitives. Only bounds and
/// centroids are stored; primitive tests are supplied by the caller.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    prim_bounds: Vec<AABB>,
    prim_centroids: Vec<Vector3f>,
    max_leaf_size: usize,
}

#[derive(Clone, Copy, Default)]
struct Bucket {
    count: usize,
    bounds: AABB,
}

fn bucket_of(c: Float, lo: Float, hi: Float) -> usize {
    (((c - lo) / (hi - lo) * SAH_BUCKETS as Float) as usize).min(SAH_BUCKETS - 1)
}

impl BVH {
    pub fn new(prim_bounds: Vec<AABB>, prim_centroids: Vec<Vector3f>) -> Self {
        Self::with_max_leaf_size(prim_bounds, prim_centroids, 4)
    }

    pub fn with_max_leaf_size(prim_bounds: Vec<AABB>, prim_centroids: Vec<Vector3f>, max_leaf_size: usize) -> Self {
        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * prim_bounds.len()),
            indices: (0..prim_bounds.len()).collect(),
            prim_bounds,
            prim_centroids,
            max_leaf_size: max_leaf_size.max(1),
        };
        if !bvh.indices.is_empty() {
            bvh.build(0, bvh.indices.len());
        }
        log::debug!("BVH over {} primitives, {} nodes.", bvh.indices.len(), bvh.nodes.len());
        bvh
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounds(&self) -> AABB {
        self.nodes.first().map(|n| n.bounds).unwrap_or_default()
    }

    /// Closest hit. `hit_fn` returns a payload and its ray distance; the
    /// query ray is shortened after every accepted hit.
    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
        where F: FnMut(usize, &Ray3f) -> Option<(T, Float)>
    {
        let mut ray = *ray;
        let mut closest: Option<(usize, T)> = None;
        self.traverse(&mut ray, |prim, ray| {
            if let Some((hit, t)) = hit_fn(prim, &*ray) {
                if ray.update(t) {
                    closest = Some((prim, hit));
                }
            }
            false
        });
        closest
    }

    /// Any hit, for shadow rays.
    pub fn ray_intersection_t<F>(&self, ray: &Ray3f, mut hit_fn: F) -> bool
        where F: FnMut(usize, &Ray3f) -> bool
    {
        let mut ray = *ray;
        self.traverse(&mut ray, |prim, ray| hit_fn(prim, &*ray))
    }

    /// Visits leaves near child first and culls boxes against the current,
    /// possibly shortened, ray. `visit` returns true to stop.
    fn traverse<V>(&self, ray: &mut Ray3f, mut visit: V) -> bool
        where V: FnMut(usize, &mut Ray3f) -> bool
    {
        if self.nodes.is_empty() {
            return false;
        }
        let dir = ray.dir();
        let mut stack: Vec<usize> = Vec::with_capacity(64);
        stack.push(0);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.bounds.ray_intersect(ray) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, count } => {
                    for &prim in &self.indices[start..start + count] {
                        if visit(prim, ray) {
                            return true;
                        }
                    }
                }
                NodeKind::Interior { second, axis } => {
                    if dir[axis] < 0.0 {
                        stack.push(index + 1);
                        stack.push(second);
                    } else {
                        stack.push(second);
                        stack.push(index + 1);
                    }
                }
            }
        }
        false
    }

    fn push_leaf(&mut self, bounds: AABB, start: usize, end: usize) -> usize {
        self.nodes.push(BVHNode { bounds, kind: NodeKind::Leaf { start, count: end - start } });
        self.nodes.len() - 1
    }

    fn build(&mut self, start: usize, end: usize) -> usize {
        let mut bounds = AABB::default();
        let mut centroids = AABB::default();
        for &prim in &self.indices[start..end] {
            bounds.expand_by_aabb(&self.prim_bounds[prim]);
            centroids.expand_by_point(&self.prim_centroids[prim]);
        }

        let count = end - start;
        let axis = centroids.max_extent();
        let (lo, hi) = (centroids.p_min[axis], centroids.p_max[axis]);
        if count <= self.max_leaf_size || hi - lo < 1e-6 {
            return self.push_leaf(bounds, start, end);
        }

        let split = match self.sah_split(start, end, axis, lo, hi, &bounds) {
            Some(split) => split,
            None => return self.push_leaf(bounds, start, end),
        };

        let mut mid = start;
        for i in start..end {
            let prim = self.indices[i];
            if bucket_of(self.prim_centroids[prim][axis], lo, hi) <= split {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }
        if mid == start || mid == end {
            return self.push_leaf(bounds, start, end);
        }

        let index = self.nodes.len();
        self.nodes.push(BVHNode { bounds, kind: NodeKind::Interior { second: 0, axis } });
        self.build(start, mid);
        let second = self.build(mid, end);
        self.nodes[index].kind = NodeKind::Interior { second, axis };
        index
    }

    /// Last bucket of the left side under the surface area heuristic, or
    /// `None` when a leaf is cheaper.
    fn sah_split(&self, start: usize, end: usize, axis: usize, lo: Float, hi: Float, bounds: &AABB) -> Option<usize> {
        let mut buckets = [Bucket::default(); SAH_BUCKETS];
        for &prim in &self.indices[start..end] {
            let bucket = &mut buckets[bucket_of(self.prim_centroids[prim][axis], lo, hi)];
            bucket.count += 1;
            bucket.bounds.expand_by_aabb(&self.prim_bounds[prim]);
        }

        // Right-hand sweep first, then the left sweep picks the cheapest split.
        let mut right_cost = [0.0 as Float; SAH_BUCKETS];
        let mut acc = Bucket::default();
        for i in (1..SAH_BUCKETS).rev() {
            acc.count += buckets[i].count;
            acc.bounds.expand_by_aabb(&buckets[i].bounds);
            right_cost[i] = if acc.count > 0 { acc.count as Float * acc.bounds.surface_area() } else { 0.0 };
        }

        let area = bounds.surface_area().max(1e-6);
        let mut best: Option<(usize, Float)> = None;
        let mut acc = Bucket::default();
        for i in 0..(SAH_BUCKETS - 1) {
            acc.count += buckets[i].count;
            acc.bounds.expand_by_aabb(&buckets[i].bounds);
            let left_cost = if acc.count > 0 { acc.count as Float * acc.bounds.surface_area() } else { 0.0 };
            let cost = TRAVERSAL_COST + (left_cost + right_cost[i + 1]) / area;
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((i, cost));
            }
        }

        best.filter(|&(_, cost)| cost < (end - start) as Float).map(|(split, _)| split)
    }
}

#[cfg(test)]
mod tests {
    use super::BVH;
    use crate::core::shape::Shape;
    use crate::math::constants::{Float, Vector3f};
    use crate::math::ray::Ray3f;
    use crate::shapes::triangle::Triangle;

    fn build(triangles: &[Triangle], leaf: usize) -> BVH {
        let bounds: Vec<_> = triangles.iter().map(|t| t.bounding_box()).collect();
        let centroids: Vec<_> = bounds.iter().map(|b| b.center()).collect();
        BVH::with_max_leaf_size(bounds, centroids, leaf)
    }

    fn closest(bvh: &BVH, triangles: &[Triangle], ray: &Ray3f) -> Option<(usize, Float)> {
        bvh.ray_intersection(ray, |prim, ray| triangles[prim].intersect(ray).map(|(t, _, _)| (t, t)))
    }

    #[test]
    fn test_matches_brute_force() {
        // A scattered grid of small triangles at varying depths.
        let triangles: Vec<Triangle> = (0..64)
            .map(|i| {
                let x = (i % 8) as Float * 1.5;
                let y = (i / 8) as Float * 1.5;
                let z = ((i * 7) % 5) as Float;
                Triangle::new(Vector3f::new(x, y, z),
                              Vector3f::new(x + 1.0, y, z),
                              Vector3f::new(x, y + 1.0, z))
            })
            .collect();
        let bvh = build(&triangles, 2);
        assert_eq!(bvh.len(), 64);

        for i in 0..64 {
            let origin = Vector3f::new((i % 8) as Float * 1.5 + 0.2, (i / 8) as Float * 1.5 + 0.3, 10.0);
            let ray = Ray3f::new(origin, Vector3f::new(0.01, -0.02, -1.0), None, None);
            let brute = triangles.iter().enumerate()
                .filter_map(|(k, tri)| tri.intersect(&ray).map(|(t, _, _)| (k, t)))
                .fold(None, |best: Option<(usize, Float)>, (k, t)| match best {
                    Some((_, bt)) if bt <= t => best,
                    _ => Some((k, t)),
                });
            let found = closest(&bvh, &triangles, &ray);
            assert_eq!(found.map(|h| h.0), brute.map(|h| h.0), "ray {}", i);
        }

        let miss = Ray3f::new(Vector3f::new(100.0, 100.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(closest(&bvh, &triangles, &miss).is_none());
        assert!(!bvh.ray_intersection_t(&miss, |prim, ray| triangles[prim].intersect(ray).is_some()));
    }

    #[test]
    fn test_closest_of_stacked_primitives() {
        // Twenty parallel triangles along +z; the ray must report the first.
        let triangles: Vec<Triangle> = (0..20)
            .map(|i| {
                let z = 10.0 - i as Float * 0.5;
                Triangle::new(Vector3f::new(-1.0, -1.0, z),
                              Vector3f::new(1.0, -1.0, z),
                              Vector3f::new(0.0, 1.0, z))
            })
            .collect();
        let bvh = build(&triangles, 2);

        for &dir in &[1.0, -1.0] {
            let origin = Vector3f::new(0.0, 0.0, if dir > 0.0 { 0.0 } else { 20.0 });
            let ray = Ray3f::new(origin, Vector3f::new(0.0, 0.0, dir), None, None);
            let (idx, t) = closest(&bvh, &triangles, &ray).expect("stack should be hit");
            if dir > 0.0 {
                assert_eq!(idx, 19);
                assert!((t - 0.5).abs() < 1e-5);
            } else {
                assert_eq!(idx, 0);
                assert!((t - 10.0).abs() < 1e-5);
            }
            assert!(bvh.ray_intersection_t(&ray, |prim, ray| triangles[prim].intersect(ray).is_some()));
        }
    }

    #[test]
    fn test_empty_hierarchy() {
        let bvh = BVH::new(Vec::new(), Vec::new());
        assert!(bvh.is_empty());
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(bvh.ray_intersection(&ray, |_, _| Some(((), 1.0))).is_none());
        assert!(!bvh.bounds().is_valid());
    }
}
