mod primitives;

pub use primitives::{make_box, make_tube};
#[cfg(test)]
pub(crate) use primitives::swept_tube;

use crate::math::{Point3, RigidTransform, Vector3, TOLERANCE};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Bounding box of a point set, or `None` when it is empty.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
        }
        Some(aabb)
    }

    /// Whether two boxes overlap, growing both by `tolerance`.
    #[must_use]
    pub fn intersects(&self, other: &Self, tolerance: f64) -> bool {
        (0..3).all(|i| {
            self.min[i] - tolerance <= other.max[i] && other.min[i] - tolerance <= self.max[i]
        })
    }
}

/// An indexed triangle mesh.
///
/// Bone surfaces, cut segments and fixture solids are all carried in this
/// form. `normals` is either empty or holds one unit normal per vertex.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle, counter-clockwise
    /// seen from outside).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Creates a mesh from vertices and triangles, computing vertex normals.
    #[must_use]
    pub fn new(vertices: Vec<Point3>, indices: Vec<[u32; 3]>) -> Self {
        let mut mesh = Self {
            vertices,
            normals: Vec::new(),
            indices,
        };
        mesh.compute_normals();
        mesh
    }

    /// Whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Iterates over triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices.iter().map(|tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Bounding box of the vertices.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Appends another mesh, re-indexing its triangles.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        let keep_normals = self.normals.len() == self.vertices.len()
            && other.normals.len() == other.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        if keep_normals {
            self.normals.extend_from_slice(&other.normals);
        } else {
            self.normals.clear();
        }
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
    }

    /// Moves the mesh in place.
    pub fn transform(&mut self, transform: &RigidTransform) {
        for v in &mut self.vertices {
            *v = transform.apply_point(v);
        }
        for n in &mut self.normals {
            *n = transform.apply_vector(n);
        }
    }

    /// Returns a moved copy of the mesh.
    #[must_use]
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        let mut copy = self.clone();
        copy.transform(transform);
        copy
    }

    /// Recomputes area-weighted vertex normals.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];
        for tri in &self.indices {
            let [a, b, c] = tri.map(|i| self.vertices[i as usize]);
            let face = (b - a).cross(&(c - a));
            for &i in tri {
                normals[i as usize] += face;
            }
        }
        for n in &mut normals {
            *n = n.try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros);
        }
        self.normals = normals;
    }

    /// Index of the vertex nearest to `point`, or `None` for an empty mesh.
    #[must_use]
    pub fn nearest_vertex(&self, point: &Point3) -> Option<usize> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (i, (v - point).norm_squared()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Enclosed volume via the divergence theorem; positive for a closed,
    /// outward-oriented mesh.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum()
    }
}
