use crate::math::Point3;
use crate::mesh::{Aabb, TriangleMesh};

use super::CollisionDetector;

/// Built-in surface contact test.
///
/// Triangles outside the overlap of both bounding boxes are skipped; the
/// remaining pairs are tested edge against triangle in both directions.
/// A mesh fully enclosed by another without touching it does not collide.
#[derive(Debug, Clone, Copy)]
pub struct TriangleCollision {
    /// Tolerance for parallel edges and box overlap.
    pub epsilon: f64,
}

impl Default for TriangleCollision {
    fn default() -> Self {
        Self { epsilon: 1e-9 }
    }
}

impl CollisionDetector for TriangleCollision {
    fn collides(&self, a: &TriangleMesh, b: &TriangleMesh) -> bool {
        let (Some(box_a), Some(box_b)) = (a.bounds(), b.bounds()) else {
            return false;
        };
        if !box_a.intersects(&box_b, self.epsilon) {
            return false;
        }

        let candidates = |mesh: &TriangleMesh, other: &Aabb| -> Vec<([Point3; 3], Aabb)> {
            mesh.triangles()
                .filter_map(|tri| {
                    let bounds = Aabb::from_points(&tri)?;
                    bounds.intersects(other, self.epsilon).then_some((tri, bounds))
                })
                .collect()
        };
        let tris_a = candidates(a, &box_b);
        let tris_b = candidates(b, &box_a);

        tris_a.iter().any(|(ta, box_ta)| {
            tris_b.iter().any(|(tb, box_tb)| {
                box_ta.intersects(box_tb, self.epsilon) && triangles_intersect(ta, tb, self.epsilon)
            })
        })
    }
}

/// Whether any edge of either triangle passes through the other.
fn triangles_intersect(a: &[Point3; 3], b: &[Point3; 3], epsilon: f64) -> bool {
    let crosses = |edges: &[Point3; 3], tri: &[Point3; 3]| {
        (0..3).any(|i| edge_hits_triangle(&edges[i], &edges[(i + 1) % 3], tri, epsilon))
    };
    crosses(a, b) || crosses(b, a)
}

/// Möller–Trumbore test restricted to the segment `e0 → e1`.
fn edge_hits_triangle(e0: &Point3, e1: &Point3, tri: &[Point3; 3], epsilon: f64) -> bool {
    let direction = e1 - e0;
    if direction.norm_squared() < epsilon * epsilon {
        return false;
    }

    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];
    let h = direction.cross(&edge2);
    let det = edge1.dot(&h);
    if det.abs() < epsilon {
        return false;
    }

    let f = 1.0 / det;
    let s = e0 - tri[0];
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    let t = f * edge2.dot(&q);
    (-epsilon..=1.0 + epsilon).contains(&t)
}
