use std::collections::HashMap;

use tracing::debug;

use crate::math::intersect_3d::{segment_crossing, strict_signed_distance};
use crate::math::{Point3, Vector3};
use crate::mesh::TriangleMesh;

use super::{chain_edge_segments, edge_key, Contour, EdgeKey, MeshSlicer};

/// Built-in mesh–plane intersection.
///
/// Every triangle straddling the plane contributes one segment between the
/// crossing points of its two straddling edges; segments are then chained
/// through the mesh edges they share.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneSlicer;

impl MeshSlicer for PlaneSlicer {
    fn slice(&self, mesh: &TriangleMesh, origin: &Point3, normal: &Vector3) -> Vec<Contour> {
        let distances: Vec<f64> = mesh
            .vertices
            .iter()
            .map(|v| strict_signed_distance(v, origin, normal))
            .collect();

        let (segments, points) = crossing_segments(mesh, &distances);
        let contours: Vec<Contour> = chain_edge_segments(&segments)
            .into_iter()
            .map(|(keys, closed)| Contour {
                points: keys.iter().filter_map(|k| points.get(k).copied()).collect(),
                closed,
            })
            .collect();

        debug!(
            segments = segments.len(),
            contours = contours.len(),
            "sliced mesh"
        );
        contours
    }
}

/// Segments (as pairs of crossed edges) and the crossing point of each
/// crossed edge.
pub(crate) fn crossing_segments(
    mesh: &TriangleMesh,
    distances: &[f64],
) -> (Vec<(EdgeKey, EdgeKey)>, HashMap<EdgeKey, Point3>) {
    let mut segments = Vec::new();
    let mut points: HashMap<EdgeKey, Point3> = HashMap::new();

    for tri in &mesh.indices {
        let mut crossed = [(0, 0); 2];
        let mut count = 0;
        for k in 0..3 {
            let key = edge_key(tri[k], tri[(k + 1) % 3]);
            let (lo, hi) = (key.0 as usize, key.1 as usize);
            if distances[lo] * distances[hi] > 0.0 {
                continue;
            }
            // Same endpoint order for both triangles sharing the edge.
            if let Some(point) = segment_crossing(
                &mesh.vertices[lo],
                &mesh.vertices[hi],
                distances[lo],
                distances[hi],
            ) {
                points.entry(key).or_insert(point);
                if count < 2 {
                    crossed[count] = key;
                }
                count += 1;
            }
        }
        if count == 2 {
            segments.push((crossed[0], crossed[1]));
        }
    }

    (segments, points)
}
