use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};
use tracing::{debug, warn};

use crate::error::{OperationError, Result};
use crate::math::intersect_3d::{segment_crossing, strict_signed_distance};
use crate::math::{Point3, Vector3};
use crate::mesh::TriangleMesh;

use super::{chain_edge_segments, edge_key, EdgeKey, HalfSpace, KeepSide, MeshCutter};

/// Built-in half-space cutter.
///
/// Clips triangles against each half-space in turn and closes every opening
/// with a planar cap triangulated by constrained Delaunay, so closed input
/// stays closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfSpaceCutter;

impl MeshCutter for HalfSpaceCutter {
    fn cut(&self, mesh: &TriangleMesh, half_spaces: &[HalfSpace]) -> Result<TriangleMesh> {
        let mut current = mesh.clone();
        for half_space in half_spaces {
            if current.is_empty() {
                break;
            }
            current = clip_and_cap(&current, half_space)?;
        }
        current.compute_normals();
        Ok(current)
    }
}

/// Output mesh under construction, remembering where each input vertex and
/// each crossed edge landed.
struct Clipper<'a> {
    input: &'a TriangleMesh,
    distances: Vec<f64>,
    out: TriangleMesh,
    kept: HashMap<u32, u32>,
    crossings: HashMap<EdgeKey, u32>,
}

impl Clipper<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn push(&mut self, point: Point3) -> u32 {
        let idx = self.out.vertices.len() as u32;
        self.out.vertices.push(point);
        idx
    }

    fn kept_vertex(&mut self, i: u32) -> u32 {
        if let Some(&idx) = self.kept.get(&i) {
            return idx;
        }
        let idx = self.push(self.input.vertices[i as usize]);
        self.kept.insert(i, idx);
        idx
    }

    fn crossing_vertex(&mut self, a: u32, b: u32) -> u32 {
        let key = edge_key(a, b);
        if let Some(&idx) = self.crossings.get(&key) {
            return idx;
        }
        let (lo, hi) = (key.0 as usize, key.1 as usize);
        let (p_lo, p_hi) = (self.input.vertices[lo], self.input.vertices[hi]);
        let point = segment_crossing(&p_lo, &p_hi, self.distances[lo], self.distances[hi])
            .unwrap_or_else(|| Point3::from((p_lo.coords + p_hi.coords) * 0.5));
        let idx = self.push(point);
        self.crossings.insert(key, idx);
        idx
    }
}

fn clip_and_cap(mesh: &TriangleMesh, half_space: &HalfSpace) -> Result<TriangleMesh> {
    let plane = &half_space.plane;
    let inside_normal = match half_space.keep {
        KeepSide::Front => *plane.normal(),
        KeepSide::Back => -*plane.normal(),
    };

    let mut clipper = Clipper {
        input: mesh,
        distances: mesh
            .vertices
            .iter()
            .map(|v| strict_signed_distance(v, plane.origin(), &inside_normal))
            .collect(),
        out: TriangleMesh::default(),
        kept: HashMap::new(),
        crossings: HashMap::new(),
    };
    let mut segments = Vec::new();

    for tri in &mesh.indices {
        let inside = tri.map(|i| clipper.distances[i as usize] > 0.0);
        match inside.iter().filter(|&&b| b).count() {
            0 => continue,
            3 => {
                let mapped = tri.map(|i| clipper.kept_vertex(i));
                clipper.out.indices.push(mapped);
                continue;
            }
            _ => {}
        }

        // Rotate so that `a` is the vertex alone on its side.
        let r = (0..3)
            .find(|&k| inside[k] != inside[(k + 1) % 3] && inside[k] != inside[(k + 2) % 3])
            .unwrap_or(0);
        let (a, b, c) = (tri[r], tri[(r + 1) % 3], tri[(r + 2) % 3]);
        let ab = clipper.crossing_vertex(a, b);
        let ca = clipper.crossing_vertex(c, a);
        if inside[r] {
            let a = clipper.kept_vertex(a);
            clipper.out.indices.push([a, ab, ca]);
        } else {
            let b = clipper.kept_vertex(b);
            let c = clipper.kept_vertex(c);
            clipper.out.indices.push([ab, b, c]);
            clipper.out.indices.push([ab, c, ca]);
        }
        segments.push((edge_key(a, b), edge_key(c, a)));
    }

    let mut loops = Vec::new();
    for (keys, closed) in chain_edge_segments(&segments) {
        if !closed {
            warn!(points = keys.len(), "open cut boundary left uncapped");
            continue;
        }
        loops.push(
            keys.iter()
                .filter_map(|k| clipper.crossings.get(k).copied())
                .collect::<Vec<u32>>(),
        );
    }

    let mut out = clipper.out;
    if !loops.is_empty() {
        let cap = triangulate_cap(&out.vertices, &loops, half_space)?;
        debug!(
            loops = loops.len(),
            triangles = cap.len(),
            "capped cut opening"
        );
        out.indices.extend(cap);
    }
    Ok(out)
}

/// Triangulates the region bounded by `loops` (vertex indices lying on the
/// cut plane), wound to face away from the kept side.
fn triangulate_cap(
    vertices: &[Point3],
    loops: &[Vec<u32>],
    half_space: &HalfSpace,
) -> Result<Vec<[u32; 3]>> {
    let plane = &half_space.plane;
    let (origin, u_dir, v_dir) = (plane.origin(), plane.x_axis(), plane.y_axis());
    let project = |p: &Point3| -> SpadePoint2<f64> {
        let d = p - origin;
        SpadePoint2::new(d.dot(u_dir), d.dot(v_dir))
    };

    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
    let mut vertex_of_handle: HashMap<usize, u32> = HashMap::new();
    for ring in loops {
        insert_constraint_loop(&mut cdt, vertices, ring, &project, &mut vertex_of_handle)?;
    }

    let interior = enclosed_faces(&cdt);
    let cap_normal = half_space.cap_normal();
    let mut triangles = Vec::new();
    for face in cdt.inner_faces() {
        if !interior.contains(&face.fix().index()) {
            continue;
        }
        let [h0, h1, h2] = face.vertices();
        let (Some(&i0), Some(&i1), Some(&i2)) = (
            vertex_of_handle.get(&h0.fix().index()),
            vertex_of_handle.get(&h1.fix().index()),
            vertex_of_handle.get(&h2.fix().index()),
        ) else {
            continue;
        };
        let (p0, p1, p2) = (
            vertices[i0 as usize],
            vertices[i1 as usize],
            vertices[i2 as usize],
        );
        let facing: Vector3 = (p1 - p0).cross(&(p2 - p0));
        if facing.dot(&cap_normal) >= 0.0 {
            triangles.push([i0, i1, i2]);
        } else {
            triangles.push([i0, i2, i1]);
        }
    }
    Ok(triangles)
}

/// Inserts a closed ring of mesh vertices as constraint edges into the CDT.
fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
    vertices: &[Point3],
    ring: &[u32],
    project: &impl Fn(&Point3) -> SpadePoint2<f64>,
    vertex_of_handle: &mut HashMap<usize, u32>,
) -> Result<()> {
    if ring.len() < 3 {
        return Err(OperationError::Failed("cap loop needs at least 3 points".into()).into());
    }

    let mut handles = Vec::with_capacity(ring.len());
    for &i in ring {
        let h = cdt
            .insert(project(&vertices[i as usize]))
            .map_err(|e: InsertionError| OperationError::Failed(format!("cap insert: {e}")))?;
        vertex_of_handle.entry(h.index()).or_insert(i);
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        } else {
            warn!("skipped self-intersecting cap edge");
        }
    }

    Ok(())
}

/// Inner faces enclosed by an odd number of cap loops.
///
/// Breadth-first walk in from the hull; each constraint edge crossed flips
/// the parity.
fn enclosed_faces(cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>) -> HashSet<usize> {
    let hull = cdt.outer_face().fix();
    let mut frontier: VecDeque<(FixedFaceHandle<InnerTag>, bool)> = cdt
        .directed_edges()
        .filter(|edge| edge.face().fix() == hull)
        .filter_map(|edge| {
            let face = edge.rev().face().as_inner()?;
            Some((face.fix(), cdt.is_constraint_edge(edge.as_undirected().fix())))
        })
        .collect();

    let mut odd_of: HashMap<usize, bool> = HashMap::new();
    while let Some((face, odd)) = frontier.pop_front() {
        if odd_of.contains_key(&face.index()) {
            continue;
        }
        odd_of.insert(face.index(), odd);
        for edge in cdt.face(face).adjacent_edges() {
            let Some(next) = edge.rev().face().as_inner() else {
                continue;
            };
            if !odd_of.contains_key(&next.fix().index()) {
                let flip = cdt.is_constraint_edge(edge.as_undirected().fix());
                frontier.push_back((next.fix(), odd ^ flip));
            }
        }
    }

    odd_of
        .into_iter()
        .filter_map(|(index, odd)| odd.then_some(index))
        .collect()
}
