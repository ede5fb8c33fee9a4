//! Mesh services the planner delegates to.
//!
//! Slicing, cutting, boolean combination and collision testing are treated
//! as black boxes behind traits. Built-in implementations cover slicing,
//! half-space cutting and collision; booleans must come from the host.

mod clip;
mod collision;
mod slice;

pub use clip::HalfSpaceCutter;
pub use collision::TriangleCollision;
pub use slice::PlaneSlicer;

use crate::error::Result;
use crate::geometry::CutPlane;
use crate::math::{Point3, Vector3};
use crate::mesh::TriangleMesh;

/// A polyline where a mesh meets a plane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    /// Ordered contour points.
    pub points: Vec<Point3>,
    /// Whether the last point connects back to the first.
    pub closed: bool,
}

impl Contour {
    /// Whether the contour has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the contour's edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        let n = self.points.len();
        let count = if self.closed && n > 2 { n } else { n.saturating_sub(1) };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// Which side of a cut plane survives a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepSide {
    /// The side the normal points to.
    Front,
    /// The side opposite the normal.
    Back,
}

/// A cut plane together with the side to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfSpace {
    /// Bounding plane.
    pub plane: CutPlane,
    /// Side of `plane` that is kept.
    pub keep: KeepSide,
}

impl HalfSpace {
    /// Keeps the part in front of `plane`.
    #[must_use]
    pub fn front(plane: CutPlane) -> Self {
        Self {
            plane,
            keep: KeepSide::Front,
        }
    }

    /// Keeps the part behind `plane`.
    #[must_use]
    pub fn back(plane: CutPlane) -> Self {
        Self {
            plane,
            keep: KeepSide::Back,
        }
    }

    /// Outward normal of the cap closing the kept region.
    #[must_use]
    pub fn cap_normal(&self) -> Vector3 {
        match self.keep {
            KeepSide::Front => -*self.plane.normal(),
            KeepSide::Back => *self.plane.normal(),
        }
    }
}

/// Boolean combination applied by [`MeshBoolean`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Difference,
}

/// Intersects a mesh with a plane.
pub trait MeshSlicer {
    /// Returns every contour where `mesh` meets the plane; empty when the
    /// plane misses it.
    fn slice(&self, mesh: &TriangleMesh, origin: &Point3, normal: &Vector3) -> Vec<Contour>;
}

/// Cuts a mesh by half-spaces, capping the openings.
pub trait MeshCutter {
    /// Returns the part of `mesh` inside all `half_spaces`.
    ///
    /// # Errors
    ///
    /// Returns an error if a cap cannot be built.
    fn cut(&self, mesh: &TriangleMesh, half_spaces: &[HalfSpace]) -> Result<TriangleMesh>;
}

/// Boolean union and difference of closed meshes.
pub trait MeshBoolean {
    /// Combines `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host operation fails.
    fn combine(&self, a: &TriangleMesh, b: &TriangleMesh, op: BooleanOp) -> Result<TriangleMesh>;
}

/// Surface contact test between two meshes.
pub trait CollisionDetector {
    /// Whether the surfaces of `a` and `b` touch or cross.
    fn collides(&self, a: &TriangleMesh, b: &TriangleMesh) -> bool;
}

/// The set of mesh services a planning pass runs against.
#[derive(Clone, Copy)]
pub struct HostServices<'a> {
    /// Plane sections of the bone.
    pub slicer: &'a dyn MeshSlicer,
    /// Splitting of the bone into segments.
    pub cutter: &'a dyn MeshCutter,
    /// Segment overlap tests for the security margin.
    pub collision: &'a dyn CollisionDetector,
    /// Needed only to assemble the final guide.
    pub boolean: Option<&'a dyn MeshBoolean>,
}

impl HostServices<'static> {
    /// Built-in slicer, cutter and collision test, without booleans.
    #[must_use]
    pub fn builtin() -> Self {
        static COLLISION: TriangleCollision = TriangleCollision { epsilon: 1e-9 };
        Self {
            slicer: &PlaneSlicer,
            cutter: &HalfSpaceCutter,
            collision: &COLLISION,
            boolean: None,
        }
    }
}

impl<'a> HostServices<'a> {
    /// Replaces the boolean service.
    #[must_use]
    pub fn with_boolean<'b>(self, boolean: &'b dyn MeshBoolean) -> HostServices<'b>
    where
        'a: 'b,
    {
        HostServices {
            slicer: self.slicer,
            cutter: self.cutter,
            collision: self.collision,
            boolean: Some(boolean),
        }
    }
}

/// Undirected mesh edge, smaller vertex index first.
pub(crate) type EdgeKey = (u32, u32);

pub(crate) fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Chains plane-crossing segments into contours of edge keys.
///
/// Each segment joins the crossing points of two edges of one triangle, so
/// on a manifold mesh every key links to at most two others.
pub(crate) fn chain_edge_segments(segments: &[(EdgeKey, EdgeKey)]) -> Vec<(Vec<EdgeKey>, bool)> {
    use std::collections::{HashMap, HashSet, VecDeque};

    let mut adjacency: HashMap<EdgeKey, Vec<EdgeKey>> = HashMap::new();
    for &(a, b) in segments {
        if a == b {
            continue;
        }
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut visited: HashSet<EdgeKey> = HashSet::new();
    let mut chains = Vec::new();

    for &(start, _) in segments {
        if !adjacency.contains_key(&start) || !visited.insert(start) {
            continue;
        }
        let mut chain = VecDeque::from([start]);

        let next_unvisited = |key: EdgeKey, visited: &HashSet<EdgeKey>| {
            adjacency
                .get(&key)
                .and_then(|links| links.iter().find(|k| !visited.contains(k)).copied())
        };

        let mut current = start;
        while let Some(next) = next_unvisited(current, &visited) {
            visited.insert(next);
            chain.push_back(next);
            current = next;
        }
        let closed = chain.len() > 2
            && adjacency
                .get(&current)
                .is_some_and(|links| links.contains(&start));

        if !closed {
            let mut current = start;
            while let Some(prev) = next_unvisited(current, &visited) {
                visited.insert(prev);
                chain.push_front(prev);
                current = prev;
            }
        }

        chains.push((chain.into_iter().collect(), closed));
    }

    chains
}
