use tracing::{debug, warn};

use crate::error::{ConvergenceNotReached, GeometryError, Result};
use crate::geometry::CutPlane;
use crate::host::MeshSlicer;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::TriangleMesh;
use crate::operations::CrossSection;

use super::AlignmentParams;

/// Outcome of [`AlignPair`].
#[derive(Debug, Clone)]
pub struct PairAlignment {
    /// Refined start point.
    pub start: Point3,
    /// Refined end point.
    pub end: Point3,
    /// Unit direction from `start` to `end`, shared by both planes.
    pub normal: Vector3,
    /// Iterations run.
    pub iterations: usize,
    /// Summed endpoint displacement of each iteration.
    pub displacements: Vec<f64>,
    /// Set when the iteration cap was hit before the tolerance.
    pub convergence: Option<ConvergenceNotReached>,
}

impl PairAlignment {
    /// Whether the tolerance was met.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.convergence.is_none()
    }

    /// Writes the result to the pair of planes: origins to the refined
    /// points, both normals to the common direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the common direction is degenerate.
    pub fn apply(&self, start: &mut CutPlane, end: &mut CutPlane) -> Result<()> {
        start.set_origin(self.start);
        end.set_origin(self.end);
        start.set_normal(self.normal)?;
        end.set_normal(self.normal)
    }
}

/// Iteratively centres a pair of points on the bone.
///
/// Each iteration slices the bone at both points with the plane normal to
/// the line joining them and moves each point to its section centroid.
/// Stops when the summed displacement falls below the tolerance or after
/// the iteration cap.
pub struct AlignPair<'a> {
    slicer: &'a dyn MeshSlicer,
    bone: &'a TriangleMesh,
    params: AlignmentParams,
}

impl<'a> AlignPair<'a> {
    /// Creates a new `AlignPair` operation.
    #[must_use]
    pub fn new(slicer: &'a dyn MeshSlicer, bone: &'a TriangleMesh, params: AlignmentParams) -> Self {
        Self {
            slicer,
            bone,
            params,
        }
    }

    /// Runs the alignment from the given seed points.
    ///
    /// # Errors
    ///
    /// Returns an error if the points coincide or a section misses the
    /// bone.
    pub fn execute(&self, start: &Point3, end: &Point3) -> Result<PairAlignment> {
        let (mut start, mut end) = (*start, *end);
        let mut displacements = Vec::with_capacity(self.params.max_iterations);
        let mut converged = false;

        for _ in 0..self.params.max_iterations {
            let normal = direction(&start, &end)?;
            let start_section = CrossSection::compute(self.slicer, self.bone, &start, &normal)?;
            let end_section = CrossSection::compute(self.slicer, self.bone, &end, &normal)?;
            let (new_start, new_end) = (*start_section.centroid(), *end_section.centroid());

            let displacement = (new_start - start).norm() + (new_end - end).norm();
            displacements.push(displacement);
            start = new_start;
            end = new_end;
            debug!(iteration = displacements.len(), displacement, "aligned pair");

            if displacement < self.params.tolerance {
                converged = true;
                break;
            }
        }

        let iterations = displacements.len();
        let convergence = if converged {
            None
        } else {
            let residual = displacements.last().copied().unwrap_or(f64::INFINITY);
            warn!(iterations, residual, "pair alignment hit the iteration cap");
            Some(ConvergenceNotReached {
                iterations,
                residual,
            })
        };

        Ok(PairAlignment {
            start,
            end,
            normal: direction(&start, &end)?,
            iterations,
            displacements,
            convergence,
        })
    }
}

fn direction(from: &Point3, to: &Point3) -> Result<Vector3> {
    (to - from).try_normalize(TOLERANCE).ok_or_else(|| {
        GeometryError::Degenerate("alignment pair points coincide".into()).into()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::host::PlaneSlicer;
    use crate::math::RigidTransform;
    use crate::mesh::{make_tube, swept_tube};

    fn shaft() -> TriangleMesh {
        make_tube(2.0, 30.0, 64)
            .transformed(&RigidTransform::from_translation(&Vector3::new(0.0, 0.0, 15.0)))
    }

    fn assert_contracting(result: &PairAlignment) {
        assert!(result.converged(), "{:?}", result.displacements);
        for pair in result.displacements.windows(2) {
            assert!(pair[1] < pair[0], "{:?}", result.displacements);
        }
    }

    #[test]
    fn straight_shaft_converges_onto_axis() {
        let tube = shaft();
        let result = AlignPair::new(&PlaneSlicer, &tube, AlignmentParams::default())
            .execute(&Point3::new(0.8, -0.5, 5.0), &Point3::new(-0.6, 0.4, 25.0))
            .unwrap();
        assert_contracting(&result);
        assert!(result.start.coords.xy().norm() < 0.01);
        assert!(result.end.coords.xy().norm() < 0.01);
        assert!(result.normal.z > 0.9999);
    }

    #[test]
    fn gently_bent_shaft_contracts() {
        // Quarter of a wide arc in the XZ plane.
        let path: Vec<Point3> = (0..=40)
            .map(|i| {
                let a = f64::from(i) / 40.0 * 0.6;
                Point3::new(60.0 * (1.0 - a.cos()), 0.0, 60.0 * a.sin())
            })
            .collect();
        let bone = swept_tube(&path, 2.0, 48);
        let seed_start = path[8] + Vector3::new(0.7, 0.6, 0.0);
        let seed_end = path[32] + Vector3::new(-0.5, -0.8, 0.0);
        let result = AlignPair::new(&PlaneSlicer, &bone, AlignmentParams::default())
            .execute(&seed_start, &seed_end)
            .unwrap();
        assert_contracting(&result);
        assert!(result.start.y.abs() < 0.05);
        assert!(result.end.y.abs() < 0.05);
    }

    #[test]
    fn iteration_cap_is_reported_not_raised() {
        let tube = shaft();
        let params = AlignmentParams {
            max_iterations: 1,
            tolerance: 1e-12,
        };
        let result = AlignPair::new(&PlaneSlicer, &tube, params)
            .execute(&Point3::new(0.8, -0.5, 5.0), &Point3::new(-0.6, 0.4, 25.0))
            .unwrap();
        let warning = result.convergence.unwrap();
        assert_eq!(warning.iterations, 1);
        assert!(warning.residual > 0.5);
    }

    #[test]
    fn apply_sets_common_normal() {
        let result = PairAlignment {
            start: Point3::new(0.0, 0.0, 1.0),
            end: Point3::new(0.0, 0.0, 4.0),
            normal: Vector3::z(),
            iterations: 1,
            displacements: vec![0.0],
            convergence: None,
        };
        let mut a = CutPlane::from_normal(Point3::origin(), Vector3::x()).unwrap();
        let mut b = CutPlane::from_normal(Point3::origin(), Vector3::y()).unwrap();
        result.apply(&mut a, &mut b).unwrap();
        assert_eq!(a.normal(), b.normal());
        assert!((a.origin().z - 1.0).abs() < 1e-12);
        assert!((b.origin().z - 4.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_seeds_are_rejected() {
        let tube = shaft();
        let p = Point3::new(0.0, 0.0, 10.0);
        assert!(AlignPair::new(&PlaneSlicer, &tube, AlignmentParams::default())
            .execute(&p, &p)
            .is_err());
    }
}
