use tracing::debug;

use crate::error::Result;
use crate::geometry::CutPlane;
use crate::host::MeshSlicer;
use crate::mesh::TriangleMesh;
use crate::operations::CrossSection;

use super::RecenterPlane;

/// Builds the two alignment planes bracketing the cut planes.
///
/// Each is a copy of the first (or last) cut plane pushed outward along
/// its normal by `multiplier` times the largest radius of its section,
/// then recentred on the bone.
pub struct CreateAlignmentPlanes<'a> {
    slicer: &'a dyn MeshSlicer,
    bone: &'a TriangleMesh,
    multiplier: f64,
}

impl<'a> CreateAlignmentPlanes<'a> {
    /// Creates a new `CreateAlignmentPlanes` operation.
    #[must_use]
    pub fn new(slicer: &'a dyn MeshSlicer, bone: &'a TriangleMesh, multiplier: f64) -> Self {
        Self {
            slicer,
            bone,
            multiplier,
        }
    }

    /// Returns the start and end alignment planes for the given first and
    /// last cut planes.
    ///
    /// # Errors
    ///
    /// Returns an error if a cut plane or an offset copy misses the bone.
    pub fn execute(&self, first: &CutPlane, last: &CutPlane) -> Result<(CutPlane, CutPlane)> {
        let start = self.bracket(first, -1.0)?;
        let end = self.bracket(last, 1.0)?;
        Ok((start, end))
    }

    fn bracket(&self, cut: &CutPlane, sign: f64) -> Result<CutPlane> {
        let section = CrossSection::compute(self.slicer, self.bone, cut.origin(), cut.normal())?;
        let distance = sign * self.multiplier * section.max_radius();
        let mut plane = cut.offset(distance);
        RecenterPlane::new(self.slicer, self.bone).execute(&mut plane)?;
        debug!(distance, origin = ?plane.origin(), "placed alignment plane");
        Ok(plane)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::host::PlaneSlicer;
    use crate::math::{Point3, RigidTransform, Vector3};
    use crate::mesh::make_tube;

    #[test]
    fn brackets_sit_one_radius_outside() {
        let tube = make_tube(2.0, 40.0, 64)
            .transformed(&RigidTransform::from_translation(&Vector3::new(0.0, 0.0, 20.0)));
        let first = CutPlane::from_normal(Point3::new(0.3, 0.0, 15.0), Vector3::z()).unwrap();
        let last = CutPlane::from_normal(Point3::new(0.0, 0.4, 25.0), Vector3::z()).unwrap();

        let (start, end) = CreateAlignmentPlanes::new(&PlaneSlicer, &tube, 1.0)
            .execute(&first, &last)
            .unwrap();
        assert_relative_eq!(start.origin().z, 13.0, epsilon = 1e-9);
        assert_relative_eq!(end.origin().z, 27.0, epsilon = 1e-9);
        assert!(start.origin().coords.xy().norm() < 1e-9);
        assert_relative_eq!(*start.normal(), Vector3::z());
    }
}
