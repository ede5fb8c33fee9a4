use tracing::debug;

use crate::error::Result;
use crate::geometry::CutPlane;
use crate::host::MeshSlicer;
use crate::mesh::TriangleMesh;
use crate::operations::CrossSection;

/// Moves a plane's origin to the centroid of its bone cross-section.
///
/// Single pass; the orientation is left untouched.
pub struct RecenterPlane<'a> {
    slicer: &'a dyn MeshSlicer,
    bone: &'a TriangleMesh,
}

impl<'a> RecenterPlane<'a> {
    /// Creates a new `RecenterPlane` operation.
    #[must_use]
    pub fn new(slicer: &'a dyn MeshSlicer, bone: &'a TriangleMesh) -> Self {
        Self { slicer, bone }
    }

    /// Recentres `plane` and returns the section it was centred on.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane misses the bone.
    pub fn execute(&self, plane: &mut CutPlane) -> Result<CrossSection> {
        let section = CrossSection::compute(self.slicer, self.bone, plane.origin(), plane.normal())?;
        debug!(from = ?plane.origin(), to = ?section.centroid(), "recentred plane");
        plane.set_origin(*section.centroid());
        Ok(section)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::host::PlaneSlicer;
    use crate::math::{Point3, Vector3};
    use crate::mesh::make_tube;

    #[test]
    fn origin_moves_to_axis_and_normal_is_kept() {
        let tube = make_tube(2.0, 10.0, 48);
        let mut plane = CutPlane::from_normal(Point3::new(1.2, -0.7, 1.5), Vector3::z()).unwrap();
        RecenterPlane::new(&PlaneSlicer, &tube).execute(&mut plane).unwrap();
        assert_relative_eq!(*plane.origin(), Point3::new(0.0, 0.0, 1.5), epsilon = 1e-9);
        assert_relative_eq!(*plane.normal(), Vector3::z());
    }

    #[test]
    fn plane_off_the_bone_fails_unchanged() {
        let tube = make_tube(2.0, 10.0, 16);
        let mut plane = CutPlane::from_normal(Point3::new(0.0, 0.0, 40.0), Vector3::z()).unwrap();
        assert!(RecenterPlane::new(&PlaneSlicer, &tube).execute(&mut plane).is_err());
        assert_relative_eq!(plane.origin().z, 40.0);
    }
}
