use tracing::{debug, info};

use crate::error::{GeometryError, OperationError, Result};
use crate::math::{perpendicular, Matrix3, Point3, RigidTransform, TOLERANCE};
use crate::mesh::{make_tube, TriangleMesh};

use super::{FixtureKind, FixtureSolid};

/// Screw-hole cylinder dimensions.
#[derive(Debug, Clone, Copy)]
pub struct ScrewGuideParams {
    /// Hole radius.
    pub radius: f64,
    /// Cylinder length, centred on the fiducial.
    pub length: f64,
    /// Facets around the circumference.
    pub sides: usize,
}

impl Default for ScrewGuideParams {
    fn default() -> Self {
        Self {
            radius: 1.5,
            length: 50.0,
            sides: 50,
        }
    }
}

/// Places a screw-hole cylinder at every fiducial.
///
/// The cylinder is centred on the fiducial and its axis follows the
/// surface normal of the guide base at the nearest base vertex.
pub struct ScrewGuides<'a> {
    base: &'a TriangleMesh,
    params: ScrewGuideParams,
}

impl<'a> ScrewGuides<'a> {
    /// Creates a new `ScrewGuides` operation.
    #[must_use]
    pub fn new(base: &'a TriangleMesh, params: ScrewGuideParams) -> Self {
        Self { base, params }
    }

    /// Returns one cylinder per fiducial, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the base mesh is empty or the normal at the
    /// nearest vertex vanishes.
    pub fn execute(&self, fiducials: &[Point3]) -> Result<Vec<FixtureSolid>> {
        let normals = if self.base.normals.len() == self.base.vertices.len() {
            self.base.normals.clone()
        } else {
            let mut base = self.base.clone();
            base.compute_normals();
            base.normals
        };
        let tube = make_tube(self.params.radius, self.params.length, self.params.sides);

        let guides = fiducials
            .iter()
            .map(|fiducial| {
                let nearest = self.base.nearest_vertex(fiducial).ok_or_else(|| {
                    OperationError::InvalidInput("guide base mesh is empty".into())
                })?;
                let axis = normals[nearest]
                    .try_normalize(TOLERANCE)
                    .ok_or(GeometryError::ZeroVector)?;
                let x = perpendicular(&axis);
                let y = axis.cross(&x);
                let rotation = Matrix3::from_columns(&[x, y, axis]);
                debug!(?fiducial, vertex = nearest, ?axis, "placed screw guide");
                Ok(FixtureSolid::place(
                    FixtureKind::ScrewCylinder,
                    &tube,
                    RigidTransform::from_parts(&rotation, &fiducial.coords),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(count = guides.len(), "generated screw guides");
        Ok(guides)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::PlannerError;
    use crate::math::Vector3;
    use crate::mesh::make_box;

    #[test]
    fn cylinder_follows_base_normal() {
        let base = make_box(10.0, 10.0, 10.0);
        let fiducial = Point3::new(5.2, 4.9, 5.1);
        let guides = ScrewGuides::new(&base, ScrewGuideParams::default())
            .execute(&[fiducial])
            .unwrap();
        assert_eq!(guides.len(), 1);

        let guide = &guides[0];
        assert_eq!(guide.kind, FixtureKind::ScrewCylinder);
        let axis = guide.placement.apply_vector(&Vector3::z());
        assert_relative_eq!(axis, Vector3::new(1.0, 1.0, 1.0).normalize(), epsilon = 1e-12);
        assert_relative_eq!(guide.placement.translation(), fiducial.coords, epsilon = 1e-12);
        assert!(guide.placement.orthonormality_error() < 1e-12);
    }

    #[test]
    fn cylinder_has_requested_size() {
        let base = make_box(10.0, 10.0, 10.0);
        let params = ScrewGuideParams {
            radius: 2.0,
            length: 30.0,
            sides: 12,
        };
        let guides = ScrewGuides::new(&base, params)
            .execute(&[Point3::new(0.0, 0.0, 6.0)])
            .unwrap();
        let guide = &guides[0];
        assert_eq!(guide.mesh.vertices.len(), 2 * 12 + 2);

        let centre = guide.placement.apply_point(&Point3::origin());
        let axis = guide.placement.apply_vector(&Vector3::z());
        for v in &guide.mesh.vertices {
            let along = (v - centre).dot(&axis);
            let radial = (v - centre - axis * along).norm();
            assert!(radial <= 2.0 + 1e-9);
            assert!(along.abs() <= 15.0 + 1e-9);
        }
    }

    #[test]
    fn empty_base_is_rejected() {
        let base = TriangleMesh::default();
        assert!(matches!(
            ScrewGuides::new(&base, ScrewGuideParams::default()).execute(&[Point3::origin()]),
            Err(PlannerError::Operation(OperationError::InvalidInput(_)))
        ));
    }
}
