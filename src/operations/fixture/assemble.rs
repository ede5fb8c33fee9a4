use tracing::{debug, info};

use crate::error::{FixtureError, Result};
use crate::host::{BooleanOp, MeshBoolean};
use crate::mesh::TriangleMesh;

use super::{FixtureKind, FixtureSolid, MiterBox};

/// Builds the surgical guide from its base and fixture solids.
///
/// The housings are added to the base first, then the screw holes and the
/// saw slots are subtracted, so slots cut through their own housings.
pub struct AssembleGuide<'a> {
    boolean: &'a dyn MeshBoolean,
    base: &'a TriangleMesh,
}

impl<'a> AssembleGuide<'a> {
    /// Creates a new `AssembleGuide` operation.
    #[must_use]
    pub fn new(boolean: &'a dyn MeshBoolean, base: &'a TriangleMesh) -> Self {
        Self { boolean, base }
    }

    /// Returns the assembled guide.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::EmptyBooleanResult`] if the result has no
    /// triangles, or the boolean service's error.
    pub fn execute(&self, miter_boxes: &[MiterBox], screws: &[FixtureSolid]) -> Result<TriangleMesh> {
        let mut guide = self.base.clone();

        for outer in miter_boxes.iter().map(|b| &b.outer) {
            guide = self.apply(&guide, outer, BooleanOp::Union)?;
        }
        for hole in screws.iter().filter(|s| s.kind == FixtureKind::ScrewCylinder) {
            guide = self.apply(&guide, hole, BooleanOp::Difference)?;
        }
        for slot in miter_boxes.iter().map(|b| &b.slot) {
            guide = self.apply(&guide, slot, BooleanOp::Difference)?;
        }

        if guide.is_empty() {
            return Err(FixtureError::EmptyBooleanResult.into());
        }
        info!(triangles = guide.triangle_count(), "assembled surgical guide");
        Ok(guide)
    }

    fn apply(&self, guide: &TriangleMesh, solid: &FixtureSolid, op: BooleanOp) -> Result<TriangleMesh> {
        let result = self.boolean.combine(guide, &solid.mesh, op)?;
        debug!(kind = ?solid.kind, ?op, triangles = result.triangle_count(), "applied fixture solid");
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::PlannerError;
    use crate::geometry::CutPlane;
    use crate::math::{Point3, RigidTransform, Vector3};
    use crate::mesh::make_box;

    /// Records the operations; union merges, difference keeps `a` unless
    /// told to erase everything.
    #[derive(Default)]
    struct RecordingBoolean {
        ops: RefCell<Vec<(BooleanOp, usize)>>,
        erase: bool,
    }

    impl MeshBoolean for RecordingBoolean {
        fn combine(&self, a: &TriangleMesh, b: &TriangleMesh, op: BooleanOp) -> Result<TriangleMesh> {
            self.ops.borrow_mut().push((op, b.triangle_count()));
            match op {
                BooleanOp::Union => {
                    let mut merged = a.clone();
                    merged.merge(b);
                    Ok(merged)
                }
                BooleanOp::Difference if self.erase => Ok(TriangleMesh::default()),
                BooleanOp::Difference => Ok(a.clone()),
            }
        }
    }

    fn miter_box(offset: f64) -> MiterBox {
        let place = RigidTransform::from_translation(&Vector3::new(offset, 0.0, 0.0));
        MiterBox {
            plane: 0,
            frame: CutPlane::from_normal(Point3::origin(), Vector3::z()).unwrap(),
            anchor: Point3::origin(),
            slot: FixtureSolid::place(FixtureKind::SlotBox, &make_box(1.0, 1.0, 1.0), place),
            outer: FixtureSolid::place(FixtureKind::OuterBox, &make_box(2.0, 2.0, 2.0), place),
        }
    }

    fn screw() -> FixtureSolid {
        let mut tube = make_box(0.5, 0.5, 4.0);
        tube.indices.truncate(10);
        FixtureSolid::place(FixtureKind::ScrewCylinder, &tube, RigidTransform::identity())
    }

    #[test]
    fn unions_come_before_differences() {
        let boolean = RecordingBoolean::default();
        let base = make_box(10.0, 10.0, 1.0);
        let guide = AssembleGuide::new(&boolean, &base)
            .execute(&[miter_box(3.0), miter_box(-3.0)], &[screw()])
            .unwrap();
        assert_eq!(guide.triangle_count(), 36);

        let ops = boolean.ops.borrow();
        let kinds: Vec<BooleanOp> = ops.iter().map(|&(op, _)| op).collect();
        assert_eq!(
            kinds,
            vec![
                BooleanOp::Union,
                BooleanOp::Union,
                BooleanOp::Difference,
                BooleanOp::Difference,
                BooleanOp::Difference,
            ]
        );
        // Screw hole before the slots.
        assert_eq!(ops[2].1, 10);
    }

    #[test]
    fn empty_result_is_an_error() {
        let boolean = RecordingBoolean {
            erase: true,
            ..RecordingBoolean::default()
        };
        let base = make_box(10.0, 10.0, 1.0);
        assert!(matches!(
            AssembleGuide::new(&boolean, &base).execute(&[miter_box(0.0)], &[]),
            Err(PlannerError::Fixture(FixtureError::EmptyBooleanResult))
        ));
    }
}
