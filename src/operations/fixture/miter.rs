use tracing::{debug, info};

use crate::error::{FixtureError, Result};
use crate::geometry::CutPlane;
use crate::host::MeshSlicer;
use crate::math::{Point3, RigidTransform, Vector3};
use crate::mesh::{make_box, TriangleMesh};
use crate::operations::CrossSection;

use super::{FixtureKind, FixtureSolid};

/// Dimensions of the miter boxes.
#[derive(Debug, Clone, Copy)]
pub struct MiterBoxParams {
    /// Reference direction of the boxes; `None` uses each plane's X axis.
    pub direction: Option<Vector3>,
    /// Slot thickness along the plane normal.
    pub slot_width: f64,
    /// Slot extent across the bone.
    pub slot_length: f64,
    /// Height of the slot housing, along the box direction.
    pub slot_height: f64,
    /// Housing wall thickness.
    pub slot_wall: f64,
    /// Gap between the bone surface and the housing.
    pub clearance: f64,
    /// Height of the slot cutter; long enough to pass through the guide.
    pub cutter_height: f64,
}

impl Default for MiterBoxParams {
    fn default() -> Self {
        Self {
            direction: None,
            slot_width: 1.0,
            slot_length: 30.0,
            slot_height: 10.0,
            slot_wall: 3.0,
            clearance: 2.0,
            cutter_height: 70.0,
        }
    }
}

/// Slot and housing for one cut plane.
#[derive(Debug, Clone)]
pub struct MiterBox {
    /// Index of the cut plane in the sequence.
    pub plane: usize,
    /// Box frame: X along the box direction, Z along the plane normal.
    pub frame: CutPlane,
    /// Outermost bone point the box is anchored on.
    pub anchor: Point3,
    /// Saw slot.
    pub slot: FixtureSolid,
    /// Housing around the slot.
    pub outer: FixtureSolid,
}

/// Places a miter box on the bone for every cut plane.
///
/// The box frame has X along the miter direction projected into the cut
/// plane, Z along the normal and Y = Z × X. Its anchor is the outermost
/// point (along +X) where the bone section crosses the plane through the
/// section centroid spanned by X and Z. Boxes of even planes are shifted
/// half a slot width back along the normal, odd ones forward, so paired
/// planes get slots on facing sides.
pub struct MiterBoxes<'a> {
    slicer: &'a dyn MeshSlicer,
    bone: &'a TriangleMesh,
    params: MiterBoxParams,
}

impl<'a> MiterBoxes<'a> {
    /// Creates a new `MiterBoxes` operation.
    #[must_use]
    pub fn new(slicer: &'a dyn MeshSlicer, bone: &'a TriangleMesh, params: MiterBoxParams) -> Self {
        Self {
            slicer,
            bone,
            params,
        }
    }

    /// Returns one miter box per plane.
    ///
    /// # Errors
    ///
    /// Returns an error if a plane misses the bone, the direction is
    /// parallel to a normal, or no anchor point exists.
    pub fn execute(&self, planes: &[CutPlane]) -> Result<Vec<MiterBox>> {
        let p = &self.params;
        let slot = make_box(p.cutter_height, p.slot_length, p.slot_width);
        let outer = make_box(
            p.slot_height,
            p.slot_length + 2.0 * p.slot_wall,
            p.slot_width + 2.0 * p.slot_wall,
        );

        let boxes = planes
            .iter()
            .enumerate()
            .map(|(i, plane)| {
                let (frame, anchor, placement) = self.placement(i, plane)?;
                Ok(MiterBox {
                    plane: i,
                    frame,
                    anchor,
                    slot: FixtureSolid::place(FixtureKind::SlotBox, &slot, placement),
                    outer: FixtureSolid::place(FixtureKind::OuterBox, &outer, placement),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(count = boxes.len(), "generated miter boxes");
        Ok(boxes)
    }

    fn placement(&self, index: usize, plane: &CutPlane) -> Result<(CutPlane, Point3, RigidTransform)> {
        let direction = self.params.direction.unwrap_or(*plane.x_axis());
        let section = CrossSection::compute(self.slicer, self.bone, plane.origin(), plane.normal())?;
        let frame = CutPlane::from_axes(*section.centroid(), direction, *plane.normal())?;
        let (x, y, z) = (*frame.x_axis(), *frame.y_axis(), *frame.normal());

        let anchor = section
            .intersect_with_plane(frame.origin(), &y)
            .into_iter()
            .max_by(|a, b| {
                let da = (a - frame.origin()).dot(&x);
                let db = (b - frame.origin()).dot(&x);
                da.total_cmp(&db)
            })
            .ok_or(FixtureError::NoPlacementPoint { plane: index })?;

        let side = if index % 2 == 0 { -1.0 } else { 1.0 };
        let translation = anchor
            + x * (self.params.slot_height / 2.0 + self.params.clearance)
            + z * (side * self.params.slot_width / 2.0);
        let placement = RigidTransform::from_parts(&frame.rotation().transpose(), &translation.coords);

        debug!(plane = index, ?anchor, ?translation, "placed miter box");
        Ok((frame, anchor, placement))
    }
}
