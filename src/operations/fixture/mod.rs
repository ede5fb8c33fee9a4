//! Cutting-guide geometry: miter boxes, screw guides, the safety-margin
//! gate and the final guide assembly.

mod assemble;
mod margin;
mod miter;
mod screw;

pub use assemble::AssembleGuide;
pub use margin::{CheckSecurityMargin, SecurityMarginParams};
pub use miter::{MiterBox, MiterBoxParams, MiterBoxes};
pub use screw::{ScrewGuideParams, ScrewGuides};

use crate::math::RigidTransform;
use crate::mesh::TriangleMesh;

/// Role of a fixture solid in the guide assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// Saw slot, subtracted from the guide.
    SlotBox,
    /// Slot housing, added to the guide.
    OuterBox,
    /// Screw hole, subtracted from the guide.
    ScrewCylinder,
}

/// A placed primitive solid.
#[derive(Debug, Clone)]
pub struct FixtureSolid {
    /// Role of the solid in the assembled guide.
    pub kind: FixtureKind,
    /// Rigid placement of the primitive, centred on its local origin.
    pub placement: RigidTransform,
    /// Primitive moved by `placement`.
    pub mesh: TriangleMesh,
}

impl FixtureSolid {
    /// Places `primitive` with `placement`.
    #[must_use]
    pub fn place(kind: FixtureKind, primitive: &TriangleMesh, placement: RigidTransform) -> Self {
        Self {
            kind,
            placement,
            mesh: primitive.transformed(&placement),
        }
    }
}
