use tracing::{debug, info};

use crate::error::{FixtureError, OperationError, Result};
use crate::geometry::CutPlane;
use crate::host::CollisionDetector;
use crate::math::RigidTransform;
use crate::mesh::TriangleMesh;
use crate::operations::sequence::ensure_even;
use crate::operations::BoneSegment;

/// Settings of the security-margin check.
#[derive(Debug, Clone, Copy)]
pub struct SecurityMarginParams {
    /// Minimum bone thickness each wedge must remove.
    pub margin: f64,
    /// Extra separation added to the margin.
    pub epsilon: f64,
    /// Whether miter-box generation is gated by the check.
    pub enabled: bool,
}

impl Default for SecurityMarginParams {
    fn default() -> Self {
        Self {
            margin: 1.0,
            epsilon: 1e-2,
            enabled: true,
        }
    }
}

/// Verifies that every wedge is thicker than the security margin.
///
/// Segment `i` is moved back by `i · (margin + epsilon)` along the normal
/// of its proximal cut plane, which closes each wedge by the margin. Two
/// adjacent segments that then touch mean the cut planes between them are
/// too close.
pub struct CheckSecurityMargin<'a> {
    collision: &'a dyn CollisionDetector,
    params: SecurityMarginParams,
}

impl<'a> CheckSecurityMargin<'a> {
    /// Creates a new `CheckSecurityMargin` operation.
    #[must_use]
    pub fn new(collision: &'a dyn CollisionDetector, params: SecurityMarginParams) -> Self {
        Self { collision, params }
    }

    /// Checks the segments produced by cutting at `planes`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::SecurityMarginViolation`] for the first
    /// colliding pair, or an error if the segments do not match the planes.
    pub fn execute(&self, segments: &[BoneSegment], planes: &[CutPlane]) -> Result<()> {
        ensure_even(planes.len())?;
        if segments.len() != planes.len() / 2 + 1 {
            return Err(OperationError::InvalidInput(format!(
                "{} segments do not match {} cut planes",
                segments.len(),
                planes.len()
            ))
            .into());
        }

        let step = self.params.margin + self.params.epsilon;
        #[allow(clippy::cast_precision_loss)]
        let shifted: Vec<TriangleMesh> = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| match i.checked_sub(1) {
                None => segment.mesh.clone(),
                Some(k) => {
                    let back = planes[2 * k + 1].normal() * (-(i as f64) * step);
                    segment.mesh.transformed(&RigidTransform::from_translation(&back))
                }
            })
            .collect();

        for (i, pair) in shifted.windows(2).enumerate() {
            if self.collision.collides(&pair[0], &pair[1]) {
                return Err(FixtureError::SecurityMarginViolation {
                    segments: (i, i + 1),
                    planes: (2 * i, 2 * i + 1),
                    required_margin: self.params.margin,
                }
                .into());
            }
            debug!(segments = ?(i, i + 1), "segments clear of the security margin");
        }

        info!(margin = self.params.margin, "security margin satisfied");
        Ok(())
    }
}
