use tracing::debug;

use crate::error::Result;
use crate::geometry::CutPlane;
use crate::math::{
    frame_from_axes, rotation_between_frames, rotation_between_vectors, Matrix3, RigidTransform,
    PARALLEL_EPSILON,
};

use super::sequence::ensure_even;

/// Transform closing the wedge between a pair of cut planes.
///
/// Maps the frame of the upper plane (`plane[2k+1]`) onto the frame of the
/// lower plane (`plane[2k]`): translate by `-upper.origin`, rotate, then
/// translate by `+lower.origin`.
pub struct PairCorrection<'a> {
    lower: &'a CutPlane,
    upper: &'a CutPlane,
}

impl<'a> PairCorrection<'a> {
    /// Creates a new `PairCorrection` operation.
    #[must_use]
    pub fn new(lower: &'a CutPlane, upper: &'a CutPlane) -> Self {
        Self { lower, upper }
    }

    /// Rotation taking the upper frame onto the lower frame.
    ///
    /// When the normals are not parallel, the upper frame's in-plane axes
    /// are taken from the lower plane's axes carried by the rotation
    /// between the two normals.
    #[must_use]
    pub fn rotation(&self) -> Matrix3 {
        let lower_z = self.lower.normal();
        let upper_z = self.upper.normal();

        let upper_frame = if lower_z.dot(upper_z) < 1.0 - PARALLEL_EPSILON {
            let carry = rotation_between_vectors(lower_z, upper_z);
            frame_from_axes(
                &(carry * self.lower.x_axis()),
                &(carry * self.lower.y_axis()),
                upper_z,
            )
        } else {
            self.upper.rotation()
        };

        rotation_between_frames(&upper_frame, &self.lower.rotation())
    }

    /// Returns the correction transform.
    #[must_use]
    pub fn execute(&self) -> RigidTransform {
        let to_lower = RigidTransform::from_translation(&self.lower.origin().coords);
        let from_upper = RigidTransform::from_translation(&-self.upper.origin().coords);
        to_lower
            .compose(&RigidTransform::from_rotation(&self.rotation()))
            .compose(&from_upper)
    }
}

/// Cumulative correction transforms for every bone segment.
///
/// Segment 0 is the fixed reference and gets the identity. Segment `i`
/// gets `C₀ · C₁ · … · Cᵢ₋₁`, so the correction of its own proximal
/// boundary is applied first.
pub struct ChainSegmentTransforms<'a> {
    planes: &'a [CutPlane],
}

impl<'a> ChainSegmentTransforms<'a> {
    /// Creates a new `ChainSegmentTransforms` operation.
    #[must_use]
    pub fn new(planes: &'a [CutPlane]) -> Self {
        Self { planes }
    }

    /// Returns one transform per segment (`planes.len() / 2 + 1` of them).
    ///
    /// # Errors
    ///
    /// Returns an error if the plane count is odd.
    pub fn execute(&self) -> Result<Vec<RigidTransform>> {
        ensure_even(self.planes.len())?;

        let mut transforms = Vec::with_capacity(self.planes.len() / 2 + 1);
        let mut total = RigidTransform::identity();
        transforms.push(total);
        for (k, pair) in self.planes.chunks_exact(2).enumerate() {
            let correction = PairCorrection::new(&pair[0], &pair[1]).execute();
            total = total.compose(&correction).orthonormalized();
            debug!(
                segment = k + 1,
                translation = ?total.translation(),
                orthonormality = total.orthonormality_error(),
                "chained segment transform"
            );
            transforms.push(total);
        }
        Ok(transforms)
    }
}
