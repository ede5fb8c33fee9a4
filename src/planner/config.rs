use std::time::Duration;

use crate::operations::align::{AlignmentParams, CenterlineParams};
use crate::operations::fixture::{MiterBoxParams, ScrewGuideParams, SecurityMarginParams};

/// Adjustments applied to a plane once the user stops moving it.
///
/// `origin_to_curve` wins over `origin_to_center` when both are set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneSnapOptions {
    /// Move the origin to the nearest guide-curve sample.
    pub origin_to_curve: bool,
    /// Move the origin to the centroid of the bone section.
    pub origin_to_center: bool,
    /// Turn the normal along the curve tangent at the nearest sample.
    pub normal_as_tangent: bool,
}

/// Settings of a planning session.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    /// Iteration cap and tolerance of pair alignment.
    pub alignment: AlignmentParams,
    /// Resolution schedule of centerline extraction.
    pub centerline: CenterlineParams,
    /// Miter box dimensions and orientation.
    pub miter_box: MiterBoxParams,
    /// Clearance required between neighbouring segments.
    pub security_margin: SecurityMarginParams,
    /// Screw-hole cylinder dimensions.
    pub screw_guide: ScrewGuideParams,
    /// Adjustments applied to a plane once a move is confirmed.
    pub snap: PlaneSnapOptions,
    /// Quiet period after the last plane move before recomputing.
    pub debounce: Duration,
    /// Offset of the alignment planes, in multiples of the section radius.
    pub alignment_margin_multiplier: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentParams::default(),
            centerline: CenterlineParams::default(),
            miter_box: MiterBoxParams::default(),
            security_margin: SecurityMarginParams::default(),
            screw_guide: ScrewGuideParams::default(),
            snap: PlaneSnapOptions::default(),
            debounce: Duration::from_millis(300),
            alignment_margin_multiplier: 1.0,
        }
    }
}
