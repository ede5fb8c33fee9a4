//! Recentering of cut planes and curves on bone cross-sections.

mod brackets;
mod centerline;
mod pair;
mod recenter;

pub use brackets::CreateAlignmentPlanes;
pub use centerline::{CenterlineParams, ExtractCenterline};
pub use pair::{AlignPair, PairAlignment};
pub use recenter::RecenterPlane;

/// Parameters controlling iterative pair alignment.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentParams {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Stop once the summed endpoint displacement of an iteration drops
    /// below this value.
    pub tolerance: f64,
}

impl Default for AlignmentParams {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            tolerance: 0.01,
        }
    }
}
