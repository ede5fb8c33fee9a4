pub mod guide_curve;
pub mod plane;

pub use guide_curve::GuideCurve;
pub use plane::CutPlane;
