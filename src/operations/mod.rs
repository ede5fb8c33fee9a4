pub mod align;
mod chain;
pub mod fixture;
mod section;
mod segment;
pub mod sequence;

pub use chain::{ChainSegmentTransforms, PairCorrection};
pub use section::CrossSection;
pub use segment::{BoneSegment, SplitSegments};
pub use sequence::{ensure_even, SequencePlanes};
