use thiserror::Error;

use crate::math::{Point3, Vector3};

/// Top-level error type for the osteotomy planner.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Section(#[from] SectionError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors raised by the cross-section service.
#[derive(Debug, Error)]
pub enum SectionError {
    /// The plane does not meet the mesh. This is a configuration error and
    /// retrying with the same plane will fail again.
    #[error("plane through {origin:?} with normal {normal:?} does not intersect the mesh")]
    EmptyIntersection { origin: Point3, normal: Vector3 },
}

/// Errors related to the ordered cut-plane sequence.
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("cut plane count is {count}, it must be even")]
    OddPlaneCount { count: usize },

    #[error("guide curve needs at least 2 points, got {points}")]
    CurveTooShort { points: usize },

    #[error("plane not found in the store")]
    PlaneNotFound,
}

/// Errors raised while building cutting-guide fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Adjacent bone segments touch once separated by the security margin.
    ///
    /// `planes` is the pair of cut planes performing the osteotomy between
    /// `segments`; their spacing has to grow by at least `required_margin`.
    #[error(
        "segments {segments:?} collide within the security margin of {required_margin}; \
         increase the distance between cut planes {planes:?}"
    )]
    SecurityMarginViolation {
        segments: (usize, usize),
        planes: (usize, usize),
        required_margin: f64,
    },

    #[error("no bone surface point found to place the miter box of cut plane {plane}")]
    NoPlacementPoint { plane: usize },

    #[error("boolean operations produced an empty surgical guide")]
    EmptyBooleanResult,
}

/// Errors related to planner operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Iterative alignment hit its iteration cap before meeting the tolerance.
///
/// Never returned as an `Err`: alignment results carry it as a warning and
/// the best estimate is used.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("alignment stopped after {iterations} iterations with residual {residual}")]
pub struct ConvergenceNotReached {
    /// Iterations run.
    pub iterations: usize,
    /// Summed origin displacement of the last iteration.
    pub residual: f64,
}

/// Convenience type alias for results using [`PlannerError`].
pub type Result<T> = std::result::Result<T, PlannerError>;
