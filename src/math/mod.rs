pub mod frame;
pub mod intersect_3d;
pub mod transform;

pub use frame::{
    frame_from_axes, perpendicular, rotation_about_axis, rotation_between_frames,
    rotation_between_vectors, PARALLEL_EPSILON,
};
pub use transform::RigidTransform;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 rotation matrix.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Arithmetic mean of a point set, or `None` when it is empty.
#[must_use]
pub fn centroid(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / points.len() as f64;
    let sum: Vector3 = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum * inv_n))
}
