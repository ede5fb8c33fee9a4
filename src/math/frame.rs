//! Orthonormal frames and the rotations between them.
//!
//! A frame is stored as a rotation matrix whose **rows** are the frame axes
//! expressed in world coordinates. Multiplying a world vector by such a
//! matrix yields its coordinates in the frame.

use super::{Matrix3, Vector3};

/// Two unit vectors are treated as parallel when their dot product reaches
/// `1 - PARALLEL_EPSILON`.
pub const PARALLEL_EPSILON: f64 = 1e-4;

/// Builds a rotation matrix whose rows are the given axes.
///
/// The axes must already be unit length, mutually orthogonal and
/// right-handed. Derive them from a primary axis with cross products (see
/// [`perpendicular`]) rather than passing arbitrary vectors: the result is
/// not a rotation otherwise.
#[must_use]
pub fn frame_from_axes(x: &Vector3, y: &Vector3, z: &Vector3) -> Matrix3 {
    debug_assert!(x.dot(y).abs() < 1e-6 && y.dot(z).abs() < 1e-6 && z.dot(x).abs() < 1e-6);
    Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()])
}

/// Rotation expressing frame 1 in frame 2's coordinates: `r2⁻¹ · r1`.
///
/// Applied to a world vector this maps frame 1's axes onto frame 2's axes
/// (`X₁ → X₂`, `Y₁ → Y₂`, `Z₁ → Z₂`).
#[must_use]
pub fn rotation_between_frames(r1: &Matrix3, r2: &Matrix3) -> Matrix3 {
    // Orthonormal: the inverse is the transpose.
    r2.transpose() * r1
}

/// Axis-angle rotation taking direction `v1` onto direction `v2`.
///
/// Returns the identity when the directions are parallel. When they are
/// anti-parallel the rotation is 180° about an arbitrary axis perpendicular
/// to `v1`.
#[must_use]
pub fn rotation_between_vectors(v1: &Vector3, v2: &Vector3) -> Matrix3 {
    let (Some(a), Some(b)) = (v1.try_normalize(0.0), v2.try_normalize(0.0)) else {
        return Matrix3::identity();
    };

    let dot = a.dot(&b);
    if dot >= 1.0 - PARALLEL_EPSILON {
        return Matrix3::identity();
    }

    let cross = a.cross(&b);
    let cross_len = cross.norm();
    if cross_len < PARALLEL_EPSILON {
        return rotation_about_axis(&perpendicular(&a), std::f64::consts::PI);
    }

    let angle = cross_len.atan2(dot);
    rotation_about_axis(&(cross / cross_len), angle)
}

/// Rotation matrix around a unit axis by an angle in radians (Rodrigues).
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rotation_about_axis(axis: &Vector3, angle: f64) -> Matrix3 {
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    Matrix3::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,
    )
}

/// Finds a unit direction perpendicular to the given unit vector.
#[must_use]
pub fn perpendicular(axis: &Vector3) -> Vector3 {
    let candidate = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    axis.cross(&candidate).normalize()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn tilted_frame() -> (Vector3, Vector3, Vector3) {
        let z = v(1.0, 2.0, 2.0).normalize();
        let x = perpendicular(&z);
        let y = z.cross(&x);
        (x, y, z)
    }

    #[test]
    fn frame_rows_are_the_axes() {
        let (x, y, z) = tilted_frame();
        let r = frame_from_axes(&x, &y, &z);
        assert_relative_eq!(r * x, v(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(r * y, v(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(r * z, v(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn rotation_between_same_frame_is_identity() {
        let (x, y, z) = tilted_frame();
        let r = frame_from_axes(&x, &y, &z);
        assert_relative_eq!(rotation_between_frames(&r, &r), Matrix3::identity(), epsilon = 1e-12);

        let world = frame_from_axes(&Vector3::x(), &Vector3::y(), &Vector3::z());
        assert_relative_eq!(
            rotation_between_frames(&world, &world),
            Matrix3::identity(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn rotation_between_frames_maps_axes() {
        let (x1, y1, z1) = tilted_frame();
        let r1 = frame_from_axes(&x1, &y1, &z1);
        let (x2, y2, z2) = (Vector3::y(), Vector3::z(), Vector3::x());
        let r2 = frame_from_axes(&x2, &y2, &z2);

        let r = rotation_between_frames(&r1, &r2);
        assert_relative_eq!(r * x1, x2, epsilon = 1e-12);
        assert_relative_eq!(r * y1, y2, epsilon = 1e-12);
        assert_relative_eq!(r * z1, z2, epsilon = 1e-12);
    }

    #[test]
    fn same_vector_gives_identity() {
        for dir in [v(1.0, 0.0, 0.0), v(0.0, 0.0, 1.0), v(0.3, -0.4, 0.5).normalize()] {
            assert_relative_eq!(
                rotation_between_vectors(&dir, &dir),
                Matrix3::identity(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn nearly_parallel_vectors_count_as_parallel() {
        let a = v(0.0, 0.0, 1.0);
        let b = v(0.001, 0.0, 1.0).normalize();
        assert_eq!(rotation_between_vectors(&a, &b), Matrix3::identity());
    }

    #[test]
    fn opposite_vectors_flip_and_twice_is_identity() {
        for dir in [v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(-0.2, 0.7, 0.1).normalize()] {
            let r = rotation_between_vectors(&dir, &-dir);
            assert_relative_eq!(r * dir, -dir, epsilon = 1e-12);
            assert_relative_eq!(r * r, Matrix3::identity(), epsilon = 1e-12);
        }
    }

    #[test]
    fn rotation_takes_first_vector_onto_second() {
        let a = v(1.0, 0.0, 0.0);
        let b = v(0.0, 1.0, 1.0).normalize();
        let r = rotation_between_vectors(&a, &b);
        assert_relative_eq!(r * a, b, epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn quarter_turn_about_z() {
        let r = rotation_about_axis(&Vector3::z(), FRAC_PI_2);
        assert_relative_eq!(r * Vector3::x(), Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn perpendicular_is_unit_and_orthogonal() {
        for axis in [Vector3::x(), Vector3::y(), Vector3::z(), v(0.95, 0.1, 0.0).normalize()] {
            let p = perpendicular(&axis);
            assert!((p.norm() - 1.0).abs() < 1e-12);
            assert!(p.dot(&axis).abs() < 1e-12);
        }
    }
}
