use super::{Matrix3, Matrix4, Point3, Vector3};

/// A rotation followed by a translation, stored as a 4x4 homogeneous matrix.
///
/// The upper-left 3x3 block stays orthonormal: every constructor builds it
/// from a rotation, and [`RigidTransform::orthonormalized`] removes the drift
/// that long composition chains accumulate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    matrix: Matrix4,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// A pure translation.
    #[must_use]
    pub fn from_translation(offset: &Vector3) -> Self {
        Self {
            matrix: Matrix4::new_translation(offset),
        }
    }

    /// A pure rotation about the world origin.
    ///
    /// `rotation` must be orthonormal.
    #[must_use]
    pub fn from_rotation(rotation: &Matrix3) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Rotation followed by translation: `p ↦ R·p + t`.
    #[must_use]
    pub fn from_parts(rotation: &Matrix3, translation: &Vector3) -> Self {
        let mut matrix = rotation.to_homogeneous();
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
        Self { matrix }
    }

    /// Returns the homogeneous matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    /// Returns the rotation block.
    #[must_use]
    pub fn rotation(&self) -> Matrix3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Returns the translation column.
    #[must_use]
    pub fn translation(&self) -> Vector3 {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Applies `self` first, then `next`.
    ///
    /// Equivalent to post-multiplying: the resulting matrix is
    /// `next · self`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        Self {
            matrix: next.matrix * self.matrix,
        }
    }

    /// Mathematical composition `self ∘ inner`: `inner` is applied first.
    #[must_use]
    pub fn compose(&self, inner: &Self) -> Self {
        Self {
            matrix: self.matrix * inner.matrix,
        }
    }

    /// Transforms a point (homogeneous coordinate 1).
    #[must_use]
    pub fn apply_point(&self, point: &Point3) -> Point3 {
        self.matrix.transform_point(point)
    }

    /// Transforms a direction (homogeneous coordinate 0, translation ignored).
    #[must_use]
    pub fn apply_vector(&self, vector: &Vector3) -> Vector3 {
        self.matrix.transform_vector(vector)
    }

    /// The inverse transform, `p ↦ Rᵀ·(p − t)`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rt = self.rotation().transpose();
        Self::from_parts(&rt, &(-(rt * self.translation())))
    }

    /// Re-orthonormalizes the rotation block with Gram–Schmidt on its columns.
    #[must_use]
    pub fn orthonormalized(&self) -> Self {
        let r = self.rotation();
        let c0 = r.column(0).normalize();
        let c1 = r.column(1).into_owned();
        let c1 = (c1 - c0 * c0.dot(&c1)).normalize();
        let c2 = c0.cross(&c1);
        Self::from_parts(&Matrix3::from_columns(&[c0, c1, c2]), &self.translation())
    }

    /// Largest deviation of `RᵀR` from the identity.
    #[must_use]
    pub fn orthonormality_error(&self) -> f64 {
        let r = self.rotation();
        (r.transpose() * r - Matrix3::identity()).abs().max()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::math::rotation_about_axis;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    #[test]
    fn translation_moves_points_not_vectors() {
        let t = RigidTransform::from_translation(&v(1.0, 2.0, 3.0));
        assert_relative_eq!(t.apply_point(&p(0.0, 0.0, 0.0)), p(1.0, 2.0, 3.0));
        assert_relative_eq!(t.apply_vector(&v(1.0, 0.0, 0.0)), v(1.0, 0.0, 0.0));
    }

    #[test]
    fn then_applies_in_order() {
        let rot = RigidTransform::from_rotation(&rotation_about_axis(&Vector3::z(), FRAC_PI_2));
        let shift = RigidTransform::from_translation(&v(10.0, 0.0, 0.0));

        // Rotate (1,0,0) to (0,1,0), then shift.
        let a = rot.then(&shift);
        assert_relative_eq!(a.apply_point(&p(1.0, 0.0, 0.0)), p(10.0, 1.0, 0.0), epsilon = 1e-12);

        // Shift to (11,0,0), then rotate.
        let b = shift.then(&rot);
        assert_relative_eq!(b.apply_point(&p(1.0, 0.0, 0.0)), p(0.0, 11.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn composition_matches_sequential_application() {
        let t1 = RigidTransform::from_parts(
            &rotation_about_axis(&Vector3::x(), 0.3),
            &v(1.0, -2.0, 0.5),
        );
        let t2 = RigidTransform::from_parts(
            &rotation_about_axis(&v(1.0, 1.0, 0.0).normalize(), -1.1),
            &v(0.0, 4.0, 2.0),
        );
        let t3 = RigidTransform::from_parts(&rotation_about_axis(&Vector3::z(), 2.0), &v(-3.0, 0.0, 1.0));

        let composed = t1.compose(&t2).compose(&t3);
        let regrouped = t1.compose(&t2.compose(&t3));
        let point = p(0.7, -1.3, 2.9);

        let sequential = t1.apply_point(&t2.apply_point(&t3.apply_point(&point)));
        assert_relative_eq!(composed.apply_point(&point), sequential, epsilon = 1e-10);
        assert_relative_eq!(regrouped.apply_point(&point), sequential, epsilon = 1e-10);
        assert_relative_eq!(t3.then(&t2).then(&t1).apply_point(&point), sequential, epsilon = 1e-10);
    }

    #[test]
    fn inverse_round_trips() {
        let t = RigidTransform::from_parts(
            &rotation_about_axis(&v(0.0, 1.0, 1.0).normalize(), 0.8),
            &v(5.0, -1.0, 2.0),
        );
        let identity = t.compose(&t.inverse());
        assert_relative_eq!(*identity.matrix(), Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn orthonormalized_removes_drift() {
        let mut rotation = rotation_about_axis(&Vector3::z(), 0.4);
        rotation[(0, 1)] += 1e-3;
        rotation[(2, 0)] -= 2e-3;
        let drifted = RigidTransform::from_parts(&rotation, &v(1.0, 1.0, 1.0));
        assert!(drifted.orthonormality_error() > 1e-4);

        let fixed = drifted.orthonormalized();
        assert!(fixed.orthonormality_error() < 1e-12);
        assert_relative_eq!(fixed.rotation().determinant(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(fixed.translation(), v(1.0, 1.0, 1.0));
    }
}
