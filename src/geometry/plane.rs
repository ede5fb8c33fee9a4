use crate::error::{GeometryError, Result};
use crate::math::{
    frame_from_axes, perpendicular, rotation_between_vectors, Matrix3, Matrix4, Point3,
    RigidTransform, Vector3, TOLERANCE,
};

/// An oriented cut plane with a full right-handed frame.
///
/// Defined by an origin and three orthonormal axes: the in-plane
/// directions `x_axis`, `y_axis`, and the unit `normal` (`x × y = normal`).
/// Every mutation re-derives a consistent frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CutPlane {
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    normal: Vector3,
}

impl CutPlane {
    /// Creates a plane from an origin and a normal vector.
    ///
    /// The in-plane axes are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let normal = unit(&normal)?;
        let x_axis = perpendicular(&normal);
        let y_axis = normal.cross(&x_axis);
        Ok(Self {
            origin,
            x_axis,
            y_axis,
            normal,
        })
    }

    /// Creates a plane from an origin, a preferred in-plane X direction and
    /// a normal. `x_dir` is projected into the plane.
    ///
    /// # Errors
    ///
    /// Returns an error if either vector is zero-length or `x_dir` is
    /// parallel to the normal.
    pub fn from_axes(origin: Point3, x_dir: Vector3, normal: Vector3) -> Result<Self> {
        let normal = unit(&normal)?;
        let projected = x_dir - normal * normal.dot(&x_dir);
        let x_axis = projected.try_normalize(TOLERANCE).ok_or_else(|| {
            GeometryError::Degenerate("in-plane direction is parallel to the normal".into())
        })?;
        let y_axis = normal.cross(&x_axis);
        Ok(Self {
            origin,
            x_axis,
            y_axis,
            normal,
        })
    }

    /// Creates a plane from a plane-to-world matrix whose columns are X, Y,
    /// Z and the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the axes are degenerate.
    pub fn from_world_matrix(matrix: &Matrix4) -> Result<Self> {
        let column = |c: usize| Vector3::new(matrix[(0, c)], matrix[(1, c)], matrix[(2, c)]);
        Self::from_axes(Point3::from(column(3)), column(0), column(2))
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the in-plane X axis.
    #[must_use]
    pub fn x_axis(&self) -> &Vector3 {
        &self.x_axis
    }

    /// Returns the in-plane Y axis.
    #[must_use]
    pub fn y_axis(&self) -> &Vector3 {
        &self.y_axis
    }

    /// Returns the unit normal (the frame's Z axis).
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Rotation matrix whose rows are the plane axes.
    #[must_use]
    pub fn rotation(&self) -> Matrix3 {
        frame_from_axes(&self.x_axis, &self.y_axis, &self.normal)
    }

    /// Plane-to-world matrix: columns X, Y, Z, origin.
    #[must_use]
    pub fn world_matrix(&self) -> Matrix4 {
        *RigidTransform::from_parts(&self.rotation().transpose(), &self.origin.coords).matrix()
    }

    /// Moves the plane without touching its orientation.
    pub fn set_origin(&mut self, origin: Point3) {
        self.origin = origin;
    }

    /// Re-orients the plane, carrying the in-plane axes along with the
    /// minimal rotation from the old normal to the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length.
    pub fn set_normal(&mut self, normal: Vector3) -> Result<()> {
        let normal = unit(&normal)?;
        let rotation = rotation_between_vectors(&self.normal, &normal);
        let x = rotation * self.x_axis;
        let x = (x - normal * normal.dot(&x))
            .try_normalize(TOLERANCE)
            .unwrap_or_else(|| perpendicular(&normal));
        self.x_axis = x;
        self.y_axis = normal.cross(&x);
        self.normal = normal;
        Ok(())
    }

    /// Signed distance of a point to the plane (positive on the normal side).
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&(point - self.origin))
    }

    /// Copy of the plane shifted by `distance` along its normal.
    #[must_use]
    pub fn offset(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.normal * distance,
            ..self.clone()
        }
    }

    /// Copy of the plane moved by a rigid transform.
    #[must_use]
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        Self {
            origin: transform.apply_point(&self.origin),
            x_axis: transform.apply_vector(&self.x_axis).normalize(),
            y_axis: transform.apply_vector(&self.y_axis).normalize(),
            normal: transform.apply_vector(&self.normal).normalize(),
        }
    }
}

fn unit(v: &Vector3) -> Result<Vector3> {
    v.try_normalize(TOLERANCE)
        .ok_or_else(|| GeometryError::ZeroVector.into())
}
