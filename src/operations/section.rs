use tracing::debug;

use crate::error::{Result, SectionError};
use crate::host::{Contour, MeshSlicer};
use crate::math::intersect_3d::{segment_crossing, strict_signed_distance};
use crate::math::{centroid, Point3, Vector3, TOLERANCE};
use crate::mesh::TriangleMesh;

/// Where a plane meets the bone: contours, their points and centroid.
#[derive(Debug, Clone)]
pub struct CrossSection {
    origin: Point3,
    normal: Vector3,
    contours: Vec<Contour>,
    points: Vec<Point3>,
    centroid: Point3,
}

impl CrossSection {
    /// Intersects `mesh` with the plane through `origin` with `normal`.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError::EmptyIntersection`] if the plane misses the
    /// mesh.
    pub fn compute(
        slicer: &dyn MeshSlicer,
        mesh: &TriangleMesh,
        origin: &Point3,
        normal: &Vector3,
    ) -> Result<Self> {
        let contours: Vec<Contour> = slicer
            .slice(mesh, origin, normal)
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect();

        let mut points: Vec<Point3> = Vec::new();
        for contour in &contours {
            for p in &contour.points {
                if !points.last().is_some_and(|last| (p - last).norm() <= TOLERANCE) {
                    points.push(*p);
                }
            }
        }

        let centroid = centroid(&points).ok_or(SectionError::EmptyIntersection {
            origin: *origin,
            normal: *normal,
        })?;

        debug!(
            contours = contours.len(),
            points = points.len(),
            ?centroid,
            "computed cross-section"
        );

        Ok(Self {
            origin: *origin,
            normal: *normal,
            contours,
            points,
            centroid,
        })
    }

    /// Origin of the slicing plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Normal of the slicing plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Section contours.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Contour points, never empty.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Arithmetic mean of the section points.
    #[must_use]
    pub fn centroid(&self) -> &Point3 {
        &self.centroid
    }

    /// Largest distance from the centroid to a section point.
    #[must_use]
    pub fn max_radius(&self) -> f64 {
        self.points
            .iter()
            .map(|p| (p - self.centroid).norm())
            .fold(0.0, f64::max)
    }

    /// Points where the section contours cross another plane.
    #[must_use]
    pub fn intersect_with_plane(&self, origin: &Point3, normal: &Vector3) -> Vec<Point3> {
        self.contours
            .iter()
            .flat_map(Contour::edges)
            .filter_map(|(a, b)| {
                let d_a = strict_signed_distance(&a, origin, normal);
                let d_b = strict_signed_distance(&b, origin, normal);
                segment_crossing(&a, &b, d_a, d_b)
            })
            .collect()
    }
}
