use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::CutPlane;
use crate::host::{HalfSpace, MeshCutter};
use crate::math::RigidTransform;
use crate::mesh::TriangleMesh;

use super::sequence::ensure_even;

/// A piece of bone between consecutive osteotomies.
#[derive(Debug, Clone)]
pub struct BoneSegment {
    /// Position along the bone, 0 being the fixed proximal piece.
    pub index: usize,
    /// Index of the cut plane bounding the segment proximally.
    pub proximal_plane: Option<usize>,
    /// Index of the cut plane bounding the segment distally.
    pub distal_plane: Option<usize>,
    /// Segment surface.
    pub mesh: TriangleMesh,
}

impl BoneSegment {
    /// Copy of the segment moved by `transform`.
    #[must_use]
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        Self {
            mesh: self.mesh.transformed(transform),
            ..self.clone()
        }
    }
}

/// Cuts the bone into segments at the cut planes.
///
/// Segment 0 is behind plane 0, segment `k` lies in front of
/// `plane[2k-1]` and behind `plane[2k]`, and the last segment is in front
/// of the last plane. The wedges between `plane[2k]` and `plane[2k+1]` are
/// the resected bone and are dropped.
pub struct SplitSegments<'a> {
    cutter: &'a dyn MeshCutter,
    bone: &'a TriangleMesh,
    planes: &'a [CutPlane],
}

impl<'a> SplitSegments<'a> {
    /// Creates a new `SplitSegments` operation.
    #[must_use]
    pub fn new(cutter: &'a dyn MeshCutter, bone: &'a TriangleMesh, planes: &'a [CutPlane]) -> Self {
        Self {
            cutter,
            bone,
            planes,
        }
    }

    /// Returns `planes.len() / 2 + 1` segments in proximal-to-distal order.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane count is odd or the cutter fails.
    pub fn execute(&self) -> Result<Vec<BoneSegment>> {
        let n = self.planes.len();
        ensure_even(n)?;

        let mut segments = Vec::with_capacity(n / 2 + 1);
        for index in 0..=n / 2 {
            let proximal_plane = index.checked_sub(1).map(|k| 2 * k + 1);
            let distal_plane = (2 * index < n).then_some(2 * index);

            let mut half_spaces = Vec::with_capacity(2);
            if let Some(p) = proximal_plane {
                half_spaces.push(HalfSpace::front(self.planes[p].clone()));
            }
            if let Some(d) = distal_plane {
                half_spaces.push(HalfSpace::back(self.planes[d].clone()));
            }

            let mesh = self.cutter.cut(self.bone, &half_spaces)?;
            if mesh.is_empty() {
                warn!(segment = index, "bone segment is empty");
            }
            debug!(
                segment = index,
                triangles = mesh.triangle_count(),
                "split bone segment"
            );
            segments.push(BoneSegment {
                index,
                proximal_plane,
                distal_plane,
                mesh,
            });
        }
        Ok(segments)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;
    use crate::host::HalfSpaceCutter;
    use crate::math::{Point3, Vector3};
    use crate::mesh::make_tube;

    fn z_plane(z: f64) -> CutPlane {
        CutPlane::from_normal(Point3::new(0.0, 0.0, z), Vector3::z()).unwrap()
    }

    #[test]
    fn two_osteotomies_give_three_segments() {
        let bone = make_tube(1.0, 20.0, 32);
        let planes = vec![z_plane(-5.0), z_plane(-4.0), z_plane(3.0), z_plane(4.5)];
        let segments = SplitSegments::new(&HalfSpaceCutter, &bone, &planes).execute().unwrap();
        assert_eq!(segments.len(), 3);

        let area = 16.0 * (TAU / 32.0).sin();
        let lengths = [5.0, 7.0, 5.5];
        for (segment, length) in segments.iter().zip(lengths) {
            assert!((segment.mesh.signed_volume() - area * length).abs() < 1e-9);
        }
        assert_eq!(segments[0].proximal_plane, None);
        assert_eq!(segments[0].distal_plane, Some(0));
        assert_eq!(segments[1].proximal_plane, Some(1));
        assert_eq!(segments[1].distal_plane, Some(2));
        assert_eq!(segments[2].proximal_plane, Some(3));
        assert_eq!(segments[2].distal_plane, None);
    }

    #[test]
    fn no_planes_keeps_whole_bone() {
        let bone = make_tube(1.0, 2.0, 8);
        let segments = SplitSegments::new(&HalfSpaceCutter, &bone, &[]).execute().unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].mesh.triangle_count(), bone.triangle_count());
    }

    #[test]
    fn odd_planes_are_rejected() {
        let bone = make_tube(1.0, 2.0, 8);
        let planes = vec![z_plane(0.0)];
        assert!(SplitSegments::new(&HalfSpaceCutter, &bone, &planes).execute().is_err());
    }
}
