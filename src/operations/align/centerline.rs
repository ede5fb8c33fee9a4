use tracing::{debug, info};

use crate::error::{GeometryError, Result};
use crate::geometry::GuideCurve;
use crate::host::MeshSlicer;
use crate::math::{Point3, TOLERANCE};
use crate::mesh::TriangleMesh;
use crate::operations::CrossSection;

/// Multi-resolution schedule for [`ExtractCenterline`].
///
/// Level `k` resamples the curve to `initial_samples * 2^k` points.
#[derive(Debug, Clone, Copy)]
pub struct CenterlineParams {
    /// Sample count of the first level.
    pub initial_samples: usize,
    /// Number of levels; each doubles the sample count.
    pub levels: usize,
    /// Recentering passes run at every level.
    pub passes_per_level: usize,
}

impl Default for CenterlineParams {
    fn default() -> Self {
        Self {
            initial_samples: 8,
            levels: 5,
            passes_per_level: 2,
        }
    }
}

impl CenterlineParams {
    /// Sample counts of each level, e.g. 8, 16, 32, 64, 128.
    #[must_use]
    pub fn schedule(&self) -> Vec<usize> {
        (0..self.levels)
            .map(|k| self.initial_samples.max(2) << k)
            .collect()
    }
}

/// Fits a centerline through a bone from a rough seed curve.
///
/// At every level the curve is resampled, then each sample is moved to the
/// centroid of the section normal to the direction between its neighbours
/// (one-sided at the ends). All samples of a pass are updated together.
pub struct ExtractCenterline<'a> {
    slicer: &'a dyn MeshSlicer,
    bone: &'a TriangleMesh,
    params: CenterlineParams,
}

impl<'a> ExtractCenterline<'a> {
    /// Creates a new `ExtractCenterline` operation.
    #[must_use]
    pub fn new(slicer: &'a dyn MeshSlicer, bone: &'a TriangleMesh, params: CenterlineParams) -> Self {
        Self {
            slicer,
            bone,
            params,
        }
    }

    /// Returns the fitted centerline.
    ///
    /// # Errors
    ///
    /// Returns an error if a sample's section misses the bone or the curve
    /// collapses.
    pub fn execute(&self, seed: &GuideCurve) -> Result<GuideCurve> {
        let mut curve = seed.clone();
        for samples in self.params.schedule() {
            curve = curve.resampled(samples)?;
            for pass in 0..self.params.passes_per_level {
                let points = self.recenter_pass(curve.points())?;
                curve = GuideCurve::new(points)?;
                debug!(samples, pass, "centerline pass");
            }
        }
        info!(points = curve.len(), length = curve.length(), "extracted centerline");
        Ok(curve)
    }

    fn recenter_pass(&self, points: &[Point3]) -> Result<Vec<Point3>> {
        let last = points.len() - 1;
        (0..points.len())
            .map(|i| {
                let prev = points[i.saturating_sub(1)];
                let next = points[(i + 1).min(last)];
                let normal = (next - prev).try_normalize(TOLERANCE).ok_or_else(|| {
                    GeometryError::Degenerate("centerline neighbours coincide".into())
                })?;
                let section = CrossSection::compute(self.slicer, self.bone, &points[i], &normal)?;
                Ok(*section.centroid())
            })
            .collect()
    }
}
