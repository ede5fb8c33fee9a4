//! Planning session tying the plane store to the planning operations.

mod config;
mod debounce;

pub use config::{PlaneSnapOptions, PlannerConfig};
pub use debounce::RecomputeDebouncer;

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{OperationError, Result};
use crate::geometry::{CutPlane, GuideCurve};
use crate::host::HostServices;
use crate::math::{Point3, RigidTransform};
use crate::mesh::TriangleMesh;
use crate::operations::align::{
    AlignPair, CreateAlignmentPlanes, ExtractCenterline, PairAlignment, RecenterPlane,
};
use crate::operations::fixture::{
    AssembleGuide, CheckSecurityMargin, FixtureSolid, MiterBox, MiterBoxes, ScrewGuides,
};
use crate::operations::{
    ensure_even, BoneSegment, ChainSegmentTransforms, SequencePlanes, SplitSegments,
};
use crate::store::{PlaneId, PlaneStore};

/// Result of one planning pass.
#[derive(Debug, Clone)]
pub struct PlanOutput {
    /// Cut planes in sequence order.
    pub planes: Vec<CutPlane>,
    /// Bone segments in their original position.
    pub segments: Vec<BoneSegment>,
    /// Correction transform of each segment.
    pub transforms: Vec<RigidTransform>,
    /// Segments moved by their correction transform.
    pub corrected: Vec<BoneSegment>,
}

/// A planning session.
///
/// Owns the cut planes, the recompute debouncer and the configuration; the
/// bone, guide curve and host services are passed to each call.
///
/// Every method that writes planes takes `&mut self`, so no move can land
/// while a recompute or alignment is running.
#[derive(Debug)]
pub struct Planner {
    store: PlaneStore,
    debouncer: RecomputeDebouncer,
    config: PlannerConfig,
    alignment_planes: Option<(CutPlane, CutPlane)>,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Planner {
    /// Creates an empty planning session.
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            store: PlaneStore::new(),
            debouncer: RecomputeDebouncer::new(config.debounce),
            config,
            alignment_planes: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Mutable settings. The debounce period is fixed at construction.
    pub fn config_mut(&mut self) -> &mut PlannerConfig {
        &mut self.config
    }

    #[must_use]
    pub fn store(&self) -> &PlaneStore {
        &self.store
    }

    /// Cut planes in sequence order.
    #[must_use]
    pub fn planes(&self) -> Vec<CutPlane> {
        self.store.planes()
    }

    /// Start and end planes of the last automatic alignment.
    #[must_use]
    pub fn alignment_planes(&self) -> Option<&(CutPlane, CutPlane)> {
        self.alignment_planes.as_ref()
    }

    /// Whether a recompute is waiting for the debounce period.
    #[must_use]
    pub fn has_pending_recompute(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Adds a plane and re-sequences the store.
    ///
    /// # Errors
    ///
    /// Returns an error if sequencing fails.
    pub fn add_plane(&mut self, plane: CutPlane, curve: &GuideCurve) -> Result<PlaneId> {
        let id = self.store.add(plane);
        SequencePlanes::new(curve).execute(&mut self.store)?;
        Ok(id)
    }

    /// Adds a plane on the curve frame nearest to `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve tangent there is degenerate.
    pub fn add_plane_near(&mut self, point: &Point3, curve: &GuideCurve) -> Result<PlaneId> {
        let index = curve.closest_point_index(point);
        let plane = curve.frame_at_index(index)?;
        debug!(index, origin = ?plane.origin(), "snapped new plane to curve");
        self.add_plane(plane, curve)
    }

    /// Removes a plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane is not in the store.
    pub fn remove_plane(&mut self, id: PlaneId) -> Result<CutPlane> {
        self.store.remove(id)
    }

    /// Replaces a plane after a user move and restarts the debounce period.
    ///
    /// The store is not re-sequenced until the move is confirmed by
    /// [`tick`](Self::tick).
    ///
    /// # Errors
    ///
    /// Returns an error if the plane is not in the store.
    pub fn move_plane(&mut self, id: PlaneId, plane: CutPlane, now: Instant) -> Result<()> {
        *self.store.plane_mut(id)? = plane;
        self.debouncer.notify(id, now);
        Ok(())
    }

    /// Runs the pending recompute once its debounce period has elapsed.
    ///
    /// The snap options are applied to the last moved plane, the store is
    /// re-sequenced along `curve`, then the plan is recomputed. Returns
    /// `Ok(None)` when nothing is due.
    ///
    /// # Errors
    ///
    /// Returns an error if snapping fails or the recompute fails, notably
    /// with an odd plane count.
    pub fn tick(
        &mut self,
        now: Instant,
        services: &HostServices<'_>,
        bone: &TriangleMesh,
        curve: &GuideCurve,
    ) -> Result<Option<PlanOutput>> {
        let Some(id) = self.debouncer.poll(now) else {
            return Ok(None);
        };
        self.snap_plane(id, services, bone, curve)?;
        SequencePlanes::new(curve).execute(&mut self.store)?;
        self.recompute(services, bone).map(Some)
    }

    fn snap_plane(
        &mut self,
        id: PlaneId,
        services: &HostServices<'_>,
        bone: &TriangleMesh,
        curve: &GuideCurve,
    ) -> Result<()> {
        let snap = self.config.snap;
        let Ok(plane) = self.store.plane_mut(id) else {
            warn!(?id, "moved plane was removed before recompute");
            return Ok(());
        };
        let index = curve.closest_point_index(plane.origin());

        if snap.origin_to_curve {
            plane.set_origin(curve.points()[index]);
        } else if snap.origin_to_center {
            RecenterPlane::new(services.slicer, bone).execute(plane)?;
        }
        if snap.normal_as_tangent {
            plane.set_normal(curve.tangent_at_index(index)?)?;
        }
        debug!(?id, ?snap, origin = ?plane.origin(), "snapped moved plane");
        Ok(())
    }

    /// Cuts the bone at the current planes and computes the correction
    /// transforms.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane count is odd or cutting fails.
    pub fn recompute(&self, services: &HostServices<'_>, bone: &TriangleMesh) -> Result<PlanOutput> {
        let planes = self.store.planes();
        ensure_even(planes.len())?;

        let segments = SplitSegments::new(services.cutter, bone, &planes).execute()?;
        let transforms = ChainSegmentTransforms::new(&planes).execute()?;
        let corrected = segments
            .iter()
            .zip(&transforms)
            .map(|(segment, transform)| segment.transformed(transform))
            .collect();

        info!(
            planes = planes.len(),
            segments = segments.len(),
            "recomputed plan"
        );
        Ok(PlanOutput {
            planes,
            segments,
            transforms,
            corrected,
        })
    }

    /// Moves every cut plane's origin to the centroid of its bone section
    /// and re-sequences the store along `curve`.
    ///
    /// # Errors
    ///
    /// Returns an error if a plane misses the bone; planes recentred before
    /// it keep their new origin.
    pub fn center_cut_planes(
        &mut self,
        services: &HostServices<'_>,
        bone: &TriangleMesh,
        curve: &GuideCurve,
    ) -> Result<()> {
        let recenter = RecenterPlane::new(services.slicer, bone);
        for id in self.store.ids().to_vec() {
            recenter.execute(self.store.plane_mut(id)?)?;
        }
        SequencePlanes::new(curve).execute(&mut self.store)?;
        info!(planes = self.store.len(), "centred cut planes");
        Ok(())
    }

    /// Derives origins and normals of the cut planes from the bone.
    ///
    /// Centres the planes, places the two alignment planes outside the
    /// first and last cut, then aligns the sequence
    /// `[start, cut₀, …, cutₙ₋₁, end]` two planes at a time. Both planes of
    /// a pair get the direction between their refined origins as normal.
    /// The store is re-sequenced along `curve` after centring and again
    /// after the aligned planes are written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane count is odd or zero, or a section
    /// misses the bone.
    pub fn auto_align(
        &mut self,
        services: &HostServices<'_>,
        bone: &TriangleMesh,
        curve: &GuideCurve,
    ) -> Result<Vec<PairAlignment>> {
        ensure_even(self.store.len())?;
        if self.store.is_empty() {
            return Err(OperationError::InvalidInput("no cut planes to align".into()).into());
        }
        self.center_cut_planes(services, bone, curve)?;

        let ids = self.store.ids().to_vec();
        let first = self.store.plane(ids[0])?;
        let last = self.store.plane(ids[ids.len() - 1])?;
        let (start, end) = CreateAlignmentPlanes::new(
            services.slicer,
            bone,
            self.config.alignment_margin_multiplier,
        )
        .execute(first, last)?;

        let mut sequence = Vec::with_capacity(ids.len() + 2);
        sequence.push(start);
        sequence.extend(self.store.planes());
        sequence.push(end);

        let align = AlignPair::new(services.slicer, bone, self.config.alignment);
        let mut results = Vec::with_capacity(sequence.len() / 2);
        for pair in sequence.chunks_exact_mut(2) {
            let (lower, upper) = pair.split_at_mut(1);
            let alignment = align.execute(lower[0].origin(), upper[0].origin())?;
            alignment.apply(&mut lower[0], &mut upper[0])?;
            results.push(alignment);
        }

        let end = sequence.pop();
        let mut aligned = sequence.into_iter();
        let start = aligned.next();
        for (id, plane) in ids.iter().zip(aligned) {
            *self.store.plane_mut(*id)? = plane;
        }
        self.alignment_planes = start.zip(end);
        SequencePlanes::new(curve).execute(&mut self.store)?;

        let unconverged = results.iter().filter(|r| !r.converged()).count();
        info!(pairs = results.len(), unconverged, "aligned cut planes");
        Ok(results)
    }

    /// Fits a centerline through the bone from a rough seed curve.
    ///
    /// # Errors
    ///
    /// Returns an error if a section of the curve misses the bone.
    pub fn extract_centerline(
        &self,
        services: &HostServices<'_>,
        bone: &TriangleMesh,
        seed: &GuideCurve,
    ) -> Result<GuideCurve> {
        ExtractCenterline::new(services.slicer, bone, self.config.centerline).execute(seed)
    }

    /// Checks the segments of `plan` against the security margin.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::SecurityMarginViolation`] for the first pair
    /// of segments that touch.
    ///
    /// [`FixtureError::SecurityMarginViolation`]: crate::error::FixtureError::SecurityMarginViolation
    pub fn check_security_margin(&self, services: &HostServices<'_>, plan: &PlanOutput) -> Result<()> {
        CheckSecurityMargin::new(services.collision, self.config.security_margin)
            .execute(&plan.segments, &plan.planes)
    }

    /// Builds the miter boxes of every cut plane, after the security-margin
    /// check when it is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the margin is violated or a box cannot be placed.
    pub fn generate_miter_boxes(
        &self,
        services: &HostServices<'_>,
        bone: &TriangleMesh,
        plan: &PlanOutput,
    ) -> Result<Vec<MiterBox>> {
        ensure_even(plan.planes.len())?;
        if self.config.security_margin.enabled {
            self.check_security_margin(services, plan)?;
        } else {
            debug!("security margin check disabled");
        }
        MiterBoxes::new(services.slicer, bone, self.config.miter_box).execute(&plan.planes)
    }

    /// Builds one screw-hole cylinder per fiducial on the guide base.
    ///
    /// # Errors
    ///
    /// Returns an error if the base mesh is empty.
    pub fn screw_guides(&self, base: &TriangleMesh, fiducials: &[Point3]) -> Result<Vec<FixtureSolid>> {
        ScrewGuides::new(base, self.config.screw_guide).execute(fiducials)
    }

    /// Assembles the surgical guide with the host boolean service.
    ///
    /// # Errors
    ///
    /// Returns an error if no boolean service is available or the result is
    /// empty.
    pub fn assemble_guide(
        &self,
        services: &HostServices<'_>,
        base: &TriangleMesh,
        miter_boxes: &[MiterBox],
        screws: &[FixtureSolid],
    ) -> Result<TriangleMesh> {
        let boolean = services.boolean.ok_or_else(|| {
            OperationError::InvalidInput("guide assembly needs a boolean service".into())
        })?;
        AssembleGuide::new(boolean, base).execute(miter_boxes, screws)
    }
}
