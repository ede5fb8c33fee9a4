use crate::error::{GeometryError, Result, SequenceError};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::CutPlane;

/// A poly-sampled guide curve with an arc-length parametrization.
///
/// Used to order cut planes along the bone and to derive frames tangent to
/// the curve.
#[derive(Debug, Clone)]
pub struct GuideCurve {
    points: Vec<Point3>,
    arc_lengths: Vec<f64>,
}

impl GuideCurve {
    /// Creates a curve from ordered sample points.
    ///
    /// Consecutive duplicate samples are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 distinct points remain.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        let mut deduped: Vec<Point3> = Vec::with_capacity(points.len());
        for point in points {
            if !deduped
                .last()
                .is_some_and(|last| (point - last).norm() <= TOLERANCE)
            {
                deduped.push(point);
            }
        }
        if deduped.len() < 2 {
            return Err(SequenceError::CurveTooShort {
                points: deduped.len(),
            }
            .into());
        }

        let mut arc_lengths = Vec::with_capacity(deduped.len());
        let mut total = 0.0;
        arc_lengths.push(0.0);
        for pair in deduped.windows(2) {
            total += (pair[1] - pair[0]).norm();
            arc_lengths.push(total);
        }

        Ok(Self {
            points: deduped,
            arc_lengths,
        })
    }

    /// Returns the sample points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a curve holds at least 2 samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Arc-length parameter of the sample at `index` (clamped).
    #[must_use]
    pub fn parameter_at_index(&self, index: usize) -> f64 {
        self.arc_lengths[index.min(self.arc_lengths.len() - 1)]
    }

    /// Index of the sample nearest to `point`. Ties go to the lowest index.
    #[must_use]
    pub fn closest_point_index(&self, point: &Point3) -> usize {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, sample) in self.points.iter().enumerate() {
            let dist = (sample - point).norm_squared();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        best
    }

    /// Unit tangent at a sample: central difference inside, one-sided at the
    /// ends.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] where the curve doubles back on
    /// itself and both neighbours coincide.
    pub fn tangent_at_index(&self, index: usize) -> Result<Vector3> {
        let last = self.points.len() - 1;
        let index = index.min(last);
        let prev = index.saturating_sub(1);
        let next = (index + 1).min(last);
        (self.points[next] - self.points[prev])
            .try_normalize(TOLERANCE)
            .ok_or_else(|| GeometryError::Degenerate(format!("no tangent at curve sample {index}")).into())
    }

    /// Frame at a sample: origin on the curve, normal along the tangent.
    ///
    /// # Errors
    ///
    /// Returns an error if the tangent is degenerate.
    pub fn frame_at_index(&self, index: usize) -> Result<CutPlane> {
        let index = index.min(self.points.len() - 1);
        CutPlane::from_normal(self.points[index], self.tangent_at_index(index)?)
    }

    /// Point at arc-length parameter `s` (clamped to the curve).
    #[must_use]
    pub fn point_at_parameter(&self, s: f64) -> Point3 {
        let s = s.clamp(0.0, self.length());
        let seg = match self
            .arc_lengths
            .binary_search_by(|probe| probe.total_cmp(&s))
        {
            Ok(i) => return self.points[i],
            Err(i) => i.clamp(1, self.points.len() - 1),
        };
        let (s0, s1) = (self.arc_lengths[seg - 1], self.arc_lengths[seg]);
        let t = (s - s0) / (s1 - s0);
        self.points[seg - 1] + (self.points[seg] - self.points[seg - 1]) * t
    }

    /// Resamples the curve to `count` points evenly spaced in arc length.
    ///
    /// # Errors
    ///
    /// Returns an error if `count < 2`.
    pub fn resampled(&self, count: usize) -> Result<Self> {
        if count < 2 {
            return Err(SequenceError::CurveTooShort { points: count }.into());
        }
        let length = self.length();
        #[allow(clippy::cast_precision_loss)]
        let step = length / (count - 1) as f64;
        #[allow(clippy::cast_precision_loss)]
        let points = (0..count)
            .map(|i| self.point_at_parameter(step * i as f64))
            .collect();
        Self::new(points)
    }
}
