use std::time::{Duration, Instant};

use tracing::trace;

use crate::store::PlaneId;

/// Trailing-edge coalescing of plane moves.
///
/// Every move restarts the quiet period. Once a full period passes without
/// moves, [`poll`](Self::poll) fires once with the last moved plane.
#[derive(Debug, Clone)]
pub struct RecomputeDebouncer {
    delay: Duration,
    pending: Option<(PlaneId, Instant)>,
}

impl RecomputeDebouncer {
    /// Creates an idle debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records a move of `plane` at `now`.
    pub fn notify(&mut self, plane: PlaneId, now: Instant) {
        trace!(?plane, "plane moved, debounce restarted");
        self.pending = Some((plane, now + self.delay));
    }

    /// Returns the last moved plane if its quiet period has elapsed at
    /// `now`, clearing it.
    pub fn poll(&mut self, now: Instant) -> Option<PlaneId> {
        match self.pending {
            Some((plane, deadline)) if now >= deadline => {
                self.pending = None;
                Some(plane)
            }
            _ => None,
        }
    }

    /// Whether a recompute is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops a waiting recompute.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
