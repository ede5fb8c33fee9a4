use tracing::debug;

use crate::error::{Result, SequenceError};
use crate::geometry::GuideCurve;
use crate::store::{PlaneId, PlaneStore};

/// Orders the planes of a store along a guide curve.
///
/// Each plane is ranked by the index of the curve sample nearest to its
/// origin; the sort is stable, so planes sharing a sample keep their
/// relative order and re-running the operation changes nothing.
pub struct SequencePlanes<'a> {
    curve: &'a GuideCurve,
}

impl<'a> SequencePlanes<'a> {
    /// Creates a new `SequencePlanes` operation.
    #[must_use]
    pub fn new(curve: &'a GuideCurve) -> Self {
        Self { curve }
    }

    /// Re-orders the store and returns each plane's curve index, in the
    /// new order.
    ///
    /// # Errors
    ///
    /// Returns an error if an id in the order is missing from the store.
    pub fn execute(&self, store: &mut PlaneStore) -> Result<Vec<usize>> {
        let mut ranked: Vec<(PlaneId, usize)> = store
            .ids()
            .iter()
            .map(|&id| {
                let plane = store.plane(id)?;
                Ok((id, self.curve.closest_point_index(plane.origin())))
            })
            .collect::<Result<_>>()?;
        ranked.sort_by_key(|&(_, index)| index);

        let indices: Vec<usize> = ranked.iter().map(|&(_, index)| index).collect();
        debug!(?indices, "sequenced cut planes");
        store.set_order(ranked.into_iter().map(|(id, _)| id).collect());
        Ok(indices)
    }
}

/// Checks that a plane count can be split into osteotomy pairs.
///
/// # Errors
///
/// Returns [`SequenceError::OddPlaneCount`] when `count` is odd.
pub fn ensure_even(count: usize) -> Result<()> {
    if count % 2 == 0 {
        Ok(())
    } else {
        Err(SequenceError::OddPlaneCount { count }.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::CutPlane;
    use crate::math::{Point3, Vector3};

    fn curve() -> GuideCurve {
        GuideCurve::new((0..=10).map(|i| Point3::new(0.0, 0.0, f64::from(i))).collect()).unwrap()
    }

    fn plane_at(z: f64) -> CutPlane {
        CutPlane::from_normal(Point3::new(0.5, 0.0, z), Vector3::z()).unwrap()
    }

    #[test]
    fn sorts_by_nearest_curve_index() {
        let curve = curve();
        let mut store = PlaneStore::new();
        let c = store.add(plane_at(8.2));
        let a = store.add(plane_at(1.1));
        let b = store.add(plane_at(4.9));

        let indices = SequencePlanes::new(&curve).execute(&mut store).unwrap();
        assert_eq!(indices, vec![1, 5, 8]);
        assert_eq!(store.ids(), &[a, b, c]);
    }

    #[test]
    fn sequencing_is_idempotent() {
        let curve = curve();
        let mut store = PlaneStore::new();
        store.add(plane_at(6.0));
        store.add(plane_at(2.0));
        store.add(plane_at(2.1));
        store.add(plane_at(9.0));

        SequencePlanes::new(&curve).execute(&mut store).unwrap();
        let once = store.ids().to_vec();
        SequencePlanes::new(&curve).execute(&mut store).unwrap();
        assert_eq!(store.ids(), once.as_slice());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let curve = curve();
        let mut store = PlaneStore::new();
        let first = store.add(plane_at(3.1));
        let second = store.add(plane_at(2.9));
        SequencePlanes::new(&curve).execute(&mut store).unwrap();
        assert_eq!(store.ids(), &[first, second]);
    }

    #[test]
    fn odd_counts_are_rejected() {
        assert!(ensure_even(0).is_ok());
        assert!(ensure_even(4).is_ok());
        assert!(matches!(
            ensure_even(3),
            Err(crate::error::PlannerError::Sequence(SequenceError::OddPlaneCount { count: 3 }))
        ));
    }
}
