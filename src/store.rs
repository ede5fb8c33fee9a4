use slotmap::SlotMap;

use crate::error::{Result, SequenceError};
use crate::geometry::CutPlane;

slotmap::new_key_type! {
    /// Unique identifier for a cut plane in the plane store.
    pub struct PlaneId;
}

/// Arena owning the cut planes of a planning session.
///
/// Planes are referenced by typed generational ids. The store also keeps
/// the planes' order along the bone, which [`SequencePlanes`] maintains.
///
/// [`SequencePlanes`]: crate::operations::SequencePlanes
#[derive(Debug, Default, Clone)]
pub struct PlaneStore {
    planes: SlotMap<PlaneId, CutPlane>,
    order: Vec<PlaneId>,
}

impl PlaneStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a plane at the end of the order and returns its id.
    pub fn add(&mut self, plane: CutPlane) -> PlaneId {
        let id = self.planes.insert(plane);
        self.order.push(id);
        id
    }

    /// Removes a plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane is not in the store.
    pub fn remove(&mut self, id: PlaneId) -> Result<CutPlane> {
        let plane = self.planes.remove(id).ok_or(SequenceError::PlaneNotFound)?;
        self.order.retain(|&other| other != id);
        Ok(plane)
    }

    /// Returns a plane, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane is not in the store.
    pub fn plane(&self, id: PlaneId) -> Result<&CutPlane> {
        Ok(self.planes.get(id).ok_or(SequenceError::PlaneNotFound)?)
    }

    /// Returns a mutable plane, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the plane is not in the store.
    pub fn plane_mut(&mut self, id: PlaneId) -> Result<&mut CutPlane> {
        Ok(self
            .planes
            .get_mut(id)
            .ok_or(SequenceError::PlaneNotFound)?)
    }

    /// Number of planes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the store holds no planes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Plane ids in sequence order.
    #[must_use]
    pub fn ids(&self) -> &[PlaneId] {
        &self.order
    }

    /// Position of a plane in the sequence.
    #[must_use]
    pub fn index_of(&self, id: PlaneId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Iterates over planes in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (PlaneId, &CutPlane)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.planes.get(id).map(|plane| (id, plane)))
    }

    /// Copies of the planes in sequence order.
    #[must_use]
    pub fn planes(&self) -> Vec<CutPlane> {
        self.iter().map(|(_, plane)| plane.clone()).collect()
    }

    pub(crate) fn set_order(&mut self, order: Vec<PlaneId>) {
        debug_assert_eq!(order.len(), self.planes.len());
        self.order = order;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};

    fn plane_at(z: f64) -> CutPlane {
        CutPlane::from_normal(Point3::new(0.0, 0.0, z), Vector3::z()).unwrap()
    }

    #[test]
    fn add_and_remove_keep_order() {
        let mut store = PlaneStore::new();
        let a = store.add(plane_at(0.0));
        let b = store.add(plane_at(1.0));
        let c = store.add(plane_at(2.0));
        assert_eq!(store.ids(), &[a, b, c]);

        store.remove(b).unwrap();
        assert_eq!(store.ids(), &[a, c]);
        assert_eq!(store.index_of(c), Some(1));
        assert!(store.plane(b).is_err());
        assert!(store.remove(b).is_err());
    }

    #[test]
    fn planes_follow_sequence_order() {
        let mut store = PlaneStore::new();
        let a = store.add(plane_at(0.0));
        let b = store.add(plane_at(5.0));
        store.set_order(vec![b, a]);
        let zs: Vec<f64> = store.planes().iter().map(|p| p.origin().z).collect();
        assert_eq!(zs, vec![5.0, 0.0]);
    }

    #[test]
    fn plane_mut_edits_in_place() {
        let mut store = PlaneStore::new();
        let a = store.add(plane_at(0.0));
        store.plane_mut(a).unwrap().set_origin(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(store.plane(a).unwrap().origin().x, 1.0);
    }
}
