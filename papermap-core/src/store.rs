//! Marker store
//!
//! An id-sorted, owned sequence of markers for one generation run. Enrichment
//! (labels, categories, heat) happens through `get_mut` before the store is
//! handed to the quadtree; after that it is only ever borrowed immutably.

use crate::types::{Bounds, Marker, MarkerId, WorldCoord};
use thiserror::Error;

/// Errors that can occur while assembling a marker store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate marker id: {0}")]
    DuplicateId(MarkerId),

    #[error("Invalid record for marker {id}: {reason}")]
    InvalidRecord { id: MarkerId, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
}

impl MarkerStore {
    /// Sort `markers` by id and reject duplicates.
    pub fn new(mut markers: Vec<Marker>) -> StoreResult<Self> {
        markers.sort_by_key(|m| m.id);
        if let Some(pair) = markers.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(StoreError::DuplicateId(pair[0].id));
        }
        Ok(Self { markers })
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &self.markers[idx])
    }

    pub fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        match self.markers.binary_search_by_key(&id, |m| m.id) {
            Ok(idx) => Some(&mut self.markers[idx]),
            Err(_) => None,
        }
    }

    /// Largest marker id; consumers use it for cache-busting.
    pub fn latest_id(&self) -> Option<MarkerId> {
        self.markers.last().map(|m| m.id)
    }


    /// Union of every marker circle's bounds, grown by `padding` on each side.
    pub fn bounds(&self, padding: WorldCoord) -> Option<Bounds> {
        let mut iter = self.markers.iter();
        let first = iter.next()?.bounds();
        let bounds = iter.fold(first, |acc, m| acc.union(&m.bounds()));
        Some(bounds.padded(padding))
    }

    /// Set every age to `rank / len` in id order.
    pub fn assign_age_by_rank(&mut self) {
        let n = self.markers.len() as f32;
        for (rank, marker) in self.markers.iter_mut().enumerate() {
            marker.age = rank as f32 / n;
        }
    }

    /// Set every age to its rank under an external sort key.
    pub fn assign_age_by_key<K: Ord, F: Fn(&Marker) -> K>(&mut self, key: F) {
        let mut order: Vec<usize> = (0..self.markers.len()).collect();
        order.sort_by_key(|&idx| key(&self.markers[idx]));
        let n = order.len() as f32;
        for (rank, idx) in order.into_iter().enumerate() {
            self.markers[idx].age = rank as f32 / n;
        }
    }

    /// Scale heat so the hottest marker has heat 1.0.
    pub fn normalize_heat(&mut self) {
        let max_heat = self.markers.iter().map(|m| m.heat).fold(0.0f32, f32::max);
        if max_heat <= 0.0 {
            return;
        }
        for marker in &mut self.markers {
            marker.heat /= max_heat;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MarkerStore {
        MarkerStore::new(vec![
            Marker::new(30, 0, 0, 10),
            Marker::new(10, 100, 50, 5),
            Marker::new(20, -40, 200, 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_sorted_by_id_and_lookup() {
        let s = store();
        let ids: Vec<_> = s.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(s.get(20).map(|m| m.x), Some(-40));
        assert!(s.get(25).is_none());
        assert_eq!(s.latest_id(), Some(30));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = MarkerStore::new(vec![Marker::new(1, 0, 0, 1), Marker::new(1, 5, 5, 1)]);
        assert!(matches!(err, Err(StoreError::DuplicateId(1))));
    }

    #[test]
    fn test_bounds_include_radius_and_padding() {
        let s = store();
        assert_eq!(s.bounds(0), Some(Bounds::new(-41, -10, 105, 201)));
        assert_eq!(s.bounds(100), Some(Bounds::new(-141, -110, 205, 301)));
        assert_eq!(MarkerStore::default().bounds(0), None);
    }

    #[test]
    fn test_age_by_rank_and_key() {
        let mut s = store();
        s.assign_age_by_rank();
        let ages: Vec<_> = s.iter().map(|m| m.age).collect();
        assert_eq!(ages, vec![0.0, 1.0 / 3.0, 2.0 / 3.0]);

        s.assign_age_by_key(|m| m.x);
        assert_eq!(s.get(20).unwrap().age, 0.0);
        assert_eq!(s.get(10).unwrap().age, 2.0 / 3.0);
    }

    #[test]
    fn test_normalize_heat() {
        let mut s = store();
        s.get_mut(10).unwrap().heat = 2.0;
        s.get_mut(30).unwrap().heat = 4.0;
        s.normalize_heat();
        assert_eq!(s.get(10).unwrap().heat, 0.5);
        assert_eq!(s.get(30).unwrap().heat, 1.0);
        assert_eq!(s.get(20).unwrap().heat, 0.0);
    }
}
