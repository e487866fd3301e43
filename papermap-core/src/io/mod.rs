//! Marker input
//!
//! A marker file is a JSON array whose elements are either compact
//! `[id, x, y, r]` tuples or record objects:
//!
//! ```json
//! [[1, 100, 200, 12],
//!  {"id": 2, "x": -50, "y": 80, "r": 30, "authors": "A.Smith", "keywords": "lensing"}]
//! ```
//!
//! Records without an `age` get one from their rank in id order.

use crate::label;
use crate::store::{MarkerStore, StoreError, StoreResult};
use crate::types::{Marker, MarkerId, WorldCoord};
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MarkerInput {
    Compact(MarkerId, WorldCoord, WorldCoord, i64),
    Record(MarkerRecord),
}

#[derive(Debug, Clone, Deserialize)]
struct MarkerRecord {
    id: MarkerId,
    x: WorldCoord,
    y: WorldCoord,
    r: i64,
    #[serde(default)]
    age: Option<f32>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    authors: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    heat: Option<f32>,
}

impl MarkerInput {
    fn into_marker(self) -> StoreResult<(Marker, Option<f32>)> {
        let record = match self {
            MarkerInput::Compact(id, x, y, r) => MarkerRecord {
                id,
                x,
                y,
                r,
                age: None,
                label: None,
                authors: None,
                keywords: None,
                category: None,
                heat: None,
            },
            MarkerInput::Record(record) => record,
        };

        let invalid = |reason: String| StoreError::InvalidRecord { id: record.id, reason };
        let radius = u32::try_from(record.r).map_err(|_| invalid(format!("radius {} out of range", record.r)))?;
        if let Some(age) = record.age {
            if !(0.0..=1.0).contains(&age) {
                return Err(invalid(format!("age {} outside [0, 1]", age)));
            }
        }
        let heat = record.heat.unwrap_or(0.0);
        if !heat.is_finite() || heat < 0.0 {
            return Err(invalid(format!("heat {} must be a non-negative number", heat)));
        }

        let text = match (record.label, record.authors, record.keywords) {
            (Some(label), _, _) => label::sanitize(&label),
            (None, None, None) => String::new(),
            (None, authors, keywords) => {
                label::compose(authors.as_deref().unwrap_or(""), keywords.as_deref().unwrap_or(""))
            }
        };

        let marker = Marker::new(record.id, record.x, record.y, radius)
            .with_label(text)
            .with_category(record.category.unwrap_or_default())
            .with_heat(heat);
        Ok((marker, record.age))
    }
}

/// Parse markers from any JSON reader.
pub fn read_markers<R: Read>(reader: R) -> StoreResult<MarkerStore> {
    let inputs: Vec<MarkerInput> = serde_json::from_reader(reader)?;
    let mut parsed = inputs
        .into_iter()
        .map(MarkerInput::into_marker)
        .collect::<StoreResult<Vec<_>>>()?;
    parsed.sort_by_key(|(m, _)| m.id);

    let n = parsed.len() as f32;
    let markers = parsed
        .into_iter()
        .enumerate()
        .map(|(rank, (mut marker, age))| {
            marker.age = age.unwrap_or(rank as f32 / n);
            marker
        })
        .collect();

    let mut store = MarkerStore::new(markers)?;
    if store.iter().any(|m| m.heat > 1.0) {
        debug!("Heat values exceed 1.0; normalizing");
        store.normalize_heat();
    }
    Ok(store)
}

/// Load a marker file from disk.
pub fn load_markers<P: AsRef<Path>>(path: P) -> StoreResult<MarkerStore> {
    let file = File::open(path.as_ref())?;
    let store = read_markers(BufReader::new(file))?;
    match store.bounds(0) {
        Some(bounds) => info!(
            "Loaded {} markers from {} (bounds {:?})",
            store.len(),
            path.as_ref().display(),
            bounds
        ),
        None => info!("Loaded no markers from {}", path.as_ref().display()),
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_tuples_get_rank_age() {
        let store = read_markers(r#"[[3, 0, 0, 5], [1, 10, 10, 2], [2, -5, 7, 0]]"#.as_bytes()).unwrap();
        let ids: Vec<_> = store.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.get(1).unwrap().age, 0.0);
        assert_eq!(store.get(3).unwrap().age, 2.0 / 3.0);
    }

    #[test]
    fn test_records_with_metadata() {
        let json = r#"[
            {"id": 1, "x": 5, "y": 6, "r": 7, "age": 0.25, "label": "plain {label}", "category": "hep-th"},
            {"id": 2, "x": 0, "y": 0, "r": 1, "authors": "A.Smith,B.Jones", "keywords": "lensing"},
            [3, 1, 1, 1]
        ]"#;
        let store = read_markers(json.as_bytes()).unwrap();
        let first = store.get(1).unwrap();
        assert_eq!(first.age, 0.25);
        assert_eq!(first.label, "plain label");
        assert_eq!(first.category, "hep-th");
        assert_eq!(store.get(2).unwrap().label, "lensing,,Smith,Jones");
        assert_eq!(store.get(3).unwrap().label, "");
    }

    #[test]
    fn test_heat_normalized_when_raw() {
        let json = r#"[{"id": 1, "x": 0, "y": 0, "r": 1, "heat": 4.0},
                       {"id": 2, "x": 0, "y": 0, "r": 1, "heat": 2.0}]"#;
        let store = read_markers(json.as_bytes()).unwrap();
        assert_eq!(store.get(1).unwrap().heat, 1.0);
        assert_eq!(store.get(2).unwrap().heat, 0.5);
    }

    #[test]
    fn test_invalid_records() {
        let err = read_markers(r#"[[1, 0, 0, -4]]"#.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { id: 1, .. }));

        let err = read_markers(r#"[{"id": 9, "x": 0, "y": 0, "r": 1, "age": 1.5}]"#.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { id: 9, .. }));

        let err = read_markers(r#"[[1, 0, 0, 1], [1, 2, 2, 1]]"#.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(1)));

        assert!(matches!(read_markers("{}".as_bytes()), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_empty_array() {
        assert!(read_markers("[]".as_bytes()).unwrap().is_empty());
    }
}
