//! Per-cell rendering seam
//!
//! The coordinator hands every grid cell to a `CellRenderer` together with
//! the markers the index found for it. Renderers are pure: they turn a cell
//! into bytes and say where those bytes belong. Writing is left to the caller.

use crate::manifest::RunSummary;
use crate::scheme::SchemeEntry;
use crate::types::{Bounds, Marker, WorldCoord};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// One grid cell at one depth, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpec {
    pub depth: u32,
    pub xi: u32,
    pub yi: u32,
    /// Lower corner of the cell.
    pub origin: (WorldCoord, WorldCoord),
    pub size: WorldCoord,
    pub scale: WorldCoord,
}

impl CellSpec {
    pub fn new(entry: &SchemeEntry, bounds: &Bounds, xi: u32, yi: u32) -> Self {
        Self {
            depth: entry.depth,
            xi,
            yi,
            origin: entry.cell_origin(bounds, xi, yi),
            size: entry.cell_size,
            scale: entry.scale,
        }
    }

    pub fn half_extent(&self) -> WorldCoord {
        self.size / 2
    }

    pub fn center(&self) -> (WorldCoord, WorldCoord) {
        let half = self.half_extent();
        (self.origin.0 + half, self.origin.1 + half)
    }
}

/// Turns the markers of one cell into an output artifact.
///
/// Implementations are shared by every worker of a depth and must not hold
/// mutable state.
pub trait CellRenderer: Sync {
    /// Short name used in logs ("zones", "tiles").
    fn name(&self) -> &str;

    /// Artifact location relative to the output root. Distinct cells must
    /// map to distinct paths.
    fn artifact_path(&self, cell: &CellSpec) -> PathBuf;

    /// Extra world units this renderer draws beyond a marker's radius, given
    /// the largest radius in the index. Cell queries are widened by it.
    fn query_margin(&self, _max_r: WorldCoord) -> WorldCoord {
        0
    }

    /// Render `markers` (sorted by id) into the artifact bytes for `cell`.
    fn render(&self, cell: &CellSpec, markers: &[&Marker]) -> RenderResult<Vec<u8>>;

    /// Manifest location relative to the output root.
    fn manifest_path(&self) -> PathBuf;

    /// Manifest bytes describing every depth that was generated.
    fn manifest(&self, summary: &RunSummary, scheme: &[SchemeEntry]) -> RenderResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{plan, DepthSpec};

    #[test]
    fn test_cell_spec_geometry() {
        let bounds = Bounds::new(0, 0, 1000, 1000);
        let entry = plan(&bounds, &[DepthSpec::new(8, 8)]).unwrap()[0];
        let cell = CellSpec::new(&entry, &bounds, 2, 3);
        assert_eq!(cell.origin, (125, 250));
        assert_eq!(cell.center(), (187, 312));
    }
}
