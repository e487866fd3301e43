//! Tiling and labelling schemes
//!
//! A scheme turns the marker bounding box plus a table of per-depth divisors
//! into concrete grid geometry. Cells are always square and derived from the
//! longest side of the box.

use crate::types::{Bounds, WorldCoord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemeError {
    #[error("Depth table is empty")]
    EmptyTable,

    #[error("Depth {depth} has a zero divisor (cells {cells}, scale {scale})")]
    ZeroDivisor { depth: usize, cells: u32, scale: u32 },
}

pub type SchemeResult<T> = Result<T, SchemeError>;

/// One row of a depth table: grid cells per axis and the scale divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSpec {
    pub cells: u32,
    pub scale: u32,
}

impl DepthSpec {
    pub const fn new(cells: u32, scale: u32) -> Self {
        Self { cells, scale }
    }
}

/// Label zones: one zone until the labels get dense, then doubling.
pub const LABEL_DEPTHS: [DepthSpec; 9] = [
    DepthSpec::new(1, 1),
    DepthSpec::new(1, 2),
    DepthSpec::new(1, 4),
    DepthSpec::new(1, 8),
    DepthSpec::new(2, 16),
    DepthSpec::new(4, 32),
    DepthSpec::new(8, 64),
    DepthSpec::new(16, 128),
    DepthSpec::new(32, 256),
];

/// Raster tiles: scale tracks the grid.
pub const TILE_DEPTHS: [DepthSpec; 5] = [
    DepthSpec::new(4, 4),
    DepthSpec::new(8, 8),
    DepthSpec::new(24, 24),
    DepthSpec::new(72, 72),
    DepthSpec::new(216, 216),
];

/// Grid geometry for one depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemeEntry {
    pub depth: u32,
    /// Cells per axis.
    pub cells: u32,
    pub cell_size: WorldCoord,
    pub scale: WorldCoord,
}

impl SchemeEntry {
    /// Lower corner of cell `(xi, yi)`; indices start at 1.
    pub fn cell_origin(&self, bounds: &Bounds, xi: u32, yi: u32) -> (WorldCoord, WorldCoord) {
        (
            bounds.min_x + WorldCoord::from(xi - 1) * self.cell_size,
            bounds.min_y + WorldCoord::from(yi - 1) * self.cell_size,
        )
    }

    pub fn cell_center(&self, bounds: &Bounds, xi: u32, yi: u32) -> (WorldCoord, WorldCoord) {
        let (x, y) = self.cell_origin(bounds, xi, yi);
        (x + self.half_extent(), y + self.half_extent())
    }

    pub fn half_extent(&self) -> WorldCoord {
        self.cell_size / 2
    }

    /// Total number of cells at this depth.
    pub fn cell_count(&self) -> u64 {
        u64::from(self.cells) * u64::from(self.cells)
    }
}

/// Derive one entry per row of `table` from `bounds`.
///
/// Cell size and scale are floored at one world unit so tiny inputs still
/// produce usable geometry.
pub fn plan(bounds: &Bounds, table: &[DepthSpec]) -> SchemeResult<Vec<SchemeEntry>> {
    if table.is_empty() {
        return Err(SchemeError::EmptyTable);
    }
    let extent = bounds.extent();
    table
        .iter()
        .enumerate()
        .map(|(depth, spec)| {
            if spec.cells == 0 || spec.scale == 0 {
                return Err(SchemeError::ZeroDivisor {
                    depth,
                    cells: spec.cells,
                    scale: spec.scale,
                });
            }
            Ok(SchemeEntry {
                depth: depth as u32,
                cells: spec.cells,
                cell_size: (extent / WorldCoord::from(spec.cells)).max(1),
                scale: (extent / WorldCoord::from(spec.scale)).max(1),
            })
        })
        .collect()
}
