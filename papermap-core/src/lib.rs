//! Papermap Core Library
//!
//! Marker store, quadtree index, tiling schemes and the parallel per-depth
//! generator that turns a paper map into label zones (and, through other
//! crates, raster tiles).

pub mod types;
pub mod label;
pub mod store;
pub mod io;
pub mod quadtree;
pub mod scheme;
pub mod cell;
pub mod manifest;
pub mod coordinator;
pub mod zones;
pub mod generate;

// Re-export commonly used types and functions
pub use types::{Bounds, Marker, MarkerId, WorldCoord};
pub use store::{MarkerStore, StoreError, StoreResult};
pub use io::{load_markers, read_markers};
pub use quadtree::{InsertError, Quadtree};
pub use scheme::{plan, DepthSpec, SchemeEntry, SchemeError, LABEL_DEPTHS, TILE_DEPTHS};
pub use cell::{CellRenderer, CellSpec, RenderError, RenderResult};
pub use manifest::RunSummary;
pub use coordinator::{partition_columns, worker_count, Coordinator, DepthStats};
pub use zones::LabelZoneRenderer;
pub use generate::{GenerateError, GenerateOptions, GenerateResult, Generator, RunReport};

/// Version information for the papermap core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
