//! Parallel per-depth cell generation
//!
//! A depth's N×N grid is split into contiguous column ranges, one per worker.
//! Each worker walks its columns top to bottom, queries the shared index,
//! renders and writes the cell. `run_depth` only returns after every range is
//! done, so depths never overlap.

use crate::cell::{CellRenderer, CellSpec};
use crate::manifest::write_artifact;
use crate::quadtree::Quadtree;
use crate::scheme::SchemeEntry;
use crate::types::Bounds;
use log::{error, info};
use rayon::prelude::*;
use std::ops::Range;
use std::path::Path;

/// Counters for one depth, or for one worker's share of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepthStats {
    pub depth: u32,
    pub written: u64,
    pub failed: u64,
    /// Sum of markers handed to the renderer over all cells.
    pub markers: u64,
}

impl DepthStats {
    fn merge(self, other: DepthStats) -> DepthStats {
        DepthStats {
            depth: self.depth,
            written: self.written + other.written,
            failed: self.failed + other.failed,
            markers: self.markers + other.markers,
        }
    }
}

/// Split columns `1..=n` into `workers` contiguous ranges of `ceil(n / workers)`.
///
/// Exactly `workers` ranges are returned; trailing ones are empty when there
/// are more workers than columns.
pub fn partition_columns(n: u32, workers: usize) -> Vec<Range<u32>> {
    let workers = workers.max(1);
    let size = n.div_ceil(workers as u32).max(1);
    let end = n + 1;
    (0..workers as u32)
        .map(|i| {
            let start = 1u32.saturating_add(i.saturating_mul(size)).min(end);
            start..start.saturating_add(size).min(end)
        })
        .collect()
}

/// Available cores, capped by `max_workers` unless it is 0.
pub fn worker_count(max_workers: usize) -> usize {
    let available = num_cpus::get();
    let workers = if max_workers == 0 { available } else { available.min(max_workers) };
    workers.max(1)
}

pub struct Coordinator {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl Coordinator {
    pub fn new(max_workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = worker_count(max_workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("papermap-worker-{}", i))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Render and write every cell of `entry`, blocking until all are done.
    ///
    /// A cell that fails to render or write is logged and counted; it never
    /// stops its siblings.
    pub fn run_depth<R>(
        &self,
        index: &Quadtree<'_>,
        entry: &SchemeEntry,
        bounds: &Bounds,
        renderer: &R,
        output_root: &Path,
    ) -> DepthStats
    where
        R: CellRenderer + ?Sized,
    {
        info!(
            "[{}] depth {}: {}x{} cells of {} units",
            renderer.name(),
            entry.depth,
            entry.cells,
            entry.cells,
            entry.cell_size
        );

        let ranges = partition_columns(entry.cells, self.workers);
        let per_worker: Vec<DepthStats> = self.pool.install(|| {
            ranges
                .par_iter()
                .map(|columns| render_columns(columns.clone(), index, entry, bounds, renderer, output_root))
                .collect()
        });

        let stats = per_worker
            .into_iter()
            .fold(DepthStats { depth: entry.depth, ..Default::default() }, DepthStats::merge);
        info!(
            "[{}] depth {} done: {} written, {} failed",
            renderer.name(),
            entry.depth,
            stats.written,
            stats.failed
        );
        stats
    }
}

fn render_columns<R>(
    columns: Range<u32>,
    index: &Quadtree<'_>,
    entry: &SchemeEntry,
    bounds: &Bounds,
    renderer: &R,
    output_root: &Path,
) -> DepthStats
where
    R: CellRenderer + ?Sized,
{
    let mut stats = DepthStats { depth: entry.depth, ..Default::default() };
    let margin = renderer.query_margin(index.max_r());
    for xi in columns {
        for yi in 1..=entry.cells {
            let cell = CellSpec::new(entry, bounds, xi, yi);
            let half = cell.half_extent() + margin;
            let markers = index.query(cell.center(), (half, half));
            let path = output_root.join(renderer.artifact_path(&cell));

            let result = renderer
                .render(&cell, &markers)
                .and_then(|bytes| write_artifact(&path, &bytes).map_err(Into::into));
            match result {
                Ok(()) => {
                    stats.written += 1;
                    stats.markers += markers.len() as u64;
                }
                Err(e) => {
                    error!(
                        "[{}] depth {} cell ({}, {}) -> {}: {}",
                        renderer.name(),
                        entry.depth,
                        xi,
                        yi,
                        path.display(),
                        e
                    );
                    stats.failed += 1;
                }
            }
        }
    }
    stats
}
