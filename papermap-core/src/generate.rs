//! Generation driver
//!
//! `Generator::prepare` indexes a store once; `Generator::run` then plans a
//! scheme for one renderer, fans each depth out over the worker pool and
//! finally writes that renderer's manifest. Several renderers can share one
//! prepared generator.

use crate::cell::{CellRenderer, RenderError};
use crate::coordinator::{Coordinator, DepthStats};
use crate::manifest::{write_atomic, RunSummary};
use crate::quadtree::Quadtree;
use crate::scheme::{plan, DepthSpec, SchemeError};
use crate::store::MarkerStore;
use crate::types::WorldCoord;
use log::{info, warn};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Scheme error: {0}")]
    Scheme(#[from] SchemeError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type GenerateResult<T> = Result<T, GenerateError>;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output_root: PathBuf,
    /// 0 means one worker per available core.
    pub max_workers: usize,
    /// Added to the marker bounding box on every side.
    pub padding: WorldCoord,
    /// Write manifests only.
    pub skip_cells: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("out"),
            max_workers: 0,
            padding: 0,
            skip_cells: false,
        }
    }
}

/// Outcome of one renderer's run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub renderer: String,
    pub depths: Vec<DepthStats>,
    pub manifest: PathBuf,
}

impl RunReport {
    pub fn written(&self) -> u64 {
        self.depths.iter().map(|d| d.written).sum()
    }

    pub fn failed(&self) -> u64 {
        self.depths.iter().map(|d| d.failed).sum()
    }
}

pub struct Generator<'a> {
    /// `None` when the store is empty.
    index: Option<Quadtree<'a>>,
    summary: RunSummary,
    coordinator: Coordinator,
    options: GenerateOptions,
}

impl<'a> Generator<'a> {
    /// Build the index for `store` and a worker pool for the run.
    pub fn prepare(store: &'a MarkerStore, options: GenerateOptions) -> GenerateResult<Self> {
        let coordinator = Coordinator::new(options.max_workers)?;
        let (index, summary) = match store.bounds(options.padding) {
            Some(bounds) => {
                info!("Indexing {} markers within {:?}", store.len(), bounds);
                let summary = RunSummary {
                    latest_id: store.latest_id().unwrap_or(0),
                    bounds,
                };
                (Some(Quadtree::build_within(store.markers(), bounds)), summary)
            }
            None => {
                warn!("Marker store is empty; only manifests will be written");
                (None, RunSummary::default())
            }
        };
        info!("Using {} workers", coordinator.workers());
        Ok(Self {
            index,
            summary,
            coordinator,
            options,
        })
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn index(&self) -> Option<&Quadtree<'a>> {
        self.index.as_ref()
    }

    /// Generate every depth of `table` with `renderer`, then its manifest.
    ///
    /// Depths run one after another; the manifest is written only once the
    /// last depth has finished. Cell failures are counted in the report,
    /// never returned as errors.
    pub fn run(&self, renderer: &dyn CellRenderer, table: &[DepthSpec]) -> GenerateResult<RunReport> {
        let root = &self.options.output_root;
        let scheme = match &self.index {
            Some(_) => plan(&self.summary.bounds, table)?,
            None => Vec::new(),
        };

        let mut depths = Vec::with_capacity(scheme.len());
        if let Some(index) = &self.index {
            if self.options.skip_cells {
                info!("[{}] skipping cell generation", renderer.name());
            } else {
                for entry in &scheme {
                    depths.push(self.coordinator.run_depth(index, entry, &self.summary.bounds, renderer, root));
                }
            }
        }

        let manifest = root.join(renderer.manifest_path());
        let bytes = renderer.manifest(&self.summary, &scheme)?;
        write_atomic(&manifest, &bytes).map_err(|source| GenerateError::Io {
            path: manifest.clone(),
            source,
        })?;

        let report = RunReport {
            renderer: renderer.name().to_string(),
            depths,
            manifest,
        };
        info!(
            "[{}] {} cells written, {} failed, manifest {}",
            report.renderer,
            report.written(),
            report.failed(),
            report.manifest.display()
        );
        Ok(report)
    }
}
