//! Generate command - index the markers, then write label zones and tiles

use anyhow::Result;
use papermap_core::{Generator, RunReport};
use std::path::Path;

use super::load_input;
use crate::config::Config;
use crate::error::CliError;

pub fn execute(config: &Config, input: &Path) -> Result<Vec<RunReport>> {
    log::info!("Starting generation");
    log::info!("Input markers: {}", input.display());
    log::info!("Output root: {}", config.general.output_root.display());

    let store = load_input(input)?;
    let generator = Generator::prepare(&store, config.generate_options()).map_err(CliError::from)?;

    let mut reports = Vec::new();
    if config.labels.skip {
        log::info!("Skipping label zones");
    } else {
        let renderer = config.label_renderer();
        reports.push(generator.run(&renderer, &config.labels.depths).map_err(CliError::from)?);
    }

    if config.tiles.skip {
        log::info!("Skipping raster tiles");
    } else {
        let renderer = config.tile_renderer()?;
        reports.push(generator.run(&renderer, &config.tiles.depths).map_err(CliError::from)?);
    }

    let failed: u64 = reports.iter().map(RunReport::failed).sum();
    if failed > 0 {
        log::warn!("{} cells could not be written; see errors above", failed);
    }
    log::info!("Generation completed");

    Ok(reports)
}
