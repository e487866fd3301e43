//! Plan command - print the label and tile schemes without writing anything

use anyhow::Result;
use papermap_core::{plan, Bounds, SchemeEntry};
use std::fmt::Write;
use std::path::Path;

use super::load_input;
use crate::config::Config;
use crate::error::CliError;

pub fn execute(config: &Config, input: &Path) -> Result<()> {
    let store = load_input(input)?;
    let Some(bounds) = store.bounds(config.general.padding) else {
        println!("No markers in {}; nothing to plan", input.display());
        return Ok(());
    };

    println!(
        "{} markers, latest id {}, bounds ({}, {}) - ({}, {}), extent {}",
        store.len(),
        store.latest_id().unwrap_or(0),
        bounds.min_x,
        bounds.min_y,
        bounds.max_x,
        bounds.max_y,
        bounds.extent()
    );

    for (name, depths, skip) in [
        ("labels", &config.labels.depths, config.labels.skip),
        ("tiles", &config.tiles.depths, config.tiles.skip),
    ] {
        if skip {
            continue;
        }
        let scheme = plan(&bounds, depths).map_err(|e| CliError::validation(format!("{}: {}", name, e)))?;
        print!("\n{}", format_scheme(name, &bounds, &scheme));
    }
    Ok(())
}

/// One row per depth: grid size, cell size, scale and total cell count.
pub fn format_scheme(name: &str, bounds: &Bounds, scheme: &[SchemeEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (extent {})", name, bounds.extent());
    let _ = writeln!(out, "{:>5} {:>9} {:>10} {:>10} {:>10}", "depth", "grid", "cell", "scale", "cells");
    let mut total = 0u64;
    for entry in scheme {
        total += entry.cell_count();
        let _ = writeln!(
            out,
            "{:>5} {:>9} {:>10} {:>10} {:>10}",
            entry.depth,
            format!("{}x{}", entry.cells, entry.cells),
            entry.cell_size,
            entry.scale,
            entry.cell_count()
        );
    }
    let _ = writeln!(out, "total {} cells", total);
    out
}
