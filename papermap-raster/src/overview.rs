//! Single-image overview of a whole marker store
//!
//! Useful as a poster or as a quick check of the layout before committing to
//! a full tile run. The image covers the squared store bounds.

use crate::tiles::TileRenderer;
use crate::RasterResult;
use log::info;
use papermap_core::manifest::write_artifact;
use papermap_core::{CellSpec, MarkerStore, WorldCoord};
use std::path::Path;

/// Render every marker of `store` into one `pixel_size` square image.
pub fn render_overview(
    renderer: &TileRenderer,
    store: &MarkerStore,
    padding: WorldCoord,
    pixel_size: u32,
) -> RasterResult<Vec<u8>> {
    let bounds = store.bounds(padding).unwrap_or_default().squared();
    let cell = CellSpec {
        depth: 0,
        xi: 1,
        yi: 1,
        origin: (bounds.min_x, bounds.min_y),
        size: bounds.extent().max(1),
        scale: bounds.extent().max(1),
    };
    let canvas = renderer.draw(&cell, store.iter(), pixel_size);
    Ok(canvas.encode(renderer.options().format.image_format())?)
}

pub fn write_overview(
    renderer: &TileRenderer,
    store: &MarkerStore,
    padding: WorldCoord,
    pixel_size: u32,
    path: &Path,
) -> RasterResult<()> {
    let bytes = render_overview(renderer, store, padding, pixel_size)?;
    write_artifact(path, &bytes)?;
    info!(
        "Wrote {}x{} overview of {} markers to {}",
        pixel_size,
        pixel_size,
        store.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use papermap_core::Marker;

    #[test]
    fn test_overview_of_empty_store_is_blank_image() {
        let bytes = render_overview(&TileRenderer::default(), &MarkerStore::default(), 0, 16).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (16, 16));
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_overview_draws_markers() {
        let mut store = MarkerStore::new(vec![Marker::new(1, 0, 0, 50), Marker::new(2, 1000, 1000, 50)]).unwrap();
        store.assign_age_by_rank();
        let bytes = render_overview(&TileRenderer::default(), &store, 0, 64).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert!(img.pixels().filter(|p| p.0[3] == 255).count() > 10);
    }
}
