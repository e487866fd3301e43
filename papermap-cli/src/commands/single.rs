//! Single command - render the whole map into one overview image

use anyhow::Result;
use papermap_raster::{write_overview, TileFormat};
use std::path::Path;

use super::load_input;
use crate::config::Config;

/// Pick the image format from the output extension, falling back to the configured one.
fn detect_format(output: &Path, fallback: TileFormat) -> TileFormat {
    match output.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "jpg" || ext == "jpeg" => TileFormat::Jpeg,
        Some(ext) if ext == "png" => TileFormat::Png,
        _ => fallback,
    }
}

pub fn execute(config: &Config, input: &Path, output: &Path) -> Result<()> {
    log::info!("Rendering overview of {} to {}", input.display(), output.display());

    let store = load_input(input)?;

    let mut config = config.clone();
    config.tiles.format = detect_format(output, config.tiles.format);
    let renderer = config.tile_renderer()?;

    write_overview(
        &renderer,
        &store,
        config.general.padding,
        config.tiles.overview_size,
        output,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("a.JPG"), TileFormat::Png), TileFormat::Jpeg);
        assert_eq!(detect_format(Path::new("a.png"), TileFormat::Jpeg), TileFormat::Png);
        assert_eq!(detect_format(Path::new("a"), TileFormat::Jpeg), TileFormat::Jpeg);
    }

    #[test]
    fn test_single_writes_image_of_requested_size() {
        let dir = TempDir::new().unwrap();
        let mut input = NamedTempFile::new().unwrap();
        write!(input, "[[1, 0, 0, 50], [2, 1000, 1000, 50]]").unwrap();

        let mut config = Config::default();
        config.tiles.overview_size = 40;
        let output = dir.path().join("overview.png");
        execute(&config, input.path(), &output).unwrap();

        let img = image::open(&output).unwrap();
        assert_eq!((img.width(), img.height()), (40, 40));
    }
}
