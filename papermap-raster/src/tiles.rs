//! Raster tiles
//!
//! Tiles are square images of `pixel_size` pixels, one per grid cell, written
//! to `tiles/{depth}/{xi}/{yi}.png` (or `tiles-bw/...` in grayscale). Each
//! tile is drawn in two passes so every halo sits underneath every disc.

use crate::canvas::Canvas;
use crate::colour::Colouring;
use image::ImageFormat;
use papermap_core::manifest::{jsonp, RunSummary};
use papermap_core::{CellRenderer, CellSpec, Marker, MarkerId, RenderResult, SchemeEntry, WorldCoord};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFormat {
    #[default]
    Png,
    Jpeg,
}

impl TileFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TileFormat::Png => "png",
            TileFormat::Jpeg => "jpg",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            TileFormat::Png => ImageFormat::Png,
            TileFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TileOptions {
    pub pixel_size: u32,
    pub format: TileFormat,
    pub draw_outline: bool,
    /// Halo radius as a multiple of the marker radius; 0 disables halos.
    pub halo_scale: f64,
    pub background: [u8; 4],
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            pixel_size: 256,
            format: TileFormat::Png,
            draw_outline: false,
            halo_scale: 1.5,
            background: [0, 0, 0, 0],
        }
    }
}

#[derive(Serialize)]
struct Tiling {
    z: u32,
    tw: WorldCoord,
    th: WorldCoord,
    nx: u32,
    ny: u32,
}

#[derive(Serialize)]
struct TileIndex {
    latestid: MarkerId,
    xmin: WorldCoord,
    ymin: WorldCoord,
    xmax: WorldCoord,
    ymax: WorldCoord,
    pixelw: u32,
    pixelh: u32,
    tilings: Vec<Tiling>,
}

#[derive(Debug, Clone, Default)]
pub struct TileRenderer {
    options: TileOptions,
    colouring: Colouring,
}

impl TileRenderer {
    pub fn new(options: TileOptions, colouring: Colouring) -> Self {
        Self { options, colouring }
    }

    pub fn options(&self) -> &TileOptions {
        &self.options
    }

    fn directory(&self) -> &'static str {
        if self.colouring.grayscale {
            "tiles-bw"
        } else {
            "tiles"
        }
    }

    /// Draw `markers` into a `pixels`-wide square covering `cell`.
    pub fn draw<'m, I>(&self, cell: &CellSpec, markers: I, pixels: u32) -> Canvas
    where
        I: IntoIterator<Item = &'m Marker>,
        I::IntoIter: Clone,
    {
        let scale = f64::from(pixels) / cell.size.max(1) as f64;
        let mut canvas = Canvas::new(pixels, pixels, cell.origin, scale, self.options.background);
        let markers = markers.into_iter();

        if self.options.halo_scale > 0.0 {
            for m in markers.clone() {
                let r = f64::from(m.radius) * self.options.halo_scale;
                canvas.fill_circle(m.x, m.y, r, self.colouring.background(m));
            }
        }
        for m in markers {
            let r = f64::from(m.radius);
            canvas.fill_circle(m.x, m.y, r, self.colouring.foreground(m));
            if self.options.draw_outline {
                canvas.outline_circle(m.x, m.y, r);
            }
        }
        canvas
    }
}

impl CellRenderer for TileRenderer {
    fn name(&self) -> &str {
        "tiles"
    }

    fn artifact_path(&self, cell: &CellSpec) -> PathBuf {
        PathBuf::from(self.directory())
            .join(cell.depth.to_string())
            .join(cell.xi.to_string())
            .join(format!("{}.{}", cell.yi, self.options.format.extension()))
    }

    /// Halos reach `(halo_scale - 1) * r` past the disc.
    fn query_margin(&self, max_r: WorldCoord) -> WorldCoord {
        let reach = max_r as f64 * (self.options.halo_scale - 1.0);
        reach.max(0.0).ceil() as WorldCoord
    }

    fn render(&self, cell: &CellSpec, markers: &[&Marker]) -> RenderResult<Vec<u8>> {
        let canvas = self.draw(cell, markers.iter().copied(), self.options.pixel_size);
        canvas.encode(self.options.format.image_format())
    }

    fn manifest_path(&self) -> PathBuf {
        PathBuf::from("tiles").join("tile_index.json")
    }

    fn manifest(&self, summary: &RunSummary, scheme: &[SchemeEntry]) -> RenderResult<Vec<u8>> {
        let index = TileIndex {
            latestid: summary.latest_id,
            xmin: summary.bounds.min_x,
            ymin: summary.bounds.min_y,
            xmax: summary.bounds.max_x,
            ymax: summary.bounds.max_y,
            pixelw: self.options.pixel_size,
            pixelh: self.options.pixel_size,
            tilings: scheme
                .iter()
                .map(|e| Tiling {
                    z: e.depth,
                    tw: e.cell_size,
                    th: e.cell_size,
                    nx: e.cells,
                    ny: e.cells,
                })
                .collect(),
        };
        Ok(jsonp("tile_index", &index)?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papermap_core::Bounds;

    fn cell() -> CellSpec {
        CellSpec {
            depth: 1,
            xi: 2,
            yi: 1,
            origin: (0, 0),
            size: 100,
            scale: 100,
        }
    }

    #[test]
    fn test_artifact_paths() {
        let png = TileRenderer::default();
        assert_eq!(png.artifact_path(&cell()), PathBuf::from("tiles/1/2/1.png"));

        let jpeg_bw = TileRenderer::new(
            TileOptions {
                format: TileFormat::Jpeg,
                ..Default::default()
            },
            Colouring {
                grayscale: true,
                ..Default::default()
            },
        );
        assert_eq!(jpeg_bw.artifact_path(&cell()), PathBuf::from("tiles-bw/1/2/1.jpg"));
        assert_eq!(jpeg_bw.manifest_path(), PathBuf::from("tiles/tile_index.json"));
    }

    #[test]
    fn test_halo_under_disc() {
        let renderer = TileRenderer::default();
        let mut m = Marker::new(1, 50, 50, 10).with_category("hep-th");
        m.age = 1.0;
        let canvas = renderer.draw(&cell(), [&m], 100);
        let img = canvas.image();
        // disc centre is the foreground colour
        assert_eq!(img.get_pixel(50, 50).0, [0, 0, 255, 255]);
        // between r and 1.5r only the washed halo shows
        let halo = img.get_pixel(50, 63).0;
        assert!((178..=179).contains(&halo[0]) && halo[0] == halo[1]);
        assert_eq!(&halo[2..], &[255, 255]);
        assert_eq!(img.get_pixel(50, 70).0[3], 0);
    }

    #[test]
    fn test_query_margin_follows_halo() {
        assert_eq!(TileRenderer::default().query_margin(10), 5);
        assert_eq!(TileRenderer::default().query_margin(3), 2);

        let no_halo = TileRenderer::new(
            TileOptions {
                halo_scale: 0.0,
                ..Default::default()
            },
            Colouring::default(),
        );
        assert_eq!(no_halo.query_margin(10), 0);
    }

    #[test]
    fn test_tile_manifest_shape() {
        let summary = RunSummary {
            latest_id: 9,
            bounds: Bounds::new(-10, -10, 90, 90),
        };
        let scheme = papermap_core::plan(&summary.bounds, &[papermap_core::DepthSpec::new(4, 4)]).unwrap();
        let out = TileRenderer::default().manifest(&summary, &scheme).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                r#"tile_index({"latestid":9,"xmin":-10,"ymin":-10,"xmax":90,"ymax":90,"#,
                r#""pixelw":256,"pixelh":256,"tilings":[{"z":0,"tw":25,"th":25,"nx":4,"ny":4}]})"#
            )
        );
    }
}
