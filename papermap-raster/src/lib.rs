/*!
# Papermap Raster Rendering

CPU rasterisation of paper markers into map tiles.

## Pipeline

1. **Colour**: each marker resolves a pale halo colour and a disc colour from
   its category, age or heat (optionally reduced to grayscale)
2. **Canvas**: halos first, then discs, composited onto a transparent RGBA
   image; sub-pixel discs fade out instead of vanishing
3. **Encode**: PNG or JPEG through the `image` crate

`TileRenderer` plugs into the core generator as a `CellRenderer`;
`overview` draws a whole store into a single image.
*/

pub mod canvas;
pub mod colour;
pub mod overview;
pub mod tiles;

pub use canvas::{Canvas, MIN_PIXEL_RADIUS};
pub use colour::{ColourScheme, Colouring, Palette, Rgb, DEFAULT_COLOUR};
pub use overview::{render_overview, write_overview};
pub use tiles::{TileFormat, TileOptions, TileRenderer};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid palette: {0}")]
    Palette(String),

    #[error("Render error: {0}")]
    Render(#[from] papermap_core::RenderError),
}

pub type RasterResult<T> = Result<T, RasterError>;
