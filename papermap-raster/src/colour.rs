//! Marker colours
//!
//! Every marker gets two colours: a pale background used for its halo and a
//! foreground used for the disc itself. Under the category scheme the base
//! colour comes from the marker's category and the foreground is dimmed for
//! older markers; under the heat-map scheme the base colour is interpolated
//! from cold to warm by heat.

use crate::{RasterError, RasterResult};
use log::info;
use papermap_core::Marker;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Linear RGB with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        Rgb(
            self.0 + (other.0 - self.0) * t,
            self.1 + (other.1 - self.1) * t,
            self.2 + (other.2 - self.2) * t,
        )
    }

    pub fn scale(self, factor: f32) -> Rgb {
        Rgb(self.0 * factor, self.1 * factor, self.2 * factor)
    }

    /// Pale version used behind the marker.
    pub fn washed(self) -> Rgb {
        Rgb(0.7 + 0.3 * self.0, 0.7 + 0.3 * self.1, 0.7 + 0.3 * self.2)
    }

    pub fn luminance(self) -> f32 {
        0.289 * self.0 + 0.587 * self.1 + 0.114 * self.2
    }

    pub fn gray(self) -> Rgb {
        let l = self.luminance();
        Rgb(l, l, l)
    }

    pub fn to_bytes(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.0), q(self.1), q(self.2)]
    }
}

/// Colour for markers whose category is unknown.
pub const DEFAULT_COLOUR: Rgb = Rgb(0.7, 1.0, 0.3);

const BUILTIN_CATEGORIES: [(&str, Rgb); 11] = [
    ("hep-th", Rgb(0.0, 0.0, 1.0)),
    ("hep-ph", Rgb(0.0, 1.0, 0.0)),
    ("hep-ex", Rgb(1.0, 1.0, 0.0)),
    ("gr-qc", Rgb(0.0, 1.0, 1.0)),
    ("astro-ph.GA", Rgb(1.0, 0.0, 1.0)),
    ("hep-lat", Rgb(0.7, 0.36, 0.2)),
    ("astro-ph.CO", Rgb(0.62, 0.86, 0.24)),
    ("astro-ph", Rgb(0.89, 0.53, 0.6)),
    ("cont-mat", Rgb(0.6, 0.4, 0.4)),
    ("quant-ph", Rgb(0.4, 0.7, 0.7)),
    ("physics", Rgb(0.0, 0.5, 0.0)),
];

#[derive(Debug, Deserialize)]
struct PaletteEntry {
    cat: String,
    col: [f32; 3],
}

/// Category name to base colour.
#[derive(Debug, Clone)]
pub struct Palette {
    colours: HashMap<String, Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colours: BUILTIN_CATEGORIES
                .iter()
                .map(|(cat, col)| (cat.to_string(), *col))
                .collect(),
        }
    }
}

impl Palette {
    /// Parse `[{"cat": "hep-th", "col": [0, 0, 1]}, ...]`.
    pub fn from_reader<R: Read>(reader: R) -> RasterResult<Self> {
        let entries: Vec<PaletteEntry> = serde_json::from_reader(reader)?;
        let mut colours = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.col.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(RasterError::Palette(format!(
                    "colour for category '{}' has components outside [0, 1]",
                    entry.cat
                )));
            }
            colours.insert(entry.cat, Rgb(entry.col[0], entry.col[1], entry.col[2]));
        }
        Ok(Self { colours })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> RasterResult<Self> {
        let file = File::open(path.as_ref())?;
        let palette = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} category colours from {}",
            palette.len(),
            path.as_ref().display()
        );
        Ok(palette)
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    pub fn colour_of(&self, category: &str) -> Rgb {
        self.colours.get(category).copied().unwrap_or(DEFAULT_COLOUR)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourScheme {
    #[default]
    Category,
    Heatmap,
}

/// Resolves the background and foreground colour of each marker.
#[derive(Debug, Clone)]
pub struct Colouring {
    pub scheme: ColourScheme,
    pub palette: Palette,
    pub cold: Rgb,
    pub warm: Rgb,
    pub grayscale: bool,
}

impl Default for Colouring {
    fn default() -> Self {
        Self {
            scheme: ColourScheme::Category,
            palette: Palette::default(),
            cold: Rgb(0.0, 0.0, 1.0),
            warm: Rgb(1.0, 0.0, 0.0),
            grayscale: false,
        }
    }
}

impl Colouring {
    fn base(&self, marker: &Marker) -> Rgb {
        match self.scheme {
            ColourScheme::Category => self.palette.colour_of(&marker.category),
            ColourScheme::Heatmap => self.cold.lerp(self.warm, marker.heat),
        }
    }

    fn finish(&self, colour: Rgb) -> Rgb {
        if self.grayscale {
            colour.gray()
        } else {
            colour
        }
    }

    pub fn background(&self, marker: &Marker) -> Rgb {
        self.finish(self.base(marker).washed())
    }

    /// Category colours darken with age; heat colours are used as-is.
    pub fn foreground(&self, marker: &Marker) -> Rgb {
        let base = self.base(marker);
        let colour = match self.scheme {
            ColourScheme::Category => base.scale(0.2 + 0.8 * marker.age.clamp(0.0, 1.0)),
            ColourScheme::Heatmap => base,
        };
        self.finish(colour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5 && (a.2 - b.2).abs() < 1e-5
    }

    #[test]
    fn test_palette_from_json_and_fallback() {
        let json = r#"[{"cat": "lensing", "col": [0.5, 0.25, 1.0]}]"#;
        let palette = Palette::from_reader(json.as_bytes()).unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.colour_of("lensing"), Rgb(0.5, 0.25, 1.0));
        assert_eq!(palette.colour_of("hep-th"), DEFAULT_COLOUR);
    }

    #[test]
    fn test_palette_rejects_out_of_range() {
        let json = r#"[{"cat": "x", "col": [2.0, 0.0, 0.0]}]"#;
        assert!(matches!(Palette::from_reader(json.as_bytes()), Err(RasterError::Palette(_))));
    }

    #[test]
    fn test_category_colours_dim_with_age() {
        let colouring = Colouring::default();
        let old = Marker::new(1, 0, 0, 1).with_category("hep-th");
        let mut new = old.clone();
        new.age = 1.0;

        assert!(close(colouring.foreground(&old), Rgb(0.0, 0.0, 0.2)));
        assert!(close(colouring.foreground(&new), Rgb(0.0, 0.0, 1.0)));
        assert!(close(colouring.background(&old), Rgb(0.7, 0.7, 1.0)));
    }

    #[test]
    fn test_unknown_category_uses_default() {
        let colouring = Colouring::default();
        let mut m = Marker::new(1, 0, 0, 1).with_category("nope");
        m.age = 1.0;
        assert!(close(colouring.foreground(&m), DEFAULT_COLOUR));
    }

    #[test]
    fn test_heatmap_interpolates() {
        let colouring = Colouring {
            scheme: ColourScheme::Heatmap,
            ..Default::default()
        };
        let m = Marker::new(1, 0, 0, 1).with_heat(0.25);
        assert!(close(colouring.foreground(&m), Rgb(0.25, 0.0, 0.75)));
    }

    #[test]
    fn test_grayscale_luminance() {
        let colouring = Colouring {
            grayscale: true,
            ..Default::default()
        };
        let mut m = Marker::new(1, 0, 0, 1).with_category("hep-ph");
        m.age = 1.0;
        let fg = colouring.foreground(&m);
        assert!(close(fg, Rgb(0.587, 0.587, 0.587)));
        assert_eq!(fg.to_bytes(), [150, 150, 150]);
    }
}
