//! CPU circle compositing onto an RGBA image
//!
//! World coordinates map to pixels through a single origin and a uniform
//! scale; `y` grows downwards in both spaces.

use crate::colour::Rgb;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use papermap_core::{RenderError, RenderResult, WorldCoord};
use std::io::Cursor;

/// Circles never shrink below this many pixels.
pub const MIN_PIXEL_RADIUS: f64 = 0.2;

const OUTLINE: Rgb = Rgb(0.0, 0.0, 0.0);

pub struct Canvas {
    img: RgbaImage,
    origin: (f64, f64),
    /// Pixels per world unit.
    scale: f64,
}

impl Canvas {
    pub fn new(width: u32, height: u32, origin: (WorldCoord, WorldCoord), scale: f64, background: [u8; 4]) -> Self {
        Self {
            img: RgbaImage::from_pixel(width, height, Rgba(background)),
            origin: (origin.0 as f64, origin.1 as f64),
            scale,
        }
    }

    pub fn to_px(&self, x: WorldCoord, y: WorldCoord) -> (f64, f64) {
        (
            (x as f64 - self.origin.0) * self.scale,
            (y as f64 - self.origin.1) * self.scale,
        )
    }

    pub fn pixel_radius(&self, radius: f64) -> f64 {
        (radius * self.scale).max(MIN_PIXEL_RADIUS)
    }

    /// Fill a disc of world radius `radius` centred on `(x, y)`.
    ///
    /// Discs smaller than a pixel are blended into the pixel under their
    /// centre with an alpha equal to their area.
    pub fn fill_circle(&mut self, x: WorldCoord, y: WorldCoord, radius: f64, colour: Rgb) {
        let (cx, cy) = self.to_px(x, y);
        let r = self.pixel_radius(radius);
        if r < 0.5 {
            let coverage = (std::f64::consts::PI * r * r).min(1.0) as f32;
            self.blend(cx.floor(), cy.floor(), colour, coverage);
            return;
        }
        self.for_each_pixel_near(cx, cy, r, |canvas, px, py, d| {
            if d <= r {
                canvas.blend(px, py, colour, 1.0);
            }
        });
    }

    /// One-pixel ring along the edge of the disc.
    pub fn outline_circle(&mut self, x: WorldCoord, y: WorldCoord, radius: f64) {
        let (cx, cy) = self.to_px(x, y);
        let r = self.pixel_radius(radius);
        if r < 1.0 {
            return;
        }
        self.for_each_pixel_near(cx, cy, r + 1.0, |canvas, px, py, d| {
            if (d - r).abs() <= 0.5 {
                canvas.blend(px, py, OUTLINE, 1.0);
            }
        });
    }

    fn for_each_pixel_near<F>(&mut self, cx: f64, cy: f64, reach: f64, mut f: F)
    where
        F: FnMut(&mut Self, f64, f64, f64),
    {
        let (w, h) = (self.img.width() as f64, self.img.height() as f64);
        let x0 = (cx - reach).floor().max(0.0);
        let x1 = (cx + reach).ceil().min(w - 1.0);
        let y0 = (cy - reach).floor().max(0.0);
        let y1 = (cy + reach).ceil().min(h - 1.0);
        let mut py = y0;
        while py <= y1 {
            let mut px = x0;
            while px <= x1 {
                let d = ((px + 0.5 - cx).powi(2) + (py + 0.5 - cy).powi(2)).sqrt();
                f(self, px, py, d);
                px += 1.0;
            }
            py += 1.0;
        }
    }

    /// Source-over composite of `colour` at `alpha` onto one pixel.
    fn blend(&mut self, px: f64, py: f64, colour: Rgb, alpha: f32) {
        if px < 0.0 || py < 0.0 || px >= self.img.width() as f64 || py >= self.img.height() as f64 {
            return;
        }
        let pixel = self.img.get_pixel_mut(px as u32, py as u32);
        let [r, g, b] = colour.to_bytes();
        let src_a = alpha.clamp(0.0, 1.0);
        let dst_a = pixel[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            let v = (s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        *pixel = Rgba([
            mix(r, pixel[0]),
            mix(g, pixel[1]),
            mix(b, pixel[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    /// Encode as PNG or JPEG. JPEG drops the alpha channel.
    pub fn encode(self, format: ImageFormat) -> RenderResult<Vec<u8>> {
        let image = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.img).to_rgb8()),
            _ => DynamicImage::ImageRgba8(self.img),
        };
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}
