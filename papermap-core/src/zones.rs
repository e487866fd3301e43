//! JSON label zones
//!
//! Each zone is a JSONP file named after its cell, e.g. `zones/3/2/5.json`
//! holding `lz_3_2_5({"scale":..,"lbls":[..]})`. Only markers that are large
//! enough to be readable at the zone's scale are listed.

use crate::cell::{CellRenderer, CellSpec, RenderResult};
use crate::label;
use crate::manifest::{jsonp, RunSummary};
use crate::scheme::SchemeEntry;
use crate::types::{Marker, MarkerId, WorldCoord};
use serde::Serialize;
use std::path::PathBuf;

pub const DEFAULT_MIN_RADIUS_FRACTION: f64 = 0.01;

#[derive(Serialize)]
struct ZoneLabel {
    x: WorldCoord,
    y: WorldCoord,
    r: u32,
    lbl: String,
}

#[derive(Serialize)]
struct Zone {
    scale: WorldCoord,
    lbls: Vec<ZoneLabel>,
}

#[derive(Serialize)]
struct ZoneGeometry {
    z: u32,
    s: WorldCoord,
    w: WorldCoord,
    h: WorldCoord,
    nx: u32,
    ny: u32,
}

#[derive(Serialize)]
struct LabelIndex {
    latestid: MarkerId,
    xmin: WorldCoord,
    ymin: WorldCoord,
    xmax: WorldCoord,
    ymax: WorldCoord,
    zones: Vec<ZoneGeometry>,
}

#[derive(Debug, Clone)]
pub struct LabelZoneRenderer {
    min_radius_fraction: f64,
}

impl Default for LabelZoneRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_RADIUS_FRACTION)
    }
}

impl LabelZoneRenderer {
    pub fn new(min_radius_fraction: f64) -> Self {
        Self { min_radius_fraction }
    }

    /// Markers at or below this radius are left out of a zone at `scale`.
    pub fn min_radius(&self, scale: WorldCoord) -> WorldCoord {
        (scale as f64 * self.min_radius_fraction) as WorldCoord
    }
}

impl CellRenderer for LabelZoneRenderer {
    fn name(&self) -> &str {
        "zones"
    }

    fn artifact_path(&self, cell: &CellSpec) -> PathBuf {
        PathBuf::from("zones")
            .join(cell.depth.to_string())
            .join(cell.xi.to_string())
            .join(format!("{}.json", cell.yi))
    }

    fn render(&self, cell: &CellSpec, markers: &[&Marker]) -> RenderResult<Vec<u8>> {
        let min_radius = self.min_radius(cell.scale);
        let lbls = markers
            .iter()
            .filter(|m| !m.label.is_empty() && m.reach() > min_radius)
            .map(|m| ZoneLabel {
                x: m.x,
                y: m.y,
                r: m.radius,
                lbl: label::sanitize(&m.label),
            })
            .collect();
        let zone = Zone { scale: cell.scale, lbls };
        let callback = format!("lz_{}_{}_{}", cell.depth, cell.xi, cell.yi);
        Ok(jsonp(&callback, &zone)?.into_bytes())
    }

    fn manifest_path(&self) -> PathBuf {
        PathBuf::from("zones").join("label_index.json")
    }

    fn manifest(&self, summary: &RunSummary, scheme: &[SchemeEntry]) -> RenderResult<Vec<u8>> {
        let index = LabelIndex {
            latestid: summary.latest_id,
            xmin: summary.bounds.min_x,
            ymin: summary.bounds.min_y,
            xmax: summary.bounds.max_x,
            ymax: summary.bounds.max_y,
            zones: scheme
                .iter()
                .map(|e| ZoneGeometry {
                    z: e.depth,
                    s: e.scale,
                    w: e.cell_size,
                    h: e.cell_size,
                    nx: e.cells,
                    ny: e.cells,
                })
                .collect(),
        };
        Ok(jsonp("label_index", &index)?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{plan, DepthSpec};
    use crate::types::Bounds;

    fn cell() -> CellSpec {
        CellSpec {
            depth: 2,
            xi: 1,
            yi: 3,
            origin: (0, 0),
            size: 250,
            scale: 1000,
        }
    }

    #[test]
    fn test_zone_filters_small_and_unlabelled() {
        let big = Marker::new(1, 10, 20, 30).with_label("dark \"matter\"");
        let small = Marker::new(2, 5, 5, 10).with_label("tiny");
        let bare = Marker::new(3, 7, 7, 50);
        let out = LabelZoneRenderer::default()
            .render(&cell(), &[&big, &small, &bare])
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"lz_2_1_3({"scale":1000,"lbls":[{"x":10,"y":20,"r":30,"lbl":"dark matter"}]})"#
        );
    }

    #[test]
    fn test_empty_zone() {
        let out = LabelZoneRenderer::default().render(&cell(), &[]).unwrap();
        assert_eq!(out, br#"lz_2_1_3({"scale":1000,"lbls":[]})"#.to_vec());
    }

    #[test]
    fn test_paths() {
        let r = LabelZoneRenderer::default();
        assert_eq!(r.artifact_path(&cell()), PathBuf::from("zones/2/1/3.json"));
        assert_eq!(r.manifest_path(), PathBuf::from("zones/label_index.json"));
    }

    #[test]
    fn test_label_index_shape() {
        let bounds = Bounds::new(0, 0, 1000, 1000);
        let scheme = plan(&bounds, &[DepthSpec::new(1, 1), DepthSpec::new(2, 4)]).unwrap();
        let summary = RunSummary { latest_id: 42, bounds };
        let out = LabelZoneRenderer::default().manifest(&summary, &scheme).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                r#"label_index({"latestid":42,"xmin":0,"ymin":0,"xmax":1000,"ymax":1000,"zones":["#,
                r#"{"z":0,"s":1000,"w":1000,"h":1000,"nx":1,"ny":1},"#,
                r#"{"z":1,"s":250,"w":500,"h":500,"nx":2,"ny":2}]})"#
            )
        );
    }

    #[test]
    fn test_empty_manifest() {
        let out = LabelZoneRenderer::default().manifest(&RunSummary::default(), &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"label_index({"latestid":0,"xmin":0,"ymin":0,"xmax":0,"ymax":0,"zones":[]})"#
        );
    }
}
