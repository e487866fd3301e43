use serde::{Deserialize, Serialize};

pub type MarkerId = u64;
pub type WorldCoord = i64;

/// A circular paper marker placed on the map.
///
/// Position and radius are fixed once the marker is created; label, category
/// and heat may be filled in by enrichment passes before the store is frozen
/// into an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub x: WorldCoord,
    pub y: WorldCoord,
    pub radius: u32,
    /// Normalized rank in [0, 1]; 0 is the oldest marker.
    pub age: f32,
    pub label: String,
    pub category: String,
    /// Normalized in [0, 1].
    pub heat: f32,
}

impl Marker {
    pub fn new(id: MarkerId, x: WorldCoord, y: WorldCoord, radius: u32) -> Self {
        Self {
            id,
            x,
            y,
            radius,
            age: 0.0,
            label: String::new(),
            category: String::new(),
            heat: 0.0,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_heat(mut self, heat: f32) -> Self {
        self.heat = heat;
        self
    }

    #[inline]
    pub fn reach(&self) -> WorldCoord {
        WorldCoord::from(self.radius)
    }

    /// Axis-aligned bounds of the marker circle.
    pub fn bounds(&self) -> Bounds {
        let r = self.reach();
        Bounds::new(self.x - r, self.y - r, self.x + r, self.y + r)
    }

    /// True when the circle's bounding square overlaps `rect` (edges inclusive).
    pub fn overlaps(&self, rect: &Bounds) -> bool {
        self.bounds().intersects(rect)
    }
}

/// Closed axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: WorldCoord,
    pub min_y: WorldCoord,
    pub max_x: WorldCoord,
    pub max_y: WorldCoord,
}

impl Bounds {
    pub fn new(min_x: WorldCoord, min_y: WorldCoord, max_x: WorldCoord, max_y: WorldCoord) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Rectangle `[center - half, center + half]` on both axes.
    pub fn around(center: (WorldCoord, WorldCoord), half: (WorldCoord, WorldCoord)) -> Self {
        Self::new(
            center.0 - half.0,
            center.1 - half.1,
            center.0 + half.0,
            center.1 + half.1,
        )
    }

    pub fn width(&self) -> WorldCoord {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> WorldCoord {
        self.max_y - self.min_y
    }

    /// Longest side; cells and scales are always derived from this.
    pub fn extent(&self) -> WorldCoord {
        self.width().max(self.height())
    }

    pub fn center(&self) -> (WorldCoord, WorldCoord) {
        (
            (self.min_x + self.max_x).div_euclid(2),
            (self.min_y + self.max_y).div_euclid(2),
        )
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn contains_point(&self, x: WorldCoord, y: WorldCoord) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn padded(&self, padding: WorldCoord) -> Bounds {
        Bounds::new(
            self.min_x - padding,
            self.min_y - padding,
            self.max_x + padding,
            self.max_y + padding,
        )
    }

    /// Expand the shorter axis symmetrically so both sides equal `extent()`.
    pub fn squared(&self) -> Bounds {
        let side = self.extent();
        let grow_x = side - self.width();
        let grow_y = side - self.height();
        let min_x = self.min_x - grow_x / 2;
        let min_y = self.min_y - grow_y / 2;
        Bounds::new(min_x, min_y, min_x + side, min_y + side)
    }
}
