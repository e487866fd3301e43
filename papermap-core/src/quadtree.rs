//! Quadtree index over marker centres
//!
//! Nodes live in an arena and refer to each other by `NodeId`. Slot 0 is a
//! shared empty node, so an internal node with no children is simply
//! `[0, 0, 0, 0]`. Cell bounds are never stored; they are recomputed from the
//! tree's square bounds on the way down.
//!
//! The tree borrows its markers and is read-only once `build` returns, so a
//! single instance can be queried from every rayon worker at once.

use crate::types::{Bounds, Marker, MarkerId, WorldCoord};
use log::{debug, info, warn};
use thiserror::Error;

pub type NodeId = u32;

const EMPTY: NodeId = 0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InsertError {
    #[error("Marker {marker_id} reached the minimum cell size at {cell:?}")]
    MinimumCellSize { marker_id: MarkerId, cell: Bounds },

    #[error("Marker {marker_id} lies outside the index bounds {bounds:?}")]
    OutOfBounds { marker_id: MarkerId, bounds: Bounds },
}

pub type InsertResult<T> = Result<T, InsertError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Empty,
    /// Index into the borrowed marker slice.
    Leaf(usize),
    /// Children in order top-left, top-right, bottom-left, bottom-right.
    Internal([NodeId; 4]),
}

#[derive(Debug)]
pub struct Quadtree<'a> {
    markers: &'a [Marker],
    nodes: Vec<Node>,
    root: NodeId,
    bounds: Bounds,
    max_r: WorldCoord,
    inserted: usize,
    rejected: Vec<MarkerId>,
}

impl<'a> Quadtree<'a> {
    /// Index `markers` inside the square around their centres.
    pub fn build(markers: &'a [Marker]) -> Self {
        let bounds = markers
            .iter()
            .map(|m| Bounds::new(m.x, m.y, m.x, m.y))
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default();
        Self::build_within(markers, bounds)
    }

    /// Index `markers` inside `bounds`, squared about its centre.
    ///
    /// Insertion failures do not stop the build; they are collected and
    /// reported once at the end.
    pub fn build_within(markers: &'a [Marker], bounds: Bounds) -> Self {
        let mut tree = Self::empty(markers, bounds.squared());
        for idx in 0..markers.len() {
            if let Err(err) = tree.insert(idx) {
                debug!("{}", err);
                tree.rejected.push(markers[idx].id);
            }
        }

        if !tree.rejected.is_empty() {
            warn!(
                "{} of {} markers could not be indexed (minimum cell size or out of bounds)",
                tree.rejected.len(),
                markers.len()
            );
        }
        info!(
            "Quadtree built: {} markers, {} nodes, bounds {:?}, max radius {}",
            tree.inserted,
            tree.node_count(),
            tree.bounds,
            tree.max_r
        );
        tree
    }

    fn empty(markers: &'a [Marker], bounds: Bounds) -> Self {
        let max_r = markers.iter().map(Marker::reach).max().unwrap_or(0);
        Self {
            markers,
            nodes: vec![Node::Empty],
            root: EMPTY,
            bounds,
            max_r,
            inserted: 0,
            rejected: Vec::new(),
        }
    }

    /// Insert the marker at `idx` of the borrowed slice.
    ///
    /// On `MinimumCellSize` the tree is unchanged apart from a possible leaf
    /// promotion; any marker already resident in that cell stays indexed.
    pub fn insert(&mut self, idx: usize) -> InsertResult<()> {
        let marker = &self.markers[idx];
        if !self.bounds.contains_point(marker.x, marker.y) {
            return Err(InsertError::OutOfBounds {
                marker_id: marker.id,
                bounds: self.bounds,
            });
        }
        self.root = self.insert_into(self.root, self.bounds, idx)?;
        self.inserted += 1;
        Ok(())
    }

    /// Place `idx` below `node` and return the id that now fills the slot.
    fn insert_into(&mut self, node: NodeId, cell: Bounds, idx: usize) -> InsertResult<NodeId> {
        match self.nodes[node as usize] {
            Node::Empty => {
                self.nodes.push(Node::Leaf(idx));
                Ok((self.nodes.len() - 1) as NodeId)
            }
            Node::Leaf(resident) => {
                self.check_cell(cell, idx)?;
                self.nodes[node as usize] = Node::Internal([EMPTY; 4]);
                self.insert_into(node, cell, resident)?;
                self.insert_into(node, cell, idx)
            }
            Node::Internal(children) => {
                self.check_cell(cell, idx)?;
                let marker = &self.markers[idx];
                let (q, sub) = quadrant(&cell, marker.x, marker.y);
                let child = self.insert_into(children[q], sub, idx)?;
                if let Node::Internal(slots) = &mut self.nodes[node as usize] {
                    slots[q] = child;
                }
                Ok(node)
            }
        }
    }

    fn check_cell(&self, cell: Bounds, idx: usize) -> InsertResult<()> {
        if cell.width() <= 1 || cell.height() <= 1 {
            return Err(InsertError::MinimumCellSize {
                marker_id: self.markers[idx].id,
                cell,
            });
        }
        Ok(())
    }

    /// Visit every marker whose circle's bounding square overlaps the
    /// rectangle `center ± half`.
    pub fn apply_if_within<F>(&self, center: (WorldCoord, WorldCoord), half: (WorldCoord, WorldCoord), mut visit: F)
    where
        F: FnMut(&'a Marker),
    {
        let window = Bounds::around(center, (half.0 + self.max_r, half.1 + self.max_r));
        self.visit_node(self.root, self.bounds, &window, center, half, &mut visit);
    }

    fn visit_node<F>(
        &self,
        node: NodeId,
        cell: Bounds,
        window: &Bounds,
        center: (WorldCoord, WorldCoord),
        half: (WorldCoord, WorldCoord),
        visit: &mut F,
    ) where
        F: FnMut(&'a Marker),
    {
        match self.nodes[node as usize] {
            Node::Empty => {}
            Node::Leaf(idx) => {
                let markers: &'a [Marker] = self.markers;
                let marker = &markers[idx];
                let r = marker.reach();
                if Bounds::around(center, (half.0 + r, half.1 + r)).contains_point(marker.x, marker.y) {
                    visit(marker);
                }
            }
            Node::Internal(children) => {
                if !cell.intersects(window) {
                    return;
                }
                for (q, child) in children.iter().enumerate() {
                    let (_, sub) = quadrant_bounds(&cell, q);
                    self.visit_node(*child, sub, window, center, half, visit);
                }
            }
        }
    }

    /// Collect the markers `apply_if_within` would visit, sorted by id.
    pub fn query(&self, center: (WorldCoord, WorldCoord), half: (WorldCoord, WorldCoord)) -> Vec<&'a Marker> {
        let mut found = Vec::new();
        self.apply_if_within(center, half, |m| found.push(m));
        found.sort_unstable_by_key(|m| m.id);
        found
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Largest marker radius; callers may inflate query windows by it.
    pub fn max_r(&self) -> WorldCoord {
        self.max_r
    }

    /// Number of markers that made it into the tree.
    pub fn len(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Live nodes, not counting the shared empty slot.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn rejected(&self) -> &[MarkerId] {
        &self.rejected
    }
}

/// Quadrant of `cell` holding `(x, y)`. Points on a midline go right/down.
fn quadrant(cell: &Bounds, x: WorldCoord, y: WorldCoord) -> (usize, Bounds) {
    let (mid_x, mid_y) = cell.center();
    let q = match (y < mid_y, x < mid_x) {
        (true, true) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    };
    quadrant_bounds(cell, q)
}

fn quadrant_bounds(cell: &Bounds, q: usize) -> (usize, Bounds) {
    let (mid_x, mid_y) = cell.center();
    let sub = match q {
        0 => Bounds::new(cell.min_x, cell.min_y, mid_x, mid_y),
        1 => Bounds::new(mid_x, cell.min_y, cell.max_x, mid_y),
        2 => Bounds::new(cell.min_x, mid_y, mid_x, cell.max_y),
        _ => Bounds::new(mid_x, mid_y, cell.max_x, cell.max_y),
    };
    (q, sub)
}
