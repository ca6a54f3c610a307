//! Collision classification and resize resolution.
//!
//! A dragged block that overlaps committed widgets is not rejected outright.
//! Each overlapping neighbor is classified by how many of its corners fall
//! inside the drop candidate, and a single edge of that neighbor is chosen to
//! retract. The retractions are accumulated on the candidate's facing sides
//! so the renderer can show where the block lands once it yields space.

use crate::block::{Edge, ResizeUpdates};
use crate::geometry::{
    Corner, GeometryError, OccupiedSpace, WidgetId, are_intersecting, collision_points,
};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// How a neighbor overlaps the drop candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionClass {
    /// No neighbor corner is inside; an edge crosses the candidate.
    PartialBoundary,
    /// Exactly one neighbor corner is inside.
    SinglePoint(Corner),
    /// One whole neighbor edge is inside.
    FullBoundary(Edge),
    /// The neighbor lies entirely inside the candidate.
    FullContainment,
}

/// The remedy computed for one colliding neighbor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborResize {
    pub widget_id: WidgetId,
    pub class: CollisionClass,
    /// Neighbor edge that retracts.
    pub edge: Edge,
    /// Grid units the edge moves inward.
    pub amount: f64,
}

impl NeighborResize {
    /// The neighbor's footprint after retracting `edge` by `amount`.
    pub fn apply_to(&self, neighbor: Rect) -> Rect {
        match self.edge {
            Edge::Top => Rect::new(neighbor.x0, neighbor.y0 + self.amount, neighbor.x1, neighbor.y1),
            Edge::Bottom => Rect::new(neighbor.x0, neighbor.y0, neighbor.x1, neighbor.y1 - self.amount),
            Edge::Left => Rect::new(neighbor.x0 + self.amount, neighbor.y0, neighbor.x1, neighbor.y1),
            Edge::Right => Rect::new(neighbor.x0, neighbor.y0, neighbor.x1 - self.amount, neighbor.y1),
        }
    }
}

/// Outcome of resolving one candidate against the occupied spaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Neighbors with a computed retraction.
    pub neighbors: Vec<NeighborResize>,
    /// Neighbors that overlap with no valid retraction.
    pub unresolved: Vec<WidgetId>,
    /// Retractions summed per candidate side.
    pub updates: ResizeUpdates,
}

impl Resolution {
    /// Whether every colliding neighbor received a retraction.
    pub fn is_resolvable(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Classify a collision from the neighbor corners found inside the candidate.
pub fn class_from_corners(id: &str, corners: &[Corner]) -> Result<CollisionClass, GeometryError> {
    let impossible = || GeometryError::ImpossibleCollision {
        id: id.to_string(),
        count: corners.len(),
    };
    match corners {
        [] => Ok(CollisionClass::PartialBoundary),
        [corner] => Ok(CollisionClass::SinglePoint(*corner)),
        [a, b] => shared_edge(*a, *b)
            .map(CollisionClass::FullBoundary)
            .ok_or_else(impossible),
        [_, _, _, _] => Ok(CollisionClass::FullContainment),
        _ => Err(impossible()),
    }
}

/// Classify how `neighbor` overlaps `candidate`.
pub fn classify(neighbor: &OccupiedSpace, candidate: Rect) -> Result<CollisionClass, GeometryError> {
    let corners: Vec<Corner> = collision_points(neighbor.as_rect(), candidate)
        .into_iter()
        .map(|p| p.corner)
        .collect();
    class_from_corners(&neighbor.id, &corners)
}

fn shared_edge(a: Corner, b: Corner) -> Option<Edge> {
    use Corner::*;
    match (a, b) {
        (TopLeft, TopRight) | (TopRight, TopLeft) => Some(Edge::Top),
        (BottomLeft, BottomRight) | (BottomRight, BottomLeft) => Some(Edge::Bottom),
        (TopLeft, BottomLeft) | (BottomLeft, TopLeft) => Some(Edge::Left),
        (TopRight, BottomRight) | (BottomRight, TopRight) => Some(Edge::Right),
        _ => None,
    }
}

/// How far `edge` of `neighbor` must move inward to clear `candidate`.
fn retraction(edge: Edge, neighbor: Rect, candidate: Rect) -> f64 {
    match edge {
        Edge::Top => candidate.y1 - neighbor.y0,
        Edge::Bottom => neighbor.y1 - candidate.y0,
        Edge::Left => candidate.x1 - neighbor.x0,
        Edge::Right => neighbor.x1 - candidate.x0,
    }
}

/// Clamp a retraction so the neighbor keeps a non-negative extent.
fn clamp_to_extent(edge: Edge, amount: f64, neighbor: Rect) -> f64 {
    let extent = match edge {
        Edge::Top | Edge::Bottom => neighbor.height(),
        Edge::Left | Edge::Right => neighbor.width(),
    };
    amount.clamp(0.0, extent)
}

/// Pick the neighbor edge to retract for a given collision class.
fn pick_edge(class: CollisionClass, neighbor: Rect, candidate: Rect) -> Option<(Edge, f64)> {
    let cheapest = |edges: &[Edge]| {
        edges
            .iter()
            .map(|&e| (e, retraction(e, neighbor, candidate)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    };
    match class {
        CollisionClass::PartialBoundary => {
            // Only edges whose opposite edge lies outside the candidate can retract.
            let mut legal = Vec::with_capacity(4);
            if neighbor.y0 < candidate.y0 {
                legal.push(Edge::Bottom);
            }
            if neighbor.y1 > candidate.y1 {
                legal.push(Edge::Top);
            }
            if neighbor.x0 < candidate.x0 {
                legal.push(Edge::Right);
            }
            if neighbor.x1 > candidate.x1 {
                legal.push(Edge::Left);
            }
            cheapest(&legal)
        }
        CollisionClass::SinglePoint(corner) => {
            let adjacent = match corner {
                Corner::TopLeft => [Edge::Top, Edge::Left],
                Corner::TopRight => [Edge::Top, Edge::Right],
                Corner::BottomLeft => [Edge::Bottom, Edge::Left],
                Corner::BottomRight => [Edge::Bottom, Edge::Right],
            };
            cheapest(&adjacent)
        }
        CollisionClass::FullBoundary(edge) => Some((edge, retraction(edge, neighbor, candidate))),
        CollisionClass::FullContainment => None,
    }
}

/// Compute the retraction for one neighbor, or `None` when none exists.
pub fn resize_for(neighbor: &OccupiedSpace, class: CollisionClass, candidate: Rect) -> Option<NeighborResize> {
    let rect = neighbor.as_rect();
    pick_edge(class, rect, candidate).map(|(edge, amount)| NeighborResize {
        widget_id: neighbor.id.clone(),
        class,
        edge,
        amount: clamp_to_extent(edge, amount, rect),
    })
}

/// Resolve a drop candidate (grid units) against the occupied spaces.
///
/// The candidate's own widget and malformed spaces are skipped.
pub fn resolve(candidate: Rect, self_id: &str, occupied: &[OccupiedSpace]) -> Resolution {
    let mut resolution = Resolution::default();

    let colliding = occupied
        .iter()
        .filter(|space| space.id != self_id)
        .filter(|space| match space.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Excluding occupied space from collision: {}", e);
                false
            }
        })
        .filter(|space| are_intersecting(space.as_rect(), candidate));

    for space in colliding {
        let class = match classify(space, candidate) {
            Ok(class) => class,
            Err(e) => {
                log::error!("{}", e);
                debug_assert!(false, "{e}");
                resolution.unresolved.push(space.id.clone());
                continue;
            }
        };
        match resize_for(space, class, candidate) {
            Some(resize) => {
                resolution.updates.add(resize.edge.opposite(), resize.amount);
                resolution.neighbors.push(resize);
            }
            None => {
                log::debug!("No resize for {} ({:?})", space.id, class);
                resolution.unresolved.push(space.id.clone());
            }
        }
    }

    resolution
}
