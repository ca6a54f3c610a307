//! Grid geometry primitives: occupied spaces, snapping, and drop validity.
//!
//! Occupied spaces and drop candidates are expressed in grid units
//! (columns and rows) as `kurbo::Rect`s where `x0`/`y0` are the left/top
//! edges and `x1`/`y1` the right/bottom edges. Pointer positions are pixels.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a widget in the layout tree.
pub type WidgetId = String;

/// Geometry errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Non-finite coordinate on {0}")]
    NonFinite(WidgetId),
    #[error("Negative extent on {0}")]
    NegativeExtent(WidgetId),
    #[error("Impossible collision against {id}: {count} corners inside the candidate")]
    ImpossibleCollision { id: WidgetId, count: usize },
}

/// A committed widget footprint, in grid units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupiedSpace {
    /// Widget owning this footprint.
    pub id: WidgetId,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    /// Canvas the widget lives on, if known.
    #[serde(default)]
    pub parent_id: Option<WidgetId>,
}

impl OccupiedSpace {
    /// Create a new occupied space.
    pub fn new(id: impl Into<WidgetId>, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            id: id.into(),
            left,
            top,
            right,
            bottom,
            parent_id: None,
        }
    }

    /// The footprint as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }

    /// Reject NaN/infinite edges and inverted rectangles.
    pub fn validate(&self) -> Result<(), GeometryError> {
        validate_rect(&self.id, self.as_rect())
    }
}

/// Check that a grid rectangle is finite and not inverted.
pub fn validate_rect(id: &str, rect: Rect) -> Result<(), GeometryError> {
    if ![rect.x0, rect.y0, rect.x1, rect.y1].iter().all(|v| v.is_finite()) {
        return Err(GeometryError::NonFinite(id.to_string()));
    }
    if rect.x1 < rect.x0 || rect.y1 < rect.y0 {
        return Err(GeometryError::NegativeExtent(id.to_string()));
    }
    Ok(())
}

/// One of the four corners of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All corners in classification order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Position of this corner on `rect`.
    pub fn of(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// A neighbor corner that landed inside a drop candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPoint {
    pub corner: Corner,
    pub point: Point,
}

/// Snapped grid cell for a pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub column: f64,
    pub row: f64,
}

impl GridCell {
    /// Footprint of a block `columns` wide and `rows` tall anchored at this cell.
    pub fn footprint(self, columns: f64, rows: f64) -> Rect {
        Rect::new(self.column, self.row, self.column + columns, self.row + rows)
    }
}

/// Whether two rectangles overlap with positive area.
///
/// Rectangles that only share an edge do not intersect.
pub fn are_intersecting(a: Rect, b: Rect) -> bool {
    !(b.x0 >= a.x1 || b.x1 <= a.x0 || b.y0 >= a.y1 || b.y1 <= a.y0)
}

/// Whether `point` lies inside `rect`, boundary included.
pub fn is_point_inside_rect(point: Point, rect: Rect) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Corners of `neighbor` that lie inside `candidate`.
pub fn collision_points(neighbor: Rect, candidate: Rect) -> Vec<CollisionPoint> {
    Corner::ALL
        .iter()
        .map(|&corner| CollisionPoint {
            corner,
            point: corner.of(neighbor),
        })
        .filter(|p| is_point_inside_rect(p.point, candidate))
        .collect()
}

/// Snap a pixel position to the nearest grid cell.
pub fn drop_zone_offsets(col_space: f64, row_space: f64, position: Point, anchor: Point) -> GridCell {
    GridCell {
        column: ((position.x - anchor.x) / col_space).round(),
        row: ((position.y - anchor.y) / row_space).round(),
    }
}

/// Snap a pixel position to the pixel origin of its nearest grid cell.
pub fn snapped_xy(col_space: f64, row_space: f64, position: Point, anchor: Point) -> Point {
    let cell = drop_zone_offsets(col_space, row_space, position, anchor);
    Point::new(cell.column * col_space, cell.row * row_space)
}

/// Whether any occupied space other than `self_id` overlaps `footprint`.
///
/// Malformed spaces are skipped.
pub fn is_drop_zone_occupied(footprint: Rect, self_id: &str, occupied: &[OccupiedSpace]) -> bool {
    occupied
        .iter()
        .filter(|space| space.id != self_id)
        .filter(|space| match space.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping occupied space: {}", e);
                false
            }
        })
        .any(|space| are_intersecting(space.as_rect(), footprint))
}

/// Whether `footprint` leaves the `[0, max_cols] x [0, max_rows]` grid.
pub fn is_overflowing_bounds(footprint: Rect, max_rows: f64, max_cols: f64) -> bool {
    footprint.x1 < 0.0 || footprint.y0 < 0.0 || footprint.x1 > max_cols || footprint.y1 > max_rows
}

/// Whether a block of `width` x `height` grid units can be dropped at `position`.
///
/// The block's own footprint (`self_id`) is ignored. Detached blocks do not
/// take part in layout and can always be dropped.
#[allow(clippy::too_many_arguments)]
pub fn no_collision(
    position: Point,
    col_space: f64,
    row_space: f64,
    anchor: Point,
    width: f64,
    height: f64,
    self_id: &str,
    occupied: &[OccupiedSpace],
    max_rows: f64,
    max_cols: f64,
    is_detached: bool,
) -> bool {
    if is_detached {
        return true;
    }
    if !(position.x.is_finite() && position.y.is_finite()) || !(width >= 0.0 && height >= 0.0) {
        log::warn!("Rejecting malformed drop candidate for {}", self_id);
        return false;
    }
    let cell = drop_zone_offsets(col_space, row_space, position, anchor);
    if cell.column < 0.0 || cell.row < 0.0 {
        return false;
    }
    let footprint = cell.footprint(width, height);
    !is_drop_zone_occupied(footprint, self_id, occupied)
        && !is_overflowing_bounds(footprint, max_rows, max_cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(l: f64, t: f64, r: f64, b: f64) -> Rect {
        Rect::new(l, t, r, b)
    }

    #[test]
    fn test_intersection_is_symmetric() {
        let samples = [
            rect(0.0, 0.0, 4.0, 4.0),
            rect(2.0, 0.0, 6.0, 4.0),
            rect(4.0, 0.0, 8.0, 4.0),
            rect(1.0, 1.0, 2.0, 2.0),
            rect(-3.0, 2.0, 10.0, 3.0),
            rect(5.0, 5.0, 5.0, 9.0),
        ];
        for a in samples {
            for b in samples {
                assert_eq!(are_intersecting(a, b), are_intersecting(b, a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        assert!(!are_intersecting(rect(0.0, 0.0, 4.0, 4.0), rect(4.0, 0.0, 8.0, 4.0)));
        assert!(!are_intersecting(rect(0.0, 0.0, 4.0, 4.0), rect(0.0, 4.0, 4.0, 8.0)));
        assert!(are_intersecting(rect(0.0, 0.0, 4.0, 4.0), rect(3.0, 3.0, 8.0, 8.0)));
    }

    #[test]
    fn test_point_inside_is_inclusive() {
        let r = rect(2.0, 0.0, 6.0, 4.0);
        assert!(is_point_inside_rect(Point::new(2.0, 0.0), r));
        assert!(is_point_inside_rect(Point::new(6.0, 4.0), r));
        assert!(is_point_inside_rect(Point::new(4.0, 2.0), r));
        assert!(!is_point_inside_rect(Point::new(1.9, 2.0), r));
        assert!(!is_point_inside_rect(Point::new(4.0, 4.1), r));
    }

    #[test]
    fn test_collision_points_for_right_edge_overlap() {
        let points = collision_points(rect(0.0, 0.0, 4.0, 4.0), rect(2.0, 0.0, 6.0, 4.0));
        let corners: Vec<Corner> = points.iter().map(|p| p.corner).collect();
        assert_eq!(corners, vec![Corner::TopRight, Corner::BottomRight]);
    }

    #[test]
    fn test_drop_zone_offsets_round_to_nearest_cell() {
        let cell = drop_zone_offsets(10.0, 10.0, Point::new(24.0, 36.0), Point::ZERO);
        assert_eq!(cell, GridCell { column: 2.0, row: 4.0 });

        let cell = drop_zone_offsets(10.0, 10.0, Point::new(44.0, 36.0), Point::new(20.0, 0.0));
        assert_eq!(cell, GridCell { column: 2.0, row: 4.0 });

        let snapped = snapped_xy(16.0, 10.0, Point::new(25.0, 14.0), Point::ZERO);
        assert_eq!(snapped, Point::new(32.0, 10.0));
    }

    #[test]
    fn test_no_collision_without_neighbors() {
        for (x, y) in [(0.0, 0.0), (40.0, 30.0), (120.0, 50.0)] {
            assert!(no_collision(
                Point::new(x, y),
                10.0,
                10.0,
                Point::ZERO,
                4.0,
                4.0,
                "W2",
                &[],
                20.0,
                64.0,
                false,
            ));
        }
    }

    #[test]
    fn test_no_collision_outside_bounds() {
        let outside = [(-100.0, 0.0), (0.0, -100.0), (700.0, 0.0), (0.0, 300.0)];
        for (x, y) in outside {
            assert!(!no_collision(
                Point::new(x, y),
                10.0,
                10.0,
                Point::ZERO,
                4.0,
                4.0,
                "W2",
                &[],
                20.0,
                64.0,
                false,
            ));
        }
    }

    #[test]
    fn test_detached_ignores_bounds_and_neighbors() {
        let occupied = vec![OccupiedSpace::new("W1", 0.0, 0.0, 4.0, 4.0)];
        assert!(no_collision(
            Point::new(-500.0, -500.0),
            10.0,
            10.0,
            Point::ZERO,
            4.0,
            4.0,
            "W2",
            &occupied,
            20.0,
            64.0,
            true,
        ));
    }

    #[test]
    fn test_no_collision_excludes_own_footprint() {
        let occupied = vec![
            OccupiedSpace::new("W1", 0.0, 0.0, 4.0, 4.0),
            OccupiedSpace::new("W2", 10.0, 0.0, 14.0, 4.0),
        ];
        // Overlaps its own old footprint only.
        assert!(no_collision(
            Point::new(110.0, 0.0),
            10.0,
            10.0,
            Point::ZERO,
            4.0,
            4.0,
            "W2",
            &occupied,
            20.0,
            64.0,
            false,
        ));
        // Overlaps W1.
        assert!(!no_collision(
            Point::new(20.0, 0.0),
            10.0,
            10.0,
            Point::ZERO,
            4.0,
            4.0,
            "W2",
            &occupied,
            20.0,
            64.0,
            false,
        ));
    }

    #[test]
    fn test_malformed_spaces_are_skipped() {
        let occupied = vec![
            OccupiedSpace::new("NaN", f64::NAN, 0.0, 4.0, 4.0),
            OccupiedSpace::new("Inverted", 4.0, 4.0, 0.0, 0.0),
        ];
        assert!(!is_drop_zone_occupied(rect(0.0, 0.0, 4.0, 4.0), "W2", &occupied));
        assert!(matches!(occupied[0].validate(), Err(GeometryError::NonFinite(_))));
        assert!(matches!(occupied[1].validate(), Err(GeometryError::NegativeExtent(_))));
    }

    #[test]
    fn test_malformed_candidate_is_rejected() {
        assert!(!no_collision(
            Point::new(f64::NAN, 0.0),
            10.0,
            10.0,
            Point::ZERO,
            4.0,
            4.0,
            "W2",
            &[],
            20.0,
            64.0,
            false,
        ));
        assert!(!no_collision(
            Point::new(0.0, 0.0),
            10.0,
            10.0,
            Point::ZERO,
            -1.0,
            4.0,
            "W2",
            &[],
            20.0,
            64.0,
            false,
        ));
    }
}
