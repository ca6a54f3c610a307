//! Blocks being dragged and the space they must yield to neighbors.

use crate::geometry::{GeometryError, GridCell, WidgetId, drop_zone_offsets, validate_rect};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Side of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// The edge facing this one across an overlap.
    pub fn opposite(self) -> Self {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Right => Edge::Left,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
        }
    }
}

/// Per-side displacement, in grid units.
///
/// Each field is how far the dragged block's side retracts so that it no
/// longer overlaps the neighbors facing that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResizeUpdates {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl ResizeUpdates {
    /// Accumulate `amount` on `side`.
    pub fn add(&mut self, side: Edge, amount: f64) {
        match side {
            Edge::Top => self.top += amount,
            Edge::Bottom => self.bottom += amount,
            Edge::Left => self.left += amount,
            Edge::Right => self.right += amount,
        }
    }

    /// Amount accumulated on `side`.
    pub fn get(&self, side: Edge) -> f64 {
        match side {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.bottom == 0.0 && self.left == 0.0 && self.right == 0.0
    }

    /// Shrink a grid rectangle by these updates. Extents never go negative.
    pub fn apply_to_cells(&self, rect: Rect) -> Rect {
        let x0 = rect.x0 + self.left;
        let y0 = rect.y0 + self.top;
        let x1 = (rect.x1 - self.right).max(x0);
        let y1 = (rect.y1 - self.bottom).max(y0);
        Rect::new(x0, y0, x1, y1)
    }
}

fn default_true() -> bool {
    true
}

/// A block being moved across the canvas.
///
/// Position and size are pixels relative to the canvas; `column_width` and
/// `row_height` are the block's extent in grid units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraggingBlock {
    pub widget_id: WidgetId,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub column_width: f64,
    pub row_height: f64,
    /// Detached blocks (modals and the like) skip layout collision.
    #[serde(default)]
    pub detach_from_layout: bool,
    #[serde(default = "default_true")]
    pub is_not_colliding: bool,
    #[serde(default)]
    pub resize_updates: Option<ResizeUpdates>,
}

impl DraggingBlock {
    /// Create a block at a pixel position with its grid extent.
    pub fn new(
        widget_id: impl Into<WidgetId>,
        origin: Point,
        column_width: f64,
        row_height: f64,
        col_space: f64,
        row_space: f64,
    ) -> Self {
        Self {
            widget_id: widget_id.into(),
            left: origin.x,
            top: origin.y,
            width: column_width * col_space,
            height: row_height * row_space,
            column_width,
            row_height,
            detach_from_layout: false,
            is_not_colliding: true,
            resize_updates: None,
        }
    }

    /// Top-left corner in pixels.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Pixel footprint.
    pub fn pixel_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }

    /// This block moved by `delta` pixels.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            left: self.left + delta.x,
            top: self.top + delta.y,
            ..self.clone()
        }
    }

    /// Grid cell the block snaps to.
    pub fn cell(&self, col_space: f64, row_space: f64) -> GridCell {
        drop_zone_offsets(col_space, row_space, self.origin(), Point::ZERO)
    }

    /// Snapped footprint in grid units.
    pub fn cell_rect(&self, col_space: f64, row_space: f64) -> Rect {
        self.cell(col_space, row_space)
            .footprint(self.column_width, self.row_height)
    }

    /// Reject non-finite positions and negative sizes.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let extents = [self.width, self.height, self.column_width, self.row_height];
        if !self.left.is_finite() || !self.top.is_finite() || !extents.iter().all(|v| v.is_finite()) {
            return Err(GeometryError::NonFinite(self.widget_id.clone()));
        }
        if extents.iter().any(|&v| v < 0.0) {
            return Err(GeometryError::NegativeExtent(self.widget_id.clone()));
        }
        validate_rect(&self.widget_id, self.pixel_rect())
    }

    /// The block as it will land once it yields space to its neighbors.
    ///
    /// Only colliding blocks with resize updates change.
    pub fn resize_adjusted(&self, col_space: f64, row_space: f64) -> Self {
        match self.resize_updates {
            Some(updates) if !self.is_not_colliding => Self {
                top: self.top + updates.top * row_space,
                left: self.left + updates.left * col_space,
                width: (self.width - (updates.left + updates.right) * col_space).max(0.0),
                height: (self.height - (updates.top + updates.bottom) * row_space).max(0.0),
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}
