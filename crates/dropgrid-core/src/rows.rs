//! Row extension for auto-growing canvases.

use crate::block::DraggingBlock;
use crate::config::GridConfig;
use crate::geometry::drop_zone_offsets;
use kurbo::Point;

/// Row the bottom-most block ends on, if any block is being dragged.
pub fn bottom_row(blocks: &[DraggingBlock], col_space: f64, row_space: f64) -> Option<f64> {
    let bottom_most = blocks
        .iter()
        .filter(|b| b.top.is_finite() && b.height.is_finite())
        .max_by(|a, b| (a.top + a.height).total_cmp(&(b.top + b.height)))?;
    let cell = drop_zone_offsets(
        col_space,
        row_space,
        Point::new(bottom_most.left, bottom_most.top + bottom_most.height),
        Point::ZERO,
    );
    Some(cell.row)
}

/// The new row count when dragged blocks approach the bottom of the canvas.
///
/// Returns `None` when the canvas cannot extend or already has room. Rows
/// never shrink while dragging.
pub fn extended_rows(blocks: &[DraggingBlock], current_rows: f64, config: &GridConfig) -> Option<f64> {
    if !config.can_extend {
        return None;
    }
    let bottom = bottom_row(blocks, config.column_width, config.row_height)?;
    if bottom <= current_rows - config.extension_offset {
        return None;
    }
    let rows = bottom + config.extension_offset;
    (rows > current_rows).then_some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GridConfig {
        GridConfig {
            column_width: 10.0,
            row_height: 10.0,
            can_extend: true,
            ..Default::default()
        }
    }

    fn block_with_bottom_row(row: f64) -> DraggingBlock {
        // Three rows tall, bottom edge at `row`.
        DraggingBlock::new("W2", Point::new(0.0, (row - 3.0) * 10.0), 4.0, 3.0, 10.0, 10.0)
    }

    #[test]
    fn test_rows_cover_block_past_bottom() {
        let config = config();
        let rows = extended_rows(&[block_with_bottom_row(12.0)], 10.0, &config).unwrap();
        assert!(rows >= 13.0);
        assert_eq!(rows, 12.0 + config.extension_offset);
    }

    #[test]
    fn test_no_extension_with_room_left() {
        assert_eq!(extended_rows(&[block_with_bottom_row(5.0)], 10.0, &config()), None);
    }

    #[test]
    fn test_no_extension_when_disabled() {
        let config = GridConfig {
            can_extend: false,
            ..config()
        };
        assert_eq!(extended_rows(&[block_with_bottom_row(30.0)], 10.0, &config), None);
    }

    #[test]
    fn test_rows_never_shrink() {
        // Dragging back up on a canvas that already grew.
        assert_eq!(extended_rows(&[block_with_bottom_row(47.0)], 50.0, &config()), None);
        assert_eq!(extended_rows(&[block_with_bottom_row(49.0)], 50.0, &config()), Some(51.0));
        assert_eq!(extended_rows(&[], 10.0, &config()), None);
    }

    #[test]
    fn test_bottom_most_block_wins() {
        let blocks = vec![block_with_bottom_row(4.0), block_with_bottom_row(11.0), block_with_bottom_row(7.0)];
        assert_eq!(bottom_row(&blocks, 10.0, 10.0), Some(11.0));
    }
}
