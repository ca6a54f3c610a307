//! Renderer trait and the drag overlay renderer.

use crate::surface::{PaintSurface, StrokeStyle};
use dropgrid_core::block::DraggingBlock;
use dropgrid_core::config::GridConfig;
use dropgrid_core::geometry::snapped_xy;
use dropgrid_core::session::Frame;
use kurbo::{Point, Rect, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Trait for drag overlay backends.
pub trait Renderer {
    /// Erase everything painted for the current drag.
    fn clear(&mut self) -> RenderResult<()>;

    /// Clear and paint one frame.
    fn paint_frame(&mut self, frame: &Frame) -> RenderResult<()>;
}

/// Colors and strokes of the drag overlay.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    /// Fill for blocks that can be dropped.
    pub valid_fill: Color,
    /// Fill for colliding blocks.
    pub invalid_fill: Color,
    /// Dashed outline at the snapped cell.
    pub snap_stroke: Color,
    /// Solid outline at the block's raw position.
    pub outline_stroke: Color,
    pub stroke_width: f64,
    pub dash: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            valid_fill: Color::from_rgba8(104, 113, 239, 153),
            invalid_fill: Color::from_rgba8(255, 0, 0, 255),
            snap_stroke: Color::from_rgba8(104, 113, 239, 255),
            outline_stroke: Color::from_rgba8(0xd4, 0xd4, 0xd4, 255),
            stroke_width: 1.0,
            dash: 3.0,
        }
    }
}

/// Paints dragged blocks and their collision state onto a surface.
pub struct OverlayRenderer<S: PaintSurface> {
    surface: S,
    style: OverlayStyle,
    col_space: f64,
    row_space: f64,
    padding: f64,
    scale: f64,
}

impl<S: PaintSurface> OverlayRenderer<S> {
    /// Create a renderer for a canvas configured by `config`.
    pub fn new(surface: S, config: &GridConfig) -> Self {
        Self {
            surface,
            style: OverlayStyle::default(),
            col_space: config.column_width,
            row_space: config.row_height,
            padding: config.effective_padding(),
            scale: config.device_pixel_ratio,
        }
    }

    /// Set the overlay style.
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Rect the block itself occupies on the overlay.
    fn block_rect(&self, block: &DraggingBlock, top_offset: f64) -> Rect {
        Rect::from_origin_size(
            Point::new(block.left + self.padding, block.top - top_offset + self.padding),
            Size::new(block.width, block.height),
        )
    }

    /// Dashed outline at the cell the block will snap to.
    fn snap_rect(&self, block: &DraggingBlock, top_offset: f64) -> Rect {
        let snapped = snapped_xy(self.col_space, self.row_space, block.origin(), Point::ZERO);
        let inset = self.style.stroke_width;
        Rect::from_origin_size(
            Point::new(
                snapped.x + inset + self.padding,
                snapped.y - top_offset + inset + self.padding,
            ),
            Size::new((block.width - inset).max(0.0), (block.height - inset).max(0.0)),
        )
    }

    fn paint_block(&mut self, block: &DraggingBlock, top_offset: f64) -> RenderResult<()> {
        let block = block.resize_adjusted(self.col_space, self.row_space);
        let body = self.block_rect(&block, top_offset);
        let snap = self.snap_rect(&block, top_offset);
        let style = self.style;

        let fill = if block.is_not_colliding {
            style.valid_fill
        } else {
            style.invalid_fill
        };
        self.surface.fill_rect(body, fill)?;
        self.surface
            .stroke_rect(snap, &StrokeStyle::dashed(style.snap_stroke, style.stroke_width, style.dash))?;
        self.surface
            .stroke_rect(body, &StrokeStyle::solid(style.outline_stroke, style.stroke_width))?;
        Ok(())
    }
}

impl<S: PaintSurface> Renderer for OverlayRenderer<S> {
    fn clear(&mut self) -> RenderResult<()> {
        self.surface.clear()
    }

    fn paint_frame(&mut self, frame: &Frame) -> RenderResult<()> {
        self.surface.set_scale(self.scale)?;
        self.surface.clear()?;
        log::trace!("Painting {} block(s)", frame.blocks.len());
        for block in &frame.blocks {
            self.paint_block(block, frame.top_offset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{PaintCommand, RecordingSurface, css_color};
    use dropgrid_core::block::ResizeUpdates;

    fn config() -> GridConfig {
        GridConfig {
            column_width: 10.0,
            row_height: 10.0,
            ..Default::default()
        }
    }

    fn block(left: f64, top: f64) -> DraggingBlock {
        DraggingBlock::new("W2", Point::new(left, top), 4.0, 4.0, 10.0, 10.0)
    }

    fn paint(config: &GridConfig, frame: Frame) -> Vec<PaintCommand> {
        let mut renderer = OverlayRenderer::new(RecordingSurface::new(), config);
        renderer.paint_frame(&frame).unwrap();
        renderer.into_surface().take_commands()
    }

    #[test]
    fn test_frame_clears_first() {
        let commands = paint(&config(), Frame::default());
        assert!(matches!(commands.as_slice(), [PaintCommand::SetScale(s), PaintCommand::Clear] if *s == 1.0));
    }

    #[test]
    fn test_valid_block_is_painted_with_padding() {
        let commands = paint(
            &config(),
            Frame {
                blocks: vec![block(22.0, 14.0)],
                top_offset: 0.0,
            },
        );
        assert_eq!(commands.len(), 5);

        let PaintCommand::FillRect { rect, color } = &commands[2] else {
            panic!("expected a fill, got {:?}", commands[2]);
        };
        assert_eq!(*rect, Rect::new(28.0, 20.0, 68.0, 60.0));
        assert_eq!(css_color(*color), "rgba(104, 113, 239, 0.6)");

        let PaintCommand::StrokeRect { rect, style } = &commands[3] else {
            panic!("expected a dashed stroke, got {:?}", commands[3]);
        };
        // Snapped to (20, 10), inset by the stroke width.
        assert_eq!(*rect, Rect::new(27.0, 17.0, 66.0, 56.0));
        assert_eq!(style.dash, Some(3.0));
        assert_eq!(css_color(style.color), "rgb(104, 113, 239)");

        let PaintCommand::StrokeRect { rect, style } = &commands[4] else {
            panic!("expected an outline, got {:?}", commands[4]);
        };
        assert_eq!(*rect, Rect::new(28.0, 20.0, 68.0, 60.0));
        assert_eq!(style.dash, None);
        assert_eq!(css_color(style.color), "rgb(212, 212, 212)");
    }

    #[test]
    fn test_colliding_block_is_resize_adjusted() {
        let config = GridConfig {
            no_pad: true,
            ..config()
        };
        let mut colliding = block(20.0, 0.0);
        colliding.is_not_colliding = false;
        colliding.resize_updates = Some(ResizeUpdates {
            left: 2.0,
            ..Default::default()
        });
        let commands = paint(
            &config,
            Frame {
                blocks: vec![colliding],
                top_offset: 0.0,
            },
        );

        let PaintCommand::FillRect { rect, color } = &commands[2] else {
            panic!("expected a fill, got {:?}", commands[2]);
        };
        assert_eq!(*rect, Rect::new(40.0, 0.0, 60.0, 40.0));
        assert_eq!(css_color(*color), "rgb(255, 0, 0)");
    }

    #[test]
    fn test_top_offset_and_scale() {
        let config = GridConfig {
            no_pad: true,
            device_pixel_ratio: 2.0,
            ..config()
        };
        let commands = paint(
            &config,
            Frame {
                blocks: vec![block(0.0, 100.0)],
                top_offset: 30.0,
            },
        );
        assert!(matches!(commands[0], PaintCommand::SetScale(s) if s == 2.0));
        let PaintCommand::FillRect { rect, .. } = &commands[2] else {
            panic!("expected a fill, got {:?}", commands[2]);
        };
        assert_eq!(rect.y0, 70.0);
    }

    #[test]
    fn test_custom_style() {
        let style = OverlayStyle {
            valid_fill: Color::from_rgba8(0, 128, 0, 255),
            stroke_width: 2.0,
            dash: 5.0,
            ..Default::default()
        };
        let mut renderer = OverlayRenderer::new(RecordingSurface::new(), &config()).with_style(style);
        renderer
            .paint_frame(&Frame {
                blocks: vec![block(22.0, 14.0)],
                top_offset: 0.0,
            })
            .unwrap();
        let commands = renderer.into_surface().take_commands();

        let PaintCommand::FillRect { color, .. } = &commands[2] else {
            panic!("expected a fill, got {:?}", commands[2]);
        };
        assert_eq!(css_color(*color), "rgb(0, 128, 0)");
        let PaintCommand::StrokeRect { rect, style } = &commands[3] else {
            panic!("expected a dashed stroke, got {:?}", commands[3]);
        };
        assert_eq!(*rect, Rect::new(28.0, 18.0, 66.0, 56.0));
        assert_eq!(style.dash, Some(5.0));
        assert_eq!(style.width, 2.0);
    }

    #[test]
    fn test_clear() {
        let mut renderer = OverlayRenderer::new(RecordingSurface::new(), &config());
        renderer.clear().unwrap();
        assert!(matches!(renderer.surface().commands(), [PaintCommand::Clear]));
    }
}
