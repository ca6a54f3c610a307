//! Paint surfaces the overlay renderer draws onto.

use crate::renderer::RenderResult;
use kurbo::Rect;
use peniko::Color;

/// Stroke parameters for outlined rectangles.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    /// Dash length; dash and gap are equal. `None` draws a solid line.
    pub dash: Option<f64>,
}

impl StrokeStyle {
    /// A solid stroke.
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: None }
    }

    /// A dashed stroke.
    pub fn dashed(color: Color, width: f64, dash: f64) -> Self {
        Self {
            color,
            width,
            dash: Some(dash),
        }
    }
}

/// A 2D surface that can paint axis-aligned rectangles.
///
/// Coordinates are CSS pixels; the surface applies its own device scale.
pub trait PaintSurface {
    /// Erase the whole surface.
    fn clear(&mut self) -> RenderResult<()>;

    /// Set the device pixel scale for subsequent drawing.
    fn set_scale(&mut self, scale: f64) -> RenderResult<()>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> RenderResult<()>;

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) -> RenderResult<()>;
}

/// A drawing call captured by [`RecordingSurface`].
#[derive(Debug, Clone)]
pub enum PaintCommand {
    Clear,
    SetScale(f64),
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, style: StrokeStyle },
}

/// Surface that records drawing calls instead of painting.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<PaintCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far.
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Commands recorded since the last clear.
    pub fn current_frame(&self) -> &[PaintCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, PaintCommand::Clear))
            .map_or(0, |i| i + 1);
        &self.commands[start..]
    }

    pub fn take_commands(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl PaintSurface for RecordingSurface {
    fn clear(&mut self) -> RenderResult<()> {
        self.commands.push(PaintCommand::Clear);
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) -> RenderResult<()> {
        self.commands.push(PaintCommand::SetScale(scale));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> RenderResult<()> {
        self.commands.push(PaintCommand::FillRect { rect, color });
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) -> RenderResult<()> {
        self.commands.push(PaintCommand::StrokeRect { rect, style: *style });
        Ok(())
    }
}

/// CSS color string for `color`.
pub fn css_color(color: Color) -> String {
    let c = color.to_rgba8();
    if c.a == u8::MAX {
        format!("rgb({}, {}, {})", c.r, c.g, c.b)
    } else {
        let alpha = (f64::from(c.a) / 255.0 * 100.0).round() / 100.0;
        format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(Color::from_rgba8(104, 113, 239, 255)), "rgb(104, 113, 239)");
        assert_eq!(css_color(Color::from_rgba8(104, 113, 239, 153)), "rgba(104, 113, 239, 0.6)");
    }

    #[test]
    fn test_current_frame_starts_after_last_clear() {
        let mut surface = RecordingSurface::new();
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_rgba8(0, 0, 0, 255)).unwrap();
        surface.clear().unwrap();
        surface.set_scale(2.0).unwrap();
        assert_eq!(surface.commands().len(), 3);
        assert!(matches!(surface.current_frame(), [PaintCommand::SetScale(s)] if *s == 2.0));
        assert_eq!(surface.take_commands().len(), 3);
        assert!(surface.commands().is_empty());
    }
}
