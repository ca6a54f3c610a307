//! Browser canvas surface.

use crate::renderer::{RenderResult, RendererError};
use crate::surface::{PaintSurface, StrokeStyle, css_color};
use kurbo::Rect;
use peniko::Color;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

fn surface_error(err: JsValue) -> RendererError {
    RendererError::Surface(format!("{:?}", err))
}

/// A [`PaintSurface`] over an HTML canvas' 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Acquire the 2D context of `canvas`.
    pub fn new(canvas: HtmlCanvasElement) -> RenderResult<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(surface_error)?
            .ok_or_else(|| RendererError::InitFailed("2D context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RendererError::InitFailed("Not a 2D context".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl PaintSurface for CanvasSurface {
    fn clear(&mut self) -> RenderResult<()> {
        self.ctx.save();
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).map_err(surface_error)?;
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
        self.ctx.restore();
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) -> RenderResult<()> {
        self.ctx
            .set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0)
            .map_err(surface_error)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> RenderResult<()> {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) -> RenderResult<()> {
        let dashes = js_sys::Array::new();
        if let Some(dash) = style.dash {
            dashes.push(&JsValue::from_f64(dash));
        }
        self.ctx.set_line_dash(&dashes).map_err(surface_error)?;
        self.ctx.set_line_width(style.width);
        self.ctx.set_stroke_style_str(&css_color(style.color));
        self.ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
        Ok(())
    }
}
