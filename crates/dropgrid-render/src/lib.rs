//! DropGrid Render Library
//!
//! Paints the drag overlay: moving blocks, their snapped cells and their
//! collision state. Drawing goes through [`PaintSurface`], so the same
//! renderer targets a browser canvas or a recording surface in tests.

mod renderer;
mod surface;

#[cfg(target_arch = "wasm32")]
mod web;

pub use renderer::{OverlayRenderer, OverlayStyle, RenderResult, Renderer, RendererError};
pub use surface::{PaintCommand, PaintSurface, RecordingSurface, StrokeStyle, css_color};

#[cfg(target_arch = "wasm32")]
pub use web::CanvasSurface;
