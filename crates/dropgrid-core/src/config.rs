//! Canvas grid configuration.

use crate::geometry::WidgetId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns on a canvas.
pub const DEFAULT_GRID_COLUMNS: f64 = 64.0;
/// Row height in pixels.
pub const DEFAULT_GRID_ROW_HEIGHT: f64 = 10.0;
/// Padding between the canvas edge and its grid, in pixels.
pub const CONTAINER_GRID_PADDING: f64 = DEFAULT_GRID_ROW_HEIGHT * 0.6;
/// Rows kept free below the bottom-most block on extendable canvases.
pub const CANVAS_EXTENSION_OFFSET: f64 = 2.0;
/// Id of the root canvas that detached widgets are dropped onto.
pub const MAIN_CONTAINER_WIDGET_ID: &str = "0";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Grid cell size must be positive, got {0}x{1}")]
    InvalidCellSize(f64, f64),
    #[error("Device pixel ratio must be positive, got {0}")]
    InvalidScale(f64),
    #[error("Grid must have at least one column and a non-negative row count")]
    InvalidGrid,
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Grid and behavior settings for one canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// The canvas widget blocks are dropped into.
    pub canvas_id: WidgetId,
    /// Parent for detached widgets.
    pub main_container_id: WidgetId,
    /// Column cell width in pixels.
    pub column_width: f64,
    /// Row cell height in pixels.
    pub row_height: f64,
    pub max_columns: f64,
    /// Committed row count of the canvas.
    pub rows: f64,
    /// Grid padding in pixels, ignored when `no_pad` is set.
    pub padding: f64,
    pub no_pad: bool,
    /// Whether the canvas grows rows as blocks approach its bottom.
    pub can_extend: bool,
    /// Every placement is invalid when set.
    pub drop_disabled: bool,
    pub device_pixel_ratio: f64,
    pub extension_offset: f64,
    /// Debounce for the row-extension repaint.
    pub row_paint_debounce_ms: u64,
    /// Trailing throttle before scrolling is considered safe again.
    pub scroll_settle_ms: u64,
    /// Pointer offset inside a block when no relative start point is known.
    pub default_handle_offset: Point,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            canvas_id: MAIN_CONTAINER_WIDGET_ID.to_string(),
            main_container_id: MAIN_CONTAINER_WIDGET_ID.to_string(),
            column_width: 16.0,
            row_height: DEFAULT_GRID_ROW_HEIGHT,
            max_columns: DEFAULT_GRID_COLUMNS,
            rows: 40.0,
            padding: CONTAINER_GRID_PADDING,
            no_pad: false,
            can_extend: false,
            drop_disabled: false,
            device_pixel_ratio: 1.0,
            extension_offset: CANVAS_EXTENSION_OFFSET,
            row_paint_debounce_ms: 0,
            scroll_settle_ms: 50,
            default_handle_offset: Point::new(20.0, 20.0),
        }
    }
}

impl GridConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.column_width > 0.0 && self.row_height > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.column_width, self.row_height));
        }
        if !(self.device_pixel_ratio > 0.0) {
            return Err(ConfigError::InvalidScale(self.device_pixel_ratio));
        }
        if !(self.max_columns >= 1.0 && self.rows >= 0.0) {
            return Err(ConfigError::InvalidGrid);
        }
        Ok(())
    }

    /// Effective padding around the grid.
    pub fn effective_padding(&self) -> f64 {
        if self.no_pad { 0.0 } else { self.padding }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GridConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_padding(), 6.0);
        assert_eq!(config.max_columns, 64.0);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = GridConfig::from_json(r#"{"column_width": 12.5, "can_extend": true, "no_pad": true}"#).unwrap();
        assert_eq!(config.column_width, 12.5);
        assert!(config.can_extend);
        assert_eq!(config.effective_padding(), 0.0);
        assert_eq!(config.scroll_settle_ms, 50);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            GridConfig::from_json(r#"{"row_height": 0}"#),
            Err(ConfigError::InvalidCellSize(_, _))
        ));
        assert!(matches!(
            GridConfig::from_json(r#"{"device_pixel_ratio": -2}"#),
            Err(ConfigError::InvalidScale(_))
        ));
        assert!(matches!(GridConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = GridConfig {
            canvas_id: "canvas-1".into(),
            rows: 12.0,
            ..Default::default()
        };
        let parsed = GridConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
