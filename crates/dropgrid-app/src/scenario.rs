//! Recorded drag scenarios and their replay.

use crate::controller::{DragController, DropOutcome};
use dropgrid_core::config::{ConfigError, GridConfig};
use dropgrid_core::geometry::WidgetId;
use dropgrid_core::session::{DragEvent, DragSource};
use dropgrid_core::store::{MemoryLayoutStore, WidgetMove, WidgetPlacement};
use dropgrid_render::{OverlayRenderer, RecordingSurface};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// One recorded input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Move { x: f64, y: f64 },
    Over { x: f64, y: f64 },
    Up,
    Out,
    Leave,
    Blur,
    Unmount,
    Scroll { top: f64, height: f64 },
    /// Let the clock run.
    Wait { ms: u64 },
}

/// A canvas, its widgets, and a drag to replay over them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: GridConfig,
    #[serde(default)]
    pub widgets: Vec<WidgetPlacement>,
    /// Occupied spaces default to the widgets on the configured canvas.
    pub drag: DragSource,
    pub steps: Vec<Step>,
}

/// How a replayed drag ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReplayOutcome {
    Committed { moves: Vec<WidgetMove> },
    Rejected { colliding: Vec<WidgetId> },
    StoreFailed { error: String },
    /// The session ended, or is still running, without a drop.
    NoDrop,
}

/// Summary of a replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub outcome: ReplayOutcome,
    /// Row count of the canvas after the drag.
    pub rows: f64,
    pub frames_painted: usize,
    pub paint_commands: usize,
    /// Listeners still attached at the end.
    pub listeners_attached: usize,
    pub pending_tasks: usize,
    pub widgets: Vec<WidgetPlacement>,
}

/// Read a scenario from a JSON file.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario, ReplayError> {
    let json = std::fs::read_to_string(path)?;
    parse_scenario(&json)
}

/// Parse a scenario from JSON.
pub fn parse_scenario(json: &str) -> Result<Scenario, ReplayError> {
    let scenario: Scenario = serde_json::from_str(json)?;
    scenario.config.validate()?;
    Ok(scenario)
}

/// Replay a scenario against an in-memory store and a recording surface.
pub fn replay(scenario: &Scenario) -> Result<ReplayReport, ReplayError> {
    let config = scenario.config.clone();
    config.validate()?;

    let mut store = MemoryLayoutStore::new();
    for widget in &scenario.widgets {
        store.insert(widget.clone());
    }
    let mut source = scenario.drag.clone();
    if source.occupied.is_empty() {
        source.occupied = store.occupied_spaces(&config.canvas_id);
    }

    let renderer = OverlayRenderer::new(RecordingSurface::new(), &config);
    let mut controller = DragController::new(config, renderer, store);
    controller.begin(source);

    for step in &scenario.steps {
        log::debug!("Replaying {:?}", step);
        match *step {
            Step::Move { x, y } => controller.dispatch(DragEvent::PointerMove(Point::new(x, y))),
            Step::Over { x, y } => controller.dispatch(DragEvent::PointerOver(Point::new(x, y))),
            Step::Up => controller.dispatch(DragEvent::PointerUp),
            Step::Out => controller.dispatch(DragEvent::PointerOut),
            Step::Leave => controller.dispatch(DragEvent::PointerLeave),
            Step::Blur => controller.dispatch(DragEvent::Blur),
            Step::Unmount => controller.dispatch(DragEvent::Unmount),
            Step::Scroll { top, height } => controller.dispatch(DragEvent::Scroll {
                scroll_top: top,
                scroll_height: height,
            }),
            Step::Wait { ms } => controller.advance_by(ms),
        }
    }

    let outcome = match controller.last_outcome() {
        Some(DropOutcome::Committed(commit)) => ReplayOutcome::Committed {
            moves: commit.moves.clone(),
        },
        Some(DropOutcome::Rejected(colliding)) => ReplayOutcome::Rejected {
            colliding: colliding.clone(),
        },
        Some(DropOutcome::StoreFailed(e)) => ReplayOutcome::StoreFailed { error: e.to_string() },
        None => ReplayOutcome::NoDrop,
    };

    Ok(ReplayReport {
        outcome,
        rows: controller.config().rows,
        frames_painted: controller.frames_painted(),
        paint_commands: controller.renderer().surface().commands().len(),
        listeners_attached: controller.listeners().attached().len(),
        pending_tasks: controller.scheduler().pending().len(),
        widgets: controller.store().placements(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENARIO: &str = r#"{
        "config": { "canvas_id": "canvas", "column_width": 10, "row_height": 10, "rows": 10, "can_extend": true },
        "widgets": [
            { "widget_id": "W1", "parent_id": "canvas", "left_column": 0, "top_row": 0, "columns": 4, "rows": 4 },
            { "widget_id": "W2", "parent_id": "canvas", "left_column": 10, "top_row": 0, "columns": 4, "rows": 3 }
        ],
        "drag": {
            "blocks": [
                { "widget_id": "W2", "left": 0, "top": 0, "width": 40, "height": 30, "column_width": 4, "row_height": 3 }
            ],
            "relative_start": { "x": 5, "y": 5 }
        },
        "steps": [
            { "type": "move", "x": 25, "y": 5 },
            { "type": "move", "x": 65, "y": 95 },
            { "type": "wait", "ms": 0 },
            { "type": "wait", "ms": 50 },
            { "type": "up" }
        ]
    }"#;

    #[test]
    fn test_replay_commits_and_extends_rows() {
        let scenario = parse_scenario(SCENARIO).unwrap();
        let report = replay(&scenario).unwrap();

        let ReplayOutcome::Committed { moves } = &report.outcome else {
            panic!("expected a commit, got {:?}", report.outcome);
        };
        assert_eq!(moves.len(), 1);
        assert_eq!((moves[0].left_column, moves[0].top_row), (6.0, 9.0));
        assert_eq!(report.rows, 14.0);
        assert_eq!(report.listeners_attached, 0);
        assert_eq!(report.pending_tasks, 0);
        // One frame for the first move and one after the rows grew.
        assert_eq!(report.frames_painted, 2);

        let w2 = report.widgets.iter().find(|w| w.widget_id == "W2").unwrap();
        assert_eq!(w2.top_row, 9.0);
    }

    #[test]
    fn test_replay_rejects_colliding_drop() {
        let mut scenario = parse_scenario(SCENARIO).unwrap();
        scenario.steps = vec![Step::Move { x: 25.0, y: 5.0 }, Step::Up];
        let report = replay(&scenario).unwrap();
        assert_eq!(
            report.outcome,
            ReplayOutcome::Rejected {
                colliding: vec!["W2".to_string()]
            }
        );
        let w2 = report.widgets.iter().find(|w| w.widget_id == "W2").unwrap();
        assert_eq!(w2.left_column, 10.0);
    }

    #[test]
    fn test_replay_group_drag_onto_vacated_cells() {
        let json = r#"{
            "config": { "canvas_id": "canvas", "column_width": 10, "row_height": 10, "rows": 10 },
            "widgets": [
                { "widget_id": "A", "parent_id": "canvas", "left_column": 0, "top_row": 0, "columns": 4, "rows": 4 },
                { "widget_id": "B", "parent_id": "canvas", "left_column": 4, "top_row": 0, "columns": 4, "rows": 4 }
            ],
            "drag": {
                "blocks": [
                    { "widget_id": "A", "left": 0, "top": 0, "width": 40, "height": 40, "column_width": 4, "row_height": 4 },
                    { "widget_id": "B", "left": 40, "top": 0, "width": 40, "height": 40, "column_width": 4, "row_height": 4 }
                ],
                "relative_start": { "x": 5, "y": 5 }
            },
            "steps": [
                { "type": "move", "x": 25, "y": 5 },
                { "type": "up" }
            ]
        }"#;
        let report = replay(&parse_scenario(json).unwrap()).unwrap();

        let ReplayOutcome::Committed { moves } = &report.outcome else {
            panic!("expected a commit, got {:?}", report.outcome);
        };
        assert_eq!(moves.len(), 2);
        let columns: Vec<(&str, f64)> = report
            .widgets
            .iter()
            .map(|w| (w.widget_id.as_str(), w.left_column))
            .collect();
        assert_eq!(columns, vec![("A", 2.0), ("B", 6.0)]);
    }

    #[test]
    fn test_replay_without_drop() {
        let mut scenario = parse_scenario(SCENARIO).unwrap();
        scenario.steps = vec![Step::Move { x: 65.0, y: 5.0 }, Step::Blur];
        let report = replay(&scenario).unwrap();
        assert_eq!(report.outcome, ReplayOutcome::NoDrop);
        assert_eq!(report.listeners_attached, 0);
    }

    #[test]
    fn test_load_scenario_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();
        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(scenario.steps[2], Step::Wait { ms: 0 });
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(load_scenario("/nonexistent/scenario.json"), Err(ReplayError::Io(_))));
        assert!(matches!(parse_scenario("{"), Err(ReplayError::Parse(_))));
        let bad_config = r#"{ "config": { "column_width": 0 }, "drag": { "blocks": [] }, "steps": [] }"#;
        assert!(matches!(parse_scenario(bad_config), Err(ReplayError::Config(_))));
    }
}
