//! Layout store: the external widget tree a finished drag commits into.

use crate::geometry::{OccupiedSpace, WidgetId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Widget not found: {0}")]
    UnknownWidget(WidgetId),
    #[error("Widget already exists: {0}")]
    DuplicateWidget(WidgetId),
    #[error("Invalid placement for {0}")]
    InvalidPlacement(WidgetId),
    #[error("Store error: {0}")]
    Other(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Whether a committed widget is new or already on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetOperation {
    Add,
    Move,
}

/// New placement of one widget, in grid units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetMove {
    pub widget_id: WidgetId,
    pub left_column: f64,
    pub top_row: f64,
    pub columns: f64,
    pub rows: f64,
    /// Canvas the widget lands on.
    pub parent_id: WidgetId,
    pub operation: WidgetOperation,
}

impl WidgetMove {
    fn is_valid(&self) -> bool {
        let values = [self.left_column, self.top_row, self.columns, self.rows];
        values.iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Every placement produced by one successful drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Canvas the drag happened on.
    pub canvas_id: WidgetId,
    /// Row count of that canvas after the drag.
    pub rows: f64,
    pub moves: Vec<WidgetMove>,
}

/// Backend for committed layout updates.
///
/// A commit is atomic: if any move is rejected nothing is applied.
pub trait LayoutStore {
    fn apply(&mut self, commit: &Commit) -> StoreResult<()>;
}

/// A widget's committed placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetPlacement {
    pub widget_id: WidgetId,
    pub parent_id: WidgetId,
    pub left_column: f64,
    pub top_row: f64,
    pub columns: f64,
    pub rows: f64,
}

impl WidgetPlacement {
    /// Footprint of this placement as an occupied space.
    pub fn occupied_space(&self) -> OccupiedSpace {
        OccupiedSpace {
            id: self.widget_id.clone(),
            left: self.left_column,
            top: self.top_row,
            right: self.left_column + self.columns,
            bottom: self.top_row + self.rows,
            parent_id: Some(self.parent_id.clone()),
        }
    }
}

impl From<&WidgetMove> for WidgetPlacement {
    fn from(m: &WidgetMove) -> Self {
        Self {
            widget_id: m.widget_id.clone(),
            parent_id: m.parent_id.clone(),
            left_column: m.left_column,
            top_row: m.top_row,
            columns: m.columns,
            rows: m.rows,
        }
    }
}

/// In-memory layout store for tests and replay.
#[derive(Debug, Clone, Default)]
pub struct MemoryLayoutStore {
    widgets: HashMap<WidgetId, WidgetPlacement>,
    canvas_rows: HashMap<WidgetId, f64>,
    commits: usize,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a widget without going through a commit.
    pub fn insert(&mut self, placement: WidgetPlacement) {
        self.widgets.insert(placement.widget_id.clone(), placement);
    }

    pub fn get(&self, widget_id: &str) -> Option<&WidgetPlacement> {
        self.widgets.get(widget_id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Number of commits applied so far.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Committed row count of a canvas.
    pub fn canvas_rows(&self, canvas_id: &str) -> Option<f64> {
        self.canvas_rows.get(canvas_id).copied()
    }

    /// Every placement, sorted by widget id.
    pub fn placements(&self) -> Vec<WidgetPlacement> {
        let mut placements: Vec<WidgetPlacement> = self.widgets.values().cloned().collect();
        placements.sort_by(|a, b| a.widget_id.cmp(&b.widget_id));
        placements
    }

    /// Snapshot of the footprints on `canvas_id`, sorted by widget id.
    pub fn occupied_spaces(&self, canvas_id: &str) -> Vec<OccupiedSpace> {
        let mut spaces: Vec<OccupiedSpace> = self
            .widgets
            .values()
            .filter(|w| w.parent_id == canvas_id)
            .map(WidgetPlacement::occupied_space)
            .collect();
        spaces.sort_by(|a, b| a.id.cmp(&b.id));
        spaces
    }

    fn check(&self, m: &WidgetMove) -> StoreResult<()> {
        if !m.is_valid() {
            return Err(StoreError::InvalidPlacement(m.widget_id.clone()));
        }
        let exists = self.widgets.contains_key(&m.widget_id);
        match m.operation {
            WidgetOperation::Move if !exists => Err(StoreError::UnknownWidget(m.widget_id.clone())),
            WidgetOperation::Add if exists => Err(StoreError::DuplicateWidget(m.widget_id.clone())),
            _ => Ok(()),
        }
    }
}

impl LayoutStore for MemoryLayoutStore {
    fn apply(&mut self, commit: &Commit) -> StoreResult<()> {
        for m in &commit.moves {
            self.check(m)?;
        }
        for m in &commit.moves {
            self.widgets.insert(m.widget_id.clone(), WidgetPlacement::from(m));
        }
        let rows = self.canvas_rows.entry(commit.canvas_id.clone()).or_insert(0.0);
        *rows = rows.max(commit.rows);
        self.commits += 1;
        log::debug!(
            "Applied {} widget move(s) on canvas {}",
            commit.moves.len(),
            commit.canvas_id
        );
        Ok(())
    }
}
