//! Drag session state machine.
//!
//! A session owns one drag gesture from pointer-down to drop. Transitions are
//! pure: [`DragSessionState::handle`] consumes the state and an event and
//! returns the next state plus the [`Effect`]s the host must carry out.
//! Nothing here touches a surface, a clock or the layout store directly.

use crate::block::{DraggingBlock, ResizeUpdates};
use crate::collision::resolve;
use crate::config::GridConfig;
use crate::geometry::{OccupiedSpace, WidgetId, no_collision};
use crate::listeners::{ListenerKind, ListenerRegistry};
use crate::rows::extended_rows;
use crate::schedule::TaskKind;
use crate::store::{Commit, WidgetMove, WidgetOperation};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a drag session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Listeners attached, waiting for the first move over the canvas.
    Armed,
    Dragging,
    /// Deciding whether the drop commits.
    Finalizing,
}

/// Scroll state of the nearest scrollable ancestor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub top: f64,
    pub height: f64,
}

impl ScrollPosition {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// `height + top`, the quantity scroll replay is measured against.
    pub fn extent(&self) -> f64 {
        self.height + self.top
    }
}

/// What a session drags.
///
/// Block positions are pixels relative to the grab point of the dragged
/// widget, so the primary widget usually sits at the origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DragSource {
    pub blocks: Vec<DraggingBlock>,
    /// Committed footprints on the canvas, snapshotted at drag start.
    /// Footprints of the dragged widgets are ignored.
    #[serde(default)]
    pub occupied: Vec<OccupiedSpace>,
    /// Pointer offset inside the dragged widget.
    #[serde(default)]
    pub relative_start: Option<Point>,
    /// Offset between the widget's original parent and this canvas.
    #[serde(default)]
    pub parent_diff: Vec2,
    /// New widgets are added rather than moved and always use the default grab point.
    #[serde(default)]
    pub is_new_widget: bool,
    #[serde(default)]
    pub scroll: ScrollPosition,
}

/// Input delivered to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragEvent {
    PointerMove(Point),
    PointerOver(Point),
    PointerUp,
    PointerOut,
    PointerLeave,
    Blur,
    Unmount,
    Scroll { scroll_top: f64, scroll_height: f64 },
    /// A task the session scheduled came due.
    TaskFired(TaskKind),
}

/// Blocks to paint on the overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub blocks: Vec<DraggingBlock>,
    /// Vertical offset of the overlay within the canvas.
    pub top_offset: f64,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AttachListeners(Vec<ListenerKind>),
    DetachListeners(Vec<ListenerKind>),
    SetArenaRaised(bool),
    ClearOverlay,
    Render(Frame),
    /// The canvas now has this many rows.
    UpdateRows(f64),
    Schedule { kind: TaskKind, delay_ms: u64 },
    Cancel(TaskKind),
    Commit(Commit),
    /// The drop was refused because these widgets still collide.
    DropRejected { colliding: Vec<WidgetId> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LastMove {
    pointer: Point,
    scroll_extent: f64,
}

/// State of one drag session.
#[derive(Debug, Clone, Default)]
pub struct DragSessionState {
    session_id: Option<Uuid>,
    phase: DragPhase,
    source: DragSource,
    start: Point,
    delta: Vec2,
    rows: f64,
    scroll: ScrollPosition,
    last_move: Option<LastMove>,
    blocks: Vec<DraggingBlock>,
    updating_rows: bool,
    can_scroll: bool,
    queued_scroll: Option<ScrollPosition>,
    arena_raised: bool,
    listeners: ListenerRegistry,
    pending_tasks: Vec<TaskKind>,
}

impl DragSessionState {
    /// An idle session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn is_active(&self) -> bool {
        self.phase != DragPhase::Idle
    }

    /// Current row count, including rows grown during this drag.
    pub fn rows(&self) -> f64 {
        self.rows
    }

    /// Blocks of the latest evaluated frame.
    pub fn blocks(&self) -> &[DraggingBlock] {
        &self.blocks
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    pub fn scroll(&self) -> ScrollPosition {
        self.scroll
    }

    pub fn can_scroll(&self) -> bool {
        self.can_scroll
    }

    pub fn is_updating_rows(&self) -> bool {
        self.updating_rows
    }

    pub fn has_queued_scroll(&self) -> bool {
        self.queued_scroll.is_some()
    }

    pub fn is_arena_raised(&self) -> bool {
        self.arena_raised
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn pending_tasks(&self) -> &[TaskKind] {
        &self.pending_tasks
    }

    /// Start a session for `source`. Only an idle session can be armed.
    pub fn arm(self, mut source: DragSource, config: &GridConfig) -> (Self, Vec<Effect>) {
        if self.phase != DragPhase::Idle {
            log::warn!("Ignoring drag start while a session is {:?}", self.phase);
            return (self, Vec::new());
        }
        if source.blocks.is_empty() {
            log::warn!("Ignoring drag start with nothing to drag");
            return (self, Vec::new());
        }

        // Dragged widgets vacate their cells for the whole drag.
        let dragged: Vec<&WidgetId> = source.blocks.iter().map(|b| &b.widget_id).collect();
        let occupied: Vec<OccupiedSpace> = source
            .occupied
            .iter()
            .filter(|space| !dragged.contains(&&space.id))
            .cloned()
            .collect();
        source.occupied = occupied;

        let session_id = Uuid::new_v4();
        let mut state = Self {
            session_id: Some(session_id),
            phase: DragPhase::Armed,
            start: config.default_handle_offset,
            rows: config.rows,
            scroll: source.scroll,
            can_scroll: true,
            source,
            ..Self::default()
        };
        for kind in ListenerKind::SESSION {
            state.listeners.attach(kind);
        }
        log::debug!(
            "Armed drag session {} with {} block(s)",
            session_id,
            state.source.blocks.len()
        );
        let effects = vec![Effect::AttachListeners(ListenerKind::SESSION.to_vec())];
        (state, effects)
    }

    /// Apply one event.
    pub fn handle(mut self, event: DragEvent, config: &GridConfig) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();
        match (self.phase, event) {
            (DragPhase::Idle, event) => {
                log::trace!("Idle session ignoring {:?}", event);
            }
            (DragPhase::Armed, DragEvent::PointerMove(pointer))
            | (DragPhase::Armed, DragEvent::PointerOver(pointer)) => {
                self.activate(&mut effects);
                self.process_move(pointer, config, &mut effects);
            }
            (DragPhase::Armed, DragEvent::Scroll { scroll_top, scroll_height }) => {
                self.scroll = ScrollPosition::new(scroll_top, scroll_height);
            }
            (DragPhase::Dragging, DragEvent::PointerMove(pointer)) => {
                self.process_move(pointer, config, &mut effects);
            }
            (DragPhase::Dragging, DragEvent::PointerOver(_)) => {}
            (DragPhase::Dragging, DragEvent::PointerUp) => {
                self.finalize(config, &mut effects);
                self.teardown_into(&mut effects);
            }
            (DragPhase::Dragging, DragEvent::Scroll { scroll_top, scroll_height }) => {
                self.on_scroll(ScrollPosition::new(scroll_top, scroll_height), config, &mut effects);
            }
            (DragPhase::Armed | DragPhase::Dragging, DragEvent::TaskFired(kind)) => {
                self.on_task(kind, config, &mut effects);
            }
            // Out also fires when the pointer crosses onto a child of the
            // canvas; hosts attach it to the overlay, which has no children.
            (
                DragPhase::Armed | DragPhase::Dragging,
                DragEvent::PointerUp
                | DragEvent::PointerOut
                | DragEvent::PointerLeave
                | DragEvent::Blur
                | DragEvent::Unmount,
            ) => {
                log::debug!("Drag session cancelled in {:?}", self.phase);
                self.teardown_into(&mut effects);
            }
            (DragPhase::Finalizing, event) => {
                log::trace!("Finalizing session ignoring {:?}", event);
            }
        }
        (self, effects)
    }

    /// Cancel the session without committing. A no-op on an idle session.
    pub fn teardown(mut self) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();
        self.teardown_into(&mut effects);
        (self, effects)
    }

    /// Frame for the current blocks.
    pub fn frame(&self, config: &GridConfig) -> Frame {
        Frame {
            blocks: self.blocks.clone(),
            top_offset: if config.can_extend { self.scroll.top } else { 0.0 },
        }
    }

    fn activate(&mut self, effects: &mut Vec<Effect>) {
        if let (false, Some(relative)) = (self.source.is_new_widget, self.source.relative_start) {
            self.start = relative;
        }
        self.phase = DragPhase::Dragging;
        self.arena_raised = true;
        effects.push(Effect::SetArenaRaised(true));
    }

    fn process_move(&mut self, pointer: Point, config: &GridConfig, effects: &mut Vec<Effect>) {
        let current = LastMove {
            pointer,
            scroll_extent: self.scroll.extent(),
        };
        if self.last_move == Some(current) {
            return;
        }

        let delta = pointer - self.start - self.source.parent_diff;
        self.delta = delta;
        let moved: Vec<DraggingBlock> = self.source.blocks.iter().map(|b| b.translated(delta)).collect();

        let grown = extended_rows(&moved, self.rows, config);
        if let Some(rows) = grown {
            log::debug!("Extending canvas rows {} -> {}", self.rows, rows);
            self.rows = rows;
            effects.push(Effect::UpdateRows(rows));
        }
        self.blocks = self.evaluate(moved, config);

        if grown.is_some() {
            self.updating_rows = true;
            self.can_scroll = false;
            self.schedule(TaskKind::RowExtensionPaint, config.row_paint_debounce_ms, effects);
        } else if !self.updating_rows {
            effects.push(Effect::Render(self.frame(config)));
        }
        self.last_move = Some(current);
    }

    /// Mark each block as droppable or colliding, resolving colliding ones.
    fn evaluate(&self, blocks: Vec<DraggingBlock>, config: &GridConfig) -> Vec<DraggingBlock> {
        let (col_space, row_space) = (config.column_width, config.row_height);
        blocks
            .into_iter()
            .map(|mut block| {
                if let Err(e) = block.validate() {
                    log::warn!("Malformed dragging block: {}", e);
                    block.is_not_colliding = false;
                    block.resize_updates = Some(ResizeUpdates::default());
                    return block;
                }
                block.is_not_colliding = !config.drop_disabled
                    && no_collision(
                        block.origin(),
                        col_space,
                        row_space,
                        Point::ZERO,
                        block.column_width,
                        block.row_height,
                        &block.widget_id,
                        &self.source.occupied,
                        self.rows,
                        config.max_columns,
                        block.detach_from_layout,
                    );
                block.resize_updates = if block.is_not_colliding {
                    None
                } else {
                    let candidate = block.cell_rect(col_space, row_space);
                    Some(resolve(candidate, &block.widget_id, &self.source.occupied).updates)
                };
                block
            })
            .collect()
    }

    fn on_scroll(&mut self, position: ScrollPosition, config: &GridConfig, effects: &mut Vec<Effect>) {
        if !self.can_scroll {
            self.queued_scroll = Some(position);
            return;
        }
        self.replay_scroll(position, config, effects);
    }

    /// Replay the last pointer move shifted by the scroll change.
    fn replay_scroll(&mut self, position: ScrollPosition, config: &GridConfig, effects: &mut Vec<Effect>) {
        let Some(last) = self.last_move else {
            self.scroll = position;
            return;
        };
        let shift = position.extent() - last.scroll_extent;
        self.scroll = position;
        self.process_move(last.pointer + Vec2::new(0.0, shift), config, effects);
    }

    fn on_task(&mut self, kind: TaskKind, config: &GridConfig, effects: &mut Vec<Effect>) {
        let Some(index) = self.pending_tasks.iter().position(|&k| k == kind) else {
            log::debug!("Ignoring stale task {:?}", kind);
            return;
        };
        self.pending_tasks.remove(index);

        match kind {
            TaskKind::RowExtensionPaint => {
                let moved = self.source.blocks.iter().map(|b| b.translated(self.delta)).collect();
                self.blocks = self.evaluate(moved, config);
                effects.push(Effect::Render(self.frame(config)));
                self.updating_rows = false;
                self.can_scroll = false;
                self.schedule(TaskKind::ScrollSettle, config.scroll_settle_ms, effects);
            }
            TaskKind::ScrollSettle => {
                self.can_scroll = true;
                if let Some(position) = self.queued_scroll.take() {
                    self.replay_scroll(position, config, effects);
                }
            }
        }
    }

    fn schedule(&mut self, kind: TaskKind, delay_ms: u64, effects: &mut Vec<Effect>) {
        if !self.pending_tasks.contains(&kind) {
            self.pending_tasks.push(kind);
        }
        effects.push(Effect::Schedule { kind, delay_ms });
    }

    fn finalize(&mut self, config: &GridConfig, effects: &mut Vec<Effect>) {
        self.phase = DragPhase::Finalizing;
        let colliding: Vec<WidgetId> = self
            .blocks
            .iter()
            .filter(|b| !b.is_not_colliding)
            .map(|b| b.widget_id.clone())
            .collect();

        if self.blocks.is_empty() || !colliding.is_empty() {
            log::info!("Drop rejected, {} block(s) colliding", colliding.len());
            effects.push(Effect::DropRejected { colliding });
            return;
        }

        let operation = if self.source.is_new_widget {
            WidgetOperation::Add
        } else {
            WidgetOperation::Move
        };
        let moves = self
            .blocks
            .iter()
            .map(|block| {
                let cell = block.cell(config.column_width, config.row_height);
                let parent_id = if block.detach_from_layout {
                    config.main_container_id.clone()
                } else {
                    config.canvas_id.clone()
                };
                WidgetMove {
                    widget_id: block.widget_id.clone(),
                    left_column: cell.column,
                    top_row: cell.row,
                    columns: block.column_width,
                    rows: block.row_height,
                    parent_id,
                    operation,
                }
            })
            .collect();
        effects.push(Effect::Commit(Commit {
            canvas_id: config.canvas_id.clone(),
            rows: self.rows,
            moves,
        }));
    }

    fn teardown_into(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == DragPhase::Idle && self.listeners.is_empty() && self.pending_tasks.is_empty() {
            return;
        }
        for kind in self.pending_tasks.drain(..) {
            effects.push(Effect::Cancel(kind));
        }
        effects.push(Effect::ClearOverlay);
        if self.arena_raised {
            effects.push(Effect::SetArenaRaised(false));
        }
        let detached = self.listeners.detach_all();
        if !detached.is_empty() {
            effects.push(Effect::DetachListeners(detached));
        }
        if let Some(id) = self.session_id {
            log::debug!("Drag session {} ended", id);
        }
        *self = Self {
            rows: self.rows,
            ..Self::default()
        };
    }
}
