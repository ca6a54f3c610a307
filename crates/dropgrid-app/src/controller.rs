//! Host driver for drag sessions.
//!
//! Feeds events into the session state machine and carries out the effects
//! it returns against a renderer, a scheduler and a layout store.

use dropgrid_core::config::GridConfig;
use dropgrid_core::geometry::WidgetId;
use dropgrid_core::listeners::ListenerRegistry;
use dropgrid_core::schedule::Scheduler;
use dropgrid_core::session::{DragEvent, DragSessionState, DragSource, Effect};
use dropgrid_core::store::{Commit, LayoutStore, StoreError};
use dropgrid_render::Renderer;

/// How the last drag ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Committed(Commit),
    Rejected(Vec<WidgetId>),
    StoreFailed(StoreError),
}

/// Drives one canvas' drag sessions.
pub struct DragController<R: Renderer, L: LayoutStore> {
    config: GridConfig,
    state: DragSessionState,
    scheduler: Scheduler,
    listeners: ListenerRegistry,
    arena_raised: bool,
    renderer: R,
    store: L,
    frames_painted: usize,
    last_outcome: Option<DropOutcome>,
}

impl<R: Renderer, L: LayoutStore> DragController<R, L> {
    pub fn new(config: GridConfig, renderer: R, store: L) -> Self {
        Self {
            config,
            state: DragSessionState::new(),
            scheduler: Scheduler::new(),
            listeners: ListenerRegistry::new(),
            arena_raised: false,
            renderer,
            store,
            frames_painted: 0,
            last_outcome: None,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn state(&self) -> &DragSessionState {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Listeners the host currently has attached.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn is_arena_raised(&self) -> bool {
        self.arena_raised
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut L {
        &mut self.store
    }

    /// Frames painted since the controller was created.
    pub fn frames_painted(&self) -> usize {
        self.frames_painted
    }

    pub fn last_outcome(&self) -> Option<&DropOutcome> {
        self.last_outcome.as_ref()
    }

    /// Arm a session for `source` (pointer-down or external drag start).
    pub fn begin(&mut self, source: DragSource) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = state.arm(source, &self.config);
        self.state = state;
        self.last_outcome = None;
        self.apply(effects);
    }

    /// Deliver one event to the active session.
    pub fn dispatch(&mut self, event: DragEvent) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = state.handle(event, &self.config);
        self.state = state;
        self.apply(effects);
    }

    /// Move the clock to `now_ms` and fire every task that came due.
    pub fn advance_to(&mut self, now_ms: u64) {
        loop {
            let due = self.scheduler.advance_to(now_ms);
            if due.is_empty() {
                break;
            }
            for kind in due {
                self.dispatch(DragEvent::TaskFired(kind));
            }
        }
    }

    pub fn advance_by(&mut self, delta_ms: u64) {
        self.advance_to(self.scheduler.now().saturating_add(delta_ms));
    }

    /// Cancel the active session without committing.
    pub fn cancel(&mut self) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = state.teardown();
        self.state = state;
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::AttachListeners(kinds) => {
                    for kind in kinds {
                        self.listeners.attach(kind);
                    }
                }
                Effect::DetachListeners(kinds) => {
                    for kind in kinds {
                        self.listeners.detach(kind);
                    }
                }
                Effect::SetArenaRaised(raised) => self.arena_raised = raised,
                Effect::ClearOverlay => {
                    if let Err(e) = self.renderer.clear() {
                        log::error!("Failed to clear overlay: {}", e);
                    }
                }
                Effect::Render(frame) => match self.renderer.paint_frame(&frame) {
                    Ok(()) => self.frames_painted += 1,
                    Err(e) => log::error!("Failed to paint frame: {}", e),
                },
                Effect::UpdateRows(rows) => {
                    log::info!("Canvas {} now has {} rows", self.config.canvas_id, rows);
                    self.config.rows = rows;
                }
                Effect::Schedule { kind, delay_ms } => {
                    self.scheduler.schedule(kind, delay_ms);
                }
                Effect::Cancel(kind) => {
                    self.scheduler.cancel(kind);
                }
                Effect::Commit(commit) => {
                    self.last_outcome = Some(match self.store.apply(&commit) {
                        Ok(()) => {
                            log::info!("Committed {} widget move(s)", commit.moves.len());
                            DropOutcome::Committed(commit)
                        }
                        Err(e) => {
                            log::error!("Failed to commit drop: {}", e);
                            DropOutcome::StoreFailed(e)
                        }
                    });
                }
                Effect::DropRejected { colliding } => {
                    self.last_outcome = Some(DropOutcome::Rejected(colliding));
                }
            }
        }
    }
}
