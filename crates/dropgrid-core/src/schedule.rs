//! Explicit, cancellable deferred tasks for a drag session.
//!
//! The scheduler owns a millisecond clock driven by the host. At most one
//! task of each kind is pending: scheduling a kind again replaces the
//! pending one, which gives debounce and trailing-throttle behavior.

use serde::{Deserialize, Serialize};

/// Deferred work a drag session can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskKind {
    /// Repaint after the canvas row count grew.
    RowExtensionPaint,
    /// Mark scrolling as safe again after a row extension.
    ScrollSettle,
}

/// A pending task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub kind: TaskKind,
    pub due_ms: u64,
    /// Insertion sequence, breaks ties between tasks due at the same time.
    seq: u64,
}

/// Clock and queue of pending tasks.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<ScheduledTask>,
}

impl Scheduler {
    /// Create a scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `kind` to fire `delay_ms` from now, replacing a pending task
    /// of the same kind. Returns the replaced task.
    pub fn schedule(&mut self, kind: TaskKind, delay_ms: u64) -> Option<ScheduledTask> {
        let replaced = self.take(kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(ScheduledTask {
            kind,
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq,
        });
        replaced
    }

    /// Cancel the pending task of `kind`. Returns whether one was pending.
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        self.take(kind).is_some()
    }

    /// Cancel everything. Returns the kinds that were pending.
    pub fn cancel_all(&mut self) -> Vec<TaskKind> {
        self.pending.drain(..).map(|t| t.kind).collect()
    }

    /// Whether a task of `kind` is pending.
    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.pending.iter().any(|t| t.kind == kind)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[ScheduledTask] {
        &self.pending
    }

    /// Move the clock to `now_ms` and return the tasks that came due, in due order.
    ///
    /// The clock never runs backwards.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<TaskKind> {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;
        let mut due: Vec<ScheduledTask> = Vec::new();
        self.pending.retain(|task| {
            if task.due_ms <= now {
                due.push(*task);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|t| (t.due_ms, t.seq));
        due.into_iter().map(|t| t.kind).collect()
    }

    /// Advance the clock by `delta_ms`.
    pub fn advance_by(&mut self, delta_ms: u64) -> Vec<TaskKind> {
        self.advance_to(self.now_ms.saturating_add(delta_ms))
    }

    fn take(&mut self, kind: TaskKind) -> Option<ScheduledTask> {
        let index = self.pending.iter().position(|t| t.kind == kind)?;
        Some(self.pending.remove(index))
    }
}
