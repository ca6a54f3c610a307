//! DropGrid Core Library
//!
//! Platform-agnostic geometry and state for dragging widgets across a
//! grid canvas: snapping, collision resolution, row extension and the
//! drag session state machine.

pub mod block;
pub mod collision;
pub mod config;
pub mod geometry;
pub mod listeners;
pub mod rows;
pub mod schedule;
pub mod session;
pub mod store;

pub use block::{DraggingBlock, Edge, ResizeUpdates};
pub use collision::{CollisionClass, NeighborResize, Resolution, resolve};
pub use config::{ConfigError, GridConfig};
pub use geometry::{GeometryError, GridCell, OccupiedSpace, WidgetId, are_intersecting, no_collision};
pub use listeners::{ListenerKind, ListenerRegistry};
pub use rows::extended_rows;
pub use schedule::{Scheduler, TaskKind};
pub use session::{DragEvent, DragPhase, DragSessionState, DragSource, Effect, Frame, ScrollPosition};
pub use store::{Commit, LayoutStore, MemoryLayoutStore, StoreError, WidgetMove, WidgetOperation, WidgetPlacement};
