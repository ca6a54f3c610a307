//! DropGrid Application
//!
//! Drives drag sessions against a renderer and a layout store, and replays
//! recorded drag scenarios.

mod controller;
mod scenario;

pub use controller::{DragController, DropOutcome};
pub use scenario::{
    ReplayError, ReplayOutcome, ReplayReport, Scenario, Step, load_scenario, parse_scenario, replay,
};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{replay_scenario, start_wasm};
