// ReelMend - app/mod.rs
//
// Application layer: job orchestration, cross-thread plumbing, app state.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod console;
pub mod dispatch;
pub mod job;
pub mod progress;
pub mod relay;
pub mod state;
pub mod surface;
