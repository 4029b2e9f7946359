// ReelMend - core/mod.rs
//
// Core repair logic layer.
// Dependencies: standard library, tracing, walkdir, chrono.
// Must NOT depend on: ui, platform, app, or any GUI crate.

pub mod analyze;
pub mod atoms;
pub mod batch;
pub mod engine;
pub mod model;
pub mod text;
