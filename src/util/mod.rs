// ReelMend - util/mod.rs
//
// Utility modules: error types, named constants, logging setup.
// Only `logging` reaches into other layers: it feeds the app layer's
// output relay.

pub mod constants;
pub mod error;
pub mod logging;
