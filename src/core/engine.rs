// ReelMend - core/engine.rs
//
// Seam between the batch runner and the repair algorithm.
//
// The batch runner only knows these two traits: an engine opens one fresh,
// independent session per item, seeded from the reference file, and the
// session repairs exactly one target.  Sessions report failures as
// `Err(FailureInfo)`; panics are caught and normalised by the caller.

use crate::core::model::{RepairSettings, Truncation};
use crate::util::error::FailureInfo;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Factory for per-item repair sessions.  Shared with the worker thread.
pub trait RepairEngine: Send + Sync {
    /// Short engine name used in log output.
    fn name(&self) -> &str;

    /// Build a session seeded from the known-good `reference` file.
    fn open_session(
        &self,
        reference: &Path,
        settings: &RepairSettings,
    ) -> Result<Box<dyn RepairSession>, FailureInfo>;

    /// Check once, before any item, that `reference` can seed sessions.
    fn check_reference(&self, reference: &Path, settings: &RepairSettings) -> Result<(), FailureInfo> {
        self.open_session(reference, settings).map(drop)
    }
}

/// One repair of one target file.
pub trait RepairSession {
    /// Repair `target`, returning the path of the written output.
    ///
    /// Free-form diagnostic text goes to `log`; `progress` receives the
    /// completion percentage (0-100) of this item.
    fn repair(
        &mut self,
        target: &Path,
        log: &mut dyn Write,
        progress: &mut dyn FnMut(u8),
    ) -> Result<PathBuf, FailureInfo>;

    /// Premature-end diagnostics of the last `repair` call, available
    /// whether it succeeded or not.
    fn truncation(&self) -> Truncation;

    /// Non-fatal oddities noticed during the last `repair` call.
    fn hidden_warnings(&self) -> Vec<String> {
        Vec::new()
    }
}
