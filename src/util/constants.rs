// ReelMend - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ReelMend";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ReelMend";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Owning-context tick
// =============================================================================

/// Period of the owning context's tick (ms): output drain, dispatched
/// actions and progress repaint all happen at this cadence.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Minimum user-configurable tick interval (ms).
pub const MIN_TICK_INTERVAL_MS: u64 = 20;

/// Maximum user-configurable tick interval (ms).
pub const MAX_TICK_INTERVAL_MS: u64 = 1_000;

/// How often `JobController::shutdown` re-checks an outstanding worker while
/// it keeps servicing the dispatch queue (ms).
pub const SHUTDOWN_POLL_INTERVAL_MS: u64 = 10;

// =============================================================================
// Dispatcher bounds
// =============================================================================

/// Maximum number of queued actions before a worker thread calling
/// `Dispatcher::schedule` waits for the owning context to drain.
pub const DISPATCH_QUEUE_CAPACITY: usize = 256;

/// Maximum number of dispatched actions run by a single tick.  Any remaining
/// actions stay queued for the next tick so a burst cannot stall a frame.
pub const MAX_DISPATCH_ACTIONS_PER_TICK: usize = 64;

// =============================================================================
// Output relay
// =============================================================================

/// Maximum length in bytes of one logging-subsystem line written into the
/// output relay (the formatted `[target] message` text, before the newline).
pub const MAX_RELAY_LOG_LINE: usize = 256;

/// Maximum number of bytes retained in one on-screen output pane.  Older text
/// is discarded from the front once the pane grows past this size.
pub const MAX_PANE_TEXT_BYTES: usize = 4 * 1024 * 1024; // 4 MiB

/// Text appended to the output relay once at the end of every job.
pub const COMPLETION_MARKER: &str = "\ndone!\n";

// =============================================================================
// Batch repair
// =============================================================================

/// A premature end recovering less than this fraction of the file triggers
/// the "try skipping unknown sequences" advisory.
pub const PREMATURE_ADVISORY_THRESHOLD: f64 = 0.9;

/// Advisory shown when an item ended prematurely with a low completion ratio.
pub const PREMATURE_END_ADVICE: &str =
    "Encountered premature end, please try 'Skip unknown sequences' in the \"Settings\" tab.";

/// Message shown when a repair is requested with a blank input.
pub const MISSING_REPAIR_INPUTS: &str =
    "Please specify the reference file and the truncated folder!";

/// Message shown when an analysis is requested with a blank input.
pub const MISSING_ANALYZE_INPUT: &str = "Please specify the file to analyze!";

/// Infix inserted between a repaired file's stem and its suffix/extension.
pub const REPAIRED_FILE_INFIX: &str = "_fixed";

/// Default step used in the output suffix when unknown sequences are skipped.
pub const DEFAULT_SKIP_STEP: u32 = 1;

/// Minimum user-configurable skip step.
pub const MIN_SKIP_STEP: u32 = 1;

/// Maximum user-configurable skip step.
pub const MAX_SKIP_STEP: u32 = 4_096;

// =============================================================================
// Container scanning
// =============================================================================

/// Maximum nesting depth followed when printing an atom tree.
pub const MAX_ATOM_DEPTH: usize = 8;

/// Maximum number of atoms printed by a single analysis.
pub const MAX_ANALYZED_ATOMS: usize = 10_000;

/// Atom types that hold child atoms rather than payload.
pub const CONTAINER_ATOMS: &[&str] = &[
    "moov", "trak", "mdia", "minf", "stbl", "edts", "udta", "dinf", "mvex", "moof", "traf",
];

/// Top-level atom types a target must carry whenever the reference does.
pub const REQUIRED_ATOMS: &[[u8; 4]] = &[*b"ftyp", *b"moov"];

/// Top-level atom types recognised without a reference to vouch for them.
pub const KNOWN_TOP_LEVEL_ATOMS: &[&str] = &[
    "ftyp", "moov", "mdat", "free", "skip", "wide", "uuid", "moof", "mfra", "meta", "pdin",
    "styp", "sidx",
];

// =============================================================================
// Logging
// =============================================================================

/// Modules whose events are never relayed: they already write their
/// user-facing text to the output panes.
pub const RELAY_EXCLUDED_TARGETS: &[&str] = &[
    "reelmend::app",
    "reelmend::core::batch",
    "reelmend::core::analyze",
];

/// Default log level for the stderr subscriber.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default verbosity of log events relayed into the output pane.
pub const DEFAULT_RELAY_LEVEL: &str = "warn";

/// Log levels accepted in `config.toml`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
