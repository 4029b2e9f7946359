// ReelMend - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use crate::util::error::FailureInfo;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Phase (reporting target)
// =============================================================================

/// The on-screen pane that receives output and progress for a job.
///
/// Each phase owns an independent output pane and progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Repair,
    Analyze,
}

impl Phase {
    /// Number of phases; sizes per-phase slot arrays.
    pub const COUNT: usize = 2;

    /// All phases in display order.
    pub const ALL: [Phase; Phase::COUNT] = [Phase::Repair, Phase::Analyze];

    /// Stable slot index of this phase.
    pub fn index(self) -> usize {
        match self {
            Phase::Repair => 0,
            Phase::Analyze => 1,
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Repair => "Repair",
            Phase::Analyze => "Analyze",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Notices (user-facing modal messages)
// =============================================================================

/// A message the owning context shows as a blocking dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Something failed: an item, a job setup, or a rejected request.
    Error(String),

    /// Informational suggestion; does not imply a failure.
    Advisory(String),
}

impl Notice {
    /// Dialog title.
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Error(_) => "Error",
            Notice::Advisory(_) => "Notice",
        }
    }

    /// Dialog body text.
    pub fn text(&self) -> &str {
        match self {
            Notice::Error(text) | Notice::Advisory(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

// =============================================================================
// Repair settings
// =============================================================================

/// User-tunable repair behaviour, applied to the next job started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairSettings {
    /// Drop atoms of unknown type instead of flagging them.
    pub skip_unknown: bool,

    /// Step recorded in the output suffix when `skip_unknown` is set.
    pub step: u32,
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self {
            skip_unknown: false,
            step: constants::DEFAULT_SKIP_STEP,
        }
    }
}

impl RepairSettings {
    /// Suffix appended to repaired file names, e.g. `-s4`.
    /// Empty unless unknown sequences are skipped.
    pub fn output_suffix(&self) -> String {
        if self.skip_unknown {
            format!("-s{}", self.step)
        } else {
            String::new()
        }
    }
}

// =============================================================================
// Batch items and statistics
// =============================================================================

/// Premature-end diagnostics reported by a repair session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Truncation {
    /// The target ended before its structure was complete.
    pub premature_end: bool,

    /// Fraction (0.0-1.0) of the target recovered before the premature end.
    pub premature_percentage: f64,
}

impl Truncation {
    /// Whether this truncation warrants the low-completion advisory.
    pub fn needs_advisory(&self) -> bool {
        self.premature_end && self.premature_percentage < constants::PREMATURE_ADVISORY_THRESHOLD
    }
}

/// Result of repairing one item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// The item was repaired and written to `output`.
    Success { output: PathBuf },

    /// The item could not be repaired.
    Failure(FailureInfo),
}

/// One processed directory entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub path: PathBuf,
    pub outcome: ItemOutcome,
    pub truncation: Truncation,
}

impl BatchItem {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Success { .. })
    }
}

/// Aggregate statistics over one batch run.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Items attempted (successes and failures).
    pub processed: usize,

    pub succeeded: usize,

    pub failed: usize,

    /// Low-completion advisories raised during the run.
    pub advisories: usize,

    /// Completion ratio of the most recent item that ended prematurely.
    pub last_premature_percentage: Option<f64>,

    /// Local wall-clock time the run started.
    pub started_at: DateTime<Local>,

    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl RunStats {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            processed: 0,
            succeeded: 0,
            failed: 0,
            advisories: 0,
            last_premature_percentage: None,
            started_at,
            duration: Duration::ZERO,
        }
    }

    /// Fold one finished item into the totals.
    pub fn record(&mut self, item: &BatchItem) {
        self.processed += 1;
        if item.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        if item.truncation.premature_end {
            self.last_premature_percentage = Some(item.truncation.premature_percentage);
        }
        if item.truncation.needs_advisory() {
            self.advisories += 1;
        }
    }

    /// One-line human summary for the output pane and status bar.
    pub fn summary_line(&self) -> String {
        format!(
            "{} file(s) processed: {} repaired, {} failed (started {}, {:.2}s)",
            self.processed,
            self.succeeded,
            self.failed,
            self.started_at.format("%H:%M:%S"),
            self.duration.as_secs_f64()
        )
    }
}

/// Statistics of one analysis job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisStats {
    /// Atoms printed (all nesting levels).
    pub atoms: usize,

    /// Top-level structure diagnostics of the analyzed file.
    pub truncation: Truncation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(success: bool, premature_end: bool, pct: f64) -> BatchItem {
        BatchItem {
            path: PathBuf::from("clip.mp4"),
            outcome: if success {
                ItemOutcome::Success {
                    output: PathBuf::from("clip_fixed.mp4"),
                }
            } else {
                ItemOutcome::Failure(FailureInfo::new("boom"))
            },
            truncation: Truncation {
                premature_end,
                premature_percentage: pct,
            },
        }
    }

    #[test]
    fn test_output_suffix_only_when_skipping() {
        assert_eq!(RepairSettings::default().output_suffix(), "");
        let s = RepairSettings {
            skip_unknown: true,
            step: 4,
        };
        assert_eq!(s.output_suffix(), "-s4");
    }

    #[test]
    fn test_advisory_threshold_is_strict() {
        let t = |premature_end, premature_percentage| Truncation {
            premature_end,
            premature_percentage,
        };
        assert!(t(true, 0.5).needs_advisory());
        assert!(!t(true, 0.9).needs_advisory());
        assert!(!t(false, 0.1).needs_advisory());
    }

    /// Advisories are counted independently of the item's success/failure.
    #[test]
    fn test_run_stats_record() {
        let mut stats = RunStats::new(Local::now());
        stats.record(&item(true, false, 0.0));
        stats.record(&item(false, true, 0.5));
        stats.record(&item(true, true, 0.95));

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.advisories, 1);
        assert_eq!(stats.last_premature_percentage, Some(0.95));
    }

    #[test]
    fn test_phase_indices_are_distinct() {
        assert_eq!(Phase::ALL.len(), Phase::COUNT);
        assert_ne!(Phase::Repair.index(), Phase::Analyze.index());
    }
}
