// ReelMend - app/progress.rs
//
// Latest-value progress slots, one per phase.
//
// The worker stores percentages; the owning context takes whatever is
// pending once per tick.  There is no queue: intermediate values that were
// never rendered are simply overwritten.

use crate::core::model::Phase;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Slot value meaning "nothing new since the last take".
const NO_UPDATE: u8 = u8::MAX;

/// Progress slots shared between the worker and the owning context.
#[derive(Debug, Clone)]
pub struct ProgressChannel {
    slots: Arc<[AtomicU8; Phase::COUNT]>,
}

impl ProgressChannel {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(std::array::from_fn(|_| AtomicU8::new(NO_UPDATE))),
        }
    }

    /// A reporter bound to `phase`, for use on the worker thread.
    pub fn reporter(&self, phase: Phase) -> ProgressReporter {
        ProgressReporter {
            channel: self.clone(),
            phase,
        }
    }

    /// Pending value of every phase that changed, at most once each.
    pub fn take_updates(&self) -> Vec<(Phase, u8)> {
        Phase::ALL
            .iter()
            .filter_map(|&phase| {
                let value = self.slots[phase.index()].swap(NO_UPDATE, Ordering::AcqRel);
                (value != NO_UPDATE).then_some((phase, value))
            })
            .collect()
    }

    /// Discard any pending value for `phase`.
    pub fn clear(&self, phase: Phase) {
        self.slots[phase.index()].store(NO_UPDATE, Ordering::Release);
    }
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker-side handle writing into one phase's slot.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    channel: ProgressChannel,
    phase: Phase,
}

impl ProgressReporter {
    /// Store `percentage`, clamped to 0-100.
    pub fn report(&self, percentage: u8) {
        self.channel.slots[self.phase.index()].store(percentage.min(100), Ordering::Release);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}
