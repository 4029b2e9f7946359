// ReelMend - app/relay.rs
//
// Output relay between the worker and the owning context.
//
// Any thread may append text; the owning context drains the whole buffer once
// per tick and appends it to the active pane.  Draining swaps the buffer for
// an empty one under the lock, so every byte written is delivered exactly
// once and in order.

use crate::app::surface::PresentationSurface;
use crate::core::model::Phase;
use crate::core::text;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared, append-only text buffer.  Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct OutputRelay {
    buffer: Arc<Mutex<String>>,
}

impl OutputRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text`.  Callable from any thread.
    pub fn write(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.lock().push_str(text);
    }

    /// Remove and return everything written since the last drain.
    pub fn drain(&self) -> Option<String> {
        let mut buffer = self.lock();
        if buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut *buffer))
        }
    }

    /// Drain into `phase`'s pane.  Returns `true` when text was delivered.
    pub fn drain_and_dispatch(&self, surface: &mut dyn PresentationSurface, phase: Phase) -> bool {
        // The lock is released before the surface is touched.
        match self.drain() {
            Some(text) => {
                surface.append_text(phase, &text);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// An `io::Write` handle appending to this relay.
    pub fn writer(&self) -> RelayWriter {
        RelayWriter {
            relay: self.clone(),
            pending: Vec::new(),
        }
    }

    // A panic while holding the lock leaves a valid `String` behind.
    fn lock(&self) -> MutexGuard<'_, String> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Byte-oriented writer into an [`OutputRelay`].
///
/// A multi-byte character split across two `write` calls is held back until
/// its last byte arrives.
#[derive(Debug)]
pub struct RelayWriter {
    relay: OutputRelay,
    pending: Vec<u8>,
}

impl io::Write for RelayWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let decoded = text::take_utf8(&mut self.pending);
        self.relay.write(&decoded);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.relay.write(&rest);
        }
        Ok(())
    }
}

impl Drop for RelayWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}
