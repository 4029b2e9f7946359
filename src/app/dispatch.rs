// ReelMend - app/dispatch.rs
//
// Deferred presentation actions.
//
// Any thread may schedule a closure against the presentation surface; the
// owning context runs queued closures in FIFO order on its next tick, never
// inline.  The queue is bounded: a worker scheduling into a full queue waits
// until the owning context drains it.  The owning thread itself never waits,
// since nothing else would ever drain the queue for it.

use crate::app::surface::PresentationSurface;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// A presentation mutation to run on the owning context.
pub type Action = Box<dyn FnOnce(&mut dyn PresentationSurface) + Send>;

struct Shared {
    queue: Mutex<VecDeque<Action>>,
    space: Condvar,
    capacity: usize,
    owner: ThreadId,
}

/// Bounded FIFO of [`Action`]s.  Clones share the same queue.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl Dispatcher {
    /// Create a dispatcher owned by the calling thread.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::new()),
                space: Condvar::new(),
                capacity: capacity.max(1),
                owner: thread::current().id(),
            }),
        }
    }

    /// Queue `action` for the next tick.
    pub fn schedule<F>(&self, action: F)
    where
        F: FnOnce(&mut dyn PresentationSurface) + Send + 'static,
    {
        let mut queue = self.lock();
        if thread::current().id() != self.shared.owner {
            while queue.len() >= self.shared.capacity {
                queue = self
                    .shared
                    .space
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }
        queue.push_back(Box::new(action));
    }

    /// Run up to `budget` queued actions against `surface`, oldest first.
    /// Returns how many ran.
    pub fn run_pending(&self, surface: &mut dyn PresentationSurface, budget: usize) -> usize {
        let mut ran = 0;
        while ran < budget {
            // Pop under the lock, run without it: actions may schedule more.
            let Some(action) = self.lock().pop_front() else {
                break;
            };
            self.shared.space.notify_all();
            action(surface);
            ran += 1;
        }
        ran
    }

    /// Number of queued actions.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Action>> {
        self.shared
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.pending())
            .field("capacity", &self.shared.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Notice, Phase};
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Default)]
    struct StatusLog(Vec<String>);

    impl PresentationSurface for StatusLog {
        fn set_text(&mut self, _: Phase, _: &str) {}
        fn append_text(&mut self, _: Phase, _: &str) {}
        fn set_progress(&mut self, _: Phase, _: u8) {}
        fn set_controls_enabled(&mut self, _: bool) {}
        fn show_blocking_message(&mut self, _: Notice) {}
        fn set_status(&mut self, status: &str) {
            self.0.push(status.to_string());
        }
        fn quit(&mut self) {}
    }

    #[test]
    fn test_actions_run_later_in_fifo_order() {
        let dispatcher = Dispatcher::new(8);
        let mut surface = StatusLog::default();
        for name in ["a", "b", "c"] {
            dispatcher.schedule(move |s| s.set_status(name));
        }
        assert!(surface.0.is_empty(), "scheduling must not run inline");

        assert_eq!(dispatcher.run_pending(&mut surface, 2), 2);
        assert_eq!(surface.0, ["a", "b"]);
        assert_eq!(dispatcher.run_pending(&mut surface, 10), 1);
        assert_eq!(surface.0, ["a", "b", "c"]);
    }

    #[test]
    fn test_owner_never_blocks_over_capacity() {
        let dispatcher = Dispatcher::new(2);
        for _ in 0..5 {
            dispatcher.schedule(|s| s.set_status("x"));
        }
        assert_eq!(dispatcher.pending(), 5);
    }

    #[test]
    fn test_worker_waits_for_drain_when_full() {
        let dispatcher = Dispatcher::new(1);
        let worker_side = dispatcher.clone();
        let (done_tx, done_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            worker_side.schedule(|s| s.set_status("first"));
            worker_side.schedule(|s| s.set_status("second"));
            done_tx.send(()).unwrap();
        });

        // The second schedule cannot complete until the queue is drained.
        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());

        let mut surface = StatusLog::default();
        while surface.0.len() < 2 {
            dispatcher.run_pending(&mut surface, 1);
            thread::sleep(Duration::from_millis(1));
        }
        worker.join().unwrap();
        assert!(done_rx.recv().is_ok());
        assert_eq!(surface.0, ["first", "second"]);
    }
}
