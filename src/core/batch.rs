// ReelMend - core/batch.rs
//
// Batch repair of every regular file in a folder.
//
// Architecture note: this module uses `walkdir` for directory enumeration as
// an OS abstraction.  It never touches presentation state: all output,
// progress and notices leave through the `BatchObserver` the caller passes
// in (the app layer's `JobContext` on the worker thread, or a recorder in
// tests).
//
// Error policy:
//   - Setup errors (reference unreadable, folder missing) abort the run
//     before any item is attempted.
//   - Every per-item failure, including an engine panic, is caught at the
//     item boundary; the run always continues with the next item.
//   - A folder entry that cannot be inspected is reported and skipped.

use crate::core::engine::{RepairEngine, RepairSession};
use crate::core::model::{BatchItem, ItemOutcome, Notice, RepairSettings, RunStats, Truncation};
use crate::core::text;
use crate::util::constants;
use crate::util::error::{FailureInfo, SetupError};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

// =============================================================================
// Observer
// =============================================================================

/// Receives everything a running job wants the user to see.
///
/// Implementations must be cheap and non-blocking: they are called on the
/// worker thread between (and during) item repairs.
pub trait BatchObserver {
    /// Free-form diagnostic text for the active output pane.
    fn output(&self, text: &str);

    /// Completion percentage (0-100) of the current item.
    fn progress(&self, percentage: u8);

    /// A message that must be shown as a blocking dialog.
    fn notify(&self, notice: Notice);

    /// Short status line describing the current item.
    fn status(&self, _text: String) {}

    /// Called once per finished item, after its notices were raised.
    fn item_finished(&self, _item: &BatchItem) {}
}

/// `io::Write` adapter that forwards decoded text to a `BatchObserver`.
pub struct ObserverWriter<'a> {
    observer: &'a dyn BatchObserver,
    pending: Vec<u8>,
}

impl<'a> ObserverWriter<'a> {
    pub fn new(observer: &'a dyn BatchObserver) -> Self {
        Self {
            observer,
            pending: Vec::new(),
        }
    }
}

impl Write for ObserverWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let decoded = text::take_utf8(&mut self.pending);
        if !decoded.is_empty() {
            self.observer.output(&decoded);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.observer.output(&rest);
        }
        Ok(())
    }
}

impl Drop for ObserverWriter<'_> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

// =============================================================================
// Setup checks and enumeration
// =============================================================================

/// Verify that `reference` is a regular file that can be opened for reading.
pub fn check_reference(reference: &Path) -> Result<(), SetupError> {
    let meta = std::fs::metadata(reference).map_err(|e| SetupError::reference(reference, e))?;
    if !meta.is_file() {
        return Err(SetupError::ReferenceNotAFile {
            path: reference.to_path_buf(),
        });
    }
    std::fs::File::open(reference).map_err(|e| SetupError::reference(reference, e))?;
    Ok(())
}

/// True for names this tool writes: `<stem>_fixed.<ext>` or
/// `<stem>_fixed-s<step>.<ext>`.
pub fn is_repaired_output(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let Some(idx) = stem.rfind(constants::REPAIRED_FILE_INFIX) else {
        return false;
    };
    let rest = &stem[idx + constants::REPAIRED_FILE_INFIX.len()..];
    rest.is_empty()
        || rest
            .strip_prefix("-s")
            .is_some_and(|step| !step.is_empty() && step.bytes().all(|b| b.is_ascii_digit()))
}

/// List the regular files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into and symlinks are not followed.
/// Outputs of an earlier run (see `is_repaired_output`) are left out.
/// Entries that cannot be inspected are returned as warnings rather than
/// failing the listing.
pub fn list_targets(dir: &Path) -> Result<(Vec<PathBuf>, Vec<String>), SetupError> {
    let meta = std::fs::metadata(dir).map_err(|e| SetupError::target(dir, e))?;
    if !meta.is_dir() {
        return Err(SetupError::TargetNotADirectory {
            path: dir.to_path_buf(),
        });
    }
    // An unlistable folder surfaces here rather than as a walker error.
    std::fs::read_dir(dir).map_err(|e| SetupError::target(dir, e))?;

    let mut files = Vec::new();
    let mut warnings = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if is_repaired_output(entry.path()) {
                    tracing::debug!(path = %entry.path().display(), "Skipping earlier repair output");
                } else {
                    files.push(entry.into_path());
                }
            }
            Ok(entry) => {
                tracing::trace!(path = %entry.path().display(), "Skipping non-regular entry");
            }
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| dir.display().to_string());
                warnings.push(format!("Cannot inspect '{path}': {e}"));
            }
        }
    }

    Ok((files, warnings))
}

// =============================================================================
// BatchRunner
// =============================================================================

/// Runs one engine over every regular file of a folder.
pub struct BatchRunner {
    engine: Arc<dyn RepairEngine>,
    settings: RepairSettings,
}

impl BatchRunner {
    pub fn new(engine: Arc<dyn RepairEngine>, settings: RepairSettings) -> Self {
        Self { engine, settings }
    }

    /// Repair every regular file in `target_dir` against `reference`.
    ///
    /// Returns `Err` only for setup errors, before any item is attempted.
    /// Per-item failures are reported through `observer` and counted in the
    /// returned `RunStats`.  Exactly one completion marker is written when
    /// the run gets past setup.
    pub fn run(
        &self,
        reference: &Path,
        target_dir: &Path,
        observer: &dyn BatchObserver,
    ) -> Result<RunStats, SetupError> {
        check_reference(reference)?;
        self.validate_reference(reference)?;
        let (targets, warnings) = list_targets(target_dir)?;

        let started = Instant::now();
        let mut stats = RunStats::new(chrono::Local::now());
        let total = targets.len();

        tracing::info!(
            engine = self.engine.name(),
            reference = %reference.display(),
            folder = %target_dir.display(),
            files = total,
            "Batch repair started"
        );

        for warning in warnings {
            tracing::warn!(warning = %warning, "Folder entry skipped");
            observer.output(&format!("{warning}\n"));
        }

        for (idx, target) in targets.iter().enumerate() {
            let name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| target.display().to_string());
            observer.status(format!("Repairing {}/{total}: {name}", idx + 1));
            observer.output(&format!("\nRepairing '{}'\n", target.display()));

            let item = self.repair_one(reference, target, observer);
            stats.record(&item);
            observer.progress(100);

            match &item.outcome {
                ItemOutcome::Success { output } => {
                    tracing::info!(file = %target.display(), output = %output.display(), "Item repaired");
                    observer.output(&format!("Saved '{}'\n", output.display()));
                }
                ItemOutcome::Failure(info) => {
                    tracing::warn!(file = %target.display(), error = %info.message, "Item failed");
                    observer.output(&format!("{info}\n"));
                    observer.notify(Notice::Error(info.to_string()));
                }
            }

            if item.truncation.needs_advisory() {
                tracing::info!(
                    file = %target.display(),
                    percentage = item.truncation.premature_percentage,
                    "Premature end with low completion"
                );
                observer.notify(Notice::Advisory(constants::PREMATURE_END_ADVICE.to_string()));
            }

            observer.item_finished(&item);
        }

        stats.duration = started.elapsed();
        observer.output(&format!("\n{}\n", stats.summary_line()));
        observer.output(constants::COMPLETION_MARKER);
        observer.status(stats.summary_line());

        tracing::info!(
            processed = stats.processed,
            failed = stats.failed,
            advisories = stats.advisories,
            "Batch repair complete"
        );

        Ok(stats)
    }

    /// Let the engine reject an unusable reference once, as a setup error.
    fn validate_reference(&self, reference: &Path) -> Result<(), SetupError> {
        let checked = panic::catch_unwind(AssertUnwindSafe(|| {
            self.engine.check_reference(reference, &self.settings)
        }));
        let info = match checked {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(info)) => info,
            Err(payload) => FailureInfo::from_panic(payload.as_ref()),
        };
        Err(SetupError::ReferenceInvalid {
            path: reference.to_path_buf(),
            message: info.message,
        })
    }

    /// Repair a single target, converting every failure shape into a
    /// `BatchItem` with a `Failure` outcome.
    fn repair_one(&self, reference: &Path, target: &Path, observer: &dyn BatchObserver) -> BatchItem {
        let failed = |info: FailureInfo, truncation: Truncation| BatchItem {
            path: target.to_path_buf(),
            outcome: ItemOutcome::Failure(info.with_path(target)),
            truncation,
        };

        let opened = panic::catch_unwind(AssertUnwindSafe(|| {
            self.engine.open_session(reference, &self.settings)
        }));
        let mut session: Box<dyn RepairSession> = match opened {
            Ok(Ok(session)) => session,
            Ok(Err(info)) => return failed(info, Truncation::default()),
            Err(payload) => return failed(FailureInfo::from_panic(payload.as_ref()), Truncation::default()),
        };

        let repaired = {
            let mut log = ObserverWriter::new(observer);
            let mut report = |percentage: u8| observer.progress(percentage.min(100));
            panic::catch_unwind(AssertUnwindSafe(|| {
                session.repair(target, &mut log, &mut report)
            }))
        };

        match repaired {
            Ok(result) => {
                for warning in session.hidden_warnings() {
                    observer.output(&format!("warning: {warning}\n"));
                }
                let truncation = session.truncation();
                match result {
                    Ok(output) => BatchItem {
                        path: target.to_path_buf(),
                        outcome: ItemOutcome::Success { output },
                        truncation,
                    },
                    Err(info) => failed(info, truncation),
                }
            }
            // A session that panicked mid-repair has no trustworthy diagnostics.
            Err(payload) => failed(FailureInfo::from_panic(payload.as_ref()), Truncation::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Observer that records every callback for assertions.
    #[derive(Default)]
    struct Recorder {
        output: RefCell<String>,
        progress: RefCell<Vec<u8>>,
        notices: RefCell<Vec<Notice>>,
        finished: RefCell<Vec<BatchItem>>,
    }

    impl BatchObserver for Recorder {
        fn output(&self, text: &str) {
            self.output.borrow_mut().push_str(text);
        }
        fn progress(&self, percentage: u8) {
            self.progress.borrow_mut().push(percentage);
        }
        fn notify(&self, notice: Notice) {
            self.notices.borrow_mut().push(notice);
        }
        fn item_finished(&self, item: &BatchItem) {
            self.finished.borrow_mut().push(item.clone());
        }
    }

    /// Engine whose behaviour per target is chosen by the file's content.
    ///
    /// `ok` succeeds, `fail` returns Err, `panic-str` / `panic-string` panic
    /// with the matching payload, `short` succeeds and `short-fail` fails,
    /// both with a premature end at 50 %.  A reference reading `invalid`
    /// cannot open sessions.
    struct ScriptedEngine;

    struct ScriptedSession {
        truncation: Truncation,
    }

    impl RepairEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn open_session(
            &self,
            reference: &Path,
            _settings: &RepairSettings,
        ) -> Result<Box<dyn RepairSession>, FailureInfo> {
            let content = fs::read(reference).map_err(|e| FailureInfo::io("read reference", &e))?;
            if content == b"invalid" {
                return Err(FailureInfo::new("not a complete container"));
            }
            Ok(Box::new(ScriptedSession {
                truncation: Truncation::default(),
            }))
        }
    }

    impl RepairSession for ScriptedSession {
        fn repair(
            &mut self,
            target: &Path,
            log: &mut dyn Write,
            progress: &mut dyn FnMut(u8),
        ) -> Result<PathBuf, FailureInfo> {
            let script = fs::read_to_string(target).map_err(|e| FailureInfo::io("read", &e))?;
            progress(40);
            writeln!(log, "script: {}", script.trim()).ok();
            match script.trim() {
                "fail" => Err(FailureInfo::new("missing sample table")),
                "panic-str" => panic!("static failure"),
                "panic-string" => std::panic::panic_any(String::from("owned failure")),
                "short" => {
                    self.truncation = Truncation {
                        premature_end: true,
                        premature_percentage: 0.5,
                    };
                    Ok(target.with_extension("out"))
                }
                "short-fail" => {
                    self.truncation = Truncation {
                        premature_end: true,
                        premature_percentage: 0.5,
                    };
                    Err(FailureInfo::new("no sample table survived"))
                }
                _ => Ok(target.with_extension("out")),
            }
        }

        fn truncation(&self) -> Truncation {
            self.truncation
        }
    }

    fn setup(scripts: &[(&str, &str)]) -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let reference = dir.path().join("reference.mp4");
        fs::write(&reference, b"reference").unwrap();
        let folder = dir.path().join("broken");
        fs::create_dir(&folder).unwrap();
        for (name, script) in scripts {
            fs::write(folder.join(name), script).unwrap();
        }
        (dir, reference, folder)
    }

    fn runner() -> BatchRunner {
        BatchRunner::new(Arc::new(ScriptedEngine), RepairSettings::default())
    }

    #[test]
    fn test_all_success_counts_every_file_and_one_marker() {
        let (_dir, reference, folder) = setup(&[("a.mp4", "ok"), ("b.mp4", "ok"), ("c.mp4", "ok")]);
        let rec = Recorder::default();

        let stats = runner().run(&reference, &folder, &rec).unwrap();

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.succeeded, 3);
        assert_eq!(rec.output.borrow().matches("done!").count(), 1);
        assert!(rec.notices.borrow().is_empty());
    }

    /// Every panic shape and Err return is isolated to its own item.
    #[test]
    fn test_failures_never_abort_the_batch() {
        let (_dir, reference, folder) = setup(&[
            ("1.mp4", "panic-str"),
            ("2.mp4", "ok"),
            ("3.mp4", "fail"),
            ("4.mp4", "panic-string"),
            ("5.mp4", "ok"),
        ]);
        let rec = Recorder::default();

        let stats = runner().run(&reference, &folder, &rec).unwrap();

        assert_eq!(stats.processed, 5);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 3);

        let finished = rec.finished.borrow();
        let names: Vec<_> = finished
            .iter()
            .map(|i| i.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["1.mp4", "2.mp4", "3.mp4", "4.mp4", "5.mp4"]);

        let output = rec.output.borrow();
        assert!(output.contains("static failure"));
        assert!(output.contains("owned failure"));
        assert!(output.contains("missing sample table"));
        assert_eq!(rec.notices.borrow().iter().filter(|n| n.is_error()).count(), 3);
    }

    #[test]
    fn test_each_item_ends_at_full_progress() {
        let (_dir, reference, folder) = setup(&[("a.mp4", "ok"), ("b.mp4", "fail")]);
        let rec = Recorder::default();

        runner().run(&reference, &folder, &rec).unwrap();

        let progress = rec.progress.borrow();
        assert_eq!(progress.as_slice(), &[40, 100, 40, 100]);
    }

    #[test]
    fn test_premature_end_raises_exactly_one_advisory() {
        let (_dir, reference, folder) = setup(&[("a.mp4", "short")]);
        let rec = Recorder::default();

        let stats = runner().run(&reference, &folder, &rec).unwrap();

        let notices = rec.notices.borrow();
        assert_eq!(notices.len(), 1);
        assert!(matches!(notices[0], Notice::Advisory(_)));
        assert_eq!(stats.advisories, 1);
        // The advisory does not turn a successful repair into a failure.
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.last_premature_percentage, Some(0.5));
    }

    #[test]
    fn test_failed_item_with_premature_end_still_gets_advisory() {
        let (_dir, reference, folder) = setup(&[("a.mp4", "short-fail")]);
        let rec = Recorder::default();

        let stats = runner().run(&reference, &folder, &rec).unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.advisories, 1);
        let notices = rec.notices.borrow();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices.iter().filter(|n| n.is_error()).count(), 1);
        assert_eq!(notices.iter().filter(|n| matches!(n, Notice::Advisory(_))).count(), 1);
    }

    #[test]
    fn test_invalid_reference_is_rejected_once_before_items() {
        let (_dir, reference, folder) = setup(&[("a.mp4", "ok"), ("b.mp4", "ok"), ("c.mp4", "ok")]);
        fs::write(&reference, b"invalid").unwrap();
        let rec = Recorder::default();

        let result = runner().run(&reference, &folder, &rec);

        assert!(matches!(result, Err(SetupError::ReferenceInvalid { .. })));
        assert!(rec.finished.borrow().is_empty());
        assert!(rec.notices.borrow().is_empty());
        assert!(rec.output.borrow().is_empty());
    }

    #[test]
    fn test_unreadable_reference_aborts_before_items() {
        let (_dir, reference, folder) = setup(&[("a.mp4", "ok")]);
        fs::remove_file(&reference).unwrap();
        let rec = Recorder::default();

        let result = runner().run(&reference, &folder, &rec);

        assert!(matches!(result, Err(SetupError::ReferenceNotFound { .. })));
        assert!(rec.finished.borrow().is_empty());
        assert!(rec.output.borrow().is_empty());
    }

    #[test]
    fn test_target_must_be_directory() {
        let (_dir, reference, _folder) = setup(&[]);
        let rec = Recorder::default();

        let result = runner().run(&reference, &reference, &rec);

        assert!(matches!(result, Err(SetupError::TargetNotADirectory { .. })));
    }

    #[test]
    fn test_list_targets_skips_subdirectories_and_sorts() {
        let (_dir, _reference, folder) = setup(&[("b.mp4", "ok"), ("a.mp4", "ok")]);
        fs::create_dir(folder.join("nested")).unwrap();
        fs::write(folder.join("nested").join("c.mp4"), "ok").unwrap();

        let (files, warnings) = list_targets(&folder).unwrap();

        assert!(warnings.is_empty());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.mp4", "b.mp4"]);
    }

    #[test]
    fn test_list_targets_skips_earlier_outputs() {
        let (_dir, _reference, folder) = setup(&[
            ("clip.mp4", "ok"),
            ("clip_fixed.mp4", "ok"),
            ("clip_fixed-s3.mp4", "ok"),
            ("my_fixed_bike.mp4", "ok"),
            ("notes_fixed-sx.txt", "ok"),
        ]);

        let (files, _) = list_targets(&folder).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["clip.mp4", "my_fixed_bike.mp4", "notes_fixed-sx.txt"]);
    }

    #[test]
    fn test_observer_writer_forwards_split_utf8() {
        let rec = Recorder::default();
        {
            let mut w = ObserverWriter::new(&rec);
            w.write_all(b"caf\xC3").unwrap();
            w.write_all(b"\xA9\n").unwrap();
        }
        assert_eq!(rec.output.borrow().as_str(), "café\n");
    }
}
