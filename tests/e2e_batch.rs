// ReelMend - tests/e2e_batch.rs
//
// End-to-end tests for the repair and analyze jobs.
//
// These tests drive the real job controller, worker thread, dispatcher,
// output relay and built-in atom engine against real files in temporary
// directories.  The only stand-in is the presentation surface, which
// records what a front-end would have shown.

use reelmend::app::job::{JobController, JobOutcome, JobRequest, StartOutcome};
use reelmend::app::relay::OutputRelay;
use reelmend::app::surface::PresentationSurface;
use reelmend::core::atoms::AtomEngine;
use reelmend::core::model::{Notice, Phase, RepairSettings};
use reelmend::util::constants;
use reelmend::util::error::{ArgumentError, ReelMendError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

#[derive(Default)]
struct RecordingSurface {
    texts: [String; Phase::COUNT],
    progress: [Vec<u8>; Phase::COUNT],
    controls: Vec<bool>,
    notices: Vec<Notice>,
    statuses: Vec<String>,
}

impl RecordingSurface {
    fn text(&self, phase: Phase) -> &str {
        &self.texts[phase.index()]
    }

    fn count(&self, error: bool) -> usize {
        self.notices.iter().filter(|n| n.is_error() == error).count()
    }
}

impl PresentationSurface for RecordingSurface {
    fn set_text(&mut self, phase: Phase, text: &str) {
        self.texts[phase.index()] = text.to_string();
    }
    fn append_text(&mut self, phase: Phase, text: &str) {
        self.texts[phase.index()].push_str(text);
    }
    fn set_progress(&mut self, phase: Phase, percentage: u8) {
        self.progress[phase.index()].push(percentage);
    }
    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls.push(enabled);
    }
    fn show_blocking_message(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
    fn set_status(&mut self, status: &str) {
        self.statuses.push(status.to_string());
    }
    fn quit(&mut self) {}
}

/// Encode one atom with a 32-bit size header.
fn atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

/// ftyp (16) + moov{mvhd} (28) + mdat (8 + `media`).
fn container(media: usize) -> Vec<u8> {
    let mut data = atom(b"ftyp", b"isom\0\0\0\0");
    data.extend(atom(b"moov", &atom(b"mvhd", &[0; 12])));
    data.extend(atom(b"mdat", &vec![0x5A; media]));
    data
}

const HEADER_BYTES: usize = 16 + 28;

fn controller(settings: RepairSettings) -> JobController {
    JobController::new(Arc::new(AtomEngine), OutputRelay::new(), settings)
}

fn run_to_idle(controller: &mut JobController, surface: &mut RecordingSurface) {
    let deadline = Instant::now() + Duration::from_secs(20);
    while controller.tick(surface) {
        assert!(Instant::now() < deadline, "job did not finish in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn repair(dir: &Path, reference: &Path) -> JobRequest {
    JobRequest::Repair {
        reference: reference.display().to_string(),
        target_dir: dir.display().to_string(),
    }
}

// =============================================================================
// Repair E2E
// =============================================================================

/// A folder with a healthy file, a truncated file and a non-container file:
/// all three are attempted, the non-container one fails, both low-completion
/// items raise an advisory, and the controls come back.
#[test]
fn e2e_repairs_every_file_and_continues_after_failure() {
    let tmp = TempDir::new().unwrap();
    let reference = tmp.path().join("reference.mp4");
    fs::write(&reference, container(64)).unwrap();

    let broken = tmp.path().join("broken");
    fs::create_dir(&broken).unwrap();
    fs::write(broken.join("a_good.mp4"), container(32)).unwrap();
    let mut torn = container(200);
    torn.truncate(HEADER_BYTES + 8 + 40);
    fs::write(broken.join("b_torn.mp4"), &torn).unwrap();
    fs::write(broken.join("c_notes.txt"), "hello world!").unwrap();
    fs::create_dir(broken.join("nested")).unwrap();

    let mut controller = controller(RepairSettings::default());
    let mut surface = RecordingSurface::default();
    let started = controller
        .start(repair(&broken, &reference), &mut surface)
        .unwrap();
    assert_eq!(started, StartOutcome::Started);
    run_to_idle(&mut controller, &mut surface);

    let Some(JobOutcome::Repaired(stats)) = controller.last_outcome() else {
        panic!("expected a finished repair, got {:?}", controller.last_outcome());
    };
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.advisories, 2);

    // Healthy file is copied whole; the torn one loses its partial mdat.
    assert_eq!(
        fs::read(broken.join("a_good_fixed.mp4")).unwrap(),
        container(32)
    );
    assert_eq!(
        fs::read(broken.join("b_torn_fixed.mp4")).unwrap(),
        torn[..HEADER_BYTES].to_vec()
    );
    assert!(!broken.join("c_notes_fixed.txt").exists());

    assert_eq!(surface.count(true), 1);
    assert_eq!(surface.count(false), 2);
    assert_eq!(surface.controls, [false, true]);

    let text = surface.text(Phase::Repair);
    assert_eq!(text.matches(constants::COMPLETION_MARKER).count(), 1);
    assert!(text.contains("c_notes.txt"));
    assert!(!text.contains("nested"));
    assert_eq!(surface.progress[Phase::Repair.index()].last(), Some(&100));
    assert!(surface
        .statuses
        .iter()
        .any(|s| s == "Repairing 2/3: b_torn.mp4"));
}

/// With unknown atoms skipped the output name carries the step suffix and
/// the unknown atom is dropped.
#[test]
fn e2e_skip_unknown_drops_atoms_and_suffixes_output() {
    let tmp = TempDir::new().unwrap();
    let reference = tmp.path().join("reference.mov");
    fs::write(&reference, container(16)).unwrap();

    let broken = tmp.path().join("broken");
    fs::create_dir(&broken).unwrap();
    let mut clip = container(16);
    clip.extend(atom(b"zzzz", &[1, 2, 3, 4]));
    fs::write(broken.join("clip.mov"), &clip).unwrap();

    let settings = RepairSettings {
        skip_unknown: true,
        step: 3,
    };
    let mut controller = controller(settings);
    let mut surface = RecordingSurface::default();
    controller
        .start(repair(&broken, &reference), &mut surface)
        .unwrap();
    run_to_idle(&mut controller, &mut surface);

    let output = fs::read(broken.join("clip_fixed-s3.mov")).unwrap();
    assert_eq!(output, container(16));
    assert!(surface.notices.is_empty(), "{:?}", surface.notices);
}

/// A missing reference aborts before any item and is reported once.
#[test]
fn e2e_missing_reference_is_a_setup_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("clip.mp4"), container(8)).unwrap();

    let mut controller = controller(RepairSettings::default());
    let mut surface = RecordingSurface::default();
    controller
        .start(
            repair(tmp.path(), &tmp.path().join("absent.mp4")),
            &mut surface,
        )
        .unwrap();
    run_to_idle(&mut controller, &mut surface);

    assert!(matches!(
        controller.last_outcome(),
        Some(JobOutcome::SetupFailed(_))
    ));
    assert_eq!(surface.count(true), 1);
    assert!(!tmp.path().join("clip_fixed.mp4").exists());
    assert_eq!(surface.controls, [false, true]);
}

/// A reference that opens but is not a complete container aborts the job
/// once, before any file is touched.
#[test]
fn e2e_truncated_reference_is_a_single_setup_error() {
    let tmp = TempDir::new().unwrap();
    let reference = tmp.path().join("reference.mp4");
    let mut data = container(64);
    data.truncate(data.len() - 10);
    fs::write(&reference, data).unwrap();

    let broken = tmp.path().join("broken");
    fs::create_dir(&broken).unwrap();
    for name in ["a.mp4", "b.mp4", "c.mp4"] {
        fs::write(broken.join(name), container(8)).unwrap();
    }

    let mut controller = controller(RepairSettings::default());
    let mut surface = RecordingSurface::default();
    controller
        .start(repair(&broken, &reference), &mut surface)
        .unwrap();
    run_to_idle(&mut controller, &mut surface);

    assert!(matches!(
        controller.last_outcome(),
        Some(JobOutcome::SetupFailed(_))
    ));
    assert_eq!(surface.notices.len(), 1);
    assert!(!broken.join("a_fixed.mp4").exists());
    assert!(!surface.text(Phase::Repair).contains("Repairing '"));
}

/// Running the same folder twice does not repair the first run's outputs.
#[test]
fn e2e_second_run_ignores_earlier_outputs() {
    let tmp = TempDir::new().unwrap();
    let reference = tmp.path().join("reference.mp4");
    fs::write(&reference, container(64)).unwrap();
    let broken = tmp.path().join("broken");
    fs::create_dir(&broken).unwrap();
    fs::write(broken.join("clip.mp4"), container(16)).unwrap();

    let mut controller = controller(RepairSettings::default());
    for _ in 0..2 {
        let mut surface = RecordingSurface::default();
        controller
            .start(repair(&broken, &reference), &mut surface)
            .unwrap();
        run_to_idle(&mut controller, &mut surface);
    }

    let Some(JobOutcome::Repaired(stats)) = controller.last_outcome() else {
        panic!("expected a finished repair, got {:?}", controller.last_outcome());
    };
    assert_eq!(stats.processed, 1);
    assert!(!broken.join("clip_fixed_fixed.mp4").exists());
}

/// A blank folder is rejected synchronously: no worker, no pane text.
#[test]
fn e2e_blank_target_is_rejected_without_a_job() {
    let mut controller = controller(RepairSettings::default());
    let mut surface = RecordingSurface::default();

    let result = controller.start(
        JobRequest::Repair {
            reference: "reference.mp4".to_string(),
            target_dir: String::new(),
        },
        &mut surface,
    );

    assert!(matches!(
        result,
        Err(ReelMendError::Argument(ArgumentError::MissingTarget))
    ));
    assert!(!controller.is_running());
    assert!(!controller.tick(&mut surface));
    assert_eq!(surface.count(true), 1);
    assert!(surface.text(Phase::Repair).is_empty());
    assert!(surface.controls.is_empty());
}

// =============================================================================
// Analyze E2E
// =============================================================================

/// Analysis reports into its own pane and leaves the repair pane alone.
#[test]
fn e2e_analyze_reports_to_its_own_pane() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("clip.mp4");
    fs::write(&file, container(24)).unwrap();

    let mut controller = controller(RepairSettings::default());
    let mut surface = RecordingSurface::default();
    controller
        .start(
            JobRequest::Analyze {
                file: file.display().to_string(),
            },
            &mut surface,
        )
        .unwrap();
    run_to_idle(&mut controller, &mut surface);

    let text = surface.text(Phase::Analyze);
    assert!(text.contains("ftyp @0 size 16"));
    assert!(text.contains("  mvhd @24 size 20"));
    assert!(text.ends_with(constants::COMPLETION_MARKER));
    assert!(surface.text(Phase::Repair).is_empty());
    assert_eq!(surface.progress[Phase::Analyze.index()].last(), Some(&100));
    assert!(matches!(
        controller.last_outcome(),
        Some(JobOutcome::Analyzed(stats)) if stats.atoms == 4
    ));
}
