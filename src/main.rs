// ReelMend - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Engine and job controller construction
// 4. eframe GUI launch, or the headless tick loop with --headless

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use reelmend::app;

pub use reelmend::core;
pub use reelmend::platform;
pub use reelmend::ui;
pub use reelmend::util;

use crate::app::console::ConsoleSurface;
use crate::app::job::{JobController, JobRequest};
use crate::app::relay::OutputRelay;
use crate::core::atoms::AtomEngine;
use crate::core::engine::RepairEngine;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// ReelMend - batch repair of truncated video recordings.
///
/// Repairs every file in a folder against a complete reference file recorded
/// by the same device, or prints the atom tree of a single file.
#[derive(Parser, Debug)]
#[command(name = "ReelMend", version, about)]
struct Cli {
    /// Complete reference file recorded by the same device.
    #[arg(short = 'r', long = "reference")]
    reference: Option<PathBuf>,

    /// Folder holding the truncated files.
    #[arg(short = 't', long = "target")]
    target: Option<PathBuf>,

    /// Print the atom tree of FILE instead of repairing.
    #[arg(short = 'a', long = "analyze", value_name = "FILE")]
    analyze: Option<PathBuf>,

    /// Drop atoms of unknown type instead of keeping them.
    #[arg(short = 's', long = "skip-unknown")]
    skip_unknown: bool,

    /// Step recorded in the output suffix when skipping unknown atoms.
    #[arg(long = "step", value_name = "N",
          value_parser = clap::value_parser!(u32).range(
              i64::from(util::constants::MIN_SKIP_STEP)..=i64::from(util::constants::MAX_SKIP_STEP)))]
    step: Option<u32>,

    /// Run without a window: print output to stdout and exit when done.
    #[arg(long = "headless")]
    headless: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config is read before logging so its level can take effect; its
    // warnings are logged once the subscriber is up.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let (config, config_warnings) = platform::config::load_config(&platform_paths.config_dir);

    let relay = OutputRelay::new();
    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.relay_level.as_deref(),
        relay.clone(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        headless = cli.headless,
        "ReelMend starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    // CLI flags override config.toml.
    let mut settings = config.repair_settings();
    if cli.skip_unknown {
        settings.skip_unknown = true;
    }
    if let Some(step) = cli.step {
        settings.step = step;
    }
    let tick = Duration::from_millis(config.tick_interval_ms);
    let engine: Arc<dyn RepairEngine> = Arc::new(AtomEngine);

    if cli.headless {
        return run_headless(&cli, JobController::new(engine, relay, settings), tick);
    }

    // Start-up events (config warnings among them) stay in the relay and
    // reach the Repair pane on the first tick.
    let controller = JobController::new(engine, relay, settings);

    let mut state = app::state::AppState::new(settings, config.dark_mode, cli.debug);
    if let Some(ref path) = cli.reference {
        state.reference_input = path.display().to_string();
    }
    if let Some(ref path) = cli.target {
        state.target_input = path.display().to_string();
    }
    if let Some(ref path) = cli.analyze {
        state.analyze_input = path.display().to_string();
        state.tab = app::state::Tab::Analyze;
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size(ui::theme::WINDOW_SIZE)
            .with_min_inner_size(ui::theme::MIN_WINDOW_SIZE),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::ReelMendApp::new(state, controller, tick)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch ReelMend GUI: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Drive one job with a console surface until it finishes.
///
/// Exits with failure on a rejected request, a setup error or when any item
/// failed.
fn run_headless(cli: &Cli, mut controller: JobController, tick: Duration) -> ExitCode {
    let request = match &cli.analyze {
        Some(file) => JobRequest::Analyze {
            file: file.display().to_string(),
        },
        None => JobRequest::Repair {
            reference: cli
                .reference
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            target_dir: cli
                .target
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        },
    };

    let mut surface = ConsoleSurface::new(std::io::stdout(), std::io::stderr());
    if let Err(e) = controller.start(request, &mut surface) {
        tracing::error!(error = %e, "Headless job not started");
        return ExitCode::FAILURE;
    }
    while controller.tick(&mut surface) {
        std::thread::sleep(tick);
    }
    controller.shutdown(&mut surface);

    match controller.last_outcome() {
        Some(outcome) if !outcome.has_failures() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
