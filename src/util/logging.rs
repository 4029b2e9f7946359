// ReelMend - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets RUST_LOG=debug)
//   - Config file: [logging] level = "debug"
//
// Output: stderr, plus the on-screen output pane through `RelayLayer`.  The
// relay has its own verbosity ([logging] relay_level) so diagnostics meant
// for stderr do not flood the pane.
// Never logs secrets, tokens, or PII at any level.

use crate::app::relay::OutputRelay;
use crate::core::text;
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
/// `relay_level` is the most verbose level copied into `relay`.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
pub fn init(
    debug_flag: bool,
    config_level: Option<&str>,
    relay_level: Option<&str>,
    relay: OutputRelay,
) {
    // Build the env filter with the correct priority
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let relay_filter = parse_level(relay_level.unwrap_or(super::constants::DEFAULT_RELAY_LEVEL));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(RelayLayer::new(relay, relay_filter))
        .init();

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        relay = %relay_filter,
        "Logging initialised"
    );
}

/// Parse a config-file level name; unknown names fall back to the default
/// relay level.
fn parse_level(level: &str) -> LevelFilter {
    level
        .parse()
        .or_else(|_| super::constants::DEFAULT_RELAY_LEVEL.parse())
        .unwrap_or(LevelFilter::WARN)
}

// =============================================================================
// RelayLayer
// =============================================================================

/// Copies log events into an [`OutputRelay`] as `[target] message k=v`
/// lines of at most `MAX_RELAY_LOG_LINE` bytes.
///
/// Events more verbose than `max_level`, or from a module listed in
/// `RELAY_EXCLUDED_TARGETS`, are dropped before any field is visited.  The
/// filter is applied in `on_event` rather than `enabled` so it never
/// suppresses events for the other layers.
pub struct RelayLayer {
    relay: OutputRelay,
    max_level: LevelFilter,
    excluded: &'static [&'static str],
}

impl RelayLayer {
    pub fn new(relay: OutputRelay, max_level: LevelFilter) -> Self {
        Self {
            relay,
            max_level,
            excluded: super::constants::RELAY_EXCLUDED_TARGETS,
        }
    }

    fn is_excluded(&self, target: &str) -> bool {
        self.excluded.iter().any(|module| {
            target
                .strip_prefix(module)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
        })
    }
}

impl<S: Subscriber> Layer<S> for RelayLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if self.max_level < *meta.level() || self.is_excluded(meta.target()) {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let mut line = format!("[{}] {}{}", meta.target(), visitor.message, visitor.fields);
        text::clip_to_boundary(&mut line, super::constants::MAX_RELAY_LOG_LINE);
        line.push('\n');
        self.relay.write(&line);
    }
}

/// Collects the `message` field and the remaining fields separately.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}
