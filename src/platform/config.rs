// ReelMend - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::RepairSettings;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ReelMend configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/reelmend/ or %APPDATA%\ReelMend\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[repair]` section.
    pub repair: RepairSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[repair]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RepairSection {
    /// Drop atoms of unknown type instead of keeping them.
    pub skip_unknown: Option<bool>,
    /// Step recorded in the output suffix when skipping.
    pub step: Option<u32>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Owning-context tick period in ms.
    pub tick_interval_ms: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Most verbose level relayed into the output pane.
    pub relay_level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Repair --
    pub skip_unknown: bool,
    pub step: u32,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,
    pub tick_interval_ms: u64,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Relay verbosity; `None` means the default.
    pub relay_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            skip_unknown: false,
            step: constants::DEFAULT_SKIP_STEP,
            dark_mode: true,
            tick_interval_ms: constants::DEFAULT_TICK_INTERVAL_MS,
            log_level: None,
            relay_level: None,
        }
    }
}

impl AppConfig {
    pub fn repair_settings(&self) -> RepairSettings {
        RepairSettings {
            skip_unknown: self.skip_unknown,
            step: self.step,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unreadable or unparseable, returns defaults with a warning:
/// the application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw(&config_path) {
        Ok(raw) => raw,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();
    let mut reject = |field: &str, value: String, expected: String| {
        let e = ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value,
            expected,
        };
        warnings.push(format!("{e}. Using default."));
    };

    // -- Repair --
    if let Some(skip) = raw.repair.skip_unknown {
        config.skip_unknown = skip;
    }
    if let Some(step) = raw.repair.step {
        if (constants::MIN_SKIP_STEP..=constants::MAX_SKIP_STEP).contains(&step) {
            config.step = step;
        } else {
            reject(
                "repair.step",
                step.to_string(),
                format!("{}-{}", constants::MIN_SKIP_STEP, constants::MAX_SKIP_STEP),
            );
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => reject("ui.theme", other.to_string(), "\"dark\" or \"light\"".to_string()),
        }
    }

    // -- UI: tick_interval_ms --
    if let Some(ms) = raw.ui.tick_interval_ms {
        if (constants::MIN_TICK_INTERVAL_MS..=constants::MAX_TICK_INTERVAL_MS).contains(&ms) {
            config.tick_interval_ms = ms;
        } else {
            reject(
                "ui.tick_interval_ms",
                ms.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_TICK_INTERVAL_MS,
                    constants::MAX_TICK_INTERVAL_MS
                ),
            );
        }
    }

    // -- Logging --
    let levels = constants::VALID_LOG_LEVELS.join(", ");
    if let Some(ref level) = raw.logging.level {
        if is_valid_level(level) {
            config.log_level = Some(level.to_lowercase());
        } else {
            reject("logging.level", level.clone(), levels.clone());
        }
    }
    if let Some(ref level) = raw.logging.relay_level {
        if is_valid_level(level) {
            config.relay_level = Some(level.to_lowercase());
        } else {
            reject("logging.relay_level", level.clone(), levels);
        }
    }

    config
}

fn is_valid_level(level: &str) -> bool {
    constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str())
}
