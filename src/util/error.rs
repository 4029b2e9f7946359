// ReelMend - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::any::Any;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Top-level error type for all ReelMend operations.
/// Errors are categorised by the stage that produced them.
#[derive(Debug)]
pub enum ReelMendError {
    /// A job was requested with missing inputs.
    Argument(ArgumentError),

    /// A job could not get past its setup stage.
    Setup(SetupError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// The background worker thread could not be spawned.
    Spawn { source: io::Error },
}

impl fmt::Display for ReelMendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument(e) => write!(f, "Invalid request: {e}"),
            Self::Setup(e) => write!(f, "Setup error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Spawn { source } => write!(f, "Cannot start background worker: {source}"),
        }
    }
}

impl std::error::Error for ReelMendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Argument(e) => Some(e),
            Self::Setup(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Spawn { source } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Argument errors
// ---------------------------------------------------------------------------

/// A job request rejected before any thread was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentError {
    /// The reference (known-good) file path is blank.
    MissingReference,

    /// The folder of truncated files is blank.
    MissingTarget,

    /// The file to analyze is blank.
    MissingAnalyzeFile,
}

impl ArgumentError {
    /// Message shown to the user when the request is rejected.
    pub fn user_message(&self) -> &'static str {
        use crate::util::constants;
        match self {
            Self::MissingReference | Self::MissingTarget => constants::MISSING_REPAIR_INPUTS,
            Self::MissingAnalyzeFile => constants::MISSING_ANALYZE_INPUT,
        }
    }
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingReference => f.write_str("no reference file specified"),
            Self::MissingTarget => f.write_str("no truncated folder specified"),
            Self::MissingAnalyzeFile => f.write_str("no file to analyze specified"),
        }
    }
}

impl std::error::Error for ArgumentError {}

impl From<ArgumentError> for ReelMendError {
    fn from(e: ArgumentError) -> Self {
        Self::Argument(e)
    }
}

// ---------------------------------------------------------------------------
// Setup errors
// ---------------------------------------------------------------------------

/// Unrecoverable errors that abort a whole job before any item is attempted.
#[derive(Debug)]
pub enum SetupError {
    /// The reference file does not exist.
    ReferenceNotFound { path: PathBuf },

    /// The reference path exists but is not a regular file.
    ReferenceNotAFile { path: PathBuf },

    /// The reference file exists but cannot be opened for reading.
    ReferenceUnreadable { path: PathBuf, source: io::Error },

    /// The reference was read but the engine cannot repair against it.
    ReferenceInvalid { path: PathBuf, message: String },

    /// The target directory does not exist.
    TargetNotFound { path: PathBuf },

    /// The target path exists but is not a directory.
    TargetNotADirectory { path: PathBuf },

    /// The target directory cannot be listed.
    TargetUnreadable { path: PathBuf, source: io::Error },
}

impl SetupError {
    /// Classify an I/O error raised while probing the reference file.
    pub fn reference(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::ReferenceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::ReferenceUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Classify an I/O error raised while probing the target directory.
    pub fn target(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::TargetNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::TargetUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceNotFound { path } => {
                write!(f, "Reference file '{}' does not exist", path.display())
            }
            Self::ReferenceNotAFile { path } => {
                write!(f, "Reference '{}' is not a regular file", path.display())
            }
            Self::ReferenceUnreadable { path, source } => {
                write!(
                    f,
                    "Cannot read reference file '{}': {source}",
                    path.display()
                )
            }
            Self::ReferenceInvalid { path, message } => {
                write!(f, "Reference '{}' cannot be used: {message}", path.display())
            }
            Self::TargetNotFound { path } => {
                write!(f, "Folder '{}' does not exist", path.display())
            }
            Self::TargetNotADirectory { path } => {
                write!(f, "'{}' is not a folder", path.display())
            }
            Self::TargetUnreadable { path, source } => {
                write!(f, "Cannot list folder '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReferenceUnreadable { source, .. } => Some(source),
            Self::TargetUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SetupError> for ReelMendError {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

// ---------------------------------------------------------------------------
// Per-item failures
// ---------------------------------------------------------------------------

/// Normalised description of one failed item.
///
/// Every failure shape an engine can produce (an `Err` return or a panic with
/// a `&str`, `String` or opaque payload) is reduced to this record at the
/// item boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInfo {
    /// The item the failure belongs to, when known.
    pub path: Option<PathBuf>,

    /// Human-readable failure text.
    pub message: String,
}

impl FailureInfo {
    /// A failure not yet attributed to a path.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }

    /// A failure carrying an I/O error with the operation it came from.
    pub fn io(operation: &str, source: &io::Error) -> Self {
        Self::new(format!("{operation}: {source}"))
    }

    /// Attach `path` unless the failure already names one.
    pub fn with_path(mut self, path: &Path) -> Self {
        if self.path.is_none() {
            self.path = Some(path.to_path_buf());
        }
        self
    }

    /// Normalise a panic payload caught with `catch_unwind`.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&'static str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "unknown failure (non-text panic payload)".to_string()
        };
        Self::new(message)
    }
}

impl fmt::Display for FailureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "'{}': {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for FailureInfo {}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ReelMendError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for ReelMend results.
pub type Result<T> = std::result::Result<T, ReelMendError>;
