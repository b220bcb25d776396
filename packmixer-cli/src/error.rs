//! CLI error type.

use std::fmt;

use packmixer::config::ConfigError;
use packmixer::logging::LoggingError;
use packmixer::MixError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid or unreadable configuration.
    Config(String),
    /// Engine failure.
    Mix(MixError),
    /// Logging could not be set up.
    Logging(String),
    /// Interactive prompt failed or was aborted.
    Prompt(String),
    /// Output could not be rendered.
    Output(String),
    /// The operation was interrupted with Ctrl+C.
    Interrupted,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Mix(e) => write!(f, "{}", e),
            CliError::Logging(msg) => write!(f, "Logging error: {}", msg),
            CliError::Prompt(msg) => write!(f, "Prompt failed: {}", msg),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
            CliError::Interrupted => write!(f, "Interrupted"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Mix(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MixError> for CliError {
    fn from(e: MixError) -> Self {
        match e {
            MixError::Cancelled => CliError::Interrupted,
            other => CliError::Mix(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e.to_string())
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Interrupted => 130,
            _ => 1,
        }
    }
}
