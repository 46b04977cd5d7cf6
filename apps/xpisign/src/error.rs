//! CLI error handling

use std::fmt;

use xpisign_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(xpisign_errors::ConfigError),
    /// Workflow error
    Sign(xpisign_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// Failed to write output
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: {e}")?;
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Sign(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Output(msg) => write!(f, "Output error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Sign(e) => Some(e),
            _ => None,
        }
    }
}

impl From<xpisign_errors::Error> for CliError {
    fn from(e: xpisign_errors::Error) -> Self {
        match e {
            xpisign_errors::Error::Config(config) => CliError::Config(config),
            other => CliError::Sign(other),
        }
    }
}

impl From<xpisign_errors::SigningError> for CliError {
    fn from(e: xpisign_errors::SigningError) -> Self {
        CliError::Sign(e.into())
    }
}
