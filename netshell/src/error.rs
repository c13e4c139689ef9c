//! Error types for netshell.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::dialect::DialectTag;

/// Main error type for netshell operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Opening the channel failed (network, authentication, timeout).
    #[error("Connect failure: {0}")]
    Connect(#[from] TransportError),

    /// The channel failed after it was opened.
    #[error("Channel fault: {0}")]
    Channel(#[from] ChannelError),

    /// Invalid session or batch configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The task driving a session ended abnormally.
    #[error("Session task failed: {message}")]
    TaskFailed { message: String },
}

impl Error {
    /// Classify the error into the session failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connect(_) => ErrorKind::ConnectFailure,
            Error::Channel(ChannelError::Cancelled) => ErrorKind::Cancelled,
            Error::Channel(_) => ErrorKind::ChannelFault,
            Error::Config(_) => ErrorKind::InvalidConfig,
            Error::TaskFailed { .. } => ErrorKind::Internal,
        }
    }
}

/// Coarse classification of a session-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConnectFailure,
    ChannelFault,
    Cancelled,
    InvalidConfig,
    Internal,
}

/// Transport layer errors (TCP, SSH handshake, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to reach the host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// The server's host key was rejected
    #[error("Host key for {host}:{port} rejected: {reason}")]
    HostKeyRejected {
        host: String,
        port: u16,
        reason: String,
    },

    /// Opening the channel did not finish in time
    #[error("Connect timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel errors raised once the interactive shell is up.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The remote side closed the channel
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// The session was cancelled or ran past its deadline
    #[error("Session cancelled")]
    Cancelled,
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required field is missing or a value is out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A dialect name that matches no profile
    #[error("Unknown dialect '{name}'")]
    UnknownDialect { name: String },

    /// The host list could not be loaded
    #[error("Host list {path}: {reason}")]
    HostList { path: PathBuf, reason: String },
}

/// Non-fatal observations attached to a session outcome.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// No dialect keywords were found in the banner; the fallback was used.
    DetectionUncertain { fallback: DialectTag },

    /// A command did not return to the prompt within its timeout.
    CommandTimeout { command: String, timeout: Duration },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DetectionUncertain { fallback } => {
                write!(f, "could not detect device dialect, assuming {fallback}")
            }
            Warning::CommandTimeout { command, timeout } => {
                write!(f, "'{command}' did not complete within {timeout:?}")
            }
        }
    }
}

/// Result type alias using netshell's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err: Error = TransportError::Timeout(Duration::from_secs(10)).into();
        assert_eq!(err.kind(), ErrorKind::ConnectFailure);

        let err: Error = ChannelError::Closed.into();
        assert_eq!(err.kind(), ErrorKind::ChannelFault);

        let err: Error = ChannelError::Cancelled.into();
        assert_eq!(err.kind(), ErrorKind::Cancelled);

        let err: Error = ConfigError::UnknownDialect {
            name: "junos".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::DetectionUncertain {
            fallback: DialectTag::Cisco,
        };
        assert_eq!(
            warning.to_string(),
            "could not detect device dialect, assuming cisco"
        );
    }
}
