//! Builder for session configurations.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;

use super::config::{SessionConfig, SessionTimings};
use crate::dialect::{DialectTag, EchoStripMode};
use crate::error::{ConfigError, Result};
use crate::transport::AuthMethod;

/// Builder for [`SessionConfig`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use netshell::SessionConfig;
///
/// # fn example() -> Result<(), netshell::Error> {
/// let config = SessionConfig::builder()
///     .host("192.168.93.101")
///     .username("admin")
///     .password("secret")
///     .commands(["show version", "show ip interface brief"])
///     .per_command_timeout(Duration::from_secs(15))
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// The host may be left empty for a configuration shared across a batch;
/// the batch runner fills it in per host.
#[derive(Debug)]
pub struct SessionConfigBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: Option<AuthMethod>,
    commands: Vec<String>,
    dialect_commands: IndexMap<DialectTag, Vec<String>>,
    per_command_timeout: Duration,
    privilege_secret: Option<SecretString>,
    privilege_level: Option<String>,
    explicit_dialect: Option<DialectTag>,
    echo_strip_mode: Option<EchoStripMode>,
    session_timeout: Option<Duration>,
    timings: SessionTimings,
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfigBuilder {
    /// Create a builder with default port, timeouts and timings.
    pub fn new() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: None,
            auth: None,
            commands: Vec::new(),
            dialect_commands: IndexMap::new(),
            per_command_timeout: Duration::from_secs(15),
            privilege_secret: None,
            privilege_level: None,
            explicit_dialect: None,
            echo_strip_mode: None,
            session_timeout: None,
            timings: SessionTimings::default(),
        }
    }

    /// Set the target host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = Some(AuthMethod::Password(SecretString::from(password.into())));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        });
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        });
        self
    }

    /// Append one command.
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// Append several commands.
    pub fn commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Use a dedicated command list when `dialect` is selected.
    pub fn dialect_commands<I, S>(mut self, dialect: DialectTag, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dialect_commands
            .insert(dialect, commands.into_iter().map(Into::into).collect());
        self
    }

    /// Set how long each command may take to return to the prompt.
    pub fn per_command_timeout(mut self, timeout: Duration) -> Self {
        self.per_command_timeout = timeout;
        self
    }

    /// Set the privilege (enable/super) secret.
    pub fn privilege_secret(mut self, secret: impl Into<String>) -> Self {
        self.privilege_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Set the privilege level for dialects that take one.
    pub fn privilege_level(mut self, level: impl Into<String>) -> Self {
        self.privilege_level = Some(level.into());
        self
    }

    /// Skip detection and use this dialect.
    pub fn dialect(mut self, dialect: DialectTag) -> Self {
        self.explicit_dialect = Some(dialect);
        self
    }

    /// Recognize the command echo this way regardless of dialect.
    pub fn echo_strip_mode(mut self, mode: EchoStripMode) -> Self {
        self.echo_strip_mode = Some(mode);
        self
    }

    /// Abort the session after this long.
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timings.connect_timeout = timeout;
        self
    }

    /// Replace all bring-up and polling timings.
    pub fn timings(mut self, timings: SessionTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<SessionConfig> {
        let username = self
            .username
            .filter(|u| !u.is_empty())
            .ok_or_else(|| invalid("username is required"))?;

        let auth = self
            .auth
            .ok_or_else(|| invalid("a password or private key is required"))?;

        if self.per_command_timeout.is_zero() {
            return Err(invalid("per-command timeout must be non-zero").into());
        }

        if self.timings.poll_interval.is_zero() {
            return Err(invalid("poll interval must be non-zero").into());
        }

        Ok(SessionConfig {
            host: self.host,
            port: self.port,
            username,
            auth,
            commands: self.commands,
            dialect_commands: self.dialect_commands,
            per_command_timeout: self.per_command_timeout,
            privilege_secret: self.privilege_secret,
            privilege_level: self.privilege_level,
            explicit_dialect: self.explicit_dialect,
            echo_strip_mode: self.echo_strip_mode,
            session_timeout: self.session_timeout,
            timings: self.timings,
        })
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidConfig {
        message: message.to_string(),
    }
}
