//! Session configuration.

use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;

use super::builder::SessionConfigBuilder;
use crate::dialect::{DialectTag, EchoStripMode};
use crate::transport::AuthMethod;
use crate::transport::config::duplicate_secret;

/// Delays and windows used during bring-up and the command loop.
///
/// The defaults suit slow access switches; lab devices tolerate much
/// shorter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimings {
    /// Upper bound on opening the channel.
    pub connect_timeout: Duration,

    /// Pause before collecting the banner.
    pub banner_settle: Duration,

    /// How long banner output is collected, regardless of pauses.
    pub banner_window: Duration,

    /// Pause after the paging command before its response is discarded.
    pub paging_settle: Duration,

    /// Pause between the privilege command and the secret.
    pub privilege_prompt_delay: Duration,

    /// Pause after the secret before its response is discarded.
    pub privilege_settle: Duration,

    /// Upper bound on discarding plumbing output.
    pub drain_window: Duration,

    /// Length of one read slice in every poll loop.
    pub poll_interval: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            banner_settle: Duration::from_millis(1500),
            banner_window: Duration::from_secs(3),
            paging_settle: Duration::from_millis(500),
            privilege_prompt_delay: Duration::from_millis(400),
            privilege_settle: Duration::from_millis(800),
            drain_window: Duration::from_secs(1),
            poll_interval: Duration::from_millis(80),
        }
    }
}

/// Everything one session needs. Immutable once the session starts.
#[derive(Debug)]
pub struct SessionConfig {
    /// Target host name or address.
    pub host: String,

    /// SSH port.
    pub port: u16,

    /// Login user.
    pub username: String,

    /// Login credentials.
    pub auth: AuthMethod,

    /// Commands to run, in order. Blank entries are skipped.
    pub commands: Vec<String>,

    /// Per-dialect replacements for `commands`, applied once the dialect is known.
    pub dialect_commands: IndexMap<DialectTag, Vec<String>>,

    /// How long one command may take to return to the prompt.
    pub per_command_timeout: Duration,

    /// Secret for the privilege dialogue; no escalation without it.
    pub privilege_secret: Option<SecretString>,

    /// Privilege level for dialects that take one.
    pub privilege_level: Option<String>,

    /// Skip detection and use this dialect.
    pub explicit_dialect: Option<DialectTag>,

    /// Echo recognition in place of the dialect's own.
    pub echo_strip_mode: Option<EchoStripMode>,

    /// Abort the whole session after this long.
    pub session_timeout: Option<Duration>,

    /// Bring-up and polling delays.
    pub timings: SessionTimings,
}

impl SessionConfig {
    /// Start building a configuration.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Copy of this configuration aimed at another host.
    pub fn for_host(&self, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..self.clone()
        }
    }

    /// The command sequence to run once `dialect` is selected.
    pub fn commands_for(&self, dialect: DialectTag) -> &[String] {
        self.dialect_commands
            .get(&dialect)
            .map_or(self.commands.as_slice(), Vec::as_slice)
    }
}

impl Clone for SessionConfig {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            auth: self.auth.clone(),
            commands: self.commands.clone(),
            dialect_commands: self.dialect_commands.clone(),
            per_command_timeout: self.per_command_timeout,
            privilege_secret: self.privilege_secret.as_ref().map(duplicate_secret),
            privilege_level: self.privilege_level.clone(),
            explicit_dialect: self.explicit_dialect,
            echo_strip_mode: self.echo_strip_mode,
            session_timeout: self.session_timeout,
            timings: self.timings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn config() -> SessionConfig {
        SessionConfig::builder()
            .username("admin")
            .password("secret")
            .commands(["show version", "show ip interface brief"])
            .dialect_commands(DialectTag::Huawei, ["display version"])
            .privilege_secret("enable-secret")
            .build()
            .unwrap()
    }

    #[test]
    fn test_for_host_keeps_everything_else() {
        let shared = config();
        let per_host = shared.for_host("10.0.0.1");

        assert_eq!(per_host.host, "10.0.0.1");
        assert_eq!(per_host.username, "admin");
        assert_eq!(per_host.commands, shared.commands);
        assert_eq!(
            per_host.privilege_secret.as_ref().unwrap().expose_secret(),
            "enable-secret"
        );
    }

    #[test]
    fn test_commands_for_dialect() {
        let config = config();
        assert_eq!(config.commands_for(DialectTag::Huawei), ["display version"]);
        assert_eq!(config.commands_for(DialectTag::Cisco).len(), 2);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("enable-secret"));
        assert!(!rendered.contains("\"secret\""));
    }
}
