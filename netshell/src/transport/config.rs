//! SSH transport and authentication configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Host key verification mode.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Accept any host key.
    #[default]
    AcceptAny,

    /// Only accept keys already present in known_hosts.
    KnownHosts {
        /// Alternate known_hosts file; the user's default when `None`.
        path: Option<PathBuf>,
    },
}

/// Options for the russh-based connector.
#[derive(Debug, Clone)]
pub struct SshOptions {
    /// Terminal width requested for the PTY.
    pub terminal_width: u32,

    /// Terminal height requested for the PTY.
    pub terminal_height: u32,

    /// Terminal type requested for the PTY.
    pub terminal_type: String,

    /// Drop the connection after this much silence from the server.
    pub inactivity_timeout: Option<Duration>,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            terminal_width: 200,
            terminal_height: 500,
            terminal_type: "vt100".to_string(),
            inactivity_timeout: Some(Duration::from_secs(300)),
            host_key_verification: HostKeyVerification::default(),
        }
    }
}

/// Authentication method for SSH connections.
#[derive(Debug)]
pub enum AuthMethod {
    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}

impl Clone for AuthMethod {
    fn clone(&self) -> Self {
        match self {
            AuthMethod::Password(password) => AuthMethod::Password(duplicate_secret(password)),
            AuthMethod::PrivateKey { path, passphrase } => AuthMethod::PrivateKey {
                path: path.clone(),
                passphrase: passphrase.as_ref().map(duplicate_secret),
            },
        }
    }
}

/// Copy a secret without exposing it anywhere but the new allocation.
pub(crate) fn duplicate_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}
