//! Transport layer: opening authenticated interactive shells.
//!
//! The session engine only depends on the [`Connector`] trait. The bundled
//! [`SshConnector`] implements it on top of russh; tests and callers with
//! their own transport can plug in anything that yields a
//! [`ShellChannel`](crate::channel::ShellChannel).

pub mod config;
mod ssh;

use std::future::Future;

use crate::channel::ShellChannel;
use crate::driver::SessionConfig;
use crate::error::TransportError;

pub use config::{AuthMethod, HostKeyVerification, SshOptions};
pub use ssh::{SshConnector, SshShell};

/// Opens interactive shells for sessions.
pub trait Connector: Send + Sync {
    /// The channel type handed to the session engine.
    type Channel: ShellChannel;

    /// Connect to `config.host:config.port`, authenticate and start a shell.
    ///
    /// The engine bounds this call with the configured connect timeout.
    fn open(
        &self,
        config: &SessionConfig,
    ) -> impl Future<Output = Result<Self::Channel, TransportError>> + Send;
}
