//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use log::{debug, trace, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{HashAlg, PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use russh::{Channel, ChannelMsg, Disconnect};
use secrecy::ExposeSecret;

use super::Connector;
use super::config::{AuthMethod, HostKeyVerification, SshOptions};
use crate::channel::ShellChannel;
use crate::driver::SessionConfig;
use crate::error::{ChannelError, TransportError};

/// Opens interactive shells over SSH.
#[derive(Debug, Clone, Default)]
pub struct SshConnector {
    options: SshOptions,
}

impl SshConnector {
    /// Create a connector with the given options.
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    /// Authenticate with the server.
    async fn authenticate(
        session: &mut Handle<SshHandler>,
        config: &SessionConfig,
    ) -> Result<(), TransportError> {
        let success = match &config.auth {
            AuthMethod::Password(password) => session
                .authenticate_password(config.username.as_str(), password.expose_secret())
                .await?
                .success(),
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| TransportError::Key(e.to_string()))?;

                // Get the best RSA hash algorithm supported by the server
                let hash_alg = session.best_supported_rsa_hash().await?.flatten();

                session
                    .authenticate_publickey(
                        config.username.as_str(),
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await?
                    .success()
            }
        };

        if !success {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            });
        }

        Ok(())
    }
}

impl Connector for SshConnector {
    type Channel = SshShell;

    async fn open(&self, config: &SessionConfig) -> Result<SshShell, TransportError> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: self.options.inactivity_timeout,
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            verification: self.options.host_key_verification.clone(),
            host_key_error: host_key_error.clone(),
        };

        let mut session = client::connect(ssh_config, (config.host.as_str(), config.port), handler)
            .await
            .map_err(|e| {
                // Prefer the detailed host key error over russh's generic one
                if let Some(hk_err) = host_key_error.lock().ok().and_then(|mut slot| slot.take()) {
                    return hk_err;
                }
                match e {
                    russh::Error::IO(source) => TransportError::ConnectionFailed {
                        host: config.host.clone(),
                        port: config.port,
                        source,
                    },
                    other => TransportError::Ssh(other),
                }
            })?;

        Self::authenticate(&mut session, config).await?;

        let channel = session.channel_open_session().await?;
        channel
            .request_pty(
                true,
                &self.options.terminal_type,
                self.options.terminal_width,
                self.options.terminal_height,
                0,
                0,
                &[],
            )
            .await?;
        channel.request_shell(true).await?;

        debug!("shell opened on {}:{}", config.host, config.port);

        Ok(SshShell {
            session,
            channel,
            closed: false,
        })
    }
}

/// An interactive shell on an SSH connection.
///
/// Owns both the connection and its single session channel; closing the
/// shell disconnects the whole connection.
pub struct SshShell {
    session: Handle<SshHandler>,
    channel: Channel<Msg>,
    closed: bool,
}

impl ShellChannel for SshShell {
    async fn read_chunk(&mut self, wait: Duration) -> Result<Option<Bytes>, ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }

        // Control messages (window adjust, request replies) are not output;
        // keep waiting for data until `wait` is used up.
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let message = match tokio::time::timeout_at(deadline, self.channel.wait()).await {
                Err(_) => return Ok(None),
                Ok(message) => message,
            };

            match message {
                Some(ChannelMsg::Data { data }) | Some(ChannelMsg::ExtendedData { data, .. }) => {
                    return Ok(Some(Bytes::copy_from_slice(&data)));
                }
                None | Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) => {
                    return Err(ChannelError::Closed);
                }
                Some(other) => trace!("ignoring channel message: {:?}", other),
            }
        }
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.channel.data(data).await.map_err(ChannelError::Ssh)
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // The device may already have hung up; the disconnect below still runs.
        if let Err(e) = self.channel.close().await {
            trace!("channel close: {}", e);
        }
        self.session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(ChannelError::Ssh)
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    verification: HostKeyVerification,
    /// Detailed host key error surfaced by `open` instead of russh's generic one.
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    fn reject(&self, reason: String) {
        warn!("rejecting host key for {}:{}: {}", self.host, self.port, reason);
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(TransportError::HostKeyRejected {
                host: self.host.clone(),
                port: self.port,
                reason,
            });
        }
    }

    fn check_known_hosts(
        &self,
        pubkey: &PublicKey,
        path: Option<&PathBuf>,
    ) -> Result<bool, russh::keys::Error> {
        match path {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, pubkey),
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint(HashAlg::Sha256);

        match &self.verification {
            HostKeyVerification::AcceptAny => {
                debug!("accepting host key {} for {}", fingerprint, self.host);
                Ok(true)
            }
            HostKeyVerification::KnownHosts { path } => {
                match self.check_known_hosts(server_public_key, path.as_ref()) {
                    Ok(true) => Ok(true),
                    Ok(false) => {
                        self.reject(format!("{} is not in known_hosts", fingerprint));
                        Ok(false)
                    }
                    Err(e) => {
                        self.reject(e.to_string());
                        Ok(false)
                    }
                }
            }
        }
    }
}
