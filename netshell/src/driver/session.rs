//! The session engine: one device, one channel, one run.
//!
//! A session walks a fixed sequence of phases:
//!
//! ```text
//! Connecting -> BannerDrain -> DialectSelected -> PagingDisabled
//!     -> [PrivilegeEscalating] -> CommandLoop -> Closed
//! ```
//!
//! Any phase can fail into `Error`. Whatever happens, the channel is closed
//! before the outcome is returned, and results gathered before a failure
//! are kept.
//!
//! Devices give no structured signal that a command finished. Completion is
//! inferred from the dialect's prompt pattern matching the tail of the
//! output; the per-command timeout covers commands that never return to a
//! recognizable prompt.

use std::time::Duration;

use bytes::Bytes;
use log::{debug, info, trace, warn};
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::time::Instant;

use super::cancel::CancelSignal;
use super::config::SessionConfig;
use super::normalize;
use super::response::{CommandResult, SessionOutcome};
use crate::channel::{PatternBuffer, ShellChannel};
use crate::dialect::{self, DialectProfile, DialectTag};
use crate::error::{ChannelError, ConfigError, Result, TransportError, Warning};
use crate::transport::Connector;

/// Line terminator sent after every command.
const LINE_TERMINATOR: &str = "\n";

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Connecting,
    BannerDrain,
    DialectSelected,
    PagingDisabled,
    PrivilegeEscalating,
    CommandLoop,
    Closed,
    Error,
}

/// Mutable state owned by exactly one engine for its lifetime.
struct SessionState<C> {
    phase: Phase,
    dialect: Option<DialectTag>,
    channel: Option<C>,
    buffer: PatternBuffer,
}

/// Drives one interactive session against one device.
pub struct SessionEngine<'a, K: Connector> {
    connector: &'a K,
    config: SessionConfig,
    cancel: CancelSignal,
    state: SessionState<K::Channel>,
}

impl<'a, K: Connector> SessionEngine<'a, K> {
    /// Create an engine for `config`; nothing happens until [`run`](Self::run).
    pub fn new(connector: &'a K, config: SessionConfig) -> Self {
        Self {
            connector,
            config,
            cancel: CancelSignal::default(),
            state: SessionState {
                phase: Phase::Connecting,
                dialect: None,
                channel: None,
                buffer: PatternBuffer::default(),
            },
        }
    }

    /// Observe `cancel` on every poll tick.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Run the session to completion.
    ///
    /// Never fails: session-level errors are recorded on the outcome along
    /// with any results gathered before them.
    pub async fn run(mut self) -> SessionOutcome {
        let start = Instant::now();
        if let Some(limit) = self.config.session_timeout {
            self.cancel = self.cancel.clone().with_deadline(start + limit);
        }

        let mut outcome = SessionOutcome::new(self.config.host.clone());
        let result = self.drive(&mut outcome).await;

        self.release().await;
        outcome.dialect = self.state.dialect;

        match result {
            Ok(()) => self.enter(Phase::Closed),
            Err(err) => {
                warn!(
                    "[{}] session failed during {:?}: {}",
                    self.config.host, self.state.phase, err
                );
                outcome.failed_in = Some(self.state.phase);
                outcome.error = Some(err);
                self.enter(Phase::Error);
            }
        }

        outcome.phase = self.state.phase;
        outcome.elapsed = start.elapsed();
        outcome
    }

    async fn drive(&mut self, outcome: &mut SessionOutcome) -> Result<()> {
        self.connect().await?;
        let banner = self.drain_banner().await?;
        let profile = self.select_dialect(&banner, outcome);
        self.disable_paging(profile).await?;
        if self.config.privilege_secret.is_some() {
            self.escalate(profile).await?;
        }
        self.command_loop(profile, outcome).await
    }

    fn enter(&mut self, phase: Phase) {
        trace!("[{}] {:?} -> {:?}", self.config.host, self.state.phase, phase);
        self.state.phase = phase;
    }

    async fn connect(&mut self) -> Result<()> {
        self.enter(Phase::Connecting);

        if self.config.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "host is required".to_string(),
            }
            .into());
        }

        let limit = self.config.timings.connect_timeout;
        info!("[{}] connecting on port {}", self.config.host, self.config.port);

        let channel = tokio::time::timeout(limit, self.connector.open(&self.config))
            .await
            .map_err(|_| TransportError::Timeout(limit))??;

        self.state.channel = Some(channel);
        Ok(())
    }

    /// Collect output for the whole banner window; devices pause mid-banner.
    async fn drain_banner(&mut self) -> Result<String> {
        self.enter(Phase::BannerDrain);
        self.pause(self.config.timings.banner_settle).await?;

        let mut banner = Vec::new();
        let window_end = Instant::now() + self.config.timings.banner_window;
        while Instant::now() < window_end {
            if let Some(chunk) = self.read_slice().await? {
                banner.extend_from_slice(&chunk);
            }
        }

        trace!("[{}] banner: {} bytes", self.config.host, banner.len());
        Ok(String::from_utf8_lossy(&banner).into_owned())
    }

    fn select_dialect(
        &mut self,
        banner: &str,
        outcome: &mut SessionOutcome,
    ) -> &'static DialectProfile {
        let tag = match self.config.explicit_dialect {
            Some(tag) => {
                debug!("[{}] using configured dialect {}", self.config.host, tag);
                tag
            }
            None => {
                let detection = dialect::detect(banner);
                if detection.uncertain {
                    warn!(
                        "[{}] could not detect device dialect, assuming {}",
                        self.config.host, detection.tag
                    );
                    outcome.warnings.push(Warning::DetectionUncertain {
                        fallback: detection.tag,
                    });
                }
                detection.tag
            }
        };

        info!("[{}] dialect: {}", self.config.host, tag);
        self.state.dialect = Some(tag);
        self.enter(Phase::DialectSelected);
        DialectProfile::get(tag)
    }

    async fn disable_paging(&mut self, profile: &DialectProfile) -> Result<()> {
        self.enter(Phase::PagingDisabled);
        self.send_line(profile.paging_disable_command).await?;
        self.pause(self.config.timings.paging_settle).await?;
        self.drain(profile).await?;
        Ok(())
    }

    /// Send the privilege command and secret. Success is not verified here;
    /// callers that need confirmation include a checking command.
    async fn escalate(&mut self, profile: &DialectProfile) -> Result<()> {
        self.enter(Phase::PrivilegeEscalating);

        let level = self.config.privilege_level.as_deref();
        if level.is_some() && !profile.privilege_command.supports_level() {
            debug!("[{}] {} ignores the privilege level", self.config.host, profile.tag);
        }
        let command = profile.privilege_command_for(level);
        info!("[{}] requesting privilege: {}", self.config.host, command);

        self.send_line(&command).await?;
        self.pause(self.config.timings.privilege_prompt_delay).await?;

        if let Some(secret) = &self.config.privilege_secret {
            let channel = self.state.channel.as_mut().ok_or(ChannelError::Closed)?;
            channel.write_all(secret.expose_secret().as_bytes()).await?;
            channel.write_all(LINE_TERMINATOR.as_bytes()).await?;
        }

        self.pause(self.config.timings.privilege_settle).await?;
        self.drain(profile).await?;
        Ok(())
    }

    async fn command_loop(
        &mut self,
        profile: &DialectProfile,
        outcome: &mut SessionOutcome,
    ) -> Result<()> {
        self.enter(Phase::CommandLoop);

        let commands: Vec<String> = self
            .config
            .commands_for(profile.tag)
            .iter()
            .map(|command| command.trim())
            .filter(|command| !command.is_empty())
            .map(str::to_string)
            .collect();

        for command in commands {
            let result = self.execute(&command, profile).await?;
            if result.timed_out {
                warn!(
                    "[{}] '{}' did not return to the prompt within {:?}",
                    self.config.host, command, self.config.per_command_timeout
                );
                outcome.warnings.push(Warning::CommandTimeout {
                    command: command.clone(),
                    timeout: self.config.per_command_timeout,
                });
            }
            outcome.results.insert(command, result);
        }

        Ok(())
    }

    async fn execute(&mut self, command: &str, profile: &DialectProfile) -> Result<CommandResult> {
        self.state.buffer.clear();
        debug!("[{}] send: {}", self.config.host, command);
        self.send_line(command).await?;

        let start = Instant::now();
        let deadline = start + self.config.per_command_timeout;
        let timed_out = loop {
            if let Some(chunk) = self.read_slice().await? {
                self.state.buffer.extend(&chunk);
            }
            if self.state.buffer.tail_matches(&profile.prompt_detect) {
                break false;
            }
            if Instant::now() >= deadline {
                break true;
            }
        };

        let prompt = if timed_out {
            String::new()
        } else {
            self.state.buffer.last_line()
        };
        let raw_output = String::from_utf8_lossy(&self.state.buffer.take()).into_owned();
        let mode = self.config.echo_strip_mode.unwrap_or(profile.echo_strip_mode);
        let output = normalize::clean_with_mode(&raw_output, command, &profile.prompt_strip, mode);

        trace!(
            "[{}] '{}': {} bytes raw, timed_out={}",
            self.config.host,
            command,
            raw_output.len(),
            timed_out
        );

        Ok(CommandResult {
            command: command.to_string(),
            output,
            raw_output,
            prompt,
            timed_out,
            elapsed: start.elapsed(),
        })
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        let channel = self.state.channel.as_mut().ok_or(ChannelError::Closed)?;
        channel
            .write_all(format!("{line}{LINE_TERMINATOR}").as_bytes())
            .await?;
        Ok(())
    }

    /// Read for at most one poll interval.
    async fn read_slice(&mut self) -> Result<Option<Bytes>> {
        self.check_cancelled()?;

        let wait = self.config.timings.poll_interval;
        let channel = self.state.channel.as_mut().ok_or(ChannelError::Closed)?;
        match tokio::time::timeout(wait, channel.read_chunk(wait)).await {
            Ok(chunk) => Ok(chunk?),
            Err(_) => Ok(None),
        }
    }

    /// Discard the response to a plumbing command.
    ///
    /// Stops once the device is back at its prompt and a slice passes
    /// quietly, or when the drain window ends. Quiet slices before the
    /// prompt are waited out.
    async fn drain(&mut self, profile: &DialectProfile) -> Result<usize> {
        let deadline = Instant::now() + self.config.timings.drain_window;
        self.state.buffer.clear();
        let mut at_prompt = false;

        while Instant::now() < deadline {
            match self.read_slice().await? {
                Some(chunk) => {
                    self.state.buffer.extend(&chunk);
                    at_prompt = self.state.buffer.tail_matches(&profile.prompt_detect);
                }
                None if at_prompt => break,
                None => {}
            }
        }

        if !at_prompt {
            debug!("[{}] no prompt within the drain window", self.config.host);
        }
        let discarded = self.state.buffer.take().len();
        trace!("[{}] discarded {} bytes", self.config.host, discarded);
        Ok(discarded)
    }

    /// Sleep in poll-interval slices so cancellation is noticed.
    async fn pause(&mut self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.check_cancelled()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            tokio::time::sleep((deadline - now).min(self.config.timings.poll_interval)).await;
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ChannelError::Cancelled.into());
        }
        Ok(())
    }

    /// Close the channel if one is open; runs on every exit path.
    async fn release(&mut self) {
        let Some(mut channel) = self.state.channel.take() else {
            return;
        };

        let limit = self.config.timings.connect_timeout;
        match tokio::time::timeout(limit, channel.close()).await {
            Ok(Ok(())) => debug!("[{}] channel closed", self.config.host),
            Ok(Err(e)) => warn!("[{}] failed to close channel: {}", self.config.host, e),
            Err(_) => warn!(
                "[{}] channel close did not finish within {:?}",
                self.config.host, limit
            ),
        }
    }
}
