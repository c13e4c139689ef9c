//! Result types for command execution and whole sessions.

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::session::Phase;
use crate::dialect::DialectTag;
use crate::error::{Error, Warning};

/// Text rendered for a command that ran but produced nothing.
pub const NO_OUTPUT: &str = "[no effective output]";

/// Cleaned output of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum CommandOutput {
    /// The command produced output.
    Text(String),
    /// Nothing was left after removing the echo and prompt.
    Empty,
}

impl CommandOutput {
    /// The output text; empty for [`CommandOutput::Empty`].
    pub fn as_str(&self) -> &str {
        match self {
            CommandOutput::Text(text) => text,
            CommandOutput::Empty => "",
        }
    }

    /// True when the command produced no effective output.
    pub fn is_empty(&self) -> bool {
        matches!(self, CommandOutput::Empty)
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Text(text) => f.write_str(text),
            CommandOutput::Empty => f.write_str(NO_OUTPUT),
        }
    }
}

/// Result of running one command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    /// The command that was sent.
    pub command: String,

    /// Cleaned output.
    pub output: CommandOutput,

    /// Everything captured between sending the command and the end of the read loop.
    #[serde(skip)]
    pub raw_output: String,

    /// The prompt the device returned to; empty on timeout.
    pub prompt: String,

    /// The prompt never came back within the per-command timeout.
    pub timed_out: bool,

    /// Time from sending the command to the end of the read loop.
    pub elapsed: Duration,
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output)
    }
}

/// Everything one session produced.
///
/// Results keep the order commands were given in. When the session failed,
/// `error` is set and `results` holds whatever completed before the fault.
#[derive(Debug, Serialize)]
pub struct SessionOutcome {
    /// The host this session targeted.
    pub host: String,

    /// The dialect in use, once selected.
    pub dialect: Option<DialectTag>,

    /// Results keyed by command, in execution order.
    pub results: IndexMap<String, CommandResult>,

    /// Non-fatal observations.
    pub warnings: Vec<Warning>,

    /// The session-level failure, if any.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<Error>,

    /// The phase the session was in when it failed.
    pub failed_in: Option<Phase>,

    /// Terminal phase: `Closed` or `Error`.
    pub phase: Phase,

    /// Wall time of the whole session.
    pub elapsed: Duration,
}

impl SessionOutcome {
    /// An empty outcome for `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            dialect: None,
            results: IndexMap::new(),
            warnings: Vec::new(),
            error: None,
            failed_in: None,
            phase: Phase::Connecting,
            elapsed: Duration::ZERO,
        }
    }

    /// An outcome for a session that never got to run.
    pub fn failed(host: impl Into<String>, error: Error) -> Self {
        Self {
            error: Some(error),
            phase: Phase::Error,
            ..Self::new(host)
        }
    }

    /// True when the session finished without a session-level error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Look up the result for a command.
    pub fn get(&self, command: &str) -> Option<&CommandResult> {
        self.results.get(command)
    }

    /// Commands that hit their timeout.
    pub fn timed_out(&self) -> impl Iterator<Item = &CommandResult> {
        self.results.values().filter(|result| result.timed_out)
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dialect {
            Some(dialect) => writeln!(f, "[{}] dialect: {}", self.host, dialect)?,
            None => writeln!(f, "[{}] dialect: unknown", self.host)?,
        }

        for warning in &self.warnings {
            writeln!(f, "[{}] warning: {}", self.host, warning)?;
        }

        for result in self.results.values() {
            writeln!(f, "[{}] result ({}):", self.host, result.command)?;
            if result.timed_out {
                writeln!(f, "[timed out after {:?}]", result.elapsed)?;
            }
            writeln!(f, "{}", result.output)?;
            writeln!(f, "{}", "-".repeat(70))?;
        }

        if let Some(error) = &self.error {
            writeln!(f, "[{}] failed: {}", self.host, error)?;
        }

        Ok(())
    }
}

fn serialize_error<S: Serializer>(error: &Option<Error>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
