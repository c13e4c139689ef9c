//! # netshell
//!
//! Async command collection from network device CLIs over SSH.
//!
//! netshell opens an interactive shell on a switch or router, works out
//! which vendor CLI it is talking to, turns off paging, optionally raises
//! privilege, runs a list of commands and returns their cleaned output.
//! A batch runner does the same for many hosts at once.
//!
//! ## Features
//!
//! - Async SSH connections via russh
//! - Cisco and Huawei dialects, detected from the login banner
//! - Prompt-based completion with a per-command timeout
//! - Output cleaning (echo, prompt and color codes removed)
//! - Per-host failure isolation in batches
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netshell::{SessionConfig, SshConnector, execute_session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netshell::Error> {
//!     let config = SessionConfig::builder()
//!         .host("192.168.93.101")
//!         .username("admin")
//!         .password("secret")
//!         .commands(["show version", "show ip interface brief"])
//!         .build()?;
//!
//!     let outcome = execute_session(&SshConnector::default(), config).await;
//!     print!("{}", outcome);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod hosts;
pub mod transport;

// Re-export main types for convenience
pub use channel::ShellChannel;
pub use dialect::{DialectProfile, DialectTag, EchoStripMode};
pub use driver::{
    BatchRunner, CancelHandle, CancelSignal, CommandOutput, CommandResult, Phase,
    SessionConfig, SessionConfigBuilder, SessionEngine, SessionOutcome, SessionTimings,
    execute_batch, execute_session,
};
pub use error::{Error, ErrorKind, Warning};
pub use hosts::{load_host_list, parse_host_list};
pub use transport::{AuthMethod, Connector, SshConnector, SshOptions};
