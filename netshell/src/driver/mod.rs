//! Session driving: configuration, the per-device engine and batch execution.

mod batch;
mod builder;
mod cancel;
mod config;
pub mod normalize;
mod response;
mod session;

use indexmap::IndexMap;

use crate::transport::Connector;

pub use batch::{BatchRunner, DEFAULT_CONCURRENCY};
pub use builder::SessionConfigBuilder;
pub use cancel::{CancelHandle, CancelSignal};
pub use config::{SessionConfig, SessionTimings};
pub use response::{CommandOutput, CommandResult, NO_OUTPUT, SessionOutcome};
pub use session::{Phase, SessionEngine};

/// Run one session against `config.host`.
pub async fn execute_session<K: Connector>(connector: &K, config: SessionConfig) -> SessionOutcome {
    SessionEngine::new(connector, config).run().await
}

/// Run `shared` against every host with the default concurrency.
pub async fn execute_batch<K, I, S>(
    connector: K,
    hosts: I,
    shared: &SessionConfig,
) -> IndexMap<String, SessionOutcome>
where
    K: Connector + 'static,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    BatchRunner::new(connector).run(hosts, shared).await
}
