//! Running one session per host, concurrently.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use indexmap::{IndexMap, IndexSet};
use log::{info, warn};

use super::cancel::CancelSignal;
use super::config::SessionConfig;
use super::response::SessionOutcome;
use super::session::SessionEngine;
use crate::error::Error;
use crate::transport::Connector;

/// Default number of sessions in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Runs a shared configuration against many hosts.
///
/// Every session is independent: one host failing, hanging or panicking
/// never affects the others. Each host gets its own outcome.
pub struct BatchRunner<K> {
    connector: Arc<K>,
    concurrency: usize,
    cancel: CancelSignal,
}

impl<K> BatchRunner<K>
where
    K: Connector + 'static,
{
    /// Create a runner that owns `connector`.
    pub fn new(connector: K) -> Self {
        Self::from_arc(Arc::new(connector))
    }

    /// Share an existing connector.
    pub fn from_arc(connector: Arc<K>) -> Self {
        Self {
            connector,
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancelSignal::default(),
        }
    }

    /// Limit sessions in flight (minimum 1).
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Cancel every session of the batch through one signal.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run `shared` against every host.
    ///
    /// Duplicate hosts run once. The returned map follows the input order.
    pub async fn run<I, S>(
        &self,
        hosts: I,
        shared: &SessionConfig,
    ) -> IndexMap<String, SessionOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hosts: IndexSet<String> = hosts.into_iter().map(Into::into).collect();
        info!("running {} session(s), {} at a time", hosts.len(), self.concurrency);

        let mut finished: IndexMap<String, SessionOutcome> = stream::iter(hosts.iter().cloned())
            .map(|host| {
                let connector = Arc::clone(&self.connector);
                let config = shared.for_host(host.clone());
                let cancel = self.cancel.clone();
                async move {
                    let task = tokio::spawn(async move {
                        SessionEngine::new(connector.as_ref(), config)
                            .with_cancel(cancel)
                            .run()
                            .await
                    });
                    let outcome = match task.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!("[{}] session task failed: {}", host, e);
                            SessionOutcome::failed(
                                host.clone(),
                                Error::TaskFailed {
                                    message: e.to_string(),
                                },
                            )
                        }
                    };
                    (host, outcome)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let failed = finished.values().filter(|o| !o.is_success()).count();
        info!(
            "batch finished: {} succeeded, {} failed",
            finished.len() - failed,
            failed
        );

        hosts
            .into_iter()
            .filter_map(|host| finished.swap_remove(&host).map(|outcome| (host, outcome)))
            .collect()
    }
}
