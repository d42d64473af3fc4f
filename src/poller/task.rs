use crate::{
    error::FeeError,
    metrics::PollerMetrics,
    pricing::normalize,
    sources::FeeSource,
    store::FeeStore,
    types::Network,
};
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, error, instrument, trace};

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    /// New fees were written.
    Applied,
    /// The source had nothing to offer, the last snapshot stays.
    NoData,
    /// Polling stopped while the tick was in flight.
    Discarded,
}

/// Polls a single network until its session ends.
#[derive(Debug)]
pub(super) struct PollTask {
    pub(super) store: FeeStore,
    pub(super) source: Arc<dyn FeeSource>,
    pub(super) network: Network,
    pub(super) session: u64,
    pub(super) interval: Duration,
}

impl PollTask {
    /// Spawns the polling loop, returning a handle to stop it.
    pub(super) fn spawn(self) -> PollingHandle {
        let network = self.network;
        let session = self.session;
        let task = tokio::spawn(self.run());
        PollingHandle { network, session, task }
    }

    /// Ticks immediately, then `interval` after every completed tick.
    async fn run(self) {
        let metrics = PollerMetrics::new_with_labels(&[("network", self.network.to_string())]);

        while self.store.session() == self.session {
            let started = Instant::now();
            let outcome = self.tick().await;
            metrics.ticks.increment(1);
            metrics.tick_duration.record(started.elapsed().as_millis() as f64);

            match outcome {
                Ok(TickOutcome::Applied) => {}
                Ok(TickOutcome::NoData) => debug!(network = %self.network, "No fee data"),
                Ok(TickOutcome::Discarded) => {
                    metrics.discarded_ticks.increment(1);
                    break;
                }
                Err(err) => {
                    metrics.failed_ticks.increment(1);
                    error!(network = %self.network, %err, "Failed to poll gas fees");
                    self.store.report_poll_failure(self.network, &err);
                }
            }

            tokio::time::sleep(self.interval).await;
        }

        trace!(network = %self.network, session = self.session, "Polling loop exited");
    }

    #[instrument(skip(self), fields(network = %self.network, session = self.session))]
    async fn tick(&self) -> Result<TickOutcome, FeeError> {
        let quote = self.source.fetch_quote(self.network).await?;
        let Some(fees) = normalize(quote, self.network)? else {
            return Ok(TickOutcome::NoData);
        };

        if self.store.apply_poll_result(self.session, fees)? {
            Ok(TickOutcome::Applied)
        } else {
            Ok(TickOutcome::Discarded)
        }
    }
}

/// Handle to a running polling loop, consumed by [`PollingHandle::stop`].
#[derive(Debug)]
pub struct PollingHandle {
    network: Network,
    session: u64,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Network being polled.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Stops the loop and resets the snapshot.
    ///
    /// A tick in flight is cancelled; if it already completed its fetch its result is
    /// discarded.
    pub fn stop(self, store: &FeeStore) {
        self.task.abort();
        store.end_session(self.session);
        debug!(network = %self.network, session = self.session, "Stopped polling");
    }
}
