//! Polling of fee sources.
//!
//! A [`FeePoller`] runs at most one polling loop. Each tick fetches a quote, normalizes it
//! and merges it into the [`FeeStore`]. Failed ticks are reported and the loop carries on;
//! the next tick is scheduled a polling interval after the previous one completed.

mod task;
pub use task::PollingHandle;
use task::PollTask;

use crate::{error::FeeError, sources::FeeSources, store::FeeStore, types::Network};
use std::{collections::BTreeMap, time::Duration};
use tracing::info;

/// Drives fee polling for one network at a time.
#[derive(Debug)]
pub struct FeePoller {
    /// Store poll results are written to.
    store: FeeStore,
    /// Fee source of every network.
    sources: FeeSources,
    /// Polling interval overrides.
    intervals: BTreeMap<Network, Duration>,
    /// The active polling loop.
    handle: Option<PollingHandle>,
}

impl FeePoller {
    /// Creates a new idle [`FeePoller`].
    pub fn new(store: FeeStore, sources: FeeSources) -> Self {
        Self { store, sources, intervals: BTreeMap::new(), handle: None }
    }

    /// Overrides the polling interval of `network`.
    pub fn with_polling_interval(mut self, network: Network, interval: Duration) -> Self {
        self.intervals.insert(network, interval);
        self
    }

    /// Interval between the end of a tick and the start of the next one.
    pub fn polling_interval(&self, network: Network) -> Duration {
        self.intervals.get(&network).copied().unwrap_or(network.default_polling_interval())
    }

    /// The store this poller writes to.
    pub fn store(&self) -> &FeeStore {
        &self.store
    }

    /// Network currently polled.
    pub fn network(&self) -> Option<Network> {
        self.handle.as_ref().map(PollingHandle::network)
    }

    /// Whether a polling loop is running.
    pub fn is_polling(&self) -> bool {
        self.handle.is_some()
    }

    /// Starts polling `network`, stopping any active loop first.
    ///
    /// The snapshot is reset and the first tick runs right away. A network without a fee
    /// source is rejected and leaves the poller idle.
    pub fn start(&mut self, network: Network) -> Result<(), FeeError> {
        self.stop();
        let source = self.sources.get(network).ok_or(FeeError::UnsupportedNetwork(network))?;

        let interval = self.polling_interval(network);
        let session = self.store.begin_session(network);
        info!(%network, ?interval, session, "Started polling gas fees");

        self.handle =
            Some(PollTask { store: self.store.clone(), source, network, session, interval }.spawn());
        Ok(())
    }

    /// Stops the active loop, if any, and resets the snapshot.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop(&self.store);
        }
    }
}

impl Drop for FeePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
