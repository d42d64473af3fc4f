use crate::{
    error::FeeError,
    metrics::EventMetrics,
    types::{Network, Speed},
};
use std::fmt::Debug;
use tracing::{error, info};

/// Sink for analytics and crash reports.
///
/// Calls are fire-and-forget and must not block.
pub trait FeeEvents: Debug + Send + Sync {
    /// The user switched to `option`.
    fn gas_fee_option_changed(&self, network: Option<Network>, option: Speed);

    /// A poll of `network` failed.
    fn poll_failed(&self, network: Network, error: &FeeError);
}

/// [`FeeEvents`] that logs events and counts them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEvents;

impl TracingEvents {
    fn metrics(network: Option<Network>) -> EventMetrics {
        let network = network.map(|network| network.to_string()).unwrap_or_default();
        EventMetrics::new_with_labels(&[("network", network)])
    }
}

impl FeeEvents for TracingEvents {
    fn gas_fee_option_changed(&self, network: Option<Network>, option: Speed) {
        info!(target: "gas_fees::events", ?network, %option, "Gas fee option changed");
        Self::metrics(network).option_changes.increment(1);
    }

    fn poll_failed(&self, network: Network, error: &FeeError) {
        error!(target: "gas_fees::events", %network, %error, "Failed to poll gas fees");
        Self::metrics(Some(network)).poll_failures.increment(1);
    }
}
