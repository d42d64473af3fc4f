//! Fee engine metrics.

use eyre::WrapErr;
use metrics::{Counter, Histogram};
use metrics_derive::Metrics;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::{
    net::SocketAddr,
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tracing::info;

/// Metrics of a [`FeePoller`](crate::poller::FeePoller), labelled by network.
#[derive(Metrics)]
#[metrics(scope = "gas_fees.poller")]
pub struct PollerMetrics {
    /// Number of completed ticks.
    pub ticks: Counter,
    /// Number of ticks that failed to produce fees.
    pub failed_ticks: Counter,
    /// Number of ticks whose result was discarded because polling stopped.
    pub discarded_ticks: Counter,
    /// Duration of a tick in milliseconds.
    pub tick_duration: Histogram,
}

/// Metrics of the default [`FeeEvents`](crate::store::FeeEvents) sink, labelled by network.
#[derive(Metrics)]
#[metrics(scope = "gas_fees.events")]
pub struct EventMetrics {
    /// Number of times the user switched tiers.
    pub option_changes: Counter,
    /// Number of reported poll failures.
    pub poll_failures: Counter,
}

/// Builds a Prometheus exporter serving on `metrics_addr`, returning a handle.
///
/// The recorder performs upkeep every 5 seconds. Calling this again returns the existing
/// handle.
pub async fn setup_exporter(metrics_addr: impl Into<SocketAddr>) -> eyre::Result<PrometheusHandle> {
    static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

    let mut lock = HANDLE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = &*lock {
        return Ok(handle.clone());
    }

    let addr: SocketAddr = metrics_addr.into();
    let (recorder, exporter) = PrometheusBuilder::new()
        .with_http_listener(addr)
        .upkeep_timeout(Duration::from_secs(5))
        .build()
        .wrap_err("failed to build metrics recorder")?;

    let handle = recorder.handle();
    metrics::set_global_recorder(recorder).wrap_err("could not set metrics recorder")?;
    tokio::spawn(exporter);

    info!(target: "gas_fees::spawn", %addr, "Started metrics server");

    *lock = Some(handle.clone());

    Ok(handle)
}
