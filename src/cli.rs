//! # Gas fees CLI
use crate::{
    config::FeeConfig,
    spawn::{FeeEngine, try_spawn_with_args},
    store::StaticWallet,
    types::{FeeSnapshot, Network, WalletAsset},
};
use alloy::primitives::{Address, Bytes};
use clap::Parser;
use eyre::OptionExt;
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

/// Watches transaction fees of a network.
#[derive(Debug, Parser)]
#[command(author, about = "Gas fees", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, one is created from the other arguments and stored under this path.
    #[arg(long, value_name = "CONFIG", env = "GAS_FEES_CONFIG", default_value = "gas-fees.yaml")]
    pub config: PathBuf,
    /// The network to poll.
    #[arg(long, value_name = "NETWORK", default_value = "mainnet")]
    pub network: Network,
    /// The RPC endpoint of a network, in the format "network:url".
    ///
    /// Required to poll Arbitrum and Optimism.
    #[arg(long = "rpc-url", value_name = "NETWORK:URL", value_parser = parse_network_url)]
    pub rpc_urls: Vec<(Network, Url)>,
    /// The meteorology endpoint serving EIP-1559 fee suggestions.
    #[arg(long = "meteorology-url", value_name = "URL", env = "GAS_FEES_METEOROLOGY_URL")]
    pub meteorology_url: Option<Url>,
    /// The Polygon gas station endpoint.
    #[arg(long = "polygon-station-url", value_name = "URL", env = "GAS_FEES_POLYGON_STATION_URL")]
    pub polygon_station_url: Option<Url>,
    /// The polling interval of the polled network, overriding its default.
    #[arg(long, value_name = "MILLISECONDS", value_parser = parse_duration_millis)]
    pub polling_interval: Option<Duration>,
    /// The gas limit fees are estimated for until a transaction supplies one.
    #[arg(long, value_name = "GAS")]
    pub default_gas_limit: Option<u64>,
    /// The gas limit of the transaction.
    #[arg(long, value_name = "GAS")]
    pub gas_limit: Option<u64>,
    /// The balance of the native gas asset, in whole units.
    #[arg(long, value_name = "AMOUNT", default_value = "0")]
    pub balance: String,
    /// The price of the asset fees are valued in, in the display currency.
    #[arg(long, value_name = "PRICE")]
    pub price: Option<f64>,
    /// The recipient of the transaction, used to estimate the Optimism L1 data fee.
    #[arg(long, value_name = "ADDRESS", default_value_t = Address::ZERO)]
    pub to: Address,
    /// The calldata of the transaction, used to estimate the Optimism L1 data fee.
    #[arg(long, value_name = "HEX", default_value = "0x")]
    pub calldata: Bytes,
    /// Serve Prometheus metrics.
    #[arg(long, default_value_t = false)]
    pub metrics: bool,
    /// The address to serve metrics on.
    #[arg(long = "metrics.addr", value_name = "ADDR")]
    pub metrics_address: Option<SocketAddr>,
    /// Print every snapshot as JSON instead of logging a summary.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Args {
    /// Polls the network until interrupted.
    pub async fn run(self) -> eyre::Result<()> {
        let config_path = self.config.clone();
        let network = self.network;
        let gas_limit = self.gas_limit;
        let json = self.json;
        let (to, calldata) = (self.to, self.calldata.clone());
        let wallet = Arc::new(StaticWallet::new(self.wallet_assets()));

        let mut engine = try_spawn_with_args(self, &config_path, wallet).await?;
        engine.poller.start(network)?;

        if let Some(gas_limit) = gas_limit {
            engine.store.set_gas_limit(gas_limit)?;
        }
        if network.requires_l1_data_fee()
            && let Err(err) = engine.supply_l1_data_fee(network, to, calldata).await
        {
            warn!(%network, %err, "Failed to estimate L1 data fee");
        }

        watch_fees(&mut engine, json).await
    }

    /// Merges [`Args`] values into an existing [`FeeConfig`] instance.
    pub fn merge_fee_config(self, config: FeeConfig) -> FeeConfig {
        let config = config
            .with_rpc_urls(&self.rpc_urls)
            .with_meteorology_url(self.meteorology_url)
            .with_polygon_station_url(self.polygon_station_url)
            .with_polling_interval(self.network, self.polling_interval)
            .with_metrics_address(self.metrics_address);
        let config = match self.default_gas_limit {
            Some(limit) => config.with_default_gas_limit(limit),
            None => config,
        };
        if self.metrics { config.with_metrics_enabled(true) } else { config }
    }

    /// Wallet holding the configured balance of the network's gas asset.
    fn wallet_assets(&self) -> Vec<WalletAsset> {
        let native = WalletAsset::new(self.network.native_asset_address(), self.balance.clone());
        let Some(price) = self.price else {
            return vec![native];
        };

        let pricing = self.network.price_asset_address();
        if native.is(pricing) {
            vec![native.with_price(price)]
        } else {
            vec![native, WalletAsset::new(pricing, "0").with_price(price)]
        }
    }
}

/// Reports every published snapshot until ctrl-c.
async fn watch_fees(engine: &mut FeeEngine, json: bool) -> eyre::Result<()> {
    let mut updates = engine.store.subscribe();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    log_snapshot(&snapshot);
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    engine.poller.stop();
    Ok(())
}

fn log_snapshot(snapshot: &FeeSnapshot) {
    let (Some(fees), Some(params)) = (&snapshot.gas_fees_by_speed, &snapshot.gas_fee_params_by_speed)
    else {
        return;
    };

    for (speed, fee) in fees {
        let time = params.get(*speed).map(|params| params.estimated_time().display.clone());
        info!(
            %speed,
            fee = %fee.estimated_fee().display,
            value = %fee.estimated_fee().native.display,
            max_fee = ?fee.max_fee().map(|fee| &fee.display),
            time = ?time,
            "Gas fee"
        );
    }
    if let Some(selected) = &snapshot.selected_gas_fee {
        info!(
            option = %selected.option,
            time = %selected.estimated_time.display,
            sufficient = ?snapshot.is_sufficient_gas,
            "Selected gas fee"
        );
    }
}

/// Parses a string representing milliseconds to a [`Duration`].
fn parse_duration_millis(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let millis = arg.parse()?;
    Ok(Duration::from_millis(millis))
}

/// Parses a string representing a pair of network and a url in a format of "network:url".
fn parse_network_url(arg: &str) -> eyre::Result<(Network, Url)> {
    let (network, url) = arg.split_once(':').ok_or_eyre("expected network:url argument")?;

    Ok((network.parse()?, url.parse()?))
}
