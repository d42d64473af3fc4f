//! Fee engine constants.

use std::time::Duration;

/// Gas limit of a plain native transfer, used until a caller supplies one.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// Decimals of every native gas asset we support.
pub const NATIVE_DECIMALS: u8 = 18;

/// Polling interval for networks without a dedicated cadence.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(5000);

/// Polling interval for Polygon.
pub const POLYGON_POLLING_INTERVAL: Duration = Duration::from_millis(2000);

/// Polling interval for Arbitrum.
pub const ARBITRUM_POLLING_INTERVAL: Duration = Duration::from_millis(3000);

/// Base fee forced on the test network when it is served by a local development chain.
///
/// A forked chain keeps the real network's base fee, so quoting a high one keeps
/// transactions sendable.
pub const LOCAL_DEV_CHAIN_BASE_FEE_GWEI: u64 = 1000;

/// Arbitrum nodes overestimate the gas price, these scale it down (in percent).
pub const ARBITRUM_FAST_MULTIPLIER: u64 = 70;
/// See [`ARBITRUM_FAST_MULTIPLIER`].
pub const ARBITRUM_AVERAGE_MULTIPLIER: u64 = 50;
/// See [`ARBITRUM_FAST_MULTIPLIER`].
pub const ARBITRUM_SAFE_LOW_MULTIPLIER: u64 = 40;

/// Expected wait, in minutes, of the fastest L2 price.
pub const L2_FAST_WAIT_MINUTES: f64 = 0.2;
/// Expected wait, in minutes, of the average L2 price.
pub const L2_AVERAGE_WAIT_MINUTES: f64 = 0.5;
/// Expected wait, in minutes, of the slowest L2 price.
pub const L2_SAFE_LOW_WAIT_MINUTES: f64 = 1.0;

/// Wallet identifier of ether on mainnet and the test network.
pub const ETH_ADDRESS: &str = "eth";

/// MATIC on Polygon.
pub const MATIC_POLYGON_ADDRESS: &str = "0x0000000000000000000000000000000000001010";

/// Native ether on Arbitrum.
pub const ARBITRUM_ETH_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// Native ether on Optimism.
pub const OPTIMISM_ETH_ADDRESS: &str = "0xDeadDeAddeAddEAddeadDEaDDEAdDeaDDeAD0000";

/// Default meteorology endpoint serving EIP-1559 fee suggestions.
pub const DEFAULT_METEOROLOGY_URL: &str = "https://metadata.p.rainbow.me/meteorology/v1/gas";

/// Default Polygon gas station endpoint.
pub const DEFAULT_POLYGON_STATION_URL: &str =
    "https://api.polygonscan.com/api?module=gastracker&action=gasoracle";

/// Expected confirmation time when the oracle reports no confirmation data.
pub const DEFAULT_CONFIRMATION_TIME: Duration = Duration::from_secs(15);
