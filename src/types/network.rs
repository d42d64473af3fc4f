//! Supported networks and their fee model.

use crate::constants::{
    ARBITRUM_ETH_ADDRESS, ARBITRUM_POLLING_INTERVAL, DEFAULT_POLLING_INTERVAL, ETH_ADDRESS,
    MATIC_POLYGON_ADDRESS, OPTIMISM_ETH_ADDRESS, POLYGON_POLLING_INTERVAL,
};
use alloy::primitives::ChainId;
use alloy_chains::{Chain, NamedChain};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumIter, EnumString};

/// A network the fee engine can poll.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Network {
    /// Ethereum mainnet.
    Mainnet,
    /// Goerli, the designated test network.
    Goerli,
    /// Polygon PoS.
    Polygon,
    /// Arbitrum One.
    Arbitrum,
    /// OP Mainnet.
    Optimism,
}

/// The coin a network pays gas in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum NativeCoin {
    /// Ether.
    ETH,
    /// Polygon's MATIC.
    MATIC,
}

impl Network {
    /// Returns the [`Chain`] for this network.
    pub const fn chain(&self) -> Chain {
        Chain::from_named(match self {
            Self::Mainnet => NamedChain::Mainnet,
            Self::Goerli => NamedChain::Goerli,
            Self::Polygon => NamedChain::Polygon,
            Self::Arbitrum => NamedChain::Arbitrum,
            Self::Optimism => NamedChain::Optimism,
        })
    }

    /// Returns the chain id.
    pub fn chain_id(&self) -> ChainId {
        self.chain().id()
    }

    /// Whether this network uses flat L2 gas pricing.
    pub const fn is_l2(&self) -> bool {
        matches!(self, Self::Polygon | Self::Arbitrum | Self::Optimism)
    }

    /// Whether fees on this network are quoted as base fee plus priority fee.
    pub const fn supports_eip1559(&self) -> bool {
        !self.is_l2()
    }

    /// Whether this network charges an L1 data fee that is supplied out-of-band.
    pub const fn requires_l1_data_fee(&self) -> bool {
        matches!(self, Self::Optimism)
    }

    /// The coin gas is paid in.
    pub const fn native_coin(&self) -> NativeCoin {
        match self {
            Self::Polygon => NativeCoin::MATIC,
            _ => NativeCoin::ETH,
        }
    }

    /// Address under which the wallet lists the native gas asset.
    pub const fn native_asset_address(&self) -> &'static str {
        match self {
            Self::Mainnet | Self::Goerli => ETH_ADDRESS,
            Self::Polygon => MATIC_POLYGON_ADDRESS,
            Self::Arbitrum => ARBITRUM_ETH_ADDRESS,
            Self::Optimism => OPTIMISM_ETH_ADDRESS,
        }
    }

    /// Address of the asset whose price values fees in the display currency.
    ///
    /// Every network prices gas in ETH except Polygon.
    pub const fn price_asset_address(&self) -> &'static str {
        match self {
            Self::Polygon => MATIC_POLYGON_ADDRESS,
            _ => ETH_ADDRESS,
        }
    }

    /// Default interval between two fee polls.
    pub const fn default_polling_interval(&self) -> Duration {
        match self {
            Self::Polygon => POLYGON_POLLING_INTERVAL,
            Self::Arbitrum => ARBITRUM_POLLING_INTERVAL,
            _ => DEFAULT_POLLING_INTERVAL,
        }
    }
}

impl From<Network> for Chain {
    fn from(network: Network) -> Self {
        network.chain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn fee_models() {
        assert!(Network::Mainnet.supports_eip1559());
        assert!(Network::Goerli.supports_eip1559());
        for network in [Network::Polygon, Network::Arbitrum, Network::Optimism] {
            assert!(network.is_l2());
            assert!(!network.supports_eip1559());
        }
        assert!(Network::iter().filter(|n| n.requires_l1_data_fee()).eq([Network::Optimism]));
    }

    #[test]
    fn polling_intervals() {
        assert_eq!(Network::Mainnet.default_polling_interval(), Duration::from_millis(5000));
        assert_eq!(Network::Polygon.default_polling_interval(), Duration::from_millis(2000));
        assert_eq!(Network::Arbitrum.default_polling_interval(), Duration::from_millis(3000));
        assert_eq!(Network::Optimism.default_polling_interval(), Duration::from_millis(5000));
    }

    #[test]
    fn parse_and_chain_ids() {
        assert_eq!(Network::from_str("Arbitrum").unwrap(), Network::Arbitrum);
        assert_eq!(Network::Optimism.to_string(), "optimism");
        assert_eq!(Network::Mainnet.chain_id(), 1);
        assert_eq!(Network::Optimism.chain_id(), 10);
        assert_eq!(Network::Polygon.chain_id(), 137);
        assert_eq!(Network::Arbitrum.chain_id(), 42161);
    }

    #[test]
    fn native_pricing() {
        assert_eq!(Network::Polygon.native_coin(), NativeCoin::MATIC);
        assert_eq!(Network::Polygon.price_asset_address(), MATIC_POLYGON_ADDRESS);
        assert_eq!(Network::Arbitrum.price_asset_address(), ETH_ADDRESS);
        assert_eq!(Network::Arbitrum.native_asset_address(), ARBITRUM_ETH_ADDRESS);
    }
}
