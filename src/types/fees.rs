use super::Speed;
use alloy::primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency used to display fee values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// ISO code, e.g. `USD`.
    pub code: String,
    /// Symbol prefixed to amounts.
    pub symbol: String,
    /// Decimals shown.
    pub decimals: u32,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self { code: "USD".to_string(), symbol: "$".to_string(), decimals: 2 }
    }
}

impl NativeCurrency {
    /// Formats an amount in this currency.
    pub fn format(&self, amount: Decimal) -> String {
        let amount =
            amount.round_dp_with_strategy(self.decimals, RoundingStrategy::MidpointAwayFromZero);
        format!("{}{:.*}", self.symbol, self.decimals as usize, amount)
    }
}

/// A value expressed in the display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeValue {
    /// Amount in the display currency.
    pub amount: Decimal,
    /// Human readable amount.
    pub display: String,
}

/// Total cost of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAmount {
    /// Amount in wei.
    pub amount: U256,
    /// Amount in the network's native coin.
    pub display: String,
    /// Amount in the display currency.
    pub native: NativeValue,
}

/// Cost estimate of a single tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GasFee {
    /// Estimate on a network with a dynamic base fee.
    Eip1559 {
        /// Expected cost.
        #[serde(rename = "estimatedFee")]
        estimated_fee: FeeAmount,
        /// Worst case cost.
        #[serde(rename = "maxFee")]
        max_fee: FeeAmount,
    },
    /// Estimate on a network with flat gas pricing.
    Legacy {
        /// Expected cost.
        #[serde(rename = "estimatedFee")]
        estimated_fee: FeeAmount,
    },
}

impl GasFee {
    /// Expected cost.
    pub fn estimated_fee(&self) -> &FeeAmount {
        match self {
            Self::Eip1559 { estimated_fee, .. } | Self::Legacy { estimated_fee } => estimated_fee,
        }
    }

    /// Worst case cost, only known for dynamic base fee networks.
    pub fn max_fee(&self) -> Option<&FeeAmount> {
        match self {
            Self::Eip1559 { max_fee, .. } => Some(max_fee),
            Self::Legacy { .. } => None,
        }
    }

    /// The cost a wallet balance has to cover.
    pub fn required_amount(&self) -> &FeeAmount {
        self.max_fee().unwrap_or_else(|| self.estimated_fee())
    }
}

/// Cost estimates of every tier.
pub type GasFeesBySpeed = BTreeMap<Speed, GasFee>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn currency_format() {
        let usd = NativeCurrency::default();
        assert_eq!(usd.format(Decimal::from_str("4.2").unwrap()), "$4.20");
        assert_eq!(usd.format(Decimal::from_str("0.126").unwrap()), "$0.13");
    }
}
