use super::Speed;
use crate::error::FeeError;
use alloy::primitives::{
    U256,
    utils::{ParseUnits, format_units, parse_units},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};

/// A single per-gas fee quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParam {
    /// Amount in wei.
    amount: U256,
    /// Amount in gwei.
    gwei: String,
    /// Human readable amount.
    display: String,
}

impl FeeParam {
    /// Creates a [`FeeParam`] from an amount in wei.
    pub fn from_wei(amount: U256) -> Self {
        // formatting only fails on invalid units
        let gwei = format_units(amount, "gwei")
            .map(|gwei| trim_decimal(&gwei))
            .unwrap_or_else(|_| amount.to_string());
        let display = format!("{gwei} Gwei");
        Self { amount, gwei, display }
    }

    /// Creates a [`FeeParam`] from a decimal gwei string.
    pub fn from_gwei(gwei: &str) -> Result<Self, FeeError> {
        Ok(Self::from_wei(parse_amount(gwei, GWEI_DECIMALS)?))
    }

    /// Amount in wei.
    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Amount in gwei.
    pub fn gwei(&self) -> &str {
        &self.gwei
    }

    /// Human readable amount.
    pub fn display(&self) -> &str {
        &self.display
    }
}

/// Expected time until inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedTime {
    /// Expected wait.
    #[serde(with = "crate::serde::duration")]
    pub amount: Duration,
    /// Human readable wait.
    pub display: String,
}

impl EstimatedTime {
    /// Creates an [`EstimatedTime`].
    pub fn new(amount: Duration) -> Self {
        let secs = amount.as_secs_f64();
        let display = if secs < 60.0 {
            format!("~{} sec", secs.round() as u64)
        } else {
            format!("~{} min", (secs / 60.0).round() as u64)
        };
        Self { amount, display }
    }

    /// Creates an [`EstimatedTime`] from a wait expressed in minutes.
    pub fn from_minutes(minutes: f64) -> Self {
        Self::new(Duration::from_secs_f64(minutes * 60.0))
    }
}

/// Fee parameters of a tier on a network with a dynamic base fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip1559FeeParams {
    /// Tier these parameters belong to.
    pub option: Speed,
    /// Maximum total fee per gas.
    pub max_fee_per_gas: FeeParam,
    /// Tip per gas for the block producer.
    pub max_priority_fee_per_gas: FeeParam,
    /// Expected base fee per gas.
    pub base_fee_per_gas: FeeParam,
    /// Expected time until inclusion.
    pub estimated_time: EstimatedTime,
}

/// Fee parameters of a tier on a network with flat gas pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFeeParams {
    /// Tier these parameters belong to.
    pub option: Speed,
    /// Gas price.
    pub gas_price: FeeParam,
    /// Expected time until inclusion.
    pub estimated_time: EstimatedTime,
}

/// Fee parameters of a single tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GasFeeParams {
    /// Base fee plus priority fee.
    Eip1559(Eip1559FeeParams),
    /// Flat gas price.
    Legacy(LegacyFeeParams),
}

impl GasFeeParams {
    /// Expected time until inclusion.
    pub fn estimated_time(&self) -> &EstimatedTime {
        match self {
            Self::Eip1559(params) => &params.estimated_time,
            Self::Legacy(params) => &params.estimated_time,
        }
    }
}

/// Fee parameters of every tier, in the fee model of the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "tiers", rename_all = "lowercase")]
pub enum GasFeeParamsBySpeed {
    /// Base fee plus priority fee tiers.
    Eip1559(BTreeMap<Speed, Eip1559FeeParams>),
    /// Flat gas price tiers.
    Legacy(BTreeMap<Speed, LegacyFeeParams>),
}

impl GasFeeParamsBySpeed {
    /// Returns the parameters of a tier.
    pub fn get(&self, speed: Speed) -> Option<GasFeeParams> {
        match self {
            Self::Eip1559(tiers) => tiers.get(&speed).cloned().map(GasFeeParams::Eip1559),
            Self::Legacy(tiers) => tiers.get(&speed).cloned().map(GasFeeParams::Legacy),
        }
    }

    /// Whether the tier is present.
    pub fn contains(&self, speed: Speed) -> bool {
        match self {
            Self::Eip1559(tiers) => tiers.contains_key(&speed),
            Self::Legacy(tiers) => tiers.contains_key(&speed),
        }
    }
}

/// Removes trailing zeros of a formatted decimal.
pub(crate) fn trim_decimal(value: &str) -> String {
    if !value.contains('.') {
        return value.to_string();
    }
    value.trim_end_matches('0').trim_end_matches('.').to_string()
}

const GWEI_DECIMALS: u8 = 9;

/// Parses a non-negative decimal amount in whole units into its smallest unit.
///
/// Exponent notation such as `1e-3` is accepted.
pub(crate) fn parse_amount(amount: &str, decimals: u8) -> Result<U256, FeeError> {
    let amount = amount.trim();
    let parsed = match parse_units(amount, decimals) {
        Ok(parsed) => parsed,
        Err(_) => {
            let decimal = Decimal::from_scientific(amount)
                .map_err(|_| FeeError::InvalidAmount(amount.to_string()))?;
            parse_units(&decimal.normalize().to_string(), decimals)?
        }
    };

    match parsed {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(value) if value.is_zero() => Ok(U256::ZERO),
        ParseUnits::I256(_) => Err(FeeError::InvalidAmount(amount.to_string())),
    }
}
