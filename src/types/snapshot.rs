use super::{FeeParam, GasFee, GasFeeParams, GasFeeParamsBySpeed, GasFeesBySpeed, Network, Speed};
use crate::types::EstimatedTime;
use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction the base fee is moving in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseFeeTrend {
    /// Base fee is going down.
    Falling,
    /// Base fee is flat.
    #[default]
    Stable,
    /// Base fee is going up.
    Rising,
    /// Base fee is going up fast.
    Surging,
}

impl From<i64> for BaseFeeTrend {
    fn from(trend: i64) -> Self {
        match trend {
            i64::MIN..=-1 => Self::Falling,
            1 => Self::Rising,
            2..=i64::MAX => Self::Surging,
            _ => Self::Stable,
        }
    }
}

/// Fee conditions of the latest block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBlockParams {
    /// Base fee of the latest block.
    pub base_fee_per_gas: FeeParam,
    /// Where the base fee is heading.
    pub trend: BaseFeeTrend,
}

/// Expected confirmation time, in seconds, mapped to the priority fee (wei) needed for it.
pub type ConfirmationTimes = BTreeMap<u64, U256>;

/// The tier the user is about to pay with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedGasFee {
    /// Selected tier.
    pub option: Speed,
    /// Fee parameters of the tier.
    pub gas_fee_params: GasFeeParams,
    /// Cost estimate of the tier.
    pub gas_fee: GasFee,
    /// Expected time until inclusion.
    pub estimated_time: EstimatedTime,
}

/// The complete fee estimation state published after every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSnapshot {
    /// Gas limit used when no explicit one was set.
    pub default_gas_limit: u64,
    /// Gas limit of the pending transaction.
    pub gas_limit: Option<u64>,
    /// Fee parameters of every tier.
    pub gas_fee_params_by_speed: Option<GasFeeParamsBySpeed>,
    /// Cost estimates of every tier.
    pub gas_fees_by_speed: Option<GasFeesBySpeed>,
    /// The tier the user is about to pay with.
    pub selected_gas_fee: Option<SelectedGasFee>,
    /// Whether the wallet can cover the selected fee, unknown until fees are known.
    pub is_sufficient_gas: Option<bool>,
    /// Network being polled.
    pub tx_network: Option<Network>,
    /// Fee conditions of the latest block.
    pub current_block_params: Option<CurrentBlockParams>,
    /// Expected confirmation times by priority fee.
    pub confirmation_time_by_priority_fee: Option<ConfirmationTimes>,
    /// Whether the user edited the custom tier.
    pub custom_gas_fee_modified_by_user: bool,
    /// L1 data fee of the pending transaction on Optimism.
    pub l1_gas_fee_optimism: Option<FeeParam>,
    /// When a poll last updated fee data.
    pub last_updated: Option<DateTime<Utc>>,
}

impl FeeSnapshot {
    /// Returns an empty snapshot.
    pub fn new(default_gas_limit: u64) -> Self {
        Self {
            default_gas_limit,
            gas_limit: None,
            gas_fee_params_by_speed: None,
            gas_fees_by_speed: None,
            selected_gas_fee: None,
            is_sufficient_gas: None,
            tx_network: None,
            current_block_params: None,
            confirmation_time_by_priority_fee: None,
            custom_gas_fee_modified_by_user: false,
            l1_gas_fee_optimism: None,
            last_updated: None,
        }
    }

    /// Gas limit fees are estimated for.
    pub fn effective_gas_limit(&self) -> u64 {
        self.gas_limit.unwrap_or(self.default_gas_limit)
    }

    /// Currently selected tier.
    pub fn selected_option(&self) -> Option<Speed> {
        self.selected_gas_fee.as_ref().map(|fee| fee.option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_from_oracle() {
        assert_eq!(BaseFeeTrend::from(-1), BaseFeeTrend::Falling);
        assert_eq!(BaseFeeTrend::from(0), BaseFeeTrend::Stable);
        assert_eq!(BaseFeeTrend::from(1), BaseFeeTrend::Rising);
        assert_eq!(BaseFeeTrend::from(2), BaseFeeTrend::Surging);
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = FeeSnapshot::new(21_000);
        assert_eq!(snapshot.effective_gas_limit(), 21_000);
        assert_eq!(snapshot.is_sufficient_gas, None);
        assert_eq!(snapshot.selected_option(), None);
    }
}
