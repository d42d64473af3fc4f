//! Selection of the fee the user is about to pay, and the balance check against it.

use crate::{
    constants::NATIVE_DECIMALS,
    error::FeeError,
    types::{
        GasFeeParamsBySpeed, GasFeesBySpeed, Network, SelectedGasFee, Speed, WalletAsset,
        find_asset, parse_amount,
    },
};
use alloy::primitives::U256;
use tracing::warn;

/// Outcome of [`select_fee`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSelection {
    /// Whether the wallet can cover the selected fee.
    pub is_sufficient_gas: bool,
    /// The selected tier.
    pub selected_gas_fee: SelectedGasFee,
}

/// Resolves the tier to select: `requested` if present in `params`, otherwise
/// [`Speed::Normal`].
pub fn resolve_option(params: &GasFeeParamsBySpeed, requested: Option<Speed>) -> Speed {
    requested.filter(|speed| params.contains(*speed)).unwrap_or(Speed::Normal)
}

/// Balance of the network's native gas asset in wei.
///
/// An unlisted asset, or one with an unreadable or negative balance, holds nothing.
pub fn native_balance(assets: &[WalletAsset], network: Network) -> U256 {
    let Some(asset) = find_asset(assets, network.native_asset_address()) else {
        return U256::ZERO;
    };
    parse_amount(&asset.balance.amount, NATIVE_DECIMALS)
        .inspect_err(|err| warn!(%network, %err, "Invalid native balance, assuming zero"))
        .unwrap_or_default()
}

/// Selects `option` and checks whether the wallet can pay for it.
///
/// `option` must be present in both `params` and `fees`, use [`resolve_option`] first.
pub fn select_fee(
    assets: &[WalletAsset],
    params: &GasFeeParamsBySpeed,
    fees: &GasFeesBySpeed,
    option: Speed,
    network: Network,
) -> Result<FeeSelection, FeeError> {
    let gas_fee_params = params.get(option).ok_or(FeeError::MissingOption(option))?;
    let gas_fee = fees.get(&option).ok_or(FeeError::MissingOption(option))?.clone();

    let is_sufficient_gas = native_balance(assets, network) >= gas_fee.required_amount().amount;

    Ok(FeeSelection {
        is_sufficient_gas,
        selected_gas_fee: SelectedGasFee {
            option,
            estimated_time: gas_fee_params.estimated_time().clone(),
            gas_fee_params,
            gas_fee,
        },
    })
}
