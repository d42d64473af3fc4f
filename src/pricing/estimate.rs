use crate::{
    constants::NATIVE_DECIMALS,
    error::FeeError,
    types::{
        FeeAmount, GasFee, GasFeeParamsBySpeed, GasFeesBySpeed, NativeCoin, NativeCurrency,
        NativeValue, Network, WalletAsset, find_asset, trim_decimal,
    },
};
use alloy::primitives::{U256, utils::format_units};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::str::FromStr;

/// Price of the coin fees are paid in, in the display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativePrice {
    /// Coin fees are paid in.
    pub coin: NativeCoin,
    /// Price of one whole coin.
    pub price: Decimal,
}

impl NativePrice {
    /// Creates a new [`NativePrice`].
    pub fn new(coin: NativeCoin, price: Decimal) -> Self {
        Self { coin, price }
    }

    /// Reads the price of the network's pricing asset from the wallet assets.
    ///
    /// An unlisted or unpriced asset is worth zero.
    pub fn from_assets(assets: &[WalletAsset], network: Network) -> Self {
        let price = find_asset(assets, network.price_asset_address())
            .and_then(|asset| asset.price)
            .and_then(|price| Decimal::from_f64(price.value))
            .unwrap_or_default();
        Self::new(network.native_coin(), price)
    }

    /// Expresses a wei amount in the native coin and the display currency.
    pub fn fee_amount(
        &self,
        amount: U256,
        currency: &NativeCurrency,
    ) -> Result<FeeAmount, FeeError> {
        let units = trim_decimal(&format_units(amount, NATIVE_DECIMALS)?);
        let native = Decimal::from_str(&units)
            .ok()
            .and_then(|units| units.checked_mul(self.price))
            .ok_or_else(|| FeeError::InvalidAmount(units.clone()))?;

        Ok(FeeAmount {
            amount,
            display: format!("{units} {}", self.coin),
            native: NativeValue { amount: native, display: currency.format(native) },
        })
    }
}

/// Estimates the cost of every tier for a transaction using `gas_limit` gas.
///
/// `l1_data_fee` is added on top of every estimate.
pub fn estimate_costs(
    params: &GasFeeParamsBySpeed,
    gas_limit: u64,
    price: &NativePrice,
    currency: &NativeCurrency,
    l1_data_fee: Option<U256>,
) -> Result<GasFeesBySpeed, FeeError> {
    let gas_limit = U256::from(gas_limit);
    let l1_data_fee = l1_data_fee.unwrap_or_default();
    let cost = |per_gas: U256| gas_limit.saturating_mul(per_gas).saturating_add(l1_data_fee);

    match params {
        GasFeeParamsBySpeed::Eip1559(tiers) => tiers
            .iter()
            .map(|(&speed, tier)| {
                let estimated = cost(
                    tier.base_fee_per_gas
                        .amount()
                        .saturating_add(tier.max_priority_fee_per_gas.amount()),
                );
                let max = cost(tier.max_fee_per_gas.amount());
                Ok::<_, FeeError>((
                    speed,
                    GasFee::Eip1559 {
                        estimated_fee: price.fee_amount(estimated, currency)?,
                        max_fee: price.fee_amount(max, currency)?,
                    },
                ))
            })
            .collect(),
        GasFeeParamsBySpeed::Legacy(tiers) => tiers
            .iter()
            .map(|(&speed, tier)| {
                let estimated = cost(tier.gas_price.amount());
                let estimated_fee = price.fee_amount(estimated, currency)?;
                Ok::<_, FeeError>((speed, GasFee::Legacy { estimated_fee }))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{ETH_ADDRESS, MATIC_POLYGON_ADDRESS},
        types::{EstimatedTime, FeeParam, LegacyFeeParams, Speed},
    };
    use std::{collections::BTreeMap, time::Duration};

    fn gwei(amount: u64) -> U256 {
        U256::from(amount) * U256::from(1_000_000_000u64)
    }

    fn legacy_params(gas_price: U256) -> GasFeeParamsBySpeed {
        GasFeeParamsBySpeed::Legacy(BTreeMap::from([(
            Speed::Normal,
            LegacyFeeParams {
                option: Speed::Normal,
                gas_price: FeeParam::from_wei(gas_price),
                estimated_time: EstimatedTime::new(Duration::from_secs(60)),
            },
        )]))
    }

    #[test]
    fn pricing_asset() {
        let assets = vec![
            WalletAsset::new(ETH_ADDRESS, "1").with_price(2000.0),
            WalletAsset::new(MATIC_POLYGON_ADDRESS, "10").with_price(0.5),
        ];

        let price = NativePrice::from_assets(&assets, Network::Arbitrum);
        assert_eq!(price.coin, NativeCoin::ETH);
        assert_eq!(price.price, Decimal::from(2000));

        let price = NativePrice::from_assets(&assets, Network::Polygon);
        assert_eq!(price.coin, NativeCoin::MATIC);
        assert_eq!(price.price, Decimal::from_str("0.5").unwrap());

        assert_eq!(NativePrice::from_assets(&[], Network::Mainnet).price, Decimal::ZERO);
    }

    #[test]
    fn legacy_costs() {
        let price = NativePrice::new(NativeCoin::ETH, Decimal::from(2000));
        let fees =
            estimate_costs(&legacy_params(gwei(20)), 21_000, &price, &NativeCurrency::default(), None)
                .unwrap();

        let fee = &fees[&Speed::Normal];
        assert!(fee.max_fee().is_none());
        let estimated = fee.estimated_fee();
        assert_eq!(estimated.amount, U256::from(420_000_000_000_000u64));
        assert_eq!(estimated.display, "0.00042 ETH");
        assert_eq!(estimated.native.amount, Decimal::from_str("0.84").unwrap());
        assert_eq!(estimated.native.display, "$0.84");
    }

    #[test]
    fn l1_data_fee_is_added() {
        let price = NativePrice::new(NativeCoin::ETH, Decimal::ZERO);
        let fees = estimate_costs(
            &legacy_params(gwei(1)),
            21_000,
            &price,
            &NativeCurrency::default(),
            Some(U256::from(1_000)),
        )
        .unwrap();

        assert_eq!(
            fees[&Speed::Normal].estimated_fee().amount,
            U256::from(21_000_000_001_000u64)
        );
    }
}
