use crate::{
    constants::DEFAULT_CONFIRMATION_TIME,
    error::FeeError,
    sources::{Eip1559Quote, LegacyQuote, PricedWait, RawQuote},
    types::{
        BaseFeeTrend, ConfirmationTimes, CurrentBlockParams, Eip1559FeeParams, EstimatedTime,
        FeeParam, GasFeeParamsBySpeed, LegacyFeeParams, Network, Speed,
    },
};
use alloy::primitives::U256;
use std::{collections::BTreeMap, time::Duration};
use tracing::warn;

/// Fee data derived from a single quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFees {
    /// Fee parameters of every tier, `custom` included.
    pub params: GasFeeParamsBySpeed,
    /// Fee conditions of the latest block, dynamic base fee networks only.
    pub current_block_params: Option<CurrentBlockParams>,
    /// Expected confirmation times, dynamic base fee networks only.
    pub confirmation_times: Option<ConfirmationTimes>,
}

/// Converts a raw quote into the fee parameters of every tier.
///
/// The fee model is picked by `network`; a quote of the other model is rejected. Returns
/// `None` if the quote carries no usable tiers.
pub fn normalize(quote: RawQuote, network: Network) -> Result<Option<NormalizedFees>, FeeError> {
    match (quote, network.supports_eip1559()) {
        (RawQuote::Eip1559(quote), true) => Ok(normalize_eip1559(quote)),
        (RawQuote::Legacy(quote), false) => Ok(Some(normalize_legacy(quote))),
        _ => Err(FeeError::QuoteMismatch(network)),
    }
}

fn normalize_eip1559(quote: Eip1559Quote) -> Option<NormalizedFees> {
    if quote.tiers.is_empty() {
        return None;
    }
    if let Some(missing) = Speed::QUOTED.iter().find(|speed| !quote.tiers.contains_key(speed)) {
        warn!(%missing, "Quote is missing a tier.");
        return None;
    }

    let base_fee_per_gas = FeeParam::from_wei(quote.base_fee_suggestion);
    let mut tiers = quote
        .tiers
        .iter()
        .map(|(&option, tier)| {
            let params = Eip1559FeeParams {
                option,
                max_fee_per_gas: FeeParam::from_wei(tier.max_fee_per_gas),
                max_priority_fee_per_gas: FeeParam::from_wei(tier.max_priority_fee_per_gas),
                base_fee_per_gas: base_fee_per_gas.clone(),
                estimated_time: confirmation_time(
                    &quote.confirmation_time_by_priority_fee,
                    tier.max_priority_fee_per_gas,
                ),
            };
            (option, params)
        })
        .collect::<BTreeMap<_, _>>();

    if let Some(urgent) = tiers.get(&Speed::Urgent).cloned() {
        tiers.insert(Speed::Custom, Eip1559FeeParams { option: Speed::Custom, ..urgent });
    }

    Some(NormalizedFees {
        params: GasFeeParamsBySpeed::Eip1559(tiers),
        current_block_params: Some(CurrentBlockParams {
            base_fee_per_gas: FeeParam::from_wei(quote.current_base_fee),
            trend: BaseFeeTrend::from(quote.trend),
        }),
        confirmation_times: Some(quote.confirmation_time_by_priority_fee),
    })
}

/// Expected time for a priority fee: the fastest confirmation it pays for, else the slowest
/// known one.
pub(crate) fn confirmation_time(times: &ConfirmationTimes, priority_fee: U256) -> EstimatedTime {
    let secs = times
        .iter()
        .find(|(_, fee)| **fee <= priority_fee)
        .or_else(|| times.last_key_value())
        .map(|(secs, _)| Duration::from_secs(*secs))
        .unwrap_or(DEFAULT_CONFIRMATION_TIME);
    EstimatedTime::new(secs)
}

fn normalize_legacy(quote: LegacyQuote) -> NormalizedFees {
    let (normal, fast, urgent) = match quote.fastest {
        Some(fastest) => (quote.average, quote.fast, fastest),
        None => (quote.safe_low.unwrap_or(quote.average), quote.average, quote.fast),
    };

    let tier = |option: Speed, priced: PricedWait| LegacyFeeParams {
        option,
        gas_price: FeeParam::from_wei(priced.price),
        estimated_time: EstimatedTime::new(priced.wait),
    };

    let tiers = BTreeMap::from([
        (Speed::Normal, tier(Speed::Normal, normal)),
        (Speed::Fast, tier(Speed::Fast, fast)),
        (Speed::Urgent, tier(Speed::Urgent, urgent)),
        (Speed::Custom, tier(Speed::Custom, urgent)),
    ]);

    NormalizedFees {
        params: GasFeeParamsBySpeed::Legacy(tiers),
        current_block_params: None,
        confirmation_times: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{ArbitrumGasPrices, Eip1559TierQuote, PolygonStationPrices};

    fn gwei(amount: u64) -> U256 {
        U256::from(amount) * U256::from(1_000_000_000u64)
    }

    fn eip1559_quote() -> Eip1559Quote {
        let tier = |priority: u64| Eip1559TierQuote {
            max_fee_per_gas: gwei(30 + priority),
            max_priority_fee_per_gas: gwei(priority),
        };
        Eip1559Quote {
            tiers: BTreeMap::from([
                (Speed::Normal, tier(1)),
                (Speed::Fast, tier(2)),
                (Speed::Urgent, tier(3)),
            ]),
            base_fee_suggestion: gwei(30),
            current_base_fee: gwei(28),
            trend: -1,
            confirmation_time_by_priority_fee: BTreeMap::from([
                (15, gwei(3)),
                (30, gwei(2)),
                (60, gwei(1)),
            ]),
        }
    }

    #[test]
    fn eip1559_tiers() {
        let fees = normalize(RawQuote::Eip1559(eip1559_quote()), Network::Mainnet)
            .unwrap()
            .unwrap();
        let GasFeeParamsBySpeed::Eip1559(tiers) = &fees.params else {
            panic!("expected eip1559 params");
        };

        assert_eq!(tiers.len(), 4);
        let fast = &tiers[&Speed::Fast];
        assert_eq!(fast.max_fee_per_gas.amount(), gwei(32));
        assert_eq!(fast.max_priority_fee_per_gas.amount(), gwei(2));
        assert_eq!(fast.base_fee_per_gas.amount(), gwei(30));
        assert_eq!(fast.estimated_time.amount, Duration::from_secs(30));

        let custom = &tiers[&Speed::Custom];
        assert_eq!(custom.option, Speed::Custom);
        assert_eq!(custom.max_fee_per_gas, tiers[&Speed::Urgent].max_fee_per_gas);

        let block = fees.current_block_params.unwrap();
        assert_eq!(block.base_fee_per_gas.amount(), gwei(28));
        assert_eq!(block.trend, BaseFeeTrend::Falling);
        assert_eq!(fees.confirmation_times.unwrap().len(), 3);
    }

    #[test]
    fn confirmation_times() {
        let times = eip1559_quote().confirmation_time_by_priority_fee;
        assert_eq!(confirmation_time(&times, gwei(5)).amount, Duration::from_secs(15));
        assert_eq!(confirmation_time(&times, gwei(1)).amount, Duration::from_secs(60));
        // below every known fee
        assert_eq!(confirmation_time(&times, U256::from(1)).amount, Duration::from_secs(60));
        assert_eq!(
            confirmation_time(&ConfirmationTimes::new(), gwei(1)).amount,
            DEFAULT_CONFIRMATION_TIME
        );
    }

    #[test]
    fn empty_quote_has_no_data() {
        let mut quote = eip1559_quote();
        quote.tiers.clear();
        assert_eq!(normalize(RawQuote::Eip1559(quote), Network::Mainnet).unwrap(), None);

        let mut quote = eip1559_quote();
        quote.tiers.remove(&Speed::Fast);
        assert_eq!(normalize(RawQuote::Eip1559(quote), Network::Goerli).unwrap(), None);
    }

    #[test]
    fn rejects_mismatched_quotes() {
        let quote = RawQuote::Eip1559(eip1559_quote());
        assert!(matches!(
            normalize(quote, Network::Polygon),
            Err(FeeError::QuoteMismatch(Network::Polygon))
        ));

        let quote = RawQuote::Legacy(ArbitrumGasPrices::quote_from_price(gwei(1)));
        assert!(matches!(
            normalize(quote, Network::Mainnet),
            Err(FeeError::QuoteMismatch(Network::Mainnet))
        ));
    }

    #[test]
    fn polygon_tiers() {
        let quote = PolygonStationPrices {
            safe_gas_price: "30.2".to_string(),
            propose_gas_price: "35.8".to_string(),
            fast_gas_price: "40.1".to_string(),
        }
        .into_quote()
        .unwrap();
        let fees = normalize(RawQuote::Legacy(quote), Network::Polygon).unwrap().unwrap();
        let GasFeeParamsBySpeed::Legacy(tiers) = &fees.params else {
            panic!("expected legacy params");
        };

        assert_eq!(tiers[&Speed::Normal].gas_price.amount(), gwei(31));
        assert_eq!(tiers[&Speed::Fast].gas_price.amount(), gwei(36));
        assert_eq!(tiers[&Speed::Urgent].gas_price.amount(), gwei(41));
        assert_eq!(tiers[&Speed::Custom].gas_price.amount(), gwei(41));
        assert_eq!(tiers[&Speed::Urgent].estimated_time.display, "~12 sec");
        assert!(fees.current_block_params.is_none());
    }

    #[test]
    fn arbitrum_tiers() {
        let quote = ArbitrumGasPrices::quote_from_price(gwei(1));
        let fees = normalize(RawQuote::Legacy(quote), Network::Arbitrum).unwrap().unwrap();
        let GasFeeParamsBySpeed::Legacy(tiers) = &fees.params else {
            panic!("expected legacy params");
        };

        assert_eq!(tiers[&Speed::Normal].gas_price.gwei(), "0.4");
        assert_eq!(tiers[&Speed::Fast].gas_price.gwei(), "0.5");
        assert_eq!(tiers[&Speed::Urgent].gas_price.gwei(), "0.7");
        assert_eq!(tiers[&Speed::Normal].estimated_time.display, "~1 min");
    }

    #[test]
    fn deterministic() {
        let first = normalize(RawQuote::Eip1559(eip1559_quote()), Network::Mainnet).unwrap();
        let second = normalize(RawQuote::Eip1559(eip1559_quote()), Network::Mainnet).unwrap();
        assert_eq!(first, second);
    }
}
