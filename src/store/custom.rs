use crate::{
    error::FeeError,
    pricing::confirmation_time,
    types::{
        ConfirmationTimes, Eip1559FeeParams, FeeParam, GasFeeParamsBySpeed, LegacyFeeParams, Speed,
    },
};

/// Fee the user entered for the `custom` tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomGasFee {
    /// Base fee plus priority fee network.
    Eip1559 {
        /// Maximum total fee per gas.
        max_fee_per_gas: FeeParam,
        /// Tip per gas.
        max_priority_fee_per_gas: FeeParam,
    },
    /// Flat gas price network.
    Legacy {
        /// Gas price.
        gas_price: FeeParam,
    },
}

impl CustomGasFee {
    /// Creates an EIP-1559 custom fee from decimal gwei amounts.
    pub fn eip1559_gwei(
        max_fee_per_gas: &str,
        max_priority_fee_per_gas: &str,
    ) -> Result<Self, FeeError> {
        Ok(Self::Eip1559 {
            max_fee_per_gas: FeeParam::from_gwei(max_fee_per_gas)?,
            max_priority_fee_per_gas: FeeParam::from_gwei(max_priority_fee_per_gas)?,
        })
    }

    /// Creates a legacy custom fee from a decimal gwei amount.
    pub fn legacy_gwei(gas_price: &str) -> Result<Self, FeeError> {
        Ok(Self::Legacy { gas_price: FeeParam::from_gwei(gas_price)? })
    }

    /// Rebuilds the `custom` tier of `params` from this fee.
    pub(crate) fn apply(
        self,
        params: &mut GasFeeParamsBySpeed,
        confirmation_times: Option<&ConfirmationTimes>,
    ) -> Result<(), FeeError> {
        match (self, params) {
            (
                Self::Eip1559 { max_fee_per_gas, max_priority_fee_per_gas },
                GasFeeParamsBySpeed::Eip1559(tiers),
            ) => {
                let base_fee_per_gas = tiers
                    .get(&Speed::Custom)
                    .or_else(|| tiers.get(&Speed::Urgent))
                    .map(|tier| tier.base_fee_per_gas.clone())
                    .ok_or(FeeError::FeesUnavailable)?;
                let estimated_time = confirmation_time(
                    confirmation_times.unwrap_or(&ConfirmationTimes::new()),
                    max_priority_fee_per_gas.amount(),
                );

                tiers.insert(
                    Speed::Custom,
                    Eip1559FeeParams {
                        option: Speed::Custom,
                        max_fee_per_gas,
                        max_priority_fee_per_gas,
                        base_fee_per_gas,
                        estimated_time,
                    },
                );
            }
            (Self::Legacy { gas_price }, GasFeeParamsBySpeed::Legacy(tiers)) => {
                // fastest quoted tier the price pays for, else the slowest
                let estimated_time = Speed::QUOTED
                    .iter()
                    .rev()
                    .filter_map(|speed| tiers.get(speed))
                    .find(|tier| tier.gas_price.amount() <= gas_price.amount())
                    .or_else(|| tiers.get(&Speed::Normal))
                    .map(|tier| tier.estimated_time.clone())
                    .ok_or(FeeError::FeesUnavailable)?;

                tiers.insert(
                    Speed::Custom,
                    LegacyFeeParams { option: Speed::Custom, gas_price, estimated_time },
                );
            }
            _ => return Err(FeeError::CustomFeeMismatch),
        }
        Ok(())
    }
}

/// Carries the user's `custom` tier from `previous` into freshly polled `params`.
///
/// EIP-1559 tiers only take the new base fee; legacy tiers are kept as they are.
pub(crate) fn preserve_custom(params: &mut GasFeeParamsBySpeed, previous: &GasFeeParamsBySpeed) {
    match (params, previous) {
        (GasFeeParamsBySpeed::Eip1559(tiers), GasFeeParamsBySpeed::Eip1559(previous)) => {
            let Some(custom) = previous.get(&Speed::Custom) else { return };
            let Some(base_fee_per_gas) =
                tiers.get(&Speed::Normal).map(|tier| tier.base_fee_per_gas.clone())
            else {
                return;
            };
            tiers.insert(Speed::Custom, Eip1559FeeParams { base_fee_per_gas, ..custom.clone() });
        }
        (GasFeeParamsBySpeed::Legacy(tiers), GasFeeParamsBySpeed::Legacy(previous)) => {
            if let Some(custom) = previous.get(&Speed::Custom) {
                tiers.insert(Speed::Custom, custom.clone());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EstimatedTime;
    use alloy::primitives::U256;
    use std::{collections::BTreeMap, time::Duration};

    fn gwei(amount: u64) -> FeeParam {
        FeeParam::from_wei(U256::from(amount) * U256::from(1_000_000_000u64))
    }

    fn legacy_tiers() -> GasFeeParamsBySpeed {
        let tier = |option, price, secs| LegacyFeeParams {
            option,
            gas_price: gwei(price),
            estimated_time: EstimatedTime::new(Duration::from_secs(secs)),
        };
        GasFeeParamsBySpeed::Legacy(BTreeMap::from([
            (Speed::Normal, tier(Speed::Normal, 10, 60)),
            (Speed::Fast, tier(Speed::Fast, 20, 30)),
            (Speed::Urgent, tier(Speed::Urgent, 30, 12)),
            (Speed::Custom, tier(Speed::Custom, 30, 12)),
        ]))
    }

    #[test]
    fn legacy_custom_time() {
        let mut params = legacy_tiers();
        CustomGasFee::legacy_gwei("25").unwrap().apply(&mut params, None).unwrap();

        let custom = params.get(Speed::Custom).unwrap();
        assert_eq!(custom.estimated_time().amount, Duration::from_secs(30));

        let mut params = legacy_tiers();
        CustomGasFee::legacy_gwei("1").unwrap().apply(&mut params, None).unwrap();
        assert_eq!(
            params.get(Speed::Custom).unwrap().estimated_time().amount,
            Duration::from_secs(60)
        );
    }

    #[test]
    fn negative_custom_fees_are_rejected() {
        let rejected = |fee: Result<CustomGasFee, FeeError>| {
            matches!(fee, Err(FeeError::InvalidAmount(_)))
        };
        assert!(rejected(CustomGasFee::eip1559_gwei("-50", "2")));
        assert!(rejected(CustomGasFee::eip1559_gwei("50", "-2")));
        assert!(rejected(CustomGasFee::legacy_gwei("-25")));
        assert!(CustomGasFee::eip1559_gwei("5e1", "2").is_ok());
    }

    #[test]
    fn mismatched_custom_fee() {
        let mut params = legacy_tiers();
        assert!(matches!(
            CustomGasFee::eip1559_gwei("50", "2").unwrap().apply(&mut params, None),
            Err(FeeError::CustomFeeMismatch)
        ));
    }

    #[test]
    fn legacy_custom_is_kept() {
        let mut previous = legacy_tiers();
        CustomGasFee::legacy_gwei("25").unwrap().apply(&mut previous, None).unwrap();

        let mut params = legacy_tiers();
        preserve_custom(&mut params, &previous);
        assert_eq!(params.get(Speed::Custom), previous.get(Speed::Custom));
    }
}
