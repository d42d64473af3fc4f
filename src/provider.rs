//! Alloy provider extensions.

use crate::error::FetchError;
use alloy::{
    consensus::{SignableTransaction, TxEip1559, TxEnvelope},
    eips::eip2718::Encodable2718,
    primitives::{Address, Bytes, ChainId, Signature, U256, address},
    providers::{DynProvider, Provider},
    sol,
    transports::{TransportErrorKind, TransportResult},
};
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{instrument, trace};
use url::{Host, Url};

/// Address of the OP Stack [GasPriceOracle](https://github.com/ethereum-optimism/optimism/blob/develop/packages/contracts-bedrock/src/L2/GasPriceOracle.sol) predeploy.
pub const GAS_PRICE_ORACLE_ADDRESS: Address =
    address!("0x420000000000000000000000000000000000000F");

sol! {
    #[sol(rpc)]
    contract GasPriceOracle {
        /// Computes the L1 portion of the fee based on the provided unsigned encoded transaction.
        function getL1Fee(bytes memory _data) external view returns (uint256);
    }
}

/// Something that reports the current gas price of a network.
#[async_trait]
pub trait GasPriceSource: Debug + Send + Sync {
    /// Returns the current gas price in wei.
    async fn gas_price(&self) -> Result<u128, FetchError>;
}

#[async_trait]
impl GasPriceSource for DynProvider {
    #[instrument(skip_all)]
    async fn gas_price(&self) -> Result<u128, FetchError> {
        let price = self.get_gas_price().await?;
        trace!(price, "Fetched gas price.");
        Ok(price)
    }
}

/// Extension trait for [`Provider`] adding fee helpers.
pub trait ProviderExt: Provider {
    /// Estimates the L1 data fee of an encoded transaction on an OP rollup.
    fn estimate_l1_fee(
        &self,
        encoded_tx: Bytes,
    ) -> impl Future<Output = TransportResult<U256>> + Send
    where
        Self: Sized,
    {
        async move {
            GasPriceOracle::new(GAS_PRICE_ORACLE_ADDRESS, self)
                .getL1Fee(encoded_tx)
                .call()
                .await
                .map_err(TransportErrorKind::custom)
        }
    }

    /// Estimates the L1 data fee of a transaction with `input` as calldata.
    ///
    /// Every other field is set to its maximum so the estimate is an upper bound.
    fn estimate_l1_fee_for_input(
        &self,
        chain_id: ChainId,
        to: Address,
        input: Bytes,
    ) -> impl Future<Output = TransportResult<U256>> + Send
    where
        Self: Sized,
    {
        async move { self.estimate_l1_fee(max_encoded_transaction(chain_id, to, input)).await }
    }
}

impl<T> ProviderExt for T where T: Provider {}

/// Encodes a signed transaction with all fee and nonce fields set to their maximum.
pub fn max_encoded_transaction(chain_id: ChainId, to: Address, input: Bytes) -> Bytes {
    let tx = TxEip1559 {
        chain_id,
        nonce: u64::MAX,
        gas_limit: u64::MAX,
        max_fee_per_gas: u128::MAX,
        max_priority_fee_per_gas: u128::MAX,
        to: to.into(),
        value: U256::MAX,
        input,
        ..Default::default()
    };
    let signature = Signature::new(U256::MAX, U256::MAX, true);
    TxEnvelope::from(tx.into_signed(signature)).encoded_2718().into()
}

/// Whether an RPC endpoint points at a development chain on this machine.
pub fn is_local_dev_endpoint(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain == "localhost",
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
