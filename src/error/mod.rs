//! Fee engine error types.
use crate::types::{Network, Speed};
use alloy::primitives::utils::UnitsError;
use thiserror::Error;

mod fetch;
pub use fetch::FetchError;

/// The overarching error type of the fee engine.
#[derive(Debug, Error)]
pub enum FeeError {
    /// A fee source could not be queried.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The quote shape does not match the fee model of the network.
    #[error("quote does not match the fee model of {0}")]
    QuoteMismatch(Network),
    /// The requested tier is not part of the current fee parameters.
    #[error("fee option {0} is not available")]
    MissingOption(Speed),
    /// No fee parameters were received yet.
    #[error("fee parameters are not available yet")]
    FeesUnavailable,
    /// A custom fee was supplied in the wrong fee model.
    #[error("custom fee does not match the fee model of the current network")]
    CustomFeeMismatch,
    /// A decimal amount could not be interpreted.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// Unit conversion failed.
    #[error(transparent)]
    Units(#[from] UnitsError),
    /// No fee source is registered for the network.
    #[error("unsupported network {0}")]
    UnsupportedNetwork(Network),
}
