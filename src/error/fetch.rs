use crate::types::Network;
use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

/// Errors raised while fetching a quote from a fee source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The RPC call failed.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    /// The source answered with a payload we could not interpret.
    #[error("invalid fee source response: {0}")]
    InvalidResponse(String),
    /// The source does not serve this network.
    #[error("fee source does not support {0}")]
    UnsupportedNetwork(Network),
}
