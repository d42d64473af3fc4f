//! # Gas fees
//!
//! Library for estimating transaction fees across EIP-1559 and L2 networks.
//!
//! A [`poller::FeePoller`] fetches fee quotes from the [`sources`] of a network, the
//! [`pricing`] module turns them into per-tier fee parameters and costs, and the
//! [`store::FeeStore`] publishes the resulting [`types::FeeSnapshot`] to subscribers.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod poller;
pub mod pricing;
pub mod provider;
pub mod selection;
pub mod serde;
pub mod sources;
pub mod spawn;
pub mod store;
pub mod types;
