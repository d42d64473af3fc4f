use crate::types::WalletAsset;
use std::{
    fmt::Debug,
    sync::{PoisonError, RwLock},
};

/// Wallet asset list, read whenever a fee is selected.
pub trait WalletAssets: Debug + Send + Sync {
    /// Returns the current assets of the wallet.
    fn assets(&self) -> Vec<WalletAsset>;
}

/// An in-memory [`WalletAssets`] that can be replaced at runtime.
#[derive(Debug, Default)]
pub struct StaticWallet {
    assets: RwLock<Vec<WalletAsset>>,
}

impl StaticWallet {
    /// Creates a new [`StaticWallet`] holding `assets`.
    pub fn new(assets: Vec<WalletAsset>) -> Self {
        Self { assets: RwLock::new(assets) }
    }

    /// Replaces the held assets.
    pub fn set_assets(&self, assets: Vec<WalletAsset>) {
        *self.assets.write().unwrap_or_else(PoisonError::into_inner) = assets;
    }
}

impl WalletAssets for StaticWallet {
    fn assets(&self) -> Vec<WalletAsset> {
        self.assets.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
