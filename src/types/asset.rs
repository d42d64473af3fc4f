use serde::{Deserialize, Serialize};

/// Balance of a wallet asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    /// Decimal amount in whole units, e.g. `"0.5"`.
    pub amount: String,
}

/// Price of a wallet asset in the display currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetPrice {
    /// Price of one whole unit.
    pub value: f64,
}

/// An asset held by the wallet, as reported by the account data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletAsset {
    /// Asset identifier, either `eth` or a token address.
    pub address: String,
    /// Held amount.
    pub balance: AssetBalance,
    /// Latest known price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<AssetPrice>,
}

impl WalletAsset {
    /// Creates a [`WalletAsset`].
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self { address: address.into(), balance: AssetBalance { amount: amount.into() }, price: None }
    }

    /// Sets the price of one whole unit.
    pub fn with_price(mut self, value: f64) -> Self {
        self.price = Some(AssetPrice { value });
        self
    }

    /// Whether this asset is listed under `address`.
    pub fn is(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address)
    }
}

/// Finds the asset listed under `address`.
pub fn find_asset<'a>(assets: &'a [WalletAsset], address: &str) -> Option<&'a WalletAsset> {
    assets.iter().find(|asset| asset.is(address))
}
