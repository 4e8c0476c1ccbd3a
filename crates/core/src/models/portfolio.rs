use serde::{Deserialize, Serialize};

/// Snapshot of a wallet's sBTC position as reported by the API.
///
/// Replaced wholesale on every successful fetch; never patched field by field.
/// All amounts are in BTC, all prices in USD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    /// Current sBTC balance
    pub total_balance: f64,

    /// Sum of all completed deposits
    pub total_deposits: f64,

    /// Sum of all completed withdrawals
    pub total_withdrawals: f64,

    /// sBTC price movement over the last 24 hours, in percent
    pub price_change_24h: f64,

    /// Spot BTC price. Older API versions omit it.
    #[serde(default)]
    pub btc_price: f64,

    /// Spot sBTC price. Older API versions omit it.
    #[serde(default)]
    pub sbtc_price: f64,
}

impl PortfolioStats {
    /// USD value of the balance, if a BTC price is known.
    pub fn balance_usd(&self) -> Option<f64> {
        (self.btc_price > 0.0).then(|| self.total_balance * self.btc_price)
    }

    /// sBTC price 24 hours ago, reconstructed from the current price and change.
    pub fn sbtc_price_24h_ago(&self) -> f64 {
        self.sbtc_price * (1.0 - self.price_change_24h / 100.0)
    }
}
