use serde::{Deserialize, Serialize};

use super::address::WalletAddress;
use super::portfolio::PortfolioStats;
use super::transaction::Transaction;
use crate::format;

/// Result of one aggregate fetch: both reads succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub stats: PortfolioStats,
    /// Server order (newest first), untouched by the client.
    pub transactions: Vec<Transaction>,
}

/// Read model handed to the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// Address the view belongs to; `None` before the first refresh.
    pub address: Option<WalletAddress>,

    pub stats: PortfolioStats,

    /// Unreconciled optimistic entries first, then the server list.
    pub transactions: Vec<Transaction>,

    /// A fetch cycle is in flight.
    pub loading: bool,

    /// Human-readable message from the last failed cycle, cleared when a new one starts.
    pub error: Option<String>,
}

impl DashboardView {
    /// "24h Change" card: current sBTC price against the price 24h ago.
    pub fn change_24h(&self) -> String {
        format::calculate_percentage_change(
            self.stats.sbtc_price,
            self.stats.sbtc_price_24h_ago(),
        )
    }

    pub fn balance_btc(&self) -> String {
        format::format_btc(self.stats.total_balance)
    }

    /// USD equivalent of the balance, hidden while no BTC price is known.
    pub fn balance_usd(&self) -> Option<String> {
        self.stats.balance_usd().map(format::format_usd)
    }

    /// Withdrawals are disabled at zero balance.
    pub fn can_withdraw(&self) -> bool {
        self.stats.total_balance > 0.0
    }

    pub fn pending_count(&self) -> usize {
        self.transactions
            .iter()
            .filter(|t| !t.status.is_final())
            .count()
    }
}
