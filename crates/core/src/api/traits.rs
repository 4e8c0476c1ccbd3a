use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::address::WalletAddress;
use crate::models::portfolio::PortfolioStats;
use crate::models::requests::{
    DepositReceipt, DepositRequest, DepositStatus, WithdrawalReceipt, WithdrawalRequest,
    WithdrawalStatus,
};
use crate::models::transaction::Transaction;

/// The remote sBTC API, as seen by the dashboard.
///
/// `HttpSbtcApi` is the production implementation; tests plug in mocks.
/// Implementations treat every non-2xx response as `CoreError::Network`
/// and never retry.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SbtcApi: Send + Sync {
    /// `GET /portfolio/{address}`
    async fn get_portfolio_stats(&self, address: &WalletAddress)
        -> Result<PortfolioStats, CoreError>;

    /// `GET /transactions/{address}` — newest first, as the server orders them.
    async fn get_transactions(&self, address: &WalletAddress)
        -> Result<Vec<Transaction>, CoreError>;

    /// `POST /deposit`
    async fn initiate_deposit(&self, request: &DepositRequest)
        -> Result<DepositReceipt, CoreError>;

    /// `POST /withdrawal`
    async fn initiate_withdrawal(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalReceipt, CoreError>;

    /// `GET /deposit/{txId}/status`
    async fn get_deposit_status(&self, tx_id: &str) -> Result<DepositStatus, CoreError>;

    /// `GET /withdrawal/{requestId}/status`
    async fn get_withdrawal_status(&self, request_id: &str)
        -> Result<WithdrawalStatus, CoreError>;
}
