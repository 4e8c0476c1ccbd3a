use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::SbtcApi;
use crate::config::ClientConfig;
use crate::errors::CoreError;
use crate::models::address::WalletAddress;
use crate::models::portfolio::PortfolioStats;
use crate::models::requests::{
    validate_identifier, DepositReceipt, DepositRequest, DepositStatus, WithdrawalReceipt,
    WithdrawalRequest, WithdrawalStatus,
};
use crate::models::transaction::Transaction;

/// JSON-over-HTTPS client for the sBTC API.
///
/// - **Auth**: none yet; every request only carries `Content-Type: application/json`.
/// - **Errors**: any non-2xx status becomes `CoreError::Network`, the code is not interpreted.
/// - **Endpoints**: `/portfolio/{address}`, `/transactions/{address}`, `/deposit`,
///   `/withdrawal`, `/deposit/{txId}/status`, `/withdrawal/{requestId}/status`
pub struct HttpSbtcApi {
    client: Client,
    base_url: String,
}

impl HttpSbtcApi {
    pub fn new(config: &ClientConfig) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path (which must start with `/`).
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "sBTC API request");
        self.client
            .request(method, self.endpoint_url(path))
            .header(CONTENT_TYPE, "application/json")
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let resp = self.request(Method::GET, path).send().await?;
        Self::decode(resp, "GET", path).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp = self.request(Method::POST, path).json(body).send().await?;
        Self::decode(resp, "POST", path).await
    }

    async fn decode<T: DeserializeOwned>(
        resp: Response,
        method: &str,
        path: &str,
    ) -> Result<T, CoreError> {
        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), method, path, "sBTC API returned an error status");
            return Err(CoreError::Network(format!(
                "HTTP error! status: {} ({method} {path})",
                status.as_u16()
            )));
        }
        resp.json::<T>().await.map_err(|e| {
            CoreError::Network(format!("Failed to parse response for {method} {path}: {e}"))
        })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SbtcApi for HttpSbtcApi {
    async fn get_portfolio_stats(
        &self,
        address: &WalletAddress,
    ) -> Result<PortfolioStats, CoreError> {
        self.get_json(&format!("/portfolio/{address}")).await
    }

    async fn get_transactions(
        &self,
        address: &WalletAddress,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.get_json(&format!("/transactions/{address}")).await
    }

    async fn initiate_deposit(
        &self,
        request: &DepositRequest,
    ) -> Result<DepositReceipt, CoreError> {
        self.post_json("/deposit", request).await
    }

    async fn initiate_withdrawal(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalReceipt, CoreError> {
        self.post_json("/withdrawal", request).await
    }

    async fn get_deposit_status(&self, tx_id: &str) -> Result<DepositStatus, CoreError> {
        validate_identifier("txId", tx_id)?;
        self.get_json(&format!("/deposit/{tx_id}/status")).await
    }

    async fn get_withdrawal_status(
        &self,
        request_id: &str,
    ) -> Result<WithdrawalStatus, CoreError> {
        validate_identifier("requestId", request_id)?;
        self.get_json(&format!("/withdrawal/{request_id}/status")).await
    }
}
