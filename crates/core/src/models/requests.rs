use serde::{Deserialize, Serialize};

use super::address::WalletAddress;
use super::transaction::TransactionStatus;
use crate::errors::CoreError;

/// Body of `POST /deposit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub amount: f64,
    pub recipient: String,
}

impl DepositRequest {
    /// Build a validated request. Nothing is sent if this fails.
    pub fn new(amount: f64, recipient: &str) -> Result<Self, CoreError> {
        validate_positive("amount", amount)?;
        let recipient = validate_destination("recipient", recipient)?;
        Ok(Self { amount, recipient })
    }
}

/// Body of `POST /withdrawal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub amount: f64,
    pub btc_address: String,
    pub max_fee: f64,
}

impl WithdrawalRequest {
    /// Build a validated request. Nothing is sent if this fails.
    pub fn new(amount: f64, btc_address: &str, max_fee: f64) -> Result<Self, CoreError> {
        validate_positive("amount", amount)?;
        validate_positive("maxFee", max_fee)?;
        let btc_address = validate_destination("btcAddress", btc_address)?;
        Ok(Self {
            amount,
            btc_address,
            max_fee,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceipt {
    /// Bitcoin address the user must send BTC to
    pub deposit_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalReceipt {
    pub request_id: String,
}

/// Response of `GET /deposit/{txId}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositStatus {
    pub status: TransactionStatus,
    pub confirmations: u32,
}

/// Response of `GET /withdrawal/{requestId}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalStatus {
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

// ── Validation helpers ──────────────────────────────────────────────

/// Amounts and fees must be finite and strictly positive.
pub fn validate_positive(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::ValidationError(format!(
            "{field} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

/// Ids used as URL path segments (txids, request ids).
pub fn validate_identifier(field: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::ValidationError(format!("{field} is empty")));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(CoreError::ValidationError(format!(
            "{field} contains invalid character {c:?}"
        )));
    }
    Ok(())
}

// Destination addresses are caller input, so a bad one is a validation
// failure rather than a wallet problem.
fn validate_destination(field: &str, value: &str) -> Result<String, CoreError> {
    WalletAddress::parse(value)
        .map(String::from)
        .map_err(|e| match e {
            CoreError::AddressInvalid(msg) => CoreError::ValidationError(format!("{field}: {msg}")),
            other => other,
        })
}
