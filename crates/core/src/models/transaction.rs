use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of an sBTC transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// BTC locked on Bitcoin, sBTC minted
    Deposit,
    /// sBTC burned, BTC released
    Withdrawal,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "deposit"),
            TransactionType::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// Lifecycle state reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One deposit or withdrawal in a wallet's history.
///
/// Only `status` and `amount` ever change after creation, and only when the
/// remote system confirms the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Amount in BTC. Zero for optimistic placeholders.
    pub amount: f64,

    pub status: TransactionStatus,

    pub timestamp: DateTime<Utc>,

    /// Bitcoin transaction id, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

impl Transaction {
    /// Placeholder for a deposit the user just broadcast.
    /// The Bitcoin txid doubles as the entry id.
    pub fn optimistic_deposit(tx_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let tx_id = tx_id.into();
        Self {
            id: tx_id.clone(),
            kind: TransactionType::Deposit,
            amount: 0.0,
            status: TransactionStatus::Pending,
            timestamp: now,
            tx_id: Some(tx_id),
        }
    }

    /// Placeholder for a withdrawal request the API just accepted.
    pub fn optimistic_withdrawal(request_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: request_id.into(),
            kind: TransactionType::Withdrawal,
            amount: 0.0,
            status: TransactionStatus::Pending,
            timestamp: now,
            tx_id: None,
        }
    }

    /// Whether `other` describes the same operation, by id or Bitcoin txid.
    pub fn refers_to_same(&self, other: &Transaction) -> bool {
        let mut mine = std::iter::once(self.id.as_str()).chain(self.tx_id.as_deref());
        mine.any(|key| other.id == key || other.tx_id.as_deref() == Some(key))
    }
}
