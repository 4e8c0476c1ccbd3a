use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;
use crate::models::transaction::Transaction;

/// What happens to optimistic entries when a fresh server list arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Drop an optimistic entry only once the server reports the same
    /// operation (matched by id or Bitcoin txid). Unmatched entries stay.
    #[default]
    MergeById,
    /// Last fetch wins: the server list replaces everything, optimistic
    /// entries included.
    ReplaceWithServer,
}

impl FromStr for ReconcilePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" | "merge_by_id" => Ok(ReconcilePolicy::MergeById),
            "replace" | "replace_with_server" => Ok(ReconcilePolicy::ReplaceWithServer),
            other => Err(CoreError::Config(format!(
                "unknown reconcile policy {other:?} (expected \"merge\" or \"replace\")"
            ))),
        }
    }
}

/// Outcome of merging one server list into local state.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Optimistic entries still waiting for the server, newest first.
    pub pending: Vec<Transaction>,
    /// What the UI shows: `pending` followed by the server list.
    pub displayed: Vec<Transaction>,
    /// How many optimistic entries the server list confirmed.
    pub confirmed: usize,
    /// How many optimistic entries were dropped without confirmation.
    pub discarded: usize,
}

/// Merges optimistic placeholders with authoritative server data.
///
/// Pure business logic — no I/O, no clocks. Easy to test.
pub struct ReconcileService {
    policy: ReconcilePolicy,
}

impl ReconcileService {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Put a new optimistic entry at the head of the pending list.
    /// An entry for an operation already pending replaces the old one.
    pub fn push_optimistic(&self, pending: &mut Vec<Transaction>, entry: Transaction) {
        pending.retain(|p| !p.refers_to_same(&entry));
        pending.insert(0, entry);
    }

    /// Merge a fresh server list with the local optimistic entries.
    pub fn reconcile(&self, pending: &[Transaction], server: &[Transaction]) -> Reconciled {
        match self.policy {
            ReconcilePolicy::ReplaceWithServer => Reconciled {
                pending: Vec::new(),
                displayed: server.to_vec(),
                confirmed: 0,
                discarded: pending.len(),
            },
            ReconcilePolicy::MergeById => {
                let (confirmed, still_pending): (Vec<&Transaction>, Vec<&Transaction>) = pending
                    .iter()
                    .partition(|p| server.iter().any(|s| p.refers_to_same(s)));

                let still_pending: Vec<Transaction> =
                    still_pending.into_iter().cloned().collect();
                let displayed = Self::compose(&still_pending, server);

                Reconciled {
                    pending: still_pending,
                    displayed,
                    confirmed: confirmed.len(),
                    discarded: 0,
                }
            }
        }
    }

    /// Displayed list: pending entries first, then server entries in server order.
    pub fn compose(pending: &[Transaction], server: &[Transaction]) -> Vec<Transaction> {
        pending.iter().chain(server.iter()).cloned().collect()
    }
}

impl Default for ReconcileService {
    fn default() -> Self {
        Self::new(ReconcilePolicy::default())
    }
}
