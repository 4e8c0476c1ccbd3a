pub mod api;
pub mod config;
pub mod errors;
pub mod format;
pub mod models;
pub mod services;

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use api::http::HttpSbtcApi;
use api::traits::SbtcApi;
use config::ClientConfig;
use errors::CoreError;
use models::{
    address::WalletAddress,
    dashboard::{DashboardSnapshot, DashboardView},
    portfolio::PortfolioStats,
    requests::{
        validate_identifier, DepositRequest, DepositStatus, WithdrawalRequest, WithdrawalStatus,
    },
    transaction::{Transaction, TransactionStatus, TransactionType},
};
use services::reconcile_service::{ReconcilePolicy, ReconcileService};

/// Prefix of the message shown when a refresh cycle fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load portfolio data";

/// Everything the dashboard knows between fetches.
#[derive(Debug, Default)]
struct SyncState {
    view: DashboardView,
    /// Optimistic entries not yet seen in a server list, newest first.
    pending: Vec<Transaction>,
    /// Last server transaction list, in server order.
    server: Vec<Transaction>,
    /// Bumped on every fetch cycle and on disconnect. A response is applied
    /// only if the generation it started under is still current.
    generation: u64,
}

/// Main entry point for the sBTC portfolio core library.
///
/// Owns the API client and the dashboard read model. Construct one per
/// connected wallet session and call [`disconnect`](Self::disconnect) when the
/// wallet goes away. All methods take `&self`; the internal lock is never held
/// across an `.await`.
#[must_use]
pub struct PortfolioSyncClient {
    api: Arc<dyn SbtcApi>,
    reconciler: ReconcileService,
    state: Mutex<SyncState>,
}

impl std::fmt::Debug for PortfolioSyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("PortfolioSyncClient")
            .field("policy", &self.reconciler.policy())
            .field("address", &state.view.address)
            .field("transactions", &state.view.transactions.len())
            .field("pending", &state.pending.len())
            .field("generation", &state.generation)
            .finish()
    }
}

impl PortfolioSyncClient {
    /// Wrap any `SbtcApi` implementation.
    pub fn new(api: Arc<dyn SbtcApi>, policy: ReconcilePolicy) -> Self {
        Self {
            api,
            reconciler: ReconcileService::new(policy),
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Talk to the real HTTP API described by `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(HttpSbtcApi::new(config)),
            config.reconcile_policy,
        )
    }

    /// Reconciliation policy this client was built with.
    pub fn policy(&self) -> ReconcilePolicy {
        self.reconciler.policy()
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Portfolio stats for one address, without touching the read model.
    pub async fn get_portfolio_stats(&self, address: &str) -> Result<PortfolioStats, CoreError> {
        let address = WalletAddress::parse(address)?;
        self.api.get_portfolio_stats(&address).await
    }

    /// Transaction history, newest first as the server returns it.
    pub async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>, CoreError> {
        let address = WalletAddress::parse(address)?;
        self.api.get_transactions(&address).await
    }

    /// Issue both dashboard reads concurrently. Fails as a whole if either fails.
    pub async fn fetch_snapshot(&self, address: &str) -> Result<DashboardSnapshot, CoreError> {
        let address = WalletAddress::parse(address)?;
        self.fetch_snapshot_for(&address).await
    }

    async fn fetch_snapshot_for(
        &self,
        address: &WalletAddress,
    ) -> Result<DashboardSnapshot, CoreError> {
        let (stats, transactions) = tokio::try_join!(
            self.api.get_portfolio_stats(address),
            self.api.get_transactions(address),
        )?;
        Ok(DashboardSnapshot {
            stats,
            transactions,
        })
    }

    /// Run one fetch cycle for `address` and apply it to the read model.
    ///
    /// On failure the error message is recorded in the view and the previous
    /// stats and transactions are kept. If a newer cycle (or a disconnect)
    /// started while this one was in flight, the response is dropped and the
    /// view is returned as it stands. An invalid address counts as a new
    /// cycle, so it also supersedes any refresh still in flight.
    pub async fn refresh(&self, address: &str) -> Result<DashboardView, CoreError> {
        let address = match WalletAddress::parse(address) {
            Ok(a) => a,
            Err(e) => {
                let mut state = self.state();
                state.generation += 1;
                state.view.loading = false;
                state.view.error = Some(format!("{LOAD_FAILED_MESSAGE}: {e}"));
                return Err(e);
            }
        };

        let ticket = {
            let mut state = self.state();
            state.generation += 1;
            state.view.loading = true;
            state.view.error = None;
            state.generation
        };
        debug!(%address, generation = ticket, "refreshing portfolio");

        let result = self.fetch_snapshot_for(&address).await;

        let mut state = self.state();
        if state.generation != ticket {
            debug!(
                %address,
                generation = ticket,
                current = state.generation,
                "discarding stale portfolio response"
            );
            return result.map(|_| state.view.clone());
        }

        state.view.loading = false;
        match result {
            Ok(snapshot) => {
                self.apply_snapshot(&mut state, address, snapshot);
                Ok(state.view.clone())
            }
            Err(e) => {
                warn!(%address, error = %e, "portfolio refresh failed");
                state.view.error = Some(format!("{LOAD_FAILED_MESSAGE}: {e}"));
                Err(e)
            }
        }
    }

    fn apply_snapshot(
        &self,
        state: &mut SyncState,
        address: WalletAddress,
        snapshot: DashboardSnapshot,
    ) {
        // Placeholders belong to the wallet they were created under.
        if matches!(&state.view.address, Some(previous) if *previous != address) {
            state.pending.clear();
        }

        let reconciled = self
            .reconciler
            .reconcile(&state.pending, &snapshot.transactions);
        if reconciled.confirmed > 0 || reconciled.discarded > 0 {
            info!(
                confirmed = reconciled.confirmed,
                discarded = reconciled.discarded,
                still_pending = reconciled.pending.len(),
                "reconciled optimistic transactions"
            );
        }

        state.pending = reconciled.pending;
        state.server = snapshot.transactions;
        state.view.address = Some(address);
        state.view.stats = snapshot.stats;
        state.view.transactions = reconciled.displayed;
        state.view.error = None;
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Ask the API for a deposit address. Input is checked before any request.
    ///
    /// No placeholder is recorded here: the Bitcoin txid only exists once the
    /// user broadcasts, at which point call [`record_deposit`](Self::record_deposit).
    pub async fn initiate_deposit(
        &self,
        amount: f64,
        recipient: &str,
    ) -> Result<String, CoreError> {
        let request = DepositRequest::new(amount, recipient)?;
        let receipt = self.api.initiate_deposit(&request).await?;
        info!(amount, deposit_address = %receipt.deposit_address, "deposit initiated");
        Ok(receipt.deposit_address)
    }

    /// Submit a withdrawal and show it as pending straight away.
    /// Returns the API's request id.
    pub async fn initiate_withdrawal(
        &self,
        amount: f64,
        btc_address: &str,
        max_fee: f64,
    ) -> Result<String, CoreError> {
        let request = WithdrawalRequest::new(amount, btc_address, max_fee)?;
        let receipt = self.api.initiate_withdrawal(&request).await?;
        info!(amount, request_id = %receipt.request_id, "withdrawal initiated");
        self.insert_optimistic(Transaction::optimistic_withdrawal(
            receipt.request_id.clone(),
            Utc::now(),
        ));
        Ok(receipt.request_id)
    }

    /// Show a broadcast deposit as pending until the server lists it.
    pub fn record_deposit(&self, tx_id: &str) -> Result<Transaction, CoreError> {
        validate_identifier("txId", tx_id)?;
        let entry = Transaction::optimistic_deposit(tx_id, Utc::now());
        self.insert_optimistic(entry.clone());
        Ok(entry)
    }

    /// Show a withdrawal request as pending until the server lists it.
    pub fn record_withdrawal(&self, request_id: &str) -> Result<Transaction, CoreError> {
        validate_identifier("requestId", request_id)?;
        let entry = Transaction::optimistic_withdrawal(request_id, Utc::now());
        self.insert_optimistic(entry.clone());
        Ok(entry)
    }

    fn insert_optimistic(&self, entry: Transaction) {
        let mut state = self.state();
        info!(id = %entry.id, kind = %entry.kind, "recording optimistic transaction");
        let SyncState {
            view,
            pending,
            server,
            ..
        } = &mut *state;
        self.reconciler.push_optimistic(pending, entry);
        view.transactions = ReconcileService::compose(pending, server);
    }

    // ── Status ──────────────────────────────────────────────────────

    /// Status of a deposit by Bitcoin txid. Does not touch pending entries.
    pub async fn get_deposit_status(&self, tx_id: &str) -> Result<DepositStatus, CoreError> {
        validate_identifier("txId", tx_id)?;
        self.api.get_deposit_status(tx_id).await
    }

    /// Status of a withdrawal by request id.
    pub async fn get_withdrawal_status(
        &self,
        request_id: &str,
    ) -> Result<WithdrawalStatus, CoreError> {
        validate_identifier("requestId", request_id)?;
        self.api.get_withdrawal_status(request_id).await
    }

    /// Query the status endpoint once for every pending optimistic entry and
    /// apply what it reports. Returns how many entries changed.
    ///
    /// Entries reported `failed` are dropped from the pending list, since the
    /// server will never list them. The first failing query aborts the pass
    /// without touching local state.
    pub async fn refresh_pending_statuses(&self) -> Result<usize, CoreError> {
        let (ticket, targets) = {
            let state = self.state();
            let targets: Vec<(String, TransactionType, String)> = state
                .pending
                .iter()
                .filter(|t| t.status == TransactionStatus::Pending)
                .map(|t| {
                    let key = match t.kind {
                        TransactionType::Deposit => t.tx_id.clone().unwrap_or_else(|| t.id.clone()),
                        TransactionType::Withdrawal => t.id.clone(),
                    };
                    (t.id.clone(), t.kind, key)
                })
                .collect();
            (state.generation, targets)
        };

        let mut updates = Vec::with_capacity(targets.len());
        for (id, kind, key) in targets {
            let (status, tx_id) = match kind {
                TransactionType::Deposit => (self.get_deposit_status(&key).await?.status, None),
                TransactionType::Withdrawal => {
                    let s = self.get_withdrawal_status(&key).await?;
                    (s.status, s.tx_id)
                }
            };
            updates.push((id, status, tx_id));
        }

        let mut state = self.state();
        if state.generation != ticket {
            debug!("discarding stale status updates");
            return Ok(0);
        }

        let mut changed = 0;
        for (id, status, tx_id) in updates {
            if let Some(entry) = state.pending.iter_mut().find(|t| t.id == id) {
                let new_tx_id = tx_id.or_else(|| entry.tx_id.clone());
                if entry.status != status || entry.tx_id != new_tx_id {
                    entry.status = status;
                    entry.tx_id = new_tx_id;
                    changed += 1;
                }
            }
        }

        let before = state.pending.len();
        state.pending.retain(|t| t.status != TransactionStatus::Failed);
        let dropped = before - state.pending.len();
        if dropped > 0 {
            info!(dropped, "dropped failed optimistic transactions");
        }

        if changed > 0 {
            info!(changed, "updated pending transaction statuses");
            let SyncState {
                view,
                pending,
                server,
                ..
            } = &mut *state;
            view.transactions = ReconcileService::compose(pending, server);
        }
        Ok(changed)
    }

    // ── Read model ──────────────────────────────────────────────────

    /// Current read model.
    pub fn view(&self) -> DashboardView {
        self.state().view.clone()
    }

    /// Optimistic entries still awaiting the server.
    pub fn pending(&self) -> Vec<Transaction> {
        self.state().pending.clone()
    }

    /// Tear down the session: forget all state and drop any in-flight responses.
    pub fn disconnect(&self) {
        let mut state = self.state();
        let generation = state.generation + 1;
        *state = SyncState {
            generation,
            ..SyncState::default()
        };
        info!("wallet session disconnected");
    }
}
