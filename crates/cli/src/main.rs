use std::fmt::Write as _;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sbtc_portfolio_core::config::ClientConfig;
use sbtc_portfolio_core::format::format_btc;
use sbtc_portfolio_core::models::dashboard::DashboardView;
use sbtc_portfolio_core::services::reconcile_service::ReconcilePolicy;
use sbtc_portfolio_core::PortfolioSyncClient;

/// Terminal dashboard for sBTC deposits, withdrawals and balances.
#[derive(Debug, Parser)]
#[command(name = "sbtc-portfolio", version, about)]
struct Cli {
    /// sBTC API base URL (overrides SBTC_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// How optimistic entries are merged: "merge" or "replace"
    #[arg(long, global = true)]
    policy: Option<ReconcilePolicy>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch stats and history for a wallet and print the dashboard
    Show { address: String },

    /// Refresh the dashboard periodically until interrupted
    Watch {
        address: String,
        #[arg(long, default_value_t = 30)]
        interval_secs: u64,
    },

    /// Request a deposit address for minting sBTC
    Deposit {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        recipient: String,
    },

    /// Request a BTC withdrawal
    Withdraw {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        btc_address: String,
        #[arg(long)]
        max_fee: f64,
    },

    /// Show the status of a deposit by Bitcoin txid
    DepositStatus { tx_id: String },

    /// Show the status of a withdrawal request
    WithdrawalStatus { request_id: String },
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid sBTC client configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(policy) = cli.policy {
        config.reconcile_policy = policy;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = load_config(&cli)?;
    info!(api = %config.base_url, policy = ?config.reconcile_policy, "starting");
    let client = PortfolioSyncClient::from_config(&config);

    match cli.command {
        Command::Show { address } => {
            let view = client
                .refresh(&address)
                .await
                .with_context(|| format!("failed to load portfolio for {address}"))?;
            print!("{}", render_dashboard(&view));
        }
        Command::Watch {
            address,
            interval_secs,
        } => watch(&client, &address, interval_secs.max(1)).await?,
        Command::Deposit { amount, recipient } => {
            let deposit_address = client.initiate_deposit(amount, &recipient).await?;
            println!("Send {} to {deposit_address}", format_btc(amount));
        }
        Command::Withdraw {
            amount,
            btc_address,
            max_fee,
        } => {
            let request_id = client
                .initiate_withdrawal(amount, &btc_address, max_fee)
                .await?;
            println!("Withdrawal request {request_id} submitted");
        }
        Command::DepositStatus { tx_id } => {
            let status = client.get_deposit_status(&tx_id).await?;
            println!("{tx_id}: {} ({} confirmations)", status.status, status.confirmations);
        }
        Command::WithdrawalStatus { request_id } => {
            let status = client.get_withdrawal_status(&request_id).await?;
            match status.tx_id {
                Some(tx_id) => println!("{request_id}: {} (txid {tx_id})", status.status),
                None => println!("{request_id}: {}", status.status),
            }
        }
    }

    client.disconnect();
    Ok(())
}

async fn watch(
    client: &PortfolioSyncClient,
    address: &str,
    interval_secs: u64,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match client.refresh(address).await {
                    Ok(view) => print!("{}", render_dashboard(&view)),
                    // The failure is already recorded in the view; keep polling.
                    Err(e) => warn!(error = %e, "refresh failed"),
                }
                if let Err(e) = client.refresh_pending_statuses().await {
                    warn!(error = %e, "status poll failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
        }
    }
}

fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "sBTC Portfolio");
    if let Some(address) = &view.address {
        let _ = writeln!(out, "  Wallet:            {address}");
    }
    let _ = writeln!(out, "  Total Balance:     {}", view.balance_btc());
    if let Some(usd) = view.balance_usd() {
        let _ = writeln!(out, "                     {usd}");
    }
    let _ = writeln!(out, "  Total Deposits:    {}", format_btc(view.stats.total_deposits));
    let _ = writeln!(out, "  Total Withdrawals: {}", format_btc(view.stats.total_withdrawals));
    let _ = writeln!(out, "  24h Change:        {}", view.change_24h());
    if !view.can_withdraw() {
        let _ = writeln!(out, "  (withdrawals disabled: zero balance)");
    }

    let _ = writeln!(out, "Recent Transactions");
    if view.transactions.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for tx in &view.transactions {
        let _ = writeln!(
            out,
            "  {}  {:<10} {:<9} {}  {}",
            tx.timestamp.format("%Y-%m-%d %H:%M"),
            tx.kind.to_string(),
            tx.status.to_string(),
            format_btc(tx.amount),
            tx.tx_id.as_deref().unwrap_or(&tx.id),
        );
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {error}");
    }
    out
}
