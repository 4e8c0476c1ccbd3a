use chrono::{TimeZone, Utc};
use sbtc_portfolio_core::config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use sbtc_portfolio_core::errors::CoreError;
use sbtc_portfolio_core::format::{calculate_percentage_change, format_btc, format_usd};
use sbtc_portfolio_core::models::address::WalletAddress;
use sbtc_portfolio_core::models::dashboard::DashboardView;
use sbtc_portfolio_core::models::portfolio::PortfolioStats;
use sbtc_portfolio_core::models::requests::{
    DepositRequest, DepositStatus, WithdrawalRequest, WithdrawalStatus,
};
use sbtc_portfolio_core::models::transaction::{Transaction, TransactionStatus, TransactionType};
use sbtc_portfolio_core::services::reconcile_service::ReconcilePolicy;
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════
//  WalletAddress
// ═══════════════════════════════════════════════════════════════════

mod wallet_address {
    use super::*;

    #[test]
    fn accepts_stacks_and_bitcoin_addresses() {
        for a in [
            "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7",
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq",
            "1BoatSLRHtKNngkdXEeobR76b53LETtpyT",
        ] {
            assert_eq!(WalletAddress::parse(a).unwrap().as_str(), a);
        }
    }

    #[test]
    fn accepts_contract_principal() {
        let principal = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.my-vault";
        assert_eq!(WalletAddress::parse(principal).unwrap().as_str(), principal);

        let req = DepositRequest::new(0.5, principal).unwrap();
        assert_eq!(req.recipient, principal);
    }

    #[test]
    fn rejects_url_and_non_ascii_characters() {
        for a in ["SP1/vault", "SP1?x", "SP1#x", "SP1%2E", "SP1 vault", "SP1\tx", "SPé"] {
            assert!(
                matches!(WalletAddress::parse(a), Err(CoreError::AddressInvalid(_))),
                "{a:?}"
            );
        }
    }

    #[test]
    fn empty_is_address_invalid() {
        for a in ["", "   ", "\t\n"] {
            assert!(matches!(
                WalletAddress::parse(a),
                Err(CoreError::AddressInvalid(_))
            ));
        }
    }

    #[test]
    fn display_matches_input() {
        let a = WalletAddress::parse("SP123").unwrap();
        assert_eq!(a.to_string(), "SP123");
    }

    #[test]
    fn deserialize_validates() {
        let ok: WalletAddress = serde_json::from_str("\"SP123\"").unwrap();
        assert_eq!(ok.as_str(), "SP123");
        assert!(serde_json::from_str::<WalletAddress>("\"SP 123\"").is_err());
        assert!(serde_json::from_str::<WalletAddress>("\"\"").is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  PortfolioStats
// ═══════════════════════════════════════════════════════════════════

mod portfolio_stats {
    use super::*;

    #[test]
    fn parses_camel_case_wire_format() {
        let json = r#"{
            "totalBalance": 1.25,
            "totalDeposits": 2.0,
            "totalWithdrawals": 0.75,
            "priceChange24h": -3.5,
            "btcPrice": 64000.0,
            "sbtcPrice": 63900.0
        }"#;
        let stats: PortfolioStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_balance, 1.25);
        assert_eq!(stats.total_withdrawals, 0.75);
        assert_eq!(stats.price_change_24h, -3.5);
        assert_eq!(stats.sbtc_price, 63900.0);
    }

    #[test]
    fn prices_default_to_zero_when_absent() {
        let json = r#"{
            "totalBalance": 1,
            "totalDeposits": 1,
            "totalWithdrawals": 0,
            "priceChange24h": 0
        }"#;
        let stats: PortfolioStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.btc_price, 0.0);
        assert_eq!(stats.sbtc_price, 0.0);
        assert_eq!(stats.balance_usd(), None);
    }

    #[test]
    fn balance_usd_uses_btc_price() {
        let stats = PortfolioStats {
            total_balance: 0.5,
            btc_price: 60000.0,
            ..PortfolioStats::default()
        };
        assert_eq!(stats.balance_usd(), Some(30000.0));
    }

    #[test]
    fn price_24h_ago() {
        let stats = PortfolioStats {
            sbtc_price: 50000.0,
            price_change_24h: 5.0,
            ..PortfolioStats::default()
        };
        assert!((stats.sbtc_price_24h_ago() - 47500.0).abs() < 1e-9);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Transaction
// ═══════════════════════════════════════════════════════════════════

mod transaction {
    use super::*;

    #[test]
    fn parses_server_transaction() {
        let json = r#"{
            "id": "t-1",
            "type": "withdrawal",
            "amount": 0.1,
            "status": "completed",
            "timestamp": "2025-01-15T12:00:00.000Z",
            "txId": "abc123"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionType::Withdrawal);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.tx_id.as_deref(), Some("abc123"));
        assert_eq!(tx.timestamp, Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn tx_id_is_optional() {
        let json = r#"{
            "id": "t-2",
            "type": "deposit",
            "amount": 1,
            "status": "pending",
            "timestamp": "2025-01-15T12:00:00Z"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert!(tx.tx_id.is_none());
        let back = serde_json::to_value(&tx).unwrap();
        assert!(back.get("txId").is_none());
        assert_eq!(back["type"], "deposit");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let json = r#"{
            "id": "t",
            "type": "deposit",
            "amount": 1,
            "status": "lost",
            "timestamp": "2025-01-15T12:00:00Z"
        }"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn optimistic_deposit_placeholder() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 9, 30, 0).unwrap();
        let tx = Transaction::optimistic_deposit("tx1", now);
        assert_eq!(tx.id, "tx1");
        assert_eq!(tx.tx_id.as_deref(), Some("tx1"));
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.kind, TransactionType::Deposit);
        assert_eq!(tx.timestamp, now);
    }

    #[test]
    fn optimistic_withdrawal_has_no_txid() {
        let tx = Transaction::optimistic_withdrawal("req-9", Utc::now());
        assert_eq!(tx.id, "req-9");
        assert!(tx.tx_id.is_none());
        assert_eq!(tx.kind, TransactionType::Withdrawal);
    }

    #[test]
    fn refers_to_same_matches_id_or_txid() {
        let now = Utc::now();
        let local = Transaction::optimistic_deposit("btc-tx", now);
        let mut server = Transaction::optimistic_withdrawal("srv-1", now);
        assert!(!local.refers_to_same(&server));

        server.tx_id = Some("btc-tx".into());
        assert!(local.refers_to_same(&server));

        let by_id = Transaction::optimistic_withdrawal("btc-tx", now);
        assert!(local.refers_to_same(&by_id));
    }

    #[test]
    fn status_finality() {
        assert!(!TransactionStatus::Pending.is_final());
        assert!(TransactionStatus::Completed.is_final());
        assert!(TransactionStatus::Failed.is_final());
    }

    #[test]
    fn display() {
        assert_eq!(TransactionType::Deposit.to_string(), "deposit");
        assert_eq!(TransactionStatus::Failed.to_string(), "failed");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Requests & status payloads
// ═══════════════════════════════════════════════════════════════════

mod requests {
    use super::*;

    #[test]
    fn deposit_request_serializes_wire_body() {
        let req = DepositRequest::new(0.5, "SP123").unwrap();
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, serde_json::json!({"amount": 0.5, "recipient": "SP123"}));
    }

    #[test]
    fn withdrawal_request_serializes_wire_body() {
        let req = WithdrawalRequest::new(0.1, "bc1qxyz", 0.0002).unwrap();
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"amount": 0.1, "btcAddress": "bc1qxyz", "maxFee": 0.0002})
        );
    }

    #[test]
    fn non_positive_amounts_rejected() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                DepositRequest::new(amount, "SP123"),
                Err(CoreError::ValidationError(_))
            ));
            assert!(matches!(
                WithdrawalRequest::new(amount, "bc1q", 0.001),
                Err(CoreError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn zero_max_fee_rejected() {
        let err = WithdrawalRequest::new(1.0, "bc1q", 0.0).unwrap_err();
        assert!(err.to_string().contains("maxFee"));
    }

    #[test]
    fn bad_destination_is_validation_error() {
        assert!(matches!(
            DepositRequest::new(1.0, ""),
            Err(CoreError::ValidationError(_))
        ));
        let err = WithdrawalRequest::new(1.0, "bc1q/../x", 0.001).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(ref m) if m.contains("btcAddress")));
    }

    #[test]
    fn status_payloads() {
        let d: DepositStatus =
            serde_json::from_str(r#"{"status":"pending","confirmations":2}"#).unwrap();
        assert_eq!(d.confirmations, 2);

        let w: WithdrawalStatus = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(w.status, TransactionStatus::Completed);
        assert!(w.tx_id.is_none());

        let w: WithdrawalStatus =
            serde_json::from_str(r#"{"status":"completed","txId":"ff00"}"#).unwrap();
        assert_eq!(w.tx_id.as_deref(), Some("ff00"));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Formatting
// ═══════════════════════════════════════════════════════════════════

mod formatting {
    use super::*;

    #[test]
    fn btc_has_eight_decimals() {
        assert_eq!(format_btc(1.5), "1.50000000 BTC");
        assert_eq!(format_btc(0.00000001), "0.00000001 BTC");
        assert_eq!(format_btc(0.0), "0.00000000 BTC");
        assert_eq!(format_btc(-0.0), "0.00000000 BTC");
    }

    #[test]
    fn usd_groups_thousands() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(12.5), "$12.50");
        assert_eq!(format_usd(1234.56), "$1,234.56");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_usd(-42000.1), "-$42,000.10");
    }

    #[test]
    fn usd_rounds_to_cents() {
        assert_eq!(format_usd(999.999), "$1,000.00");
        assert_eq!(format_usd(-0.001), "$0.00");
    }

    #[test]
    fn percentage_change_signs() {
        assert_eq!(calculate_percentage_change(105.0, 100.0), "+5.00%");
        assert_eq!(calculate_percentage_change(97.5, 100.0), "-2.50%");
        assert_eq!(calculate_percentage_change(100.0, 100.0), "0.00%");
    }

    #[test]
    fn percentage_change_zero_baseline() {
        assert_eq!(calculate_percentage_change(0.0, 0.0), "0.00%");
        assert_eq!(calculate_percentage_change(10.0, 0.0), "0.00%");
    }

    #[test]
    fn non_finite_inputs() {
        assert_eq!(format_btc(f64::NAN), "N/A");
        assert_eq!(format_usd(f64::INFINITY), "N/A");
        assert_eq!(calculate_percentage_change(f64::NAN, 1.0), "0.00%");
    }

    #[test]
    fn change_24h_card_is_deterministic() {
        let view = DashboardView {
            stats: PortfolioStats {
                sbtc_price: 50000.0,
                price_change_24h: 5.0,
                ..PortfolioStats::default()
            },
            ..DashboardView::default()
        };
        // 50000 vs 47500
        assert_eq!(view.change_24h(), "+5.26%");
        assert_eq!(view.change_24h(), view.change_24h());
    }

    #[test]
    fn change_24h_without_price() {
        assert_eq!(DashboardView::default().change_24h(), "0.00%");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  DashboardView helpers
// ═══════════════════════════════════════════════════════════════════

mod dashboard_view {
    use super::*;

    #[test]
    fn withdraw_disabled_at_zero_balance() {
        let mut view = DashboardView::default();
        assert!(!view.can_withdraw());
        view.stats.total_balance = 0.1;
        assert!(view.can_withdraw());
    }

    #[test]
    fn balance_strings() {
        let mut view = DashboardView::default();
        view.stats.total_balance = 0.25;
        assert_eq!(view.balance_btc(), "0.25000000 BTC");
        assert_eq!(view.balance_usd(), None);
        view.stats.btc_price = 40000.0;
        assert_eq!(view.balance_usd().as_deref(), Some("$10,000.00"));
    }

    #[test]
    fn pending_count() {
        let mut view = DashboardView::default();
        view.transactions
            .push(Transaction::optimistic_deposit("a", Utc::now()));
        let mut done = Transaction::optimistic_withdrawal("b", Utc::now());
        done.status = TransactionStatus::Completed;
        view.transactions.push(done);
        assert_eq!(view.pending_count(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ClientConfig
// ═══════════════════════════════════════════════════════════════════

mod client_config {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.reconcile_policy, ReconcilePolicy::MergeById);
    }

    #[test]
    fn reads_all_keys() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SBTC_API_URL", "https://api.example.com/v1/"),
            ("SBTC_API_TIMEOUT_SECS", " 5 "),
            ("SBTC_RECONCILE_POLICY", "replace"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.reconcile_policy, ReconcilePolicy::ReplaceWithServer);
    }

    #[test]
    fn blank_url_falls_back_to_default() {
        let config = ClientConfig::from_lookup(lookup(&[("SBTC_API_URL", "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn rejects_bad_values() {
        for pairs in [
            [("SBTC_API_URL", "ftp://example.com")],
            [("SBTC_API_TIMEOUT_SECS", "soon")],
            [("SBTC_API_TIMEOUT_SECS", "0")],
            [("SBTC_RECONCILE_POLICY", "sometimes")],
        ] {
            assert!(matches!(
                ClientConfig::from_lookup(lookup(&pairs)),
                Err(CoreError::Config(_))
            ));
        }
    }

    #[test]
    fn serde_roundtrip_json() {
        let config = ClientConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("merge_by_id"));
        let back: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
