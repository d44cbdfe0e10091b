// ═══════════════════════════════════════════════════════════════════
// Ledger Tests — trade validation, cost-basis accounting, snapshot and
// log side effects, conservation of value
// ═══════════════════════════════════════════════════════════════════

use microcap_lab_core::errors::CoreError;
use microcap_lab_core::models::history::Snapshot;
use microcap_lab_core::models::portfolio::Portfolio;
use microcap_lab_core::models::transaction::{TradeType, TransactionLog};
use microcap_lab_core::services::ledger_service::LedgerService;
use microcap_lab_core::services::valuation;

fn fresh() -> (Portfolio, TransactionLog, LedgerService) {
    (
        Portfolio::new(100.0, "2025-06-27T00:00:00Z"),
        TransactionLog::new(),
        LedgerService::new(),
    )
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
}

// ═══════════════════════════════════════════════════════════════════
//  Buy
// ═══════════════════════════════════════════════════════════════════

mod buy {
    use super::*;

    #[test]
    fn opens_new_position() {
        let (mut p, mut log, ledger) = fresh();

        let tx = ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "abeo", 10.0, 5.0)
            .unwrap();

        assert_eq!(p.cash, 50.0);
        let held = p.holding("ABEO").unwrap();
        assert_eq!(held.shares, 5.0);
        assert_eq!(held.avg_cost, 10.0);
        assert_eq!(held.current_price, 10.0);
        assert_eq!(tx.ticker, "ABEO");
        assert_eq!(tx.trade_type, TradeType::Buy);
    }

    #[test]
    fn merges_with_weighted_average_cost() {
        let mut p = Portfolio::new(200.0, "2025-06-27T00:00:00Z");
        let mut log = TransactionLog::new();
        let ledger = LedgerService::new();

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 5.0, 10.0)
            .unwrap();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 7.0, 10.0)
            .unwrap();

        let held = p.holding("ABEO").unwrap();
        assert_eq!(held.shares, 20.0);
        assert_close(held.avg_cost, 6.0);
        assert_eq!(held.current_price, 7.0);
        assert_eq!(p.holdings.len(), 1);
    }

    #[test]
    fn merge_updates_mark_price() {
        let (mut p, mut log, ledger) = fresh();

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 4.0)
            .unwrap();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 8.0, 2.0)
            .unwrap();

        assert_eq!(p.holding("ABEO").unwrap().current_price, 8.0);
    }

    #[test]
    fn insufficient_funds_rejected_without_state_change() {
        let (mut p, mut log, ledger) = fresh();

        let result = ledger.execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 11.0);

        match result.unwrap_err() {
            CoreError::InsufficientFunds { needed, available } => {
                assert_close(needed, 110.0);
                assert_close(available, 100.0);
            }
            e => panic!("Expected InsufficientFunds, got: {e:?}"),
        }
        assert_eq!(p.cash, 100.0);
        assert!(p.holdings.is_empty());
        assert_eq!(p.history.len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn max_size_order_survives_float_rounding() {
        let (mut p, mut log, ledger) = fresh();

        let shares = ledger.max_buy_shares(&p, 3.0);
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 3.0, shares)
            .unwrap();

        assert!(p.cash >= 0.0);
        assert!(p.cash < 1e-9);
    }

    #[test]
    fn zero_shares_rejected() {
        let (mut p, mut log, ledger) = fresh();
        let result = ledger.execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 0.0);
        assert!(matches!(result.unwrap_err(), CoreError::InvalidTrade(_)));
    }

    #[test]
    fn negative_price_rejected() {
        let (mut p, mut log, ledger) = fresh();
        let result = ledger.execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", -1.0, 5.0);
        assert!(matches!(result.unwrap_err(), CoreError::InvalidTrade(_)));
    }

    #[test]
    fn blank_ticker_rejected() {
        let (mut p, mut log, ledger) = fresh();
        let result = ledger.execute_trade(&mut p, &mut log, TradeType::Buy, "   ", 10.0, 5.0);
        assert!(matches!(result.unwrap_err(), CoreError::InvalidTrade(_)));
    }

    #[test]
    fn free_share_grant_allowed_at_zero_price() {
        let (mut p, mut log, ledger) = fresh();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 0.0, 5.0)
            .unwrap();
        assert_eq!(p.cash, 100.0);
        assert_eq!(p.holding("ABEO").unwrap().avg_cost, 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Sell
// ═══════════════════════════════════════════════════════════════════

mod sell {
    use super::*;

    #[test]
    fn no_position_rejected() {
        let (mut p, mut log, ledger) = fresh();
        let result = ledger.execute_trade(&mut p, &mut log, TradeType::Sell, "abeo", 12.0, 5.0);
        match result.unwrap_err() {
            CoreError::NoPosition(ticker) => assert_eq!(ticker, "ABEO"),
            e => panic!("Expected NoPosition, got: {e:?}"),
        }
    }

    #[test]
    fn overselling_rejected_without_state_change() {
        let (mut p, mut log, ledger) = fresh();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();

        let result = ledger.execute_trade(&mut p, &mut log, TradeType::Sell, "ABEO", 12.0, 6.0);

        match result.unwrap_err() {
            CoreError::InsufficientShares {
                ticker,
                requested,
                held,
            } => {
                assert_eq!(ticker, "ABEO");
                assert_eq!(requested, 6.0);
                assert_eq!(held, 5.0);
            }
            e => panic!("Expected InsufficientShares, got: {e:?}"),
        }
        assert_eq!(p.holding("ABEO").unwrap().shares, 5.0);
        assert_eq!(p.cash, 50.0);
        assert_eq!(log.len(), 1);
        assert_eq!(p.history.len(), 2);
    }

    #[test]
    fn partial_sell_decrements_and_keeps_cost_basis() {
        let (mut p, mut log, ledger) = fresh();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Sell, "ABEO", 12.0, 2.0)
            .unwrap();

        let held = p.holding("ABEO").unwrap();
        assert_eq!(held.shares, 3.0);
        assert_eq!(held.avg_cost, 10.0);
        assert_eq!(held.current_price, 12.0);
        assert_eq!(p.cash, 74.0);
    }

    #[test]
    fn full_close_removes_position() {
        let (mut p, mut log, ledger) = fresh();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Sell, "ABEO", 12.0, 5.0)
            .unwrap();

        assert!(p.holdings.is_empty());
        assert_eq!(p.cash, 110.0);

        // A further sell of the closed ticker is NoPosition, not
        // InsufficientShares — the zero record does not linger.
        let result = ledger.execute_trade(&mut p, &mut log, TradeType::Sell, "ABEO", 12.0, 1.0);
        assert!(matches!(result.unwrap_err(), CoreError::NoPosition(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Side effects — snapshots & log
// ═══════════════════════════════════════════════════════════════════

mod side_effects {
    use super::*;

    #[test]
    fn each_trade_appends_one_actual_snapshot() {
        let (mut p, mut log, ledger) = fresh();

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();
        assert_eq!(p.history.len(), 2);
        // Buying moves cash into an equally-valued position: total unchanged.
        assert_eq!(p.history.series()[1].total_value, 100.0);

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Sell, "ABEO", 12.0, 5.0)
            .unwrap();
        assert_eq!(p.history.len(), 3);
        assert_eq!(p.history.series()[2].total_value, 110.0);
    }

    #[test]
    fn trade_invalidates_forecast_suffix() {
        let (mut p, mut log, ledger) = fresh();
        p.history.replace_predictions(vec![
            Snapshot::prediction("+1 day", 105.0),
            Snapshot::prediction("+2 days", 106.0),
            Snapshot::prediction("+3 days", 107.0),
        ]);
        assert_eq!(p.history.prediction_count(), 3);

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();

        assert_eq!(p.history.prediction_count(), 0);
        assert_eq!(p.history.actual_count(), 2);
    }

    #[test]
    fn failed_trade_leaves_forecast_suffix_alone() {
        let (mut p, mut log, ledger) = fresh();
        p.history
            .replace_predictions(vec![Snapshot::prediction("+1 day", 105.0)]);

        let result = ledger.execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 999.0);

        assert!(result.is_err());
        assert_eq!(p.history.prediction_count(), 1);
    }

    #[test]
    fn log_is_most_recent_first() {
        let (mut p, mut log, ledger) = fresh();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Sell, "ABEO", 12.0, 2.0)
            .unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].trade_type, TradeType::Sell);
        assert_eq!(log.entries()[1].trade_type, TradeType::Buy);
    }

    #[test]
    fn snapshot_and_transaction_share_timestamp() {
        let (mut p, mut log, ledger) = fresh();
        let tx = ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();
        assert_eq!(p.history.series().last().unwrap().timestamp, tx.timestamp);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Conservation of value
// ═══════════════════════════════════════════════════════════════════

mod conservation {
    use super::*;

    #[test]
    fn snapshot_total_matches_valuation_after_every_trade() {
        let (mut p, mut log, ledger) = fresh();
        let trades = [
            (TradeType::Buy, "ABEO", 10.0, 4.0),
            (TradeType::Buy, "CADL", 2.5, 8.0),
            (TradeType::Sell, "ABEO", 11.0, 2.0),
            (TradeType::Buy, "ABEO", 9.0, 1.0),
            (TradeType::Sell, "CADL", 3.0, 8.0),
        ];

        for (trade_type, ticker, price, shares) in trades {
            ledger
                .execute_trade(&mut p, &mut log, trade_type, ticker, price, shares)
                .unwrap();
            let recorded = p.history.latest_actual().unwrap().total_value;
            assert_close(recorded, valuation::total_value(&p));
        }
    }

    #[test]
    fn cash_moves_exactly_by_cost_and_proceeds() {
        let (mut p, mut log, ledger) = fresh();

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 4.0)
            .unwrap();
        assert_eq!(p.cash, 60.0);

        ledger
            .execute_trade(&mut p, &mut log, TradeType::Sell, "ABEO", 15.0, 4.0)
            .unwrap();
        assert_eq!(p.cash, 120.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Valuation utility
// ═══════════════════════════════════════════════════════════════════

mod valuation_utility {
    use super::*;

    #[test]
    fn total_value_is_cash_plus_marked_holdings() {
        let (mut p, mut log, ledger) = fresh();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "CADL", 2.0, 10.0)
            .unwrap();

        // cash 30 + ABEO 50 + CADL 20
        assert_close(valuation::total_value(&p), 100.0);
    }

    #[test]
    fn profit_and_loss_against_baseline() {
        let (mut p, mut log, ledger) = fresh();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Buy, "ABEO", 10.0, 5.0)
            .unwrap();
        ledger
            .execute_trade(&mut p, &mut log, TradeType::Sell, "ABEO", 12.0, 5.0)
            .unwrap();

        assert_close(valuation::profit_and_loss(&p, 100.0), 10.0);
    }

    #[test]
    fn empty_portfolio_values_at_cash() {
        let p = Portfolio::new(100.0, "t0");
        assert_eq!(valuation::total_value(&p), 100.0);
        assert_eq!(valuation::profit_and_loss(&p, 100.0), 0.0);
    }

    #[test]
    fn max_buy_shares_is_simple_division() {
        let (p, _, ledger) = fresh();
        assert_close(ledger.max_buy_shares(&p, 4.0), 25.0);
        assert_eq!(ledger.max_buy_shares(&p, 0.0), 0.0);
    }
}
