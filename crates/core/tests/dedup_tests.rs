// ═══════════════════════════════════════════════════════════════════
// Duplicate Detection Tests — fuzzy equality rule, partitioning,
// idempotent re-import through the facade
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, Duration, TimeZone, Utc};
use portfolio_tracker_core::models::trade::{AssetType, Trade, TradeSide, TradeSource};
use portfolio_tracker_core::services::dedup_service::{DedupService, DedupTolerance};
use portfolio_tracker_core::PortfolioTracker;

fn dt(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn trade(symbol: &str, side: TradeSide, quantity: f64, price: f64, date: DateTime<Utc>) -> Trade {
    Trade::new(symbol, AssetType::Stock, side, quantity, price, date, TradeSource::Csv)
}

// ═══════════════════════════════════════════════════════════════════
//  is_same_trade — the fuzzy rule
// ═══════════════════════════════════════════════════════════════════

mod fuzzy_rule {
    use super::*;

    #[test]
    fn identical_trades_match() {
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        let b = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        assert!(s.is_same_trade(&a, &b));
    }

    #[test]
    fn rounding_and_timestamp_jitter_match() {
        // Re-exported CSVs carry slightly different rounding/granularity
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.00005, 150.004, dt(2024, 1, 15));
        let b = trade(
            "AAPL",
            TradeSide::Buy,
            10.0,
            150.00,
            dt(2024, 1, 15) + Duration::seconds(30),
        );
        assert!(s.is_same_trade(&a, &b));
        assert!(s.is_same_trade(&b, &a)); // symmetric
    }

    #[test]
    fn two_minutes_apart_do_not_match() {
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.00005, 150.004, dt(2024, 1, 15));
        let b = trade(
            "AAPL",
            TradeSide::Buy,
            10.0,
            150.00,
            dt(2024, 1, 15) + Duration::seconds(120),
        );
        assert!(!s.is_same_trade(&a, &b));
    }

    #[test]
    fn exactly_sixty_seconds_apart_do_not_match() {
        // The window is strict less-than
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        let b = trade(
            "AAPL",
            TradeSide::Buy,
            10.0,
            150.0,
            dt(2024, 1, 15) + Duration::seconds(60),
        );
        assert!(!s.is_same_trade(&a, &b));
    }

    #[test]
    fn different_symbol_never_matches() {
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        let b = trade("MSFT", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        assert!(!s.is_same_trade(&a, &b));
    }

    #[test]
    fn different_side_never_matches() {
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        let b = trade("AAPL", TradeSide::Sell, 10.0, 150.0, dt(2024, 1, 15));
        assert!(!s.is_same_trade(&a, &b));
    }

    #[test]
    fn quantity_outside_tolerance() {
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        let b = trade("AAPL", TradeSide::Buy, 10.001, 150.0, dt(2024, 1, 15));
        assert!(!s.is_same_trade(&a, &b));
    }

    #[test]
    fn price_outside_tolerance() {
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        let b = trade("AAPL", TradeSide::Buy, 10.0, 150.02, dt(2024, 1, 15));
        assert!(!s.is_same_trade(&a, &b));
    }

    #[test]
    fn fee_and_source_are_not_considered() {
        let s = DedupService::new();
        let a = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15)).with_fee(1.0);
        let mut b = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        b.source = TradeSource::Ibkr;
        assert!(s.is_same_trade(&a, &b));
    }

    #[test]
    fn custom_tolerance_widens_the_window() {
        let s = DedupService::with_tolerance(DedupTolerance {
            quantity: 1e-4,
            price: 0.01,
            time_ms: 300_000,
        });
        let a = trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15));
        let b = trade(
            "AAPL",
            TradeSide::Buy,
            10.0,
            150.0,
            dt(2024, 1, 15) + Duration::seconds(120),
        );
        assert!(s.is_same_trade(&a, &b));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  partition
// ═══════════════════════════════════════════════════════════════════

mod partition {
    use super::*;

    #[test]
    fn splits_incoming_against_existing() {
        let s = DedupService::new();
        let existing = vec![trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15))];
        let incoming = vec![
            trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15)),
            trade("MSFT", TradeSide::Buy, 5.0, 400.0, dt(2024, 1, 16)),
        ];

        let outcome = s.partition(incoming, &existing);
        assert_eq!(outcome.duplicates.len(), 1);
        assert_eq!(outcome.unique.len(), 1);
        assert_eq!(outcome.unique[0].symbol, "MSFT");
    }

    #[test]
    fn empty_existing_set_keeps_everything() {
        let s = DedupService::new();
        let incoming = vec![
            trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15)),
            trade("AAPL", TradeSide::Buy, 10.0, 150.0, dt(2024, 1, 15)),
        ];
        // Identical rows within one batch stay separate trades
        let outcome = s.partition(incoming, &[]);
        assert_eq!(outcome.unique.len(), 2);
        assert!(outcome.duplicates.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Idempotent re-import through the facade
// ═══════════════════════════════════════════════════════════════════

mod reimport {
    use super::*;

    const CSV: &str = "\
Action,Ticker,Quantity,Price,Time
Buy,AAPL,5,150.25,2024-01-15 10:30:00
Sell,AAPL,2,160.00,2024-02-01 09:15:00
Buy,MSFT,3,400.00,2024-02-10 14:45:00
";

    #[test]
    fn importing_the_same_csv_twice_adds_nothing() {
        let mut tracker = PortfolioTracker::create_new();

        let first = tracker.import_csv(CSV, TradeSource::Csv).unwrap();
        assert_eq!(first.trades_added, 3);
        assert_eq!(first.duplicates_skipped, 0);

        let second = tracker.import_csv(CSV, TradeSource::Csv).unwrap();
        assert_eq!(second.trades_added, 0);
        assert_eq!(second.duplicates_skipped, 3);
        assert_eq!(tracker.trade_count(), 3);
    }

    #[test]
    fn overlapping_export_adds_only_new_rows() {
        let mut tracker = PortfolioTracker::create_new();
        tracker.import_csv(CSV, TradeSource::Csv).unwrap();

        let extended = "\
Action,Ticker,Quantity,Price,Time
Buy,MSFT,3,400.00,2024-02-10 14:45:00
Buy,NVDA,1,700.00,2024-03-01 11:00:00
";
        let outcome = tracker.import_csv(extended, TradeSource::Csv).unwrap();
        assert_eq!(outcome.trades_added, 1);
        assert_eq!(outcome.duplicates_skipped, 1);
        assert_eq!(tracker.trade_count(), 4);
    }

    #[test]
    fn rounding_jitter_between_exports_still_deduplicates() {
        let mut tracker = PortfolioTracker::create_new();
        tracker.import_csv(CSV, TradeSource::Csv).unwrap();

        // Same trades, re-exported with coarser rounding and shifted timestamps
        let jittered = "\
Action,Ticker,Quantity,Price,Time
Buy,AAPL,5.00001,150.254,2024-01-15 10:30:30
Sell,AAPL,2,160.001,2024-02-01 09:15:10
Buy,MSFT,3,400.00,2024-02-10 14:45:59
";
        let outcome = tracker.import_csv(jittered, TradeSource::Csv).unwrap();
        assert_eq!(outcome.trades_added, 0);
        assert_eq!(outcome.duplicates_skipped, 3);
    }
}
