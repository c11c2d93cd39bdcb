//! Trade reporting — converts the order log into round-trip trades with PnL.
//!
//! Post-processes the order log after the candle stream completes. Pure
//! function: fills + last observed mark → trade records plus aggregate
//! stats. Fill `2k` opens trade `k`, fill `2k+1` closes it; the log's
//! alternation invariant guarantees the pairing is well-formed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Fill, OrderLog, Side, Trade, TradeAction};
use crate::fingerprint::{hash_json, ReportHash};

/// Last observed candle close — the mark used to value a position left
/// open when the stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkPrice {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("order log ends with an open position but no mark price was observed")]
    MissingLastPrice,
}

/// Aggregate statistics over a report's trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub trade_count: usize,
    /// Sum of non-negative trade PnL.
    pub gross_wins: f64,
    /// Sum of negative trade PnL (a non-positive number).
    pub gross_losses: f64,
    pub total_pnl: f64,
    /// Fraction of trades with strictly positive PnL.
    pub win_rate: f64,
    /// `gross_wins / |gross_losses|`; `None` when there are no losing trades.
    pub profit_factor: Option<f64>,
}

/// Ordered trade rows plus aggregates. Row order is chronological by open
/// timestamp; the column set is part of the external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReport {
    pub trades: Vec<Trade>,
    pub stats: ReportStats,
}

impl TradeReport {
    /// Content hash of the report; equal hashes mean byte-identical reports.
    pub fn report_hash(&self) -> ReportHash {
        ReportHash(hash_json(self))
    }
}

/// Build a report from the order log.
///
/// An odd number of fills means the stream ended mid-trade: the dangling
/// open is paired with a synthetic close at the last observed mark and the
/// resulting trade carries `still_open: true`. The flag is the out-of-band
/// signal — the synthetic close timestamp is the last candle's, never a
/// sentinel.
pub fn build_report(log: &OrderLog, last_seen: Option<MarkPrice>) -> Result<TradeReport, ReportError> {
    let fills = log.fills();
    let mut trades = Vec::with_capacity(fills.len() / 2 + 1);

    for pair in fills.chunks(2) {
        match pair {
            [open, close] => trades.push(paired_trade(open, close, false)),
            [open] => {
                let mark = last_seen.ok_or(ReportError::MissingLastPrice)?;
                let synthetic = Fill {
                    timestamp: mark.timestamp,
                    price: mark.price,
                    amount: open.amount,
                    side: open.side.opposite(),
                };
                trades.push(paired_trade(open, &synthetic, true));
            }
            _ => unreachable!("chunks(2) yields one or two fills"),
        }
    }

    let stats = compute_stats(&trades);
    Ok(TradeReport { trades, stats })
}

fn paired_trade(open: &Fill, close: &Fill, still_open: bool) -> Trade {
    let action = match open.side {
        Side::Buy => TradeAction::Long,
        Side::Sell => TradeAction::Short,
    };
    let pnl = match action {
        TradeAction::Long => (close.price - open.price) * open.amount,
        TradeAction::Short => (open.price - close.price) * open.amount,
    };
    Trade {
        action,
        open_ts: open.timestamp,
        open_price: open.price,
        close_ts: close.timestamp,
        close_price: close.price,
        amount: open.amount,
        pnl,
        still_open,
    }
}

fn compute_stats(trades: &[Trade]) -> ReportStats {
    let mut gross_wins = 0.0;
    let mut gross_losses = 0.0;
    let mut winners = 0usize;

    for trade in trades {
        if trade.pnl >= 0.0 {
            gross_wins += trade.pnl;
        } else {
            gross_losses += trade.pnl;
        }
        if trade.pnl > 0.0 {
            winners += 1;
        }
    }

    let trade_count = trades.len();
    let win_rate = if trade_count == 0 {
        0.0
    } else {
        winners as f64 / trade_count as f64
    };
    let profit_factor = if gross_losses < 0.0 {
        Some(gross_wins / gross_losses.abs())
    } else {
        None
    };

    ReportStats {
        trade_count,
        gross_wins,
        gross_losses,
        total_pnl: gross_wins + gross_losses,
        win_rate,
        profit_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn fill(day: u32, price: f64, amount: f64, side: Side) -> Fill {
        Fill {
            timestamp: ts(day),
            price,
            amount,
            side,
        }
    }

    fn log_of(fills: Vec<Fill>) -> OrderLog {
        let mut log = OrderLog::new();
        for f in fills {
            log.append(f).unwrap();
        }
        log
    }

    #[test]
    fn empty_log_produces_empty_report() {
        let report = build_report(&OrderLog::new(), None).unwrap();
        assert!(report.trades.is_empty());
        assert_eq!(report.stats.trade_count, 0);
        assert_eq!(report.stats.total_pnl, 0.0);
        assert_eq!(report.stats.profit_factor, None);
    }

    #[test]
    fn long_round_trip_pnl() {
        let log = log_of(vec![
            fill(1, 100.0, 2.0, Side::Buy),
            fill(5, 110.0, 2.0, Side::Sell),
        ]);
        let report = build_report(&log, None).unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.action, TradeAction::Long);
        assert!((trade.pnl - 20.0).abs() < 1e-10);
        assert!(!trade.still_open);
    }

    #[test]
    fn short_round_trip_pnl() {
        let log = log_of(vec![
            fill(1, 100.0, 3.0, Side::Sell),
            fill(4, 90.0, 3.0, Side::Buy),
        ]);
        let report = build_report(&log, None).unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.action, TradeAction::Short);
        assert!((trade.pnl - 30.0).abs() < 1e-10);
    }

    #[test]
    fn dangling_open_becomes_still_open_trade() {
        let log = log_of(vec![fill(1, 50.0, 1.0, Side::Buy)]);
        let mark = MarkPrice {
            timestamp: ts(9),
            price: 58.0,
        };
        let report = build_report(&log, Some(mark)).unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert!(trade.still_open);
        assert_eq!(trade.close_price, 58.0);
        assert_eq!(trade.close_ts, ts(9));
        assert!((trade.pnl - 8.0).abs() < 1e-10);
    }

    #[test]
    fn dangling_open_without_mark_is_an_error() {
        let log = log_of(vec![fill(1, 50.0, 1.0, Side::Buy)]);
        assert_eq!(
            build_report(&log, None).unwrap_err(),
            ReportError::MissingLastPrice
        );
    }

    #[test]
    fn rows_are_chronological_by_open_ts() {
        let log = log_of(vec![
            fill(1, 100.0, 1.0, Side::Buy),
            fill(3, 105.0, 1.0, Side::Sell),
            fill(5, 102.0, 1.0, Side::Buy),
            fill(8, 108.0, 1.0, Side::Sell),
        ]);
        let report = build_report(&log, None).unwrap();

        assert_eq!(report.trades.len(), 2);
        assert!(report.trades[0].open_ts < report.trades[1].open_ts);
    }

    #[test]
    fn stats_aggregate_wins_and_losses() {
        let log = log_of(vec![
            fill(1, 100.0, 1.0, Side::Buy),
            fill(2, 110.0, 1.0, Side::Sell), // +10
            fill(3, 110.0, 1.0, Side::Buy),
            fill(4, 104.0, 1.0, Side::Sell), // -6
            fill(5, 104.0, 1.0, Side::Buy),
            fill(6, 104.0, 1.0, Side::Sell), // 0
        ]);
        let report = build_report(&log, None).unwrap();
        let stats = &report.stats;

        assert_eq!(stats.trade_count, 3);
        assert!((stats.gross_wins - 10.0).abs() < 1e-10);
        assert!((stats.gross_losses + 6.0).abs() < 1e-10);
        assert!((stats.total_pnl - 4.0).abs() < 1e-10);
        // One strictly positive trade out of three.
        assert!((stats.win_rate - 1.0 / 3.0).abs() < 1e-10);
        assert!((stats.profit_factor.unwrap() - 10.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn report_hash_is_deterministic() {
        let log = log_of(vec![
            fill(1, 100.0, 1.0, Side::Buy),
            fill(2, 110.0, 1.0, Side::Sell),
        ]);
        let a = build_report(&log, None).unwrap();
        let b = build_report(&log, None).unwrap();
        assert_eq!(a.report_hash(), b.report_hash());
    }

    #[test]
    fn report_serialization_roundtrip() {
        let log = log_of(vec![
            fill(1, 100.0, 2.0, Side::Buy),
            fill(2, 95.0, 2.0, Side::Sell),
        ]);
        let report = build_report(&log, None).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let deser: TradeReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, deser);
    }
}
