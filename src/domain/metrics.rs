//! Performance summary over a trade ledger.

use crate::domain::position::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub trades: usize,
    /// Fraction of trades with a positive return, 0..=1.
    pub win_rate: f64,
    /// Mean per-trade return, percent.
    pub avg_return: f64,
    /// Compounded return, fraction.
    pub total_return: f64,
    /// Compounded growth of 1.0 after each trade; one point per trade.
    pub equity_curve: Vec<f64>,
    pub best_trade: f64,
    pub worst_trade: f64,
}

impl Performance {
    /// `None` when the ledger is empty.
    pub fn compute(trades: &[Trade]) -> Option<Self> {
        if trades.is_empty() {
            return None;
        }

        let n = trades.len() as f64;
        let wins = trades.iter().filter(|t| t.is_win()).count();

        let mut equity = 1.0_f64;
        let equity_curve: Vec<f64> = trades
            .iter()
            .map(|t| {
                equity *= 1.0 + t.return_pct / 100.0;
                equity
            })
            .collect();

        let returns = trades.iter().map(|t| t.return_pct);
        let best_trade = returns.clone().fold(f64::NEG_INFINITY, f64::max);
        let worst_trade = returns.clone().fold(f64::INFINITY, f64::min);
        let avg_return = returns.sum::<f64>() / n;

        Some(Performance {
            trades: trades.len(),
            win_rate: wins as f64 / n,
            avg_return,
            total_return: equity - 1.0,
            equity_curve,
            best_trade,
            worst_trade,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::ExitReason;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn trades(returns: &[(f64, f64)]) -> Vec<Trade> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        returns
            .iter()
            .enumerate()
            .map(|(i, &(entry, exit))| {
                let day = start + Duration::days(2 * i as i64);
                Trade::new(day, day + Duration::days(1), entry, exit, ExitReason::Signal)
            })
            .collect()
    }

    #[test]
    fn no_trades() {
        assert!(Performance::compute(&[]).is_none());
    }

    #[test]
    fn single_trade() {
        let p = Performance::compute(&trades(&[(100.0, 98.0)])).unwrap();
        assert_eq!(p.trades, 1);
        assert_relative_eq!(p.win_rate, 0.0);
        assert_relative_eq!(p.avg_return, -2.0, epsilon = 1e-9);
        assert_relative_eq!(p.total_return, -0.02, epsilon = 1e-12);
        assert_eq!(p.equity_curve.len(), 1);
    }

    #[test]
    fn compounding_and_extremes() {
        // +10%, -5%, +20%
        let p = Performance::compute(&trades(&[(100.0, 110.0), (100.0, 95.0), (50.0, 60.0)])).unwrap();
        assert_relative_eq!(p.win_rate, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.avg_return, 25.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(p.total_return, 1.1 * 0.95 * 1.2 - 1.0, epsilon = 1e-9);
        assert_relative_eq!(p.best_trade, 20.0, epsilon = 1e-9);
        assert_relative_eq!(p.worst_trade, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn equity_curve_recurrence() {
        let ledger = trades(&[(100.0, 103.0), (103.0, 99.0), (99.0, 101.0), (101.0, 101.0)]);
        let p = Performance::compute(&ledger).unwrap();

        assert_relative_eq!(p.equity_curve[0], 1.0 + ledger[0].return_pct / 100.0, epsilon = 1e-12);
        for i in 1..ledger.len() {
            assert_relative_eq!(
                p.equity_curve[i],
                p.equity_curve[i - 1] * (1.0 + ledger[i].return_pct / 100.0),
                epsilon = 1e-12
            );
        }
        assert_relative_eq!(*p.equity_curve.last().unwrap(), 1.0 + p.total_return, epsilon = 1e-12);
    }

    #[test]
    fn breakeven_is_not_a_win() {
        let p = Performance::compute(&trades(&[(100.0, 100.0)])).unwrap();
        assert_relative_eq!(p.win_rate, 0.0);
    }
}
