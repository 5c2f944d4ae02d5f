//! Backtest simulator and event loop.
//!
//! Walks an enriched series bar by bar with a Flat/Long state machine,
//! recording each closed position as a [`Trade`]. [`run_backtest`] adds the
//! single force-signal rerun used when the strategy never trades.

use crate::domain::error::CrosstraderError;
use crate::domain::indicator_helpers::{IndicatorSettings, apply_indicators};
use crate::domain::ohlcv::{Bar, Series};
use crate::domain::position::{ExitReason, Position, Trade};
use crate::domain::rule::Filter;
use crate::domain::signal::{Signal, evaluate};
use crate::domain::strategy::StrategyConfig;
use std::collections::BTreeMap;

/// Filter name -> number of bars on which it held.
pub type DebugCounts = BTreeMap<String, usize>;

pub const ENTRY_SIGNAL_KEY: &str = "entry_signal";
pub const EXIT_SIGNAL_KEY: &str = "exit_signal";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub trades: Vec<Trade>,
    pub debug_counts: DebugCounts,
    /// True when entries were forced rather than signalled.
    pub forced: bool,
    /// Bars walked after the date range was applied.
    pub bars: usize,
}

/// Run one simulation pass over an already enriched series.
pub fn simulate(
    series: &Series,
    config: &StrategyConfig,
) -> Result<BacktestReport, CrosstraderError> {
    series.require(&config.required_columns())?;

    let filtered;
    let bars = match &config.date_range {
        Some(range) => {
            filtered = series.within(range);
            filtered.bars()
        }
        None => series.bars(),
    };

    if bars.is_empty() {
        tracing::warn!(
            total_bars = series.len(),
            range = ?config.date_range,
            "no bars inside the date range, nothing to simulate"
        );
        return Ok(BacktestReport {
            trades: Vec::new(),
            debug_counts: DebugCounts::new(),
            forced: config.force_signal,
            bars: 0,
        });
    }

    let signals = bar_signals(bars, config);
    let last = bars.len() - 1;
    let mut position = Position::Flat;
    let mut trades = Vec::new();

    for (i, (bar, signal)) in bars.iter().zip(&signals).enumerate() {
        match position {
            Position::Flat => {
                if config.force_signal || *signal == Signal::Buy {
                    position = Position::Long {
                        entry_price: bar.close,
                        entry_timestamp: bar.timestamp,
                    };
                    tracing::debug!(
                        timestamp = %bar.timestamp,
                        price = bar.close,
                        forced = config.force_signal,
                        "position opened"
                    );
                }
            }
            Position::Long { .. } => {
                let Some(reason) = exit_reason(&position, bar, *signal, i == last, config) else {
                    continue;
                };
                if let Some(trade) = position.close(bar.close, bar.timestamp, reason) {
                    tracing::debug!(
                        timestamp = %bar.timestamp,
                        price = bar.close,
                        return_pct = trade.return_pct,
                        reason = %reason,
                        "position closed"
                    );
                    trades.push(trade);
                }
            }
        }
    }

    if !position.is_flat() {
        tracing::debug!("position still open at end of series, not recorded");
    }

    let debug_counts = debug_counts(bars, &signals, config);
    tracing::info!(
        bars = bars.len(),
        trades = trades.len(),
        forced = config.force_signal,
        "simulation finished"
    );

    Ok(BacktestReport {
        trades,
        debug_counts,
        forced: config.force_signal,
        bars: bars.len(),
    })
}

/// Simulate, then rerun once with `force_signal` if the first pass produced
/// no trades and was not already forced.
pub fn run_backtest(
    series: &Series,
    config: &StrategyConfig,
) -> Result<BacktestReport, CrosstraderError> {
    let report = simulate(series, config)?;
    if !report.trades.is_empty() || config.force_signal {
        return Ok(report);
    }

    tracing::info!("no trades from signals, rerunning with forced entries");
    simulate(series, &config.with_force_signal(true))
}

/// Enrich a raw series with indicators and run the backtest pipeline on it.
pub fn backtest(raw: &Series, config: &StrategyConfig) -> Result<BacktestReport, CrosstraderError> {
    let enriched = apply_indicators(raw, &IndicatorSettings::for_strategy(config))?;
    run_backtest(&enriched, config)
}

fn bar_signals(bars: &[Bar], config: &StrategyConfig) -> Vec<Signal> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| match i.checked_sub(1) {
            Some(prev) => evaluate(bar, &bars[prev], config),
            None => Signal::Hold,
        })
        .collect()
}

// Precedence: take profit, stop loss, sell signal, forced close on the last bar.
fn exit_reason(
    position: &Position,
    bar: &Bar,
    signal: Signal,
    is_last: bool,
    config: &StrategyConfig,
) -> Option<ExitReason> {
    let pnl = position.unrealized_return(bar.close)?;
    if pnl >= config.take_profit_fraction {
        Some(ExitReason::TakeProfit)
    } else if pnl <= -config.stop_loss_fraction {
        Some(ExitReason::StopLoss)
    } else if signal == Signal::Sell {
        Some(ExitReason::Signal)
    } else if config.force_signal && is_last {
        Some(ExitReason::Forced)
    } else {
        None
    }
}

fn debug_counts(bars: &[Bar], signals: &[Signal], config: &StrategyConfig) -> DebugCounts {
    let mut counts = DebugCounts::new();
    for filter in Filter::ALL {
        let hits = bars
            .iter()
            .enumerate()
            .filter(|(i, bar)| {
                let previous = i.checked_sub(1).map(|p| &bars[p]);
                filter.evaluate(bar, previous, config) == Some(true)
            })
            .count();
        counts.insert(filter.name().to_string(), hits);
    }
    let count = |wanted: Signal| signals.iter().filter(|s| **s == wanted).count();
    counts.insert(ENTRY_SIGNAL_KEY.to_string(), count(Signal::Buy));
    counts.insert(EXIT_SIGNAL_KEY.to_string(), count(Signal::Sell));
    counts
}
