//! Per-bar signal evaluation.
//!
//! Looks only at the bar being decided and the one before it. BUY is checked
//! first, so it wins if both conditions hold at once.

use crate::domain::ohlcv::Bar;
use crate::domain::rule::{ENTRY_FILTERS, EXIT_FILTERS, all_pass};
use crate::domain::strategy::StrategyConfig;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        })
    }
}

/// Decide on `current` given its predecessor.
///
/// Returns HOLD when any field the config needs is undefined on `current`,
/// or the EMA is undefined on `previous`.
pub fn evaluate(current: &Bar, previous: &Bar, config: &StrategyConfig) -> Signal {
    let defined = config
        .needed_indicators()
        .into_iter()
        .all(|column| current.value(column).is_some());
    if !defined || previous.ema.is_none() {
        return Signal::Hold;
    }

    if entry_condition(current, previous, config) == Some(true) {
        Signal::Buy
    } else if exit_condition(current, config) == Some(true) {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Signal for the most recent bar of `bars`; HOLD with fewer than two bars.
pub fn check_signal(bars: &[Bar], config: &StrategyConfig) -> Signal {
    match bars {
        [.., previous, current] => evaluate(current, previous, config),
        _ => Signal::Hold,
    }
}

pub fn entry_condition(current: &Bar, previous: &Bar, config: &StrategyConfig) -> Option<bool> {
    all_pass(&ENTRY_FILTERS, current, Some(previous), config)
}

pub fn exit_condition(current: &Bar, config: &StrategyConfig) -> Option<bool> {
    all_pass(&EXIT_FILTERS, current, None, config)
}
