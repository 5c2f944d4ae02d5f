//! Entry and exit predicates.
//!
//! Each [`Filter`] is an independent predicate over the current bar and its
//! predecessor. Entry and exit conditions are ANDs of filters, so the same
//! predicates can be counted one by one when diagnosing a configuration.
//!
//! Evaluation returns `None` when an input field is undefined.

use crate::domain::ohlcv::Bar;
use crate::domain::strategy::StrategyConfig;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Filter {
    /// rsi < rsi_buy_threshold
    RsiBelowBuy,
    /// close > ema while previous close <= previous ema
    EmaCrossover,
    /// close > sma
    CloseAboveSma,
    /// adx >= adx_min_strength
    AdxStrength,
    /// macd > macd_signal
    MacdAboveSignal,
    /// rsi > rsi_sell_threshold
    RsiAboveSell,
    /// close < ema
    CloseBelowEma,
}

pub const ENTRY_FILTERS: [Filter; 5] = [
    Filter::RsiBelowBuy,
    Filter::EmaCrossover,
    Filter::CloseAboveSma,
    Filter::AdxStrength,
    Filter::MacdAboveSignal,
];

/// Exits are never gated by the optional filters.
pub const EXIT_FILTERS: [Filter; 2] = [Filter::RsiAboveSell, Filter::CloseBelowEma];

impl Filter {
    pub const ALL: [Filter; 7] = [
        Filter::RsiBelowBuy,
        Filter::EmaCrossover,
        Filter::CloseAboveSma,
        Filter::AdxStrength,
        Filter::MacdAboveSignal,
        Filter::RsiAboveSell,
        Filter::CloseBelowEma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::RsiBelowBuy => "rsi_below_buy",
            Filter::EmaCrossover => "ema_crossover",
            Filter::CloseAboveSma => "close_above_sma",
            Filter::AdxStrength => "adx_strength",
            Filter::MacdAboveSignal => "macd_above_signal",
            Filter::RsiAboveSell => "rsi_above_sell",
            Filter::CloseBelowEma => "close_below_ema",
        }
    }

    /// Whether the filter takes part in its condition under `config`.
    pub fn is_enabled(self, config: &StrategyConfig) -> bool {
        match self {
            Filter::CloseAboveSma => config.use_sma_filter,
            Filter::AdxStrength => config.adx_filter_enabled(),
            Filter::MacdAboveSignal => config.use_macd_filter,
            _ => true,
        }
    }

    pub fn evaluate(
        self,
        current: &Bar,
        previous: Option<&Bar>,
        config: &StrategyConfig,
    ) -> Option<bool> {
        let holds = match self {
            Filter::RsiBelowBuy => current.rsi? < config.rsi_buy_threshold,
            Filter::EmaCrossover => {
                let previous = previous?;
                current.close > current.ema? && previous.close <= previous.ema?
            }
            Filter::CloseAboveSma => current.close > current.sma?,
            Filter::AdxStrength => current.adx? >= config.adx_min_strength,
            Filter::MacdAboveSignal => current.macd? > current.macd_signal?,
            Filter::RsiAboveSell => current.rsi? > config.rsi_sell_threshold,
            Filter::CloseBelowEma => current.close < current.ema?,
        };
        Some(holds)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// AND of every enabled filter in `filters`. `None` if any enabled filter
/// cannot be evaluated.
pub fn all_pass(
    filters: &[Filter],
    current: &Bar,
    previous: Option<&Bar>,
    config: &StrategyConfig,
) -> Option<bool> {
    let mut result = true;
    for filter in filters.iter().filter(|f| f.is_enabled(config)) {
        result &= filter.evaluate(current, previous, config)?;
    }
    Some(result)
}
