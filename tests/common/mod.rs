#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use crosstrader::domain::error::CrosstraderError;
pub use crosstrader::domain::ohlcv::{Bar, Series};
use crosstrader::domain::strategy::StrategyConfig;
use crosstrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str) -> Result<Series, CrosstraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(CrosstraderError::DataRead {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) => Series::from_bars(bars.clone()),
            None => Err(CrosstraderError::DataRead {
                reason: format!("unknown symbol {symbol}"),
            }),
        }
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn day(start: &str, offset: i64) -> NaiveDateTime {
    date(start).and_hms_opt(0, 0, 0).unwrap() + Duration::days(offset)
}

pub fn make_bar(timestamp: NaiveDateTime, close: f64) -> Bar {
    Bar::new(timestamp, close, close + 1.0, close - 1.0, close, 10_000)
}

/// One daily bar per close, starting at `start`.
pub fn bars_from_closes(start: &str, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(day(start, i as i64), c))
        .collect()
}

/// `count` daily bars oscillating around `base` with a slow drift, enough
/// swings for crossovers to occur.
pub fn generate_bars(start: &str, count: usize, base: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            base + (t * 0.21).sin() * base * 0.06 + (t * 0.043).cos() * base * 0.03 + t * 0.01
        })
        .collect();
    bars_from_closes(start, &closes)
}

/// Short periods and no optional filters so small fixtures produce signals.
pub fn fast_config() -> StrategyConfig {
    StrategyConfig {
        rsi_period: 5,
        ema_period: 8,
        sma_period: 20,
        rsi_buy_threshold: 45.0,
        rsi_sell_threshold: 55.0,
        adx_min_strength: 0.0,
        use_sma_filter: false,
        use_macd_filter: false,
        ..StrategyConfig::default()
    }
}
