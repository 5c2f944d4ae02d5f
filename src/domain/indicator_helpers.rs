//! Indicator enrichment pipeline and shared smoothing helpers.

use crate::domain::error::CrosstraderError;
use crate::domain::indicator::{
    IndicatorValue, adx, calculate_adx, calculate_ema, calculate_macd, calculate_rsi,
    calculate_sma, macd,
};
use crate::domain::ohlcv::Series;
use crate::domain::schema::Column;
use crate::domain::strategy::StrategyConfig;

/// Periods used to enrich a series. ADX and MACD parameters are fixed by
/// [`IndicatorSettings::for_strategy`]; only RSI/EMA/SMA follow the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub sma_period: usize,
    pub adx_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl IndicatorSettings {
    pub fn for_strategy(config: &StrategyConfig) -> Self {
        IndicatorSettings {
            rsi_period: config.rsi_period,
            ema_period: config.ema_period,
            sma_period: config.sma_period,
            ..Self::default()
        }
    }
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            rsi_period: 14,
            ema_period: 50,
            sma_period: 200,
            adx_window: adx::DEFAULT_WINDOW,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
        }
    }
}

/// Return a copy of `series` with every indicator column populated.
///
/// Fails with `MissingColumn` when `timestamp`/`close` (or `high`/`low`,
/// which ADX needs) are absent. Bars without enough history keep `None`.
pub fn apply_indicators(
    series: &Series,
    settings: &IndicatorSettings,
) -> Result<Series, CrosstraderError> {
    series.require(&[Column::Timestamp, Column::Close, Column::High, Column::Low])?;

    let bars = series.bars();
    let rsi = calculate_rsi(bars, settings.rsi_period).simple_values();
    let ema = calculate_ema(bars, settings.ema_period).simple_values();
    let sma = calculate_sma(bars, settings.sma_period).simple_values();
    let adx = calculate_adx(bars, settings.adx_window).simple_values();
    let macd_series = calculate_macd(
        bars,
        settings.macd_fast,
        settings.macd_slow,
        settings.macd_signal,
    );

    let enriched = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mut bar = bar.clone();
            bar.rsi = rsi[i];
            bar.ema = ema[i];
            bar.sma = sma[i];
            bar.adx = adx[i];
            (bar.macd, bar.macd_signal) = match macd_series.values[i].value {
                Some(IndicatorValue::Macd { line, signal, .. }) => (Some(line), Some(signal)),
                _ => (None, None),
            };
            bar
        })
        .collect();

    tracing::debug!(
        bars = bars.len(),
        rsi_period = settings.rsi_period,
        ema_period = settings.ema_period,
        sma_period = settings.sma_period,
        "indicators applied"
    );

    Ok(series.with_derived(enriched, &Column::INDICATORS))
}

/// Wilder smoothing over an input whose defined values are contiguous.
///
/// Seed = mean of the first `period` defined values; afterwards
/// s = (s * (period - 1) + x) / period.
pub fn wilder_smooth(input: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; input.len()];
    if period == 0 {
        return out;
    }
    let Some(start) = input.iter().position(Option::is_some) else {
        return out;
    };
    let seed_end = start + period;
    if seed_end > input.len() {
        return out;
    }

    let seed: Option<f64> = input[start..seed_end].iter().copied().sum();
    let Some(mut s) = seed.map(|sum| sum / period as f64) else {
        return out;
    };
    out[seed_end - 1] = Some(s);

    for i in seed_end..input.len() {
        let Some(x) = input[i] else { break };
        s = (s * (period - 1) as f64 + x) / period as f64;
        out[i] = Some(s);
    }
    out
}
