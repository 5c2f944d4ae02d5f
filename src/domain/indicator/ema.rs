//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, undefined_points,
};
use crate::domain::ohlcv::Bar;

pub fn calculate_ema(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = match ema_values(&closes, period) {
        Some(ema) => bars
            .iter()
            .zip(ema)
            .map(|(bar, v)| IndicatorPoint {
                timestamp: bar.timestamp,
                value: v.map(IndicatorValue::Simple),
            })
            .collect(),
        None => undefined_points(bars.iter().map(|b| b.timestamp)),
    };

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// EMA over raw values. `None` when `period` is 0; otherwise one entry per
/// input, undefined for the first `period - 1`.
pub(crate) fn ema_values(input: &[f64], period: usize) -> Option<Vec<Option<f64>>> {
    if period == 0 {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(input.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &x) in input.iter().enumerate() {
        if i < period - 1 {
            sum += x;
            out.push(None);
        } else if i == period - 1 {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = x * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }

    Some(out)
}
