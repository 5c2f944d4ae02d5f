//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(C[i-n+1..=i]), kept as a running sum.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, undefined_points,
};
use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: undefined_points(bars.iter().map(|b| b.timestamp)),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.close;
        if i >= period {
            sum -= bars[i - period].close;
        }
        let value = if i + 1 >= period {
            Some(IndicatorValue::Simple(sum / period as f64))
        } else {
            None
        };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), c, c, c, c, 1000))
            .collect()
    }

    #[test]
    fn sma_rolling_mean() {
        let series = calculate_sma(&make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        assert_eq!(
            series.simple_values(),
            vec![None, None, Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn sma_insufficient_history() {
        let series = calculate_sma(&make_bars(&[1.0, 2.0]), 200);
        assert_eq!(series.values.len(), 2);
        assert_eq!(series.first_defined(), None);
    }

    #[test]
    fn sma_period_0() {
        let series = calculate_sma(&make_bars(&[1.0, 2.0]), 0);
        assert!(series.values.iter().all(|p| !p.is_defined()));
    }

    #[test]
    fn sma_indicator_type() {
        let series = calculate_sma(&make_bars(&[1.0]), 20);
        assert_eq!(series.indicator_type, IndicatorType::Sma(20));
    }
}
