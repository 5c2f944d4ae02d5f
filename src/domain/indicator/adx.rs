//! ADX (Average Directional Index), Wilder.
//!
//! Steps:
//! 1. +DM / -DM and true range from consecutive bars
//! 2. Wilder-smooth +DM, -DM and TR over `period`
//! 3. +DI = 100 * +DM_s / TR_s, -DI = 100 * -DM_s / TR_s
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Warmup: first (2 * period - 1) bars are undefined.

use crate::domain::indicator::{
    IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, undefined_points,
};
use crate::domain::indicator_helpers::wilder_smooth;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_WINDOW: usize = 14;

pub fn calculate_adx(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Adx(period),
            values: undefined_points(bars.iter().map(|b| b.timestamp)),
        };
    }

    let n = bars.len();
    let mut tr = vec![None; n];
    let mut plus_dm = vec![None; n];
    let mut minus_dm = vec![None; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;

        plus_dm[i] = Some(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm[i] = Some(if down > up && down > 0.0 { down } else { 0.0 });
        tr[i] = Some(bars[i].true_range(bars[i - 1].close));
    }

    let tr_s = wilder_smooth(&tr, period);
    let plus_s = wilder_smooth(&plus_dm, period);
    let minus_s = wilder_smooth(&minus_dm, period);

    let dx: Vec<Option<f64>> = (0..n)
        .map(|i| {
            let (tr, plus, minus) = (tr_s[i]?, plus_s[i]?, minus_s[i]?);
            if tr == 0.0 {
                return Some(0.0);
            }
            let plus_di = 100.0 * plus / tr;
            let minus_di = 100.0 * minus / tr;
            let di_sum = plus_di + minus_di;
            if di_sum == 0.0 {
                Some(0.0)
            } else {
                Some(100.0 * ((plus_di - minus_di).abs() / di_sum))
            }
        })
        .collect();

    let values = bars
        .iter()
        .zip(wilder_smooth(&dx, period))
        .map(|(bar, adx)| IndicatorPoint {
            timestamp: bar.timestamp,
            value: adx.map(IndicatorValue::Simple),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Adx(period),
        values,
    }
}
