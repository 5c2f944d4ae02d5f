//! Strategy configuration.

use crate::domain::ohlcv::DateRange;
use crate::domain::schema::Column;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub sma_period: usize,
    pub rsi_buy_threshold: f64,
    pub rsi_sell_threshold: f64,
    /// 0 disables the ADX filter.
    pub adx_min_strength: f64,
    pub use_sma_filter: bool,
    pub use_macd_filter: bool,
    pub stop_loss_fraction: f64,
    pub take_profit_fraction: f64,
    pub date_range: Option<DateRange>,
    pub force_signal: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            rsi_period: 14,
            ema_period: 50,
            sma_period: 200,
            rsi_buy_threshold: 30.0,
            rsi_sell_threshold: 70.0,
            adx_min_strength: 20.0,
            use_sma_filter: true,
            use_macd_filter: true,
            stop_loss_fraction: 0.02,
            take_profit_fraction: 0.04,
            date_range: None,
            force_signal: false,
        }
    }
}

impl StrategyConfig {
    pub fn with_force_signal(&self, force_signal: bool) -> Self {
        StrategyConfig {
            force_signal,
            ..self.clone()
        }
    }

    pub fn adx_filter_enabled(&self) -> bool {
        self.adx_min_strength > 0.0
    }

    /// Indicator columns a bar must have defined before this config can
    /// produce anything other than HOLD.
    pub fn needed_indicators(&self) -> Vec<Column> {
        let mut columns = vec![Column::Rsi, Column::Ema];
        if self.use_sma_filter {
            columns.push(Column::Sma);
        }
        if self.adx_filter_enabled() {
            columns.push(Column::Adx);
        }
        if self.use_macd_filter {
            columns.extend([Column::Macd, Column::MacdSignal]);
        }
        columns
    }

    /// Columns the simulator refuses to run without.
    pub fn required_columns(&self) -> Vec<Column> {
        let mut columns = vec![Column::Timestamp, Column::Close];
        if self.adx_filter_enabled() {
            columns.extend([Column::High, Column::Low]);
        }
        columns.extend(self.needed_indicators());
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn defaults_match_dashboard() {
        let c = StrategyConfig::default();
        assert_eq!((c.rsi_period, c.ema_period, c.sma_period), (14, 50, 200));
        assert_eq!(c.rsi_buy_threshold, 30.0);
        assert_eq!(c.rsi_sell_threshold, 70.0);
        assert_eq!(c.adx_min_strength, 20.0);
        assert!(c.use_sma_filter);
        assert!(c.use_macd_filter);
        assert!(!c.force_signal);
        assert!(c.date_range.is_none());
    }

    #[test]
    fn with_force_signal_copies_everything_else() {
        let c = StrategyConfig {
            date_range: Some(DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            )),
            ..StrategyConfig::default()
        };
        let forced = c.with_force_signal(true);
        assert!(forced.force_signal);
        assert!(!c.force_signal);
        assert_eq!(forced.with_force_signal(false), c);
    }

    #[test]
    fn needed_indicators_follow_filters() {
        let c = StrategyConfig {
            adx_min_strength: 0.0,
            use_sma_filter: false,
            use_macd_filter: false,
            ..StrategyConfig::default()
        };
        assert_eq!(c.needed_indicators(), vec![Column::Rsi, Column::Ema]);

        let all = StrategyConfig::default().needed_indicators();
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn required_columns_include_high_low_only_for_adx() {
        let cols = StrategyConfig::default().required_columns();
        assert!(cols.starts_with(&[Column::Timestamp, Column::Close, Column::High, Column::Low]));

        let no_adx = StrategyConfig {
            adx_min_strength: 0.0,
            ..StrategyConfig::default()
        }
        .required_columns();
        assert!(no_adx.starts_with(&[Column::Timestamp, Column::Close]));
        assert!(!no_adx.contains(&Column::High));
        assert!(!no_adx.contains(&Column::Low));
    }
}
