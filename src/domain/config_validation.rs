//! Configuration validation.
//!
//! Checks every `[strategy]` and `[backtest]` value before a run. Absent keys
//! fall back to the defaults in [`StrategyConfig`](crate::domain::strategy::StrategyConfig);
//! present keys must parse and lie within range.

use crate::domain::error::CrosstraderError;
use crate::domain::ohlcv::DateRange;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    validate_periods(config)?;
    validate_rsi_thresholds(config)?;
    validate_adx_strength(config)?;
    for key in ["use_sma_filter", "use_macd_filter"] {
        parse_optional_bool(config, "strategy", key)?;
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    validate_fraction(config, "stop_loss")?;
    validate_fraction(config, "take_profit")?;
    parse_optional_bool(config, "backtest", "force_signal")?;
    read_date_range(config)?;
    Ok(())
}

/// `[backtest] start_date`/`end_date` as an inclusive range. Both or neither.
pub fn read_date_range(config: &dyn ConfigPort) -> Result<Option<DateRange>, CrosstraderError> {
    let start = non_empty(config.get_string("backtest", "start_date"));
    let end = non_empty(config.get_string("backtest", "end_date"));

    match (start, end) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(missing("backtest", "end_date")),
        (None, Some(_)) => Err(missing("backtest", "start_date")),
        (Some(start), Some(end)) => {
            let start = parse_date(&start, "start_date")?;
            let end = parse_date(&end, "end_date")?;
            if start > end {
                return Err(invalid(
                    "backtest",
                    "start_date",
                    "start_date must not be after end_date",
                ));
            }
            Ok(Some(DateRange::new(start, end)))
        }
    }
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    for key in ["rsi_period", "ema_period", "sma_period"] {
        if let Some(period) = parse_optional::<i64>(config, "strategy", key)? {
            if period < 1 {
                return Err(invalid(
                    "strategy",
                    key,
                    &format!("{key} must be at least 1"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_rsi_thresholds(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    let buy = parse_optional::<f64>(config, "strategy", "rsi_buy")?.unwrap_or(30.0);
    let sell = parse_optional::<f64>(config, "strategy", "rsi_sell")?.unwrap_or(70.0);

    for (key, value) in [("rsi_buy", buy), ("rsi_sell", sell)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid(
                "strategy",
                key,
                &format!("{key} must be between 0 and 100"),
            ));
        }
    }
    if buy >= sell {
        return Err(invalid(
            "strategy",
            "rsi_buy",
            "rsi_buy must be below rsi_sell",
        ));
    }
    Ok(())
}

fn validate_adx_strength(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    if let Some(value) = parse_optional::<f64>(config, "strategy", "adx_min_strength")? {
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid(
                "strategy",
                "adx_min_strength",
                "adx_min_strength must be between 0 and 100",
            ));
        }
    }
    Ok(())
}

fn validate_fraction(config: &dyn ConfigPort, key: &str) -> Result<(), CrosstraderError> {
    if let Some(value) = parse_optional::<f64>(config, "backtest", key)? {
        if !(value > 0.0 && value < 1.0) {
            return Err(invalid(
                "backtest",
                key,
                &format!("{key} must be between 0 and 1 (exclusive)"),
            ));
        }
    }
    Ok(())
}

fn parse_optional<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, CrosstraderError> {
    match non_empty(config.get_string(section, key)) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, &format!("cannot parse '{raw}'"))),
    }
}

fn parse_optional_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), CrosstraderError> {
    match non_empty(config.get_string(section, key)) {
        Some(raw) if parse_bool(&raw).is_none() => Err(invalid(
            section,
            key,
            &format!("expected true/false, got '{raw}'"),
        )),
        _ => Ok(()),
    }
}

/// Accepts true/false, yes/no, 1/0 in any case.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, CrosstraderError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        invalid(
            "backtest",
            field,
            &format!("invalid {field} format, expected YYYY-MM-DD"),
        )
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn missing(section: &str, key: &str) -> CrosstraderError {
    CrosstraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> CrosstraderError {
    CrosstraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
