//! Position state and closed trades.

use chrono::NaiveDateTime;
use std::fmt;

/// At most one long position is ever open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    #[default]
    Flat,
    Long {
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
    },
}

impl Position {
    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    /// Fractional return if closed at `price`; `None` when flat.
    pub fn unrealized_return(&self, price: f64) -> Option<f64> {
        match self {
            Position::Flat => None,
            Position::Long { entry_price, .. } => Some((price - entry_price) / entry_price),
        }
    }

    /// Close at `exit_price`, leaving the position flat.
    pub fn close(
        &mut self,
        exit_price: f64,
        exit_timestamp: NaiveDateTime,
        exit_reason: ExitReason,
    ) -> Option<Trade> {
        match std::mem::take(self) {
            Position::Flat => None,
            Position::Long {
                entry_price,
                entry_timestamp,
            } => Some(Trade::new(
                entry_timestamp,
                exit_timestamp,
                entry_price,
                exit_price,
                exit_reason,
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Signal,
    Forced,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::Signal => "signal",
            ExitReason::Forced => "forced",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_timestamp: NaiveDateTime,
    pub exit_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Percent, e.g. -2.0 for a 2% loss.
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn new(
        entry_timestamp: NaiveDateTime,
        exit_timestamp: NaiveDateTime,
        entry_price: f64,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        Trade {
            entry_timestamp,
            exit_timestamp,
            entry_price,
            exit_price,
            return_pct: (exit_price - entry_price) / entry_price * 100.0,
            exit_reason,
        }
    }

    pub fn is_win(&self) -> bool {
        self.return_pct > 0.0
    }
}
