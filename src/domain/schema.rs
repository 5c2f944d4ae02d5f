//! Column schema and header normalization.
//!
//! Upstream feeds disagree on header spelling (`Date` vs `date`, `Close` vs
//! `close`, `timestamp` vs `datetime`). Every header is mapped onto a single
//! canonical [`Column`] before any consumer looks at it.

use crate::domain::error::CrosstraderError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Timestamp,
    Open,
    High,
    Low,
    Close,
    Volume,
    Rsi,
    Ema,
    Sma,
    Adx,
    Macd,
    MacdSignal,
}

impl Column {
    pub const OHLCV: [Column; 6] = [
        Column::Timestamp,
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub const INDICATORS: [Column; 6] = [
        Column::Rsi,
        Column::Ema,
        Column::Sma,
        Column::Adx,
        Column::Macd,
        Column::MacdSignal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::Close => "close",
            Column::Volume => "volume",
            Column::Rsi => "rsi",
            Column::Ema => "ema",
            Column::Sma => "sma",
            Column::Adx => "adx",
            Column::Macd => "macd",
            Column::MacdSignal => "macd_signal",
        }
    }

    /// Map a raw header onto its canonical column. Matching ignores case and
    /// surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Column> {
        let normalized = header.trim().to_ascii_lowercase();
        let column = match normalized.as_str() {
            "date" | "timestamp" | "datetime" | "time" => Column::Timestamp,
            "open" => Column::Open,
            "high" => Column::High,
            "low" => Column::Low,
            "close" => Column::Close,
            "volume" => Column::Volume,
            "rsi" => Column::Rsi,
            "ema" => Column::Ema,
            "sma" => Column::Sma,
            "adx" => Column::Adx,
            "macd" => Column::Macd,
            "macd_signal" | "macdsignal" | "signal" => Column::MacdSignal,
            _ => return None,
        };
        Some(column)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type ColumnSet = BTreeSet<Column>;

/// Fail with `MissingColumn` for the first required column not in `present`.
pub fn require(present: &ColumnSet, required: &[Column]) -> Result<(), CrosstraderError> {
    match required.iter().find(|c| !present.contains(c)) {
        Some(&column) => Err(CrosstraderError::missing(column)),
        None => Ok(()),
    }
}

/// Canonical column → field position within a header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: HashMap<Column, usize>,
}

impl ColumnIndex {
    /// Build an index from raw headers. Unknown headers are ignored; when two
    /// headers normalize to the same column, the first one wins.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut positions = HashMap::new();
        for (i, header) in headers.into_iter().enumerate() {
            if let Some(column) = Column::from_header(header) {
                positions.entry(column).or_insert(i);
            }
        }
        Self { positions }
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    pub fn columns(&self) -> ColumnSet {
        self.positions.keys().copied().collect()
    }

    pub fn require(&self, required: &[Column]) -> Result<(), CrosstraderError> {
        require(&self.columns(), required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalized_and_lowercase_headers_normalize() {
        assert_eq!(Column::from_header("Date"), Some(Column::Timestamp));
        assert_eq!(Column::from_header("date"), Some(Column::Timestamp));
        assert_eq!(Column::from_header("Close"), Some(Column::Close));
        assert_eq!(Column::from_header(" close "), Some(Column::Close));
        assert_eq!(Column::from_header("MACD_Signal"), Some(Column::MacdSignal));
    }

    #[test]
    fn unknown_header_is_ignored() {
        assert_eq!(Column::from_header("adj_close"), None);
        let index = ColumnIndex::from_headers(["Date", "Adj_Close", "Close"]);
        assert_eq!(index.position(Column::Timestamp), Some(0));
        assert_eq!(index.position(Column::Close), Some(2));
        assert_eq!(index.columns().len(), 2);
    }

    #[test]
    fn duplicate_header_keeps_first() {
        let index = ColumnIndex::from_headers(["date", "Close", "close"]);
        assert_eq!(index.position(Column::Close), Some(1));
    }

    #[test]
    fn require_reports_first_missing_column() {
        let index = ColumnIndex::from_headers(["date", "open"]);
        let err = index
            .require(&[Column::Timestamp, Column::Close, Column::High])
            .unwrap_err();
        assert!(matches!(
            err,
            CrosstraderError::MissingColumn {
                column: Column::Close
            }
        ));
    }

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(Column::MacdSignal.to_string(), "macd_signal");
        assert_eq!(Column::Timestamp.to_string(), "timestamp");
    }
}
