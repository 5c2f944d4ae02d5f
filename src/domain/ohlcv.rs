//! OHLCV bar and series representation.

use crate::domain::error::CrosstraderError;
use crate::domain::schema::{self, Column, ColumnSet};
use chrono::{NaiveDate, NaiveDateTime};

/// One price bar plus the indicator fields derived from it.
///
/// Derived fields are `None` until the indicator engine fills them, and stay
/// `None` for bars inside an indicator's warm-up window.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub rsi: Option<f64>,
    pub ema: Option<f64>,
    pub sma: Option<f64>,
    pub adx: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

impl Bar {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            rsi: None,
            ema: None,
            sma: None,
            adx: None,
            macd: None,
            macd_signal: None,
        }
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Numeric value of a column; `None` for the timestamp or an undefined
    /// indicator.
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Timestamp => None,
            Column::Open => Some(self.open),
            Column::High => Some(self.high),
            Column::Low => Some(self.low),
            Column::Close => Some(self.close),
            Column::Volume => Some(self.volume as f64),
            Column::Rsi => self.rsi,
            Column::Ema => self.ema,
            Column::Sma => self.sma,
            Column::Adx => self.adx,
            Column::Macd => self.macd,
            Column::MacdSignal => self.macd_signal,
        }
    }

    pub fn set_value(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::Rsi => self.rsi = value,
            Column::Ema => self.ema = value,
            Column::Sma => self.sma = value,
            Column::Adx => self.adx = value,
            Column::Macd => self.macd = value,
            Column::MacdSignal => self.macd_signal = value,
            _ => {}
        }
    }
}

/// Inclusive calendar-date window applied before a backtest walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date <= self.end
    }
}

/// Bars in strictly ascending timestamp order, together with the set of
/// columns the bars actually carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
    columns: ColumnSet,
}

impl Series {
    pub fn new(bars: Vec<Bar>, columns: ColumnSet) -> Result<Self, CrosstraderError> {
        if let Some(i) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(CrosstraderError::UnorderedSeries { index: i + 1 });
        }
        Ok(Series { bars, columns })
    }

    /// A series with every OHLCV column present.
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self, CrosstraderError> {
        Series::new(bars, Column::OHLCV.into_iter().collect())
    }

    pub fn empty() -> Self {
        Series {
            bars: Vec::new(),
            columns: Column::OHLCV.into_iter().collect(),
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn require(&self, required: &[Column]) -> Result<(), CrosstraderError> {
        schema::require(&self.columns, required)
    }

    /// Keep only bars inside `range`. Columns are unchanged.
    pub fn within(&self, range: &DateRange) -> Series {
        Series {
            bars: self
                .bars
                .iter()
                .filter(|b| range.contains(b.timestamp))
                .cloned()
                .collect(),
            columns: self.columns.clone(),
        }
    }

    /// Replace the bars and add `columns`, keeping the ordering invariant
    /// the caller already guarantees (same timestamps as `self`).
    pub(crate) fn with_derived(&self, bars: Vec<Bar>, columns: &[Column]) -> Series {
        let mut all = self.columns.clone();
        all.extend(columns.iter().copied());
        Series { bars, columns: all }
    }
}
