//! CSV file data adapter.
//!
//! Reads `<base_path>/<SYMBOL>.csv`. Headers are matched case-insensitively
//! (`date`, `timestamp`, `datetime` and `time` all name the timestamp);
//! only `timestamp` and `close` are mandatory. Indicator columns already
//! present in the file are loaded as-is.

use crate::domain::error::CrosstraderError;
use crate::domain::ohlcv::{Bar, Series};
use crate::domain::schema::{Column, ColumnIndex};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<Series, CrosstraderError> {
        let path = self.csv_path(symbol);
        let file = File::open(&path).map_err(|e| CrosstraderError::DataRead {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let series = read_series(file)?;
        tracing::debug!(
            path = %path.display(),
            bars = series.len(),
            columns = series.columns().len(),
            "series loaded"
        );
        Ok(series)
    }
}

/// Parse CSV bars from any reader and sort them by timestamp.
pub fn read_series<R: Read>(reader: R) -> Result<Series, CrosstraderError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| CrosstraderError::DataRead {
        reason: format!("CSV header error: {}", e),
    })?;
    let index = ColumnIndex::from_headers(headers.iter());
    index.require(&[Column::Timestamp, Column::Close])?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| CrosstraderError::DataRead {
            reason: format!("CSV parse error: {}", e),
        })?;
        bars.push(parse_record(&record, &index, row + 1)?);
    }

    bars.sort_by_key(|b| b.timestamp);
    Series::new(bars, index.columns())
}

fn parse_record(
    record: &csv::StringRecord,
    index: &ColumnIndex,
    row: usize,
) -> Result<Bar, CrosstraderError> {
    let field = |column: Column| index.position(column).and_then(|i| record.get(i));

    let raw_timestamp = field(Column::Timestamp).unwrap_or_default();
    let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| CrosstraderError::DataRead {
        reason: format!("row {row}: invalid timestamp '{raw_timestamp}'"),
    })?;

    let price = |column: Column| -> Result<Option<f64>, CrosstraderError> {
        match field(column) {
            None => Ok(None),
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Some(value)),
                Ok(_) => Err(CrosstraderError::DataRead {
                    reason: format!("row {row}: non-finite {column} value '{raw}'"),
                }),
                Err(e) => Err(CrosstraderError::DataRead {
                    reason: format!("row {row}: invalid {column} value '{raw}': {e}"),
                }),
            },
        }
    };

    let close = price(Column::Close)?.unwrap_or_default();
    let open = price(Column::Open)?.unwrap_or(close);
    let high = price(Column::High)?.unwrap_or(close);
    let low = price(Column::Low)?.unwrap_or(close);
    let volume = match field(Column::Volume) {
        None | Some("") => 0,
        Some(raw) => parse_volume(raw).ok_or_else(|| CrosstraderError::DataRead {
            reason: format!("row {row}: invalid volume value '{raw}'"),
        })?,
    };

    let mut bar = Bar::new(timestamp, open, high, low, close, volume);
    for column in Column::INDICATORS {
        bar.set_value(column, field(column).and_then(parse_indicator));
    }
    Ok(bar)
}

/// Naive timestamp from a date, a date-time, or an offset-bearing date-time.
/// Offsets are dropped and the wall-clock time is kept.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.naive_local())
}

// Some feeds write volume as a float ("1200.0").
fn parse_volume(raw: &str) -> Option<i64> {
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
}

// Blank and NaN cells are warm-up rows written by other tools.
fn parse_indicator(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "Date,Open,High,Low,Close,Volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";
        fs::write(path.join("INFY.csv"), csv_content).unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_series_sorts_and_parses() {
        let (_dir, path) = setup_test_data();
        let series = CsvAdapter::new(path).fetch_series("INFY").unwrap();

        assert_eq!(series.len(), 3);
        let first = &series.bars()[0];
        assert_eq!(first.timestamp, ts(2024, 1, 15, 0, 0, 0));
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.volume, 50000);
        for column in Column::OHLCV {
            assert!(series.has(column));
        }
        assert!(!series.has(Column::Rsi));
    }

    #[test]
    fn fetch_series_missing_file_is_data_error() {
        let (_dir, path) = setup_test_data();
        let err = CsvAdapter::new(path).fetch_series("TCS").unwrap_err();
        assert!(matches!(err, CrosstraderError::DataRead { .. }));
    }

    #[test]
    fn close_only_file_records_missing_columns() {
        let csv = "timestamp,close\n2024-01-01 09:15:00,10.5\n2024-01-01 09:16:00,10.6\n";
        let series = read_series(csv.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.has(Column::Close));
        assert!(!series.has(Column::High));
        assert_eq!(series.bars()[0].high, 10.5);
        assert_eq!(series.bars()[1].timestamp, ts(2024, 1, 1, 9, 16, 0));
    }

    #[test]
    fn missing_close_is_missing_column() {
        let err = read_series("date,open\n2024-01-01,1.0\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            CrosstraderError::MissingColumn {
                column: Column::Close
            }
        ));
    }

    #[test]
    fn missing_timestamp_is_missing_column() {
        let err = read_series("open,close\n1.0,2.0\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            CrosstraderError::MissingColumn {
                column: Column::Timestamp
            }
        ));
    }

    #[test]
    fn duplicate_timestamp_is_rejected() {
        let csv = "date,close\n2024-01-02,1\n2024-01-02,2\n";
        let err = read_series(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CrosstraderError::UnorderedSeries { index: 1 }));
    }

    #[test]
    fn invalid_price_is_data_error() {
        let err = read_series("date,close\n2024-01-02,abc\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CrosstraderError::DataRead { .. }));
    }

    #[test]
    fn non_finite_price_is_data_error() {
        for cell in ["NaN", "inf", "-inf"] {
            let csv = format!("date,close\n2024-01-02,{cell}\n");
            let err = read_series(csv.as_bytes()).unwrap_err();
            assert!(matches!(err, CrosstraderError::DataRead { .. }), "{cell}");
        }
        let csv = "date,open,high,low,close\n2024-01-02,1,NaN,1,1\n";
        assert!(matches!(
            read_series(csv.as_bytes()).unwrap_err(),
            CrosstraderError::DataRead { .. }
        ));
    }

    #[test]
    fn precomputed_indicators_are_loaded() {
        let csv = "date,close,high,low,RSI,EMA,macd_signal\n\
            2024-01-02,10,11,9,,,\n\
            2024-01-03,11,12,10,55.5,10.2,NaN\n";
        let series = read_series(csv.as_bytes()).unwrap();
        assert!(series.has(Column::Rsi));
        assert!(series.has(Column::MacdSignal));
        assert!(!series.has(Column::Sma));
        assert_eq!(series.bars()[0].rsi, None);
        assert_eq!(series.bars()[1].rsi, Some(55.5));
        assert_eq!(series.bars()[1].ema, Some(10.2));
        assert_eq!(series.bars()[1].macd_signal, None);
    }

    #[test]
    fn float_volume_is_accepted() {
        let series = read_series("date,close,volume\n2024-01-02,1,1200.0\n".as_bytes()).unwrap();
        assert_eq!(series.bars()[0].volume, 1200);
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(parse_timestamp("2024-03-05"), Some(ts(2024, 3, 5, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("2024-03-05 09:15:00"),
            Some(ts(2024, 3, 5, 9, 15, 0))
        );
        assert_eq!(
            parse_timestamp("2024-03-05T09:15:00"),
            Some(ts(2024, 3, 5, 9, 15, 0))
        );
        assert_eq!(
            parse_timestamp("2024-03-05T09:15:00+05:30"),
            Some(ts(2024, 3, 5, 9, 15, 0))
        );
        assert_eq!(
            parse_timestamp("2024-03-05 09:15:00+05:30"),
            Some(ts(2024, 3, 5, 9, 15, 0))
        );
        assert_eq!(parse_timestamp("05/03/2024"), None);
    }
}
