//! CSV report adapter: trade ledger and enriched-series export.

use crate::domain::backtest::BacktestReport;
use crate::domain::error::CrosstraderError;
use crate::domain::metrics::Performance;
use crate::domain::ohlcv::Series;
use crate::domain::schema::Column;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LEDGER_HEADER: [&str; 7] = [
    "entry_timestamp",
    "exit_timestamp",
    "entry_price",
    "exit_price",
    "return_pct",
    "exit_reason",
    "equity",
];

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &BacktestReport,
        performance: Option<&Performance>,
        output_path: &Path,
    ) -> Result<(), CrosstraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(write_error)?;
        wtr.write_record(LEDGER_HEADER).map_err(write_error)?;

        let equity = performance.map(|p| p.equity_curve.as_slice()).unwrap_or(&[]);
        for (i, trade) in report.trades.iter().enumerate() {
            wtr.write_record([
                format_timestamp(trade.entry_timestamp),
                format_timestamp(trade.exit_timestamp),
                trade.entry_price.to_string(),
                trade.exit_price.to_string(),
                format!("{:.4}", trade.return_pct),
                trade.exit_reason.to_string(),
                equity.get(i).map(|e| format!("{e:.6}")).unwrap_or_default(),
            ])
            .map_err(write_error)?;
        }

        wtr.flush()?;
        tracing::info!(
            path = %output_path.display(),
            trades = report.trades.len(),
            "trade ledger written"
        );
        Ok(())
    }

    fn write_series(&self, series: &Series, output_path: &Path) -> Result<(), CrosstraderError> {
        let indicators: Vec<Column> = Column::INDICATORS
            .into_iter()
            .filter(|c| series.has(*c))
            .collect();

        let mut wtr = csv::Writer::from_path(output_path).map_err(write_error)?;
        let header = Column::OHLCV
            .iter()
            .chain(&indicators)
            .map(|c| c.name());
        wtr.write_record(header).map_err(write_error)?;

        for bar in series.bars() {
            let mut record = vec![
                format_timestamp(bar.timestamp),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];
            record.extend(
                indicators
                    .iter()
                    .map(|c| bar.value(*c).map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record).map_err(write_error)?;
        }

        wtr.flush()?;
        tracing::info!(
            path = %output_path.display(),
            bars = series.len(),
            "series written"
        );
        Ok(())
    }
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn write_error(e: csv::Error) -> CrosstraderError {
    CrosstraderError::ReportWrite {
        reason: e.to_string(),
    }
}
