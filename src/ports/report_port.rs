//! Report output port trait.

use crate::domain::backtest::BacktestReport;
use crate::domain::error::CrosstraderError;
use crate::domain::metrics::Performance;
use crate::domain::ohlcv::Series;
use std::path::Path;

pub trait ReportPort {
    /// Write the trade ledger. `performance` is `None` when there were no trades.
    fn write(
        &self,
        report: &BacktestReport,
        performance: Option<&Performance>,
        output_path: &Path,
    ) -> Result<(), CrosstraderError>;

    /// Write every bar of an enriched series with its indicator values.
    fn write_series(&self, series: &Series, output_path: &Path) -> Result<(), CrosstraderError>;
}
