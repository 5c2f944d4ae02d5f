//! Market data port trait.

use crate::domain::error::CrosstraderError;
use crate::domain::ohlcv::Series;

/// Source of historical bars for one symbol.
///
/// Implementations return bars in ascending timestamp order and record which
/// columns the source actually carried.
pub trait DataPort {
    fn fetch_series(&self, symbol: &str) -> Result<Series, CrosstraderError>;
}
