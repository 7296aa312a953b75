//! Output port for derived series and tables.

use crate::domain::error::SigtradeError;
use crate::domain::series::Series;
use crate::domain::trades::TradesTable;

pub trait OutputPort {
    /// Writes `series` as a two-column table: timestamp and `name`.
    fn write_series(&mut self, name: &str, series: &Series) -> Result<(), SigtradeError>;

    fn write_trades(&mut self, trades: &TradesTable) -> Result<(), SigtradeError>;
}
