//! Trades table: transacted volume, price and resulting position per row.

use crate::domain::error::SigtradeError;
use crate::domain::frame::{Frame, extract_frame};
use crate::domain::series::{Series, check_finite, check_increasing, check_same_index};
use crate::ports::data_port::DataSource;
use chrono::NaiveDateTime;

pub const VOLUME: &str = "volume";
pub const PRICE: &str = "price";
pub const POSITION: &str = "position";

/// External column names for a trades table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeColumns {
    pub volume: String,
    pub price: String,
    pub position: String,
}

impl Default for TradeColumns {
    fn default() -> Self {
        Self {
            volume: VOLUME.into(),
            price: PRICE.into(),
            position: POSITION.into(),
        }
    }
}

/// Built through [`TradesTable::new`] or [`TradesTable::from_positions`], so
/// the three columns always match the index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradesTable {
    index: Vec<NaiveDateTime>,
    volume: Vec<f64>,
    price: Vec<f64>,
    position: Vec<f64>,
}

impl TradesTable {
    pub fn new(
        index: Vec<NaiveDateTime>,
        volume: Vec<f64>,
        price: Vec<f64>,
        position: Vec<f64>,
    ) -> Result<Self, SigtradeError> {
        let n = index.len();
        for (name, values) in [(VOLUME, &volume), (PRICE, &price), (POSITION, &position)] {
            if values.len() != n {
                return Err(SigtradeError::alignment(
                    format!("trades column {name}"),
                    n,
                    values.len(),
                ));
            }
            check_finite(name, values)?;
        }
        check_increasing("trades index", &index)?;
        Ok(Self {
            index,
            volume,
            price,
            position,
        })
    }

    /// All three columns are required; a null column is an error.
    pub fn from_frame(frame: &Frame) -> Result<Self, SigtradeError> {
        let column = |name: &str| {
            frame
                .column(name)
                .map(<[f64]>::to_vec)
                .ok_or_else(|| SigtradeError::MissingColumn {
                    column: name.to_string(),
                })
        };
        Self::new(
            frame.index.clone(),
            column(VOLUME)?,
            column(PRICE)?,
            column(POSITION)?,
        )
    }

    /// `Ok(None)` when the source offers none of the named columns.
    pub fn extract<S>(source: &S, columns: &TradeColumns) -> Result<Option<Self>, SigtradeError>
    where
        S: DataSource + ?Sized,
    {
        let ext = [
            columns.volume.as_str(),
            columns.price.as_str(),
            columns.position.as_str(),
        ];
        match extract_frame(source, &ext, &[VOLUME, PRICE, POSITION])? {
            Some(frame) => Self::from_frame(&frame).map(Some),
            None => Ok(None),
        }
    }

    /// Trades implied by a dense position series executed at `price`.
    ///
    /// Positions are delayed by `lag` bars (a signal on bar i fills on bar
    /// i + lag) with `init_pos` held until then. A row is emitted on every
    /// bar where the delayed position differs from the bar before; the bar
    /// before the first one holds `init_pos`.
    pub fn from_positions(
        positions: &Series,
        price: &Series,
        init_pos: f64,
        lag: usize,
    ) -> Result<Self, SigtradeError> {
        check_same_index("price column", &positions.index, &price.index)?;
        if price.values.len() != price.index.len() {
            return Err(SigtradeError::alignment(
                "price column values",
                price.index.len(),
                price.values.len(),
            ));
        }
        check_increasing("positions index", &positions.index)?;
        let held = positions.shift(lag, init_pos);

        let mut table = TradesTable::default();
        let mut prev = init_pos;
        for (i, (ts, pos)) in held.iter().enumerate() {
            if pos != prev {
                let px = price.values[i];
                if px.is_nan() {
                    return Err(SigtradeError::MissingValue {
                        column: PRICE.into(),
                        row: i,
                    });
                }
                if px.is_infinite() {
                    return Err(SigtradeError::NonFiniteValue {
                        column: PRICE.into(),
                        row: i,
                        value: px,
                    });
                }
                table.index.push(ts);
                table.volume.push(pos - prev);
                table.price.push(px);
                table.position.push(pos);
            }
            prev = pos;
        }
        Ok(table)
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    pub fn price(&self) -> &[f64] {
        &self.price
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
