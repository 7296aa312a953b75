//! Signal frame: four aligned entry/exit signal columns.
//!
//! Zero means no signal; any other value is the signal's magnitude,
//! conventionally a quantity.

use crate::domain::error::SigtradeError;
use crate::domain::frame::{Frame, extract_frame};
use crate::domain::series::{check_finite, check_increasing};
use crate::ports::data_port::DataSource;
use chrono::NaiveDateTime;

pub const LONG_ENTER: &str = "long_enter";
pub const LONG_EXIT: &str = "long_exit";
pub const SHORT_ENTER: &str = "short_enter";
pub const SHORT_EXIT: &str = "short_exit";

/// Internal column names, in mask order.
pub const SIGNAL_COLUMNS: [&str; 4] = [LONG_ENTER, LONG_EXIT, SHORT_ENTER, SHORT_EXIT];

/// External column names for the four signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalMask {
    pub long_enter: String,
    pub long_exit: String,
    pub short_enter: String,
    pub short_exit: String,
}

impl Default for SignalMask {
    fn default() -> Self {
        Self {
            long_enter: "Buy".into(),
            long_exit: "Sell".into(),
            short_enter: "Short".into(),
            short_exit: "Cover".into(),
        }
    }
}

impl SignalMask {
    pub fn external_names(&self) -> [&str; 4] {
        [
            self.long_enter.as_str(),
            self.long_exit.as_str(),
            self.short_enter.as_str(),
            self.short_exit.as_str(),
        ]
    }
}

/// Only [`SignalFrame::new`] builds one, so every column matches the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    index: Vec<NaiveDateTime>,
    long_enter: Vec<f64>,
    long_exit: Vec<f64>,
    short_enter: Vec<f64>,
    short_exit: Vec<f64>,
}

impl SignalFrame {
    /// Validates alignment, ordering and finiteness before anything scans
    /// the frame.
    pub fn new(
        index: Vec<NaiveDateTime>,
        long_enter: Vec<f64>,
        long_exit: Vec<f64>,
        short_enter: Vec<f64>,
        short_exit: Vec<f64>,
    ) -> Result<Self, SigtradeError> {
        let frame = Self {
            index,
            long_enter,
            long_exit,
            short_enter,
            short_exit,
        };
        let n = frame.index.len();
        for (name, values) in frame.columns() {
            if values.len() != n {
                return Err(SigtradeError::alignment(
                    format!("signal column {name}"),
                    n,
                    values.len(),
                ));
            }
            check_finite(name, values)?;
        }
        check_increasing("signal index", &frame.index)?;
        Ok(frame)
    }

    /// Builds from an assembled frame keyed by [`SIGNAL_COLUMNS`]. Null
    /// columns mean the signal never fires and are zero-filled.
    pub fn from_frame(frame: &Frame) -> Result<Self, SigtradeError> {
        let column = |name: &str| {
            frame
                .column(name)
                .map(<[f64]>::to_vec)
                .unwrap_or_else(|| vec![0.0; frame.len()])
        };
        Self::new(
            frame.index.clone(),
            column(LONG_ENTER),
            column(LONG_EXIT),
            column(SHORT_ENTER),
            column(SHORT_EXIT),
        )
    }

    /// `Ok(None)` when the source offers none of the masked columns.
    pub fn extract<S>(source: &S, mask: &SignalMask) -> Result<Option<Self>, SigtradeError>
    where
        S: DataSource + ?Sized,
    {
        match extract_frame(source, &mask.external_names(), &SIGNAL_COLUMNS)? {
            Some(frame) => Self::from_frame(&frame).map(Some),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn long_enter(&self) -> &[f64] {
        &self.long_enter
    }

    pub fn long_exit(&self) -> &[f64] {
        &self.long_exit
    }

    pub fn short_enter(&self) -> &[f64] {
        &self.short_enter
    }

    pub fn short_exit(&self) -> &[f64] {
        &self.short_exit
    }

    pub fn columns(&self) -> [(&'static str, &[f64]); 4] {
        [
            (LONG_ENTER, self.long_enter.as_slice()),
            (LONG_EXIT, self.long_exit.as_slice()),
            (SHORT_ENTER, self.short_enter.as_slice()),
            (SHORT_EXIT, self.short_exit.as_slice()),
        ]
    }
}
