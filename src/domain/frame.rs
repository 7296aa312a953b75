//! Frame assembly from external, heterogeneously named data sources.
//!
//! [`extract_frame`] maps external column names onto internal ones. Columns
//! that are missing, or are not a numeric series, become null columns. When
//! nothing requested is present the result is `None`, so callers can tell
//! "no data offered" apart from "empty data".

use crate::domain::error::SigtradeError;
use crate::domain::series::{Series, check_same_index};
use crate::ports::data_port::DataSource;
use chrono::NaiveDateTime;
use tracing::debug;

/// A value a data source can hold under one name.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Series(Series),
    Scalar(f64),
    Text(Vec<String>),
}

impl Column {
    pub fn as_series(&self) -> Option<&Series> {
        match self {
            Column::Series(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Series(_) => "series",
            Column::Scalar(_) => "scalar",
            Column::Text(_) => "text",
        }
    }
}

/// Uniform-schema table: every requested internal name is present, either
/// with values or as a null column.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: Vec<NaiveDateTime>,
    columns: Vec<(String, Option<Vec<f64>>)>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Values of a non-null column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, values)| values.as_deref())
    }

    pub fn is_null(&self, name: &str) -> bool {
        self.column(name).is_none()
    }

    pub fn series(&self, name: &str) -> Option<Series> {
        self.column(name).map(|values| Series {
            index: self.index.clone(),
            values: values.to_vec(),
        })
    }
}

/// Assembles a [`Frame`] whose columns are named by `int_mask`, reading the
/// positionally corresponding names of `ext_mask` from `source`.
pub fn extract_frame<S>(
    source: &S,
    ext_mask: &[&str],
    int_mask: &[&str],
) -> Result<Option<Frame>, SigtradeError>
where
    S: DataSource + ?Sized,
{
    if ext_mask.len() != int_mask.len() {
        return Err(SigtradeError::alignment(
            "column name masks",
            int_mask.len(),
            ext_mask.len(),
        ));
    }

    let mut index: Option<Vec<NaiveDateTime>> = None;
    let mut columns = Vec::with_capacity(int_mask.len());

    for (&internal, &external) in int_mask.iter().zip(ext_mask) {
        let series = match source.get(external) {
            Some(Column::Series(s)) => s,
            Some(other) => {
                debug!(column = external, kind = other.kind(), "not a series, treated as null");
                columns.push((internal.to_string(), None));
                continue;
            }
            None => {
                debug!(column = external, "absent from source, treated as null");
                columns.push((internal.to_string(), None));
                continue;
            }
        };

        match &index {
            Some(idx) => check_same_index(&format!("column {external}"), idx, &series.index)?,
            None => index = Some(series.index.clone()),
        }
        columns.push((internal.to_string(), Some(series.values.clone())));
    }

    Ok(index.map(|index| Frame { index, columns }))
}
