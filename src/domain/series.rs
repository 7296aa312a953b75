//! Time-indexed numeric series.
//!
//! A [`Series`] pairs an ordered time axis with one `f64` value per row. Every
//! derived output in the crate (positions, equity) is a `Series`.

use crate::domain::error::SigtradeError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub index: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(index: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self, SigtradeError> {
        if index.len() != values.len() {
            return Err(SigtradeError::alignment(
                "series values",
                index.len(),
                values.len(),
            ));
        }
        Ok(Self { index, values })
    }

    /// A series holding `value` at every timestamp of `index`.
    pub fn constant(index: &[NaiveDateTime], value: f64) -> Self {
        Self {
            index: index.to_vec(),
            values: vec![value; index.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<(NaiveDateTime, f64)> {
        Some((*self.index.get(i)?, *self.values.get(i)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    pub fn last(&self) -> Option<(NaiveDateTime, f64)> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Keeps only rows whose value differs from the preceding row.
    ///
    /// Row 0 is always kept. Applying this to an already compacted series
    /// returns it unchanged.
    pub fn compact(&self) -> Series {
        let mut index = Vec::new();
        let mut values = Vec::new();
        let mut prev: Option<f64> = None;
        for (ts, v) in self.iter() {
            if prev.is_none_or(|p| p != v) {
                index.push(ts);
                values.push(v);
            }
            prev = Some(v);
        }
        Series { index, values }
    }

    /// Moves values `periods` rows later along the same index; the first
    /// `periods` rows take `fill`.
    pub fn shift(&self, periods: usize, fill: f64) -> Series {
        let n = self.len();
        let lead = periods.min(n);
        let mut values = Vec::with_capacity(n);
        values.extend(std::iter::repeat_n(fill, lead));
        values.extend_from_slice(&self.values[..n - lead]);
        Series {
            index: self.index.clone(),
            values,
        }
    }

    /// Places this series' values onto `axis`. Timestamps absent from
    /// this series take `fill`. Both axes hold each timestamp at most once.
    pub fn reindex(&self, axis: &[NaiveDateTime], fill: f64) -> Series {
        let lookup: HashMap<NaiveDateTime, f64> = self.iter().collect();
        Series {
            index: axis.to_vec(),
            values: axis
                .iter()
                .map(|ts| lookup.get(ts).copied().unwrap_or(fill))
                .collect(),
        }
    }
}

/// Checks that `found` is the same time axis as `expected`.
pub(crate) fn check_same_index(
    context: &str,
    expected: &[NaiveDateTime],
    found: &[NaiveDateTime],
) -> Result<(), SigtradeError> {
    if expected.len() != found.len() {
        return Err(SigtradeError::alignment(context, expected.len(), found.len()));
    }
    match expected.iter().zip(found).position(|(a, b)| a != b) {
        Some(position) => Err(SigtradeError::IndexMismatch {
            context: context.to_string(),
            position,
        }),
        None => Ok(()),
    }
}

/// Each timestamp must come strictly after the one before it.
pub(crate) fn check_increasing(context: &str, index: &[NaiveDateTime]) -> Result<(), SigtradeError> {
    match index.windows(2).position(|w| w[1] <= w[0]) {
        Some(row) => Err(SigtradeError::UnorderedIndex {
            context: context.to_string(),
            row: row + 1,
        }),
        None => Ok(()),
    }
}

/// NaN is a missing value; infinities are rejected outright.
pub(crate) fn check_finite(column: &str, values: &[f64]) -> Result<(), SigtradeError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(row) if values[row].is_nan() => Err(SigtradeError::MissingValue {
            column: column.to_string(),
            row,
        }),
        Some(row) => Err(SigtradeError::NonFiniteValue {
            column: column.to_string(),
            row,
            value: values[row],
        }),
        None => Ok(()),
    }
}

/// Parses `YYYY-MM-DD`,`YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Midnight timestamps print as a bare date.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format(DATE_FORMAT).to_string()
    } else {
        ts.format(DATETIME_FORMATS[0]).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    fn series(values: &[f64]) -> Series {
        let index = (1..=values.len() as u32).map(day).collect();
        Series::new(index, values.to_vec()).unwrap()
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = Series::new(vec![day(1), day(2)], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            SigtradeError::Alignment {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn compact_keeps_first_row_and_changes() {
        let s = series(&[1.0, 1.0, 0.0, 0.0, -2.0, -2.0]);
        let c = s.compact();
        assert_eq!(c.index, vec![day(1), day(3), day(5)]);
        assert_eq!(c.values, vec![1.0, 0.0, -2.0]);
    }

    #[test]
    fn compact_is_idempotent() {
        let c = series(&[0.0, 0.0, 3.0, 3.0, 0.0]).compact();
        assert_eq!(c.compact(), c);
    }

    #[test]
    fn compact_empty_series() {
        assert!(Series::default().compact().is_empty());
    }

    #[test]
    fn shift_fills_leading_rows() {
        let s = series(&[1.0, 2.0, 3.0]).shift(1, 0.0);
        assert_eq!(s.values, vec![0.0, 1.0, 2.0]);
        assert_eq!(s.index, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn shift_past_end_is_all_fill() {
        let s = series(&[1.0, 2.0]).shift(5, 7.0);
        assert_eq!(s.values, vec![7.0, 7.0]);
    }

    #[test]
    fn reindex_fills_missing_timestamps() {
        let sparse = Series::new(vec![day(2), day(4)], vec![5.0, -1.0]).unwrap();
        let dense = sparse.reindex(&[day(1), day(2), day(3), day(4)], 0.0);
        assert_eq!(dense.values, vec![0.0, 5.0, 0.0, -1.0]);
    }

    #[test]
    fn check_same_index_reports_first_difference() {
        let err = check_same_index("prices", &[day(1), day(2)], &[day(1), day(3)]).unwrap_err();
        assert!(matches!(err, SigtradeError::IndexMismatch { position: 1, .. }));
    }

    #[test]
    fn check_increasing_rejects_repeated_timestamp() {
        assert!(check_increasing("bars", &[day(1), day(2), day(3)]).is_ok());
        let err = check_increasing("bars", &[day(1), day(2), day(2), day(3)]).unwrap_err();
        assert!(matches!(err, SigtradeError::UnorderedIndex { row: 2, .. }));
        let err = check_increasing("bars", &[day(2), day(1)]).unwrap_err();
        assert!(matches!(err, SigtradeError::UnorderedIndex { row: 1, .. }));
    }

    #[test]
    fn check_finite_separates_missing_from_infinite() {
        assert!(check_finite("price", &[1.0, -2.0]).is_ok());
        let err = check_finite("price", &[1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, SigtradeError::MissingValue { row: 1, .. }));
        let err = check_finite("price", &[f64::NEG_INFINITY]).unwrap_err();
        assert!(matches!(err, SigtradeError::NonFiniteValue { row: 0, .. }));
    }

    #[test]
    fn parse_timestamp_accepts_dates_and_datetimes() {
        assert_eq!(parse_timestamp("2024-01-05"), Some(day(5)));
        let ts = parse_timestamp("2024-01-05 09:30:00").unwrap();
        assert_eq!(ts.format("%H:%M").to_string(), "09:30");
        assert_eq!(parse_timestamp("2024-01-05T09:30:00"), Some(ts));
        assert_eq!(parse_timestamp("05/01/2024"), None);
    }

    #[test]
    fn format_timestamp_drops_midnight() {
        assert_eq!(format_timestamp(day(5)), "2024-01-05");
        let ts = parse_timestamp("2024-01-05 09:30:00").unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-05 09:30:00");
    }
}
