#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sigtrade::domain::frame::Column;
use sigtrade::domain::series::Series;
use sigtrade::domain::signal::SignalFrame;
use sigtrade::ports::data_port::DataSource;
use std::collections::HashMap;
use std::io::Write;

pub fn day(n: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(n as i64)
}

pub fn axis(n: usize) -> Vec<NaiveDateTime> {
    (0..n).map(day).collect()
}

pub fn series(values: &[f64]) -> Series {
    Series::new(axis(values.len()), values.to_vec()).unwrap()
}

pub fn signal_frame(
    long_enter: &[f64],
    long_exit: &[f64],
    short_enter: &[f64],
    short_exit: &[f64],
) -> SignalFrame {
    SignalFrame::new(
        axis(long_enter.len()),
        long_enter.to_vec(),
        long_exit.to_vec(),
        short_enter.to_vec(),
        short_exit.to_vec(),
    )
    .unwrap()
}

/// In-memory source keyed by column name.
pub struct MockSource {
    pub columns: HashMap<String, Column>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
        }
    }

    pub fn with_series(mut self, name: &str, values: &[f64]) -> Self {
        self.columns
            .insert(name.to_string(), Column::Series(series(values)));
        self
    }

    pub fn with_scalar(mut self, name: &str, value: f64) -> Self {
        self.columns.insert(name.to_string(), Column::Scalar(value));
        self
    }

    pub fn with_signals(
        self,
        buy: &[f64],
        sell: &[f64],
        short: &[f64],
        cover: &[f64],
    ) -> Self {
        self.with_series("Buy", buy)
            .with_series("Sell", sell)
            .with_series("Short", short)
            .with_series("Cover", cover)
    }
}

impl DataSource for MockSource {
    fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    fn names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }
}

/// CSV text with a `date` column followed by `columns` in order.
pub fn csv_text(columns: &[(&str, Vec<f64>)]) -> String {
    let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
    let mut out = String::from("date");
    for (name, _) in columns {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');
    for i in 0..rows {
        out.push_str(&day(i).format("%Y-%m-%d").to_string());
        for (_, values) in columns {
            out.push(',');
            out.push_str(&values[i].to_string());
        }
        out.push('\n');
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
