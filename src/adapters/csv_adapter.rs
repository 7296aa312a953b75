//! CSV data source and output sink.
//!
//! Input files carry a header row. The first column is the timestamp; every
//! other column becomes a [`Column::Series`] when all its cells are numeric
//! (blank cells read as NaN, `true`/`false` as 1/0) and [`Column::Text`]
//! otherwise. Rows are sorted by timestamp; a timestamp may appear only once
//! and numeric cells must be finite.

use crate::domain::error::SigtradeError;
use crate::domain::frame::Column;
use crate::domain::series::{Series, format_timestamp, parse_timestamp};
use crate::domain::trades::{POSITION, PRICE, TradesTable, VOLUME};
use crate::ports::data_port::DataSource;
use crate::ports::output_port::OutputPort;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

fn csv_error(e: csv::Error) -> SigtradeError {
    SigtradeError::Data {
        reason: format!("CSV error: {e}"),
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    match cell.to_lowercase().as_str() {
        "true" => Some(1.0),
        "false" => Some(0.0),
        _ => cell.parse().ok(),
    }
}

#[derive(Debug)]
pub struct CsvSource {
    index: Vec<NaiveDateTime>,
    names: Vec<String>,
    columns: HashMap<String, Column>,
}

impl CsvSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SigtradeError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SigtradeError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let source = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            rows = source.len(),
            columns = source.names.len(),
            "loaded CSV"
        );
        Ok(source)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, SigtradeError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().map_err(csv_error)?.clone();
        if headers.is_empty() {
            return Err(SigtradeError::Data {
                reason: "missing header row".into(),
            });
        }
        let names: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

        let mut rows: Vec<(NaiveDateTime, csv::StringRecord)> = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result.map_err(csv_error)?;
            let raw = record.get(0).unwrap_or_default();
            let ts = parse_timestamp(raw).ok_or_else(|| SigtradeError::Data {
                reason: format!("invalid timestamp '{}' on data row {}", raw, i + 1),
            })?;
            rows.push((ts, record));
        }
        rows.sort_by_key(|(ts, _)| *ts);
        if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(SigtradeError::Data {
                reason: format!("duplicate timestamp {}", format_timestamp(pair[0].0)),
            });
        }

        let index: Vec<NaiveDateTime> = rows.iter().map(|(ts, _)| *ts).collect();
        let mut columns = HashMap::with_capacity(names.len());
        for (c, name) in names.iter().enumerate() {
            let cells: Vec<&str> = rows
                .iter()
                .map(|(_, record)| record.get(c + 1).unwrap_or_default())
                .collect();
            let numeric: Option<Vec<f64>> = cells.iter().map(|cell| parse_cell(cell)).collect();
            let column = match numeric {
                Some(values) => {
                    if let Some(row) = values.iter().position(|v| v.is_infinite()) {
                        return Err(SigtradeError::NonFiniteValue {
                            column: name.clone(),
                            row,
                            value: values[row],
                        });
                    }
                    Column::Series(Series {
                        index: index.clone(),
                        values,
                    })
                }
                None => Column::Text(cells.iter().map(|s| s.to_string()).collect()),
            };
            if columns.insert(name.clone(), column).is_some() {
                warn!(column = %name, "duplicate CSV header, keeping the last column");
            }
        }

        Ok(Self {
            index,
            names,
            columns,
        })
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
}

impl DataSource for CsvSource {
    fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    fn names(&self) -> Vec<String> {
        self.names.clone()
    }
}

pub struct CsvSink<W: io::Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SigtradeError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SigtradeError::Data {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;
        Ok(Self::new(file))
    }
}

impl CsvSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: io::Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn into_inner(self) -> Result<W, SigtradeError> {
        self.writer.into_inner().map_err(|e| SigtradeError::Data {
            reason: format!("failed to flush CSV output: {}", e.error()),
        })
    }
}

impl<W: io::Write> OutputPort for CsvSink<W> {
    fn write_series(&mut self, name: &str, series: &Series) -> Result<(), SigtradeError> {
        self.writer
            .write_record(["timestamp", name])
            .map_err(csv_error)?;
        for (ts, value) in series.iter() {
            self.writer
                .write_record([format_timestamp(ts), value.to_string()])
                .map_err(csv_error)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_trades(&mut self, trades: &TradesTable) -> Result<(), SigtradeError> {
        self.writer
            .write_record(["timestamp", VOLUME, PRICE, POSITION])
            .map_err(csv_error)?;
        let rows = trades
            .index()
            .iter()
            .zip(trades.volume())
            .zip(trades.price())
            .zip(trades.position());
        for (((ts, volume), price), position) in rows {
            self.writer
                .write_record([
                    format_timestamp(*ts),
                    volume.to_string(),
                    price.to_string(),
                    position.to_string(),
                ])
                .map_err(csv_error)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
