//! Signals to equity in one pass.

use crate::domain::config::RunConfig;
use crate::domain::equity::trades_to_equity;
use crate::domain::error::SigtradeError;
use crate::domain::frame::Column;
use crate::domain::resolver::Resolver;
use crate::domain::series::Series;
use crate::domain::signal::SignalFrame;
use crate::domain::trades::TradesTable;
use crate::ports::data_port::DataSource;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Positions on every bar.
    pub dense_positions: Series,
    /// Positions on the bars where they changed.
    pub positions: Series,
    pub trades: TradesTable,
    /// Realized P&L on the trades index.
    pub equity: Series,
    /// Realized P&L on every bar, zero where nothing closed.
    pub bar_equity: Series,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub bars: usize,
    pub position_changes: usize,
    pub trades: usize,
    pub realized_events: usize,
    pub total_pnl: f64,
}

impl PipelineOutput {
    pub fn summary(&self) -> Summary {
        Summary {
            bars: self.dense_positions.len(),
            position_changes: self.positions.len(),
            trades: self.trades.len(),
            realized_events: self.equity.values.iter().filter(|v| **v != 0.0).count(),
            total_pnl: self.equity.sum(),
        }
    }
}

pub struct Pipeline<'a> {
    config: &'a RunConfig,
    resolver: Resolver,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            resolver: Resolver::new(config.backend),
        }
    }

    /// `source_name` only labels a [`SigtradeError::NoData`] error.
    pub fn run<S>(&self, source: &S, source_name: &str) -> Result<PipelineOutput, SigtradeError>
    where
        S: DataSource + ?Sized,
    {
        let no_data = || SigtradeError::NoData {
            source_name: source_name.to_string(),
        };

        let signals = SignalFrame::extract(source, &self.config.mask)?.ok_or_else(no_data)?;
        let price = match source.get(&self.config.price_column) {
            Some(Column::Series(s)) => s,
            _ => {
                return Err(SigtradeError::NoData {
                    source_name: format!("{source_name} (column {})", self.config.price_column),
                });
            }
        };

        let dense_positions = self.resolver.scan(&signals, self.config.init_pos)?;
        let positions = dense_positions.compact();
        let trades =
            TradesTable::from_positions(&dense_positions, price, self.config.init_pos, self.config.lag)?;
        let equity = trades_to_equity(&trades);
        let bar_equity = equity.reindex(signals.index(), 0.0);

        let output = PipelineOutput {
            dense_positions,
            positions,
            trades,
            equity,
            bar_equity,
        };
        let summary = output.summary();
        info!(
            bars = summary.bars,
            changes = summary.position_changes,
            trades = summary.trades,
            total_pnl = summary.total_pnl,
            "pipeline complete"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::HashMap;

    fn axis(n: usize) -> Vec<NaiveDateTime> {
        (0..n as u32)
            .map(|d| NaiveDate::from_ymd_opt(2024, 7, d + 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
            .collect()
    }

    fn column(values: &[f64]) -> Column {
        Column::Series(Series::new(axis(values.len()), values.to_vec()).unwrap())
    }

    fn source() -> HashMap<String, Column> {
        let mut m = HashMap::new();
        m.insert("Buy".into(), column(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        m.insert("Sell".into(), column(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.0]));
        m.insert("Short".into(), column(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
        m.insert("Cover".into(), column(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]));
        m.insert("Close".into(), column(&[10.0, 11.0, 12.0, 13.0, 12.0, 10.0]));
        m
    }

    #[test]
    fn runs_long_then_short() {
        let config = RunConfig::default();
        let out = Pipeline::new(&config).run(&source(), "test").unwrap();

        assert_eq!(out.dense_positions.values, vec![1.0, 1.0, 0.0, -1.0, -1.0, 0.0]);
        assert_eq!(out.positions.values, vec![1.0, 0.0, -1.0, 0.0]);
        assert_eq!(out.trades.volume(), vec![1.0, -1.0, -1.0, 1.0]);
        assert_eq!(out.trades.price(), vec![10.0, 12.0, 13.0, 10.0]);
        // long 10 -> 12, short 13 -> 10
        assert_eq!(out.equity.values, vec![0.0, 2.0, 0.0, 3.0]);
        assert_eq!(out.bar_equity.values, vec![0.0, 0.0, 2.0, 0.0, 0.0, 3.0]);

        let summary = out.summary();
        assert_eq!(summary.bars, 6);
        assert_eq!(summary.trades, 4);
        assert_eq!(summary.realized_events, 2);
        assert!((summary.total_pnl - 5.0).abs() < 1e-12);
    }

    #[test]
    fn lag_moves_fills_to_next_bar() {
        let config = RunConfig {
            lag: 1,
            ..RunConfig::default()
        };
        let out = Pipeline::new(&config).run(&source(), "test").unwrap();
        // long filled at 11, exited at 13; short at 12, cover not yet filled
        assert_eq!(out.trades.price(), vec![11.0, 13.0, 12.0]);
        assert_eq!(out.bar_equity.values, vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn repeated_bar_is_rejected() {
        let days = axis(3);
        let index = vec![days[0], days[1], days[1], days[2]];
        let col = |values: &[f64]| {
            Column::Series(Series::new(index.clone(), values.to_vec()).unwrap())
        };
        let mut m = HashMap::new();
        m.insert("Buy".to_string(), col(&[1.0, 0.0, 1.0, 0.0]));
        m.insert("Sell".to_string(), col(&[0.0, 1.0, 0.0, 1.0]));
        m.insert("Close".to_string(), col(&[10.0, 12.0, 12.0, 15.0]));
        let err = Pipeline::new(&RunConfig::default()).run(&m, "test").unwrap_err();
        assert!(matches!(err, SigtradeError::UnorderedIndex { row: 2, .. }));
    }

    #[test]
    fn infinite_fill_price_is_rejected() {
        let mut m = source();
        m.insert("Close".into(), column(&[10.0, 11.0, f64::INFINITY, 13.0, 12.0, 10.0]));
        let err = Pipeline::new(&RunConfig::default()).run(&m, "test").unwrap_err();
        assert!(matches!(err, SigtradeError::NonFiniteValue { row: 2, .. }));
    }

    #[test]
    fn missing_signals_is_no_data() {
        let mut m = HashMap::new();
        m.insert("Close".to_string(), column(&[1.0]));
        let err = Pipeline::new(&RunConfig::default())
            .run(&m, "prices.csv")
            .unwrap_err();
        assert!(matches!(err, SigtradeError::NoData { ref source_name } if source_name == "prices.csv"));
    }

    #[test]
    fn missing_price_is_no_data() {
        let config = RunConfig {
            price_column: "Open".into(),
            ..RunConfig::default()
        };
        let err = Pipeline::new(&config).run(&source(), "test").unwrap_err();
        assert!(matches!(err, SigtradeError::NoData { .. }));
    }
}
