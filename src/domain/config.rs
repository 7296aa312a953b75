//! Run configuration.
//!
//! Defaults match an empty INI file; [`RunConfig::from_config`] reads the
//! `[signals]`, `[resolver]`, `[trades]` and `[execution]` sections.

use crate::domain::error::SigtradeError;
use crate::domain::resolver::ScanBackend;
use crate::domain::signal::SignalMask;
use crate::domain::trades::TradeColumns;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_PRICE_COLUMN: &str = "Close";

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mask: SignalMask,
    pub init_pos: f64,
    pub backend: ScanBackend,
    pub trade_columns: TradeColumns,
    pub price_column: String,
    pub lag: usize,
    /// Whether `positions` output is change-point compacted.
    pub compact: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mask: SignalMask::default(),
            init_pos: 0.0,
            backend: ScanBackend::default(),
            trade_columns: TradeColumns::default(),
            price_column: DEFAULT_PRICE_COLUMN.into(),
            lag: 0,
            compact: true,
        }
    }
}

impl RunConfig {
    /// Missing keys fall back to defaults. Values are assumed to have passed
    /// [`validate_config`](crate::domain::config_validation::validate_config);
    /// a blank column name, unparseable backend or negative lag is still
    /// reported here.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SigtradeError> {
        let defaults = RunConfig::default();
        let string_or = |section: &str, key: &str, default: &str| {
            match config.get_string(section, key).map(|s| s.trim().to_string()) {
                None => Ok(default.to_string()),
                Some(s) if s.is_empty() => Err(SigtradeError::ConfigInvalid {
                    section: section.into(),
                    key: key.into(),
                    reason: "column name must not be blank".into(),
                }),
                Some(s) => Ok(s),
            }
        };

        let mask = SignalMask {
            long_enter: string_or("signals", "long_enter", &defaults.mask.long_enter)?,
            long_exit: string_or("signals", "long_exit", &defaults.mask.long_exit)?,
            short_enter: string_or("signals", "short_enter", &defaults.mask.short_enter)?,
            short_exit: string_or("signals", "short_exit", &defaults.mask.short_exit)?,
        };

        let backend = match config.get_string("resolver", "backend") {
            Some(s) => s.parse().map_err(|reason| SigtradeError::ConfigInvalid {
                section: "resolver".into(),
                key: "backend".into(),
                reason,
            })?,
            None => defaults.backend,
        };

        let lag = config.get_int("execution", "lag", 0);
        let lag = usize::try_from(lag).map_err(|_| SigtradeError::ConfigInvalid {
            section: "execution".into(),
            key: "lag".into(),
            reason: "lag must be a non-negative integer".into(),
        })?;

        Ok(RunConfig {
            mask,
            init_pos: config.get_double("signals", "init_pos", defaults.init_pos),
            backend,
            trade_columns: TradeColumns {
                volume: string_or("trades", "volume", &defaults.trade_columns.volume)?,
                price: string_or("trades", "price", &defaults.trade_columns.price)?,
                position: string_or("trades", "position", &defaults.trade_columns.position)?,
            },
            price_column: string_or("execution", "price_column", &defaults.price_column)?,
            lag,
            compact: config.get_bool("output", "compact", defaults.compact),
        })
    }
}
