//! Configuration validation.
//!
//! Validates all config fields before anything runs. Every key is optional;
//! what is present must be well formed.

use crate::domain::error::SigtradeError;
use crate::domain::resolver::ScanBackend;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SigtradeError> {
    validate_signal_names(config)?;
    validate_init_pos(config)?;
    validate_backend(config)?;
    validate_trade_columns(config)?;
    validate_execution(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SigtradeError {
    SigtradeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Present names must be non-blank and pairwise distinct.
fn validate_distinct_names(
    config: &dyn ConfigPort,
    section: &str,
    keys: &[&str],
) -> Result<(), SigtradeError> {
    let mut seen: Vec<(String, &str)> = Vec::with_capacity(keys.len());
    for &key in keys {
        let Some(value) = config.get_string(section, key) else {
            continue;
        };
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(invalid(section, key, "column name must not be blank"));
        }
        if let Some((_, other)) = seen.iter().find(|(v, _)| *v == value) {
            return Err(invalid(
                section,
                key,
                format!("column '{value}' is already used by {other}"),
            ));
        }
        seen.push((value, key));
    }
    Ok(())
}

fn validate_signal_names(config: &dyn ConfigPort) -> Result<(), SigtradeError> {
    validate_distinct_names(
        config,
        "signals",
        &["long_enter", "long_exit", "short_enter", "short_exit"],
    )
}

fn validate_init_pos(config: &dyn ConfigPort) -> Result<(), SigtradeError> {
    let Some(raw) = config.get_string("signals", "init_pos") else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(()),
        _ => Err(invalid(
            "signals",
            "init_pos",
            "init_pos must be a finite number",
        )),
    }
}

fn validate_backend(config: &dyn ConfigPort) -> Result<(), SigtradeError> {
    match config.get_string("resolver", "backend") {
        Some(s) => s
            .parse::<ScanBackend>()
            .map(|_| ())
            .map_err(|reason| invalid("resolver", "backend", reason)),
        None => Ok(()),
    }
}

fn validate_trade_columns(config: &dyn ConfigPort) -> Result<(), SigtradeError> {
    validate_distinct_names(config, "trades", &["volume", "price", "position"])
}

fn validate_execution(config: &dyn ConfigPort) -> Result<(), SigtradeError> {
    if let Some(name) = config.get_string("execution", "price_column") {
        if name.trim().is_empty() {
            return Err(invalid(
                "execution",
                "price_column",
                "price_column must not be blank",
            ));
        }
    }
    if let Some(raw) = config.get_string("execution", "lag") {
        if raw.trim().parse::<usize>().is_err() {
            return Err(invalid(
                "execution",
                "lag",
                "lag must be a non-negative integer",
            ));
        }
    }
    Ok(())
}
