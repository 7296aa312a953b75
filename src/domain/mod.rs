//! Core domain types and logic.

pub mod batch;
pub mod config;
pub mod config_validation;
pub mod equity;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod resolver;
pub mod series;
pub mod signal;
pub mod trades;
pub mod view;
