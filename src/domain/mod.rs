//! Core domain types and logic.

pub mod ohlcv;
pub mod pips;
pub mod indicator;
pub mod signal;
pub mod simulation;
pub mod metrics;
pub mod strategy;
pub mod config_validation;
pub mod input_validation;
pub mod backtest;
pub mod error;
