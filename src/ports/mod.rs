//! Port traits for the I/O boundaries of the backtester.

pub mod config_port;
pub mod data_port;
pub mod report_port;
