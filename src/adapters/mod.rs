//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Market Data: simulated pair, Binance trade stream, CSV replay
//! - Paper Execution: in-memory fill ledger
//! - Audit Log: CSV trade log and tracing sinks
//! - CLI: Command-line interface definitions

pub mod market_data;
pub mod paper_execution;
pub mod audit_log;
pub mod cli;

pub use market_data::{SimulatedFeed, BinanceTradeFeed, CsvReplayFeed};
pub use paper_execution::{PaperExecution, PaperFill};
pub use audit_log::{CsvAuditLog, TracingAuditSink, NullAuditSink};
pub use cli::CliApp;
