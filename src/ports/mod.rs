//! Ports Layer - Trait definitions for external dependencies
//!
//! The engine only talks to the outside world through these seams:
//! - Market data feeds (timestamped ticks over a bounded channel)
//! - Trade execution (fire-and-forget intents, position/balance queries)
//! - Audit sinking (one record per evaluated tick)
//! - The spread model driven by the signal engine

pub mod market_data;
pub mod execution;
pub mod audit;
pub mod strategy;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use market_data::{MarketDataPort, MarketDataError};
pub use execution::ExecutionPort;
pub use audit::{AuditSink, AuditError};
pub use strategy::SpreadModel;
