//! Market Data Adapters
//!
//! Tick sources implementing `MarketDataPort`:
//! - `SimulatedFeed`: seeded synthetic pair with a mean-reverting ratio
//! - `BinanceTradeFeed`: live combined trade stream over WebSocket
//! - `CsvReplayFeed`: offline replay of recorded ticks
//!
//! Each feed runs a single producer task feeding a bounded channel and
//! stops once the receiver is dropped.

mod simulated;
mod binance;
mod replay;

pub use simulated::{SimulatedFeed, PairRandomWalk};
pub use binance::{BinanceTradeFeed, StreamRouter, DEFAULT_WS_URL, DEFAULT_QUOTE_ASSET};
pub use replay::{CsvReplayFeed, parse_tick_row};
