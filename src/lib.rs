//! pairs-arb - Online Pairs Statistical-Arbitrage Engine
//!
//! Fits an AR(1)/Ornstein-Uhlenbeck model to the price ratio of two assets
//! on every tick and trades the spread with z-score entries, mean-reversion
//! exits and a hard stop-loss.
//!
//! # Modules
//!
//! - `domain`: Value types (Tick, TradeIntent, AuditRecord, SpreadPosition)
//! - `ports`: Trait abstractions (MarketDataPort, ExecutionPort, AuditSink, SpreadModel)
//! - `strategy`: Signal generation (MeanReversionModel, PairSignalEngine)
//! - `adapters`: External implementations (feeds, paper execution, audit log, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Feed-to-engine runner

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
