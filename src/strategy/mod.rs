//! Strategy Layer - Online Pairs Mean Reversion
//!
//! Models the price ratio of two assets as a discretely sampled
//! Ornstein-Uhlenbeck process and trades its deviations:
//! - Rolling AR(1) least-squares fit mapped onto OU parameters
//! - Stationarity guard that rejects explosive or unit-root fits
//! - Three-state spread machine with z-score entries and stop-loss exits
//! - Pluggable entry sizing with ratio-hedged second leg

pub mod params;
pub mod mean_reversion;
pub mod sizing;
pub mod pair_signal;

pub use params::{StrategyConfig, ConfigError, MIN_WINDOW_SIZE};
pub use mean_reversion::{MeanReversionModel, OuParams, Ar1Fit};
pub use sizing::{PositionSizer, FixedFractionSizer, hedge_quantity};
pub use pair_signal::{PairSignalEngine, SignalState, Decision, EngineStatus, evaluate};
