pub mod runner;

pub use runner::{TradingRunner, RunnerError, RunReport, StopReason, ShutdownHandle};
