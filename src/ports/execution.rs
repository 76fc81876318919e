use crate::domain::TradeIntent;

/// Execution sink consumed by the pair engine
///
/// `execute` is fire-and-forget and must not block the tick path;
/// implementations that talk to a venue should buffer internally.
/// The queries exist for reporting outside the engine.
#[cfg_attr(test, mockall::automock)]
pub trait ExecutionPort: Send {
    fn execute(&mut self, intent: TradeIntent);

    /// Signed quantity currently held for `symbol`
    fn position(&self, symbol: &str) -> f64;

    fn balance(&self) -> f64;
}
