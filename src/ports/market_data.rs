use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::Tick;

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("WebSocket connection error: {0}")]
    WebSocketError(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Subscription error: {0}")]
    SubscriptionError(String),

    #[error("Failed to read replay file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Stream closed by remote")]
    StreamClosed,

    #[error("Feed already started")]
    AlreadyStarted,
}

/// Market data port trait
///
/// Feeds register symbols first, then `start` spawns a single producer
/// task and hands back the consuming end of a bounded channel. Dropping
/// the receiver stops the producer.
#[async_trait]
pub trait MarketDataPort: Send {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Register a symbol; ticks for unregistered symbols are never emitted
    fn subscribe(&mut self, symbol: &str) -> Result<(), MarketDataError>;

    /// Begin delivery
    async fn start(&mut self) -> Result<mpsc::Receiver<Tick>, MarketDataError>;
}
