//! CSV Replay Feed
//!
//! Replays recorded ticks from a `symbol,price,timestamp` file in file
//! order. A leading header row is tolerated; other unparseable rows are
//! skipped with a warning.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::Tick;
use crate::ports::{MarketDataError, MarketDataPort};

/// Parse one `symbol,price,timestamp` row
pub fn parse_tick_row(line: &str) -> Result<Tick, MarketDataError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [symbol, price, timestamp] = fields.as_slice() else {
        return Err(MarketDataError::ParseError(format!(
            "expected 3 fields, got {}",
            fields.len()
        )));
    };
    if symbol.is_empty() {
        return Err(MarketDataError::ParseError("empty symbol".to_string()));
    }
    let price: f64 = price
        .parse()
        .map_err(|_| MarketDataError::ParseError(format!("invalid price '{}'", price)))?;
    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| MarketDataError::ParseError(format!("invalid timestamp '{}'", timestamp)))?;

    Ok(Tick::new(*symbol, price, timestamp))
}

/// Market data port that replays a tick file
#[derive(Debug)]
pub struct CsvReplayFeed {
    path: PathBuf,
    subscribed: HashSet<String>,
    channel_buffer: usize,
    started: bool,
}

impl CsvReplayFeed {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            subscribed: HashSet::new(),
            channel_buffer: 1_024,
            started: false,
        }
    }

    pub fn with_channel_buffer(mut self, channel_buffer: usize) -> Self {
        self.channel_buffer = channel_buffer.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self, content: &str) -> Vec<Tick> {
        let mut ticks = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_tick_row(line) {
                Ok(tick) => {
                    if self.subscribed.contains(&tick.symbol) {
                        ticks.push(tick);
                    }
                }
                // Header row
                Err(_) if idx == 0 => {}
                Err(error) => {
                    warn!(line = idx + 1, error = %error, "skipping replay row");
                }
            }
        }
        ticks
    }
}

#[async_trait]
impl MarketDataPort for CsvReplayFeed {
    fn name(&self) -> &str {
        "replay"
    }

    fn subscribe(&mut self, symbol: &str) -> Result<(), MarketDataError> {
        self.subscribed.insert(symbol.to_string());
        Ok(())
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<Tick>, MarketDataError> {
        if self.started {
            return Err(MarketDataError::AlreadyStarted);
        }
        self.started = true;

        let content = tokio::fs::read_to_string(&self.path).await?;
        let ticks = self.load(&content);
        info!(path = %self.path.display(), ticks = ticks.len(), "replaying tick file");

        let (tx, rx) = mpsc::channel(self.channel_buffer);
        tokio::spawn(async move {
            for tick in ticks {
                if tx.send(tick).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}
