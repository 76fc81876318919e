//! Binance Trade Stream Feed
//!
//! Subscribes to the public combined trade stream
//! (`/stream?streams=ethusdt@trade/btcusdt@trade`) and republishes each
//! trade as a [`Tick`] under the caller's own symbol. Trades are quoted in
//! the configured quote asset (USDT by default); the engine only uses the
//! ratio, so the quote cancels out.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::domain::Tick;
use crate::ports::{MarketDataError, MarketDataPort};

pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443";
pub const DEFAULT_QUOTE_ASSET: &str = "usdt";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct CombinedEnvelope {
    data: TradePayload,
}

#[derive(Debug, Deserialize)]
struct TradePayload {
    #[serde(rename = "s")]
    symbol: String,
    /// Decimal string, e.g. "0.05231000"
    #[serde(rename = "p")]
    price: String,
    /// Trade time in Unix ms
    #[serde(rename = "T")]
    trade_time: i64,
}

/// Mapping between internal symbols and exchange stream symbols
#[derive(Debug, Clone, Default)]
pub struct StreamRouter {
    quote_asset: String,
    /// Exchange symbol (lowercase) -> internal symbol
    routes: BTreeMap<String, String>,
}

impl StreamRouter {
    pub fn new(quote_asset: impl Into<String>) -> Self {
        Self {
            quote_asset: quote_asset.into().to_lowercase(),
            routes: BTreeMap::new(),
        }
    }

    /// `ETH` becomes `ethusdt`; symbols already naming the quote asset are only lowercased
    pub fn exchange_symbol(&self, symbol: &str) -> String {
        let mut exchange = symbol.to_lowercase();
        if !exchange.contains(&self.quote_asset) {
            exchange.push_str(&self.quote_asset);
        }
        exchange
    }

    pub fn add(&mut self, symbol: &str) -> String {
        let exchange = self.exchange_symbol(symbol);
        self.routes.insert(exchange.clone(), symbol.to_string());
        exchange
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Combined-stream path, streams in sorted order
    pub fn stream_path(&self) -> String {
        let streams: Vec<String> = self.routes.keys().map(|s| format!("{}@trade", s)).collect();
        format!("/stream?streams={}", streams.join("/"))
    }

    /// Decode one combined-stream frame
    ///
    /// `Ok(None)` for trades on symbols nobody subscribed to.
    pub fn parse_trade(&self, payload: &str) -> Result<Option<Tick>, MarketDataError> {
        let envelope: CombinedEnvelope = serde_json::from_str(payload)
            .map_err(|e| MarketDataError::ParseError(e.to_string()))?;
        let trade = envelope.data;

        let Some(symbol) = self.routes.get(&trade.symbol.to_lowercase()) else {
            return Ok(None);
        };

        let price: f64 = trade.price.parse().map_err(|_| {
            MarketDataError::ParseError(format!("invalid price '{}' for {}", trade.price, trade.symbol))
        })?;

        Ok(Some(Tick::new(symbol.clone(), price, trade.trade_time)))
    }
}

/// Live trade feed from Binance
#[derive(Debug)]
pub struct BinanceTradeFeed {
    ws_url: String,
    router: StreamRouter,
    reconnect_backoff: Duration,
    channel_buffer: usize,
    started: bool,
}

impl BinanceTradeFeed {
    pub fn new() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            router: StreamRouter::new(DEFAULT_QUOTE_ASSET),
            reconnect_backoff: Duration::from_millis(1_000),
            channel_buffer: 1_024,
            started: false,
        }
    }

    /// Base endpoint without path, e.g. `wss://stream.binance.com:9443`
    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = ws_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Must be called before any `subscribe`
    pub fn with_quote_asset(mut self, quote_asset: impl Into<String>) -> Self {
        self.router = StreamRouter::new(quote_asset);
        self
    }

    pub fn with_reconnect_backoff(mut self, backoff: Duration) -> Self {
        self.reconnect_backoff = backoff;
        self
    }

    pub fn with_channel_buffer(mut self, channel_buffer: usize) -> Self {
        self.channel_buffer = channel_buffer.max(1);
        self
    }

    pub fn stream_url(&self) -> String {
        format!("{}{}", self.ws_url, self.router.stream_path())
    }

    async fn run_socket(
        mut socket: Socket,
        router: &StreamRouter,
        tx: &mpsc::Sender<Tick>,
    ) -> Result<(), MarketDataError> {
        while let Some(msg) = socket.next().await {
            let msg = msg.map_err(|e| MarketDataError::WebSocketError(e.to_string()))?;

            match msg {
                Message::Text(text) => match router.parse_trade(&text) {
                    Ok(Some(tick)) => {
                        if tx.send(tick).await.is_err() {
                            // Receiver dropped: engine is gone
                            return Ok(());
                        }
                    }
                    Ok(None) => {}
                    Err(error) => debug!(error = %error, "skipping malformed trade payload"),
                },
                Message::Ping(data) => {
                    socket
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| MarketDataError::WebSocketError(e.to_string()))?;
                }
                Message::Close(_) => return Err(MarketDataError::StreamClosed),
                _ => {}
            }
        }
        Err(MarketDataError::StreamClosed)
    }
}

impl Default for BinanceTradeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataPort for BinanceTradeFeed {
    fn name(&self) -> &str {
        "binance"
    }

    fn subscribe(&mut self, symbol: &str) -> Result<(), MarketDataError> {
        if self.started {
            return Err(MarketDataError::SubscriptionError(format!(
                "cannot subscribe {} after the stream has started",
                symbol
            )));
        }
        if symbol.trim().is_empty() {
            return Err(MarketDataError::SubscriptionError("empty symbol".to_string()));
        }
        let stream = self.router.add(symbol);
        debug!(symbol = %symbol, stream = %stream, "binance subscription registered");
        Ok(())
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<Tick>, MarketDataError> {
        if self.started {
            return Err(MarketDataError::AlreadyStarted);
        }
        if self.router.is_empty() {
            return Err(MarketDataError::SubscriptionError("no symbols subscribed".to_string()));
        }
        self.started = true;

        let (tx, rx) = mpsc::channel(self.channel_buffer);
        let url = self.stream_url();
        let router = self.router.clone();
        let backoff = self.reconnect_backoff;

        tokio::spawn(async move {
            loop {
                if tx.is_closed() {
                    break;
                }

                match connect_async(url.as_str()).await {
                    Ok((socket, _)) => {
                        info!(url = %url, "binance trade stream connected");
                        if let Err(error) = Self::run_socket(socket, &router, &tx).await {
                            warn!(error = %error, "binance trade stream dropped");
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, url = %url, "binance connect failed");
                    }
                }

                if tx.is_closed() {
                    break;
                }
                time::sleep(backoff).await;
            }
            debug!("binance feed task exiting");
        });

        Ok(rx)
    }
}
