//! Trading Runner
//!
//! Wires a market data feed to the pair engine. The feed's producer task
//! fills a bounded channel; the runner drains it on a single task, so the
//! engine only ever sees one tick at a time. The run ends when the feed
//! closes its channel or a shutdown is requested.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::ports::{AuditSink, ExecutionPort, MarketDataError, MarketDataPort, SpreadModel};
use crate::strategy::mean_reversion::MeanReversionModel;
use crate::strategy::pair_signal::{EngineStatus, PairSignalEngine};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Market data error: {0}")]
    MarketDataError(#[from] MarketDataError),
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The feed closed its channel
    FeedExhausted,
    /// `ShutdownHandle::stop` was called
    Shutdown,
}

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub reason: StopReason,
    pub ticks_received: u64,
    pub status: EngineStatus,
    pub position_a: f64,
    pub position_b: f64,
    pub balance: f64,
}

/// Requests a graceful stop from another task
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
        tracing::info!("Stop signal sent to runner");
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Feed-to-engine event loop
pub struct TradingRunner<E, A, M = MeanReversionModel> {
    engine: PairSignalEngine<E, A, M>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<E: ExecutionPort, A: AuditSink, M: SpreadModel> TradingRunner<E, A, M> {
    pub fn new(engine: PairSignalEngine<E, A, M>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            engine,
            shutdown_tx: Arc::new(tx),
            shutdown_rx: rx,
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle { tx: Arc::clone(&self.shutdown_tx) }
    }

    /// Subscribe both legs, start the feed and process ticks until it ends
    pub async fn run<F: MarketDataPort>(&mut self, mut feed: F) -> Result<RunReport, RunnerError> {
        let asset_a = self.engine.config().asset_a.clone();
        let asset_b = self.engine.config().asset_b.clone();

        feed.subscribe(&asset_a)?;
        feed.subscribe(&asset_b)?;
        let mut rx = feed.start().await?;

        tracing::info!(
            feed = feed.name(),
            asset_a = %asset_a,
            asset_b = %asset_b,
            window = self.engine.config().window_size,
            "Starting trading runner"
        );

        let mut shutdown = self.shutdown_rx.clone();
        let mut ticks_received = 0u64;

        let reason = loop {
            if *shutdown.borrow_and_update() {
                break StopReason::Shutdown;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break StopReason::Shutdown;
                    }
                }
                maybe_tick = rx.recv() => match maybe_tick {
                    Some(tick) => {
                        ticks_received += 1;
                        self.engine.on_tick(&tick);
                    }
                    None => break StopReason::FeedExhausted,
                },
            }
        };

        // Dropping the receiver stops the producer task
        drop(rx);
        self.engine.finish();

        let report = RunReport {
            reason,
            ticks_received,
            status: self.engine.snapshot(),
            position_a: self.engine.executor().position(&asset_a),
            position_b: self.engine.executor().position(&asset_b),
            balance: self.engine.executor().balance(),
        };

        tracing::info!(
            reason = ?report.reason,
            ticks = report.ticks_received,
            evaluated = report.status.ticks_evaluated,
            opened = report.status.spreads_opened,
            stop_losses = report.status.stop_losses,
            position = %report.status.position,
            balance = format_args!("{:.2}", report.balance),
            "Trading runner stopped"
        );

        Ok(report)
    }

    pub fn engine(&self) -> &PairSignalEngine<E, A, M> {
        &self.engine
    }

    pub fn into_engine(self) -> PairSignalEngine<E, A, M> {
        self.engine
    }
}
