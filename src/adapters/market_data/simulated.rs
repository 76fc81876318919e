//! Simulated Pair Feed
//!
//! Synthetic two-asset market for paper runs and backtests. Asset B takes
//! a Gaussian random walk; asset A is pulled back toward a fixed fraction
//! of B on every step, so the ratio A/B mean-reverts and the engine sees
//! real entry and exit signals.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info};

use crate::domain::Tick;
use crate::ports::{MarketDataError, MarketDataPort};

const DEFAULT_PRICE_A: f64 = 3_000.0;
const DEFAULT_PRICE_B: f64 = 50_000.0;
const DEFAULT_TARGET_RATIO: f64 = 0.06;
const DEFAULT_REVERSION: f64 = 0.1;
const DEFAULT_SIGMA_A: f64 = 5.0;
const DEFAULT_SIGMA_B: f64 = 10.0;

/// Price generator behind [`SimulatedFeed`]
#[derive(Debug, Clone)]
pub struct PairRandomWalk {
    price_a: f64,
    price_b: f64,
    target_ratio: f64,
    reversion: f64,
    sigma_a: f64,
    sigma_b: f64,
    normal: Normal,
    rng: StdRng,
}

impl PairRandomWalk {
    /// Unseeded walks draw their seed from the OS
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            price_a: DEFAULT_PRICE_A,
            price_b: DEFAULT_PRICE_B,
            target_ratio: DEFAULT_TARGET_RATIO,
            reversion: DEFAULT_REVERSION,
            sigma_a: DEFAULT_SIGMA_A,
            sigma_b: DEFAULT_SIGMA_B,
            normal: Normal::standard(),
            rng,
        }
    }

    pub fn with_start_prices(mut self, price_a: f64, price_b: f64) -> Self {
        self.price_a = price_a;
        self.price_b = price_b;
        self
    }

    pub fn with_target_ratio(mut self, target_ratio: f64) -> Self {
        self.target_ratio = target_ratio;
        self
    }

    /// Advance one step and return `(price_a, price_b)`
    pub fn step(&mut self) -> (f64, f64) {
        self.price_b += self.normal.sample(&mut self.rng) * self.sigma_b;

        let ratio = self.price_a / self.price_b;
        let pull = (self.target_ratio - ratio) * self.reversion * self.price_b;
        self.price_a += pull + self.normal.sample(&mut self.rng) * self.sigma_a;

        (self.price_a, self.price_b)
    }

    pub fn prices(&self) -> (f64, f64) {
        (self.price_a, self.price_b)
    }

    pub fn target_ratio(&self) -> f64 {
        self.target_ratio
    }
}

/// Market data port backed by [`PairRandomWalk`]
///
/// Each step emits asset B first, then asset A, both stamped with the
/// same wall-clock time in Unix milliseconds.
#[derive(Debug)]
pub struct SimulatedFeed {
    asset_a: String,
    asset_b: String,
    subscribed: HashSet<String>,
    tick_interval: Duration,
    channel_buffer: usize,
    seed: Option<u64>,
    steps: Option<u64>,
    started: bool,
}

impl SimulatedFeed {
    pub fn new(asset_a: impl Into<String>, asset_b: impl Into<String>) -> Self {
        Self {
            asset_a: asset_a.into(),
            asset_b: asset_b.into(),
            subscribed: HashSet::new(),
            tick_interval: Duration::from_millis(100),
            channel_buffer: 1_024,
            seed: None,
            steps: None,
            started: false,
        }
    }

    /// Zero disables pacing entirely
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_channel_buffer(mut self, channel_buffer: usize) -> Self {
        self.channel_buffer = channel_buffer.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Stop after `steps` generator steps instead of running forever
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = Some(steps);
        self
    }
}

#[async_trait]
impl MarketDataPort for SimulatedFeed {
    fn name(&self) -> &str {
        "simulated"
    }

    fn subscribe(&mut self, symbol: &str) -> Result<(), MarketDataError> {
        if symbol != self.asset_a && symbol != self.asset_b {
            return Err(MarketDataError::SubscriptionError(format!(
                "simulated feed only produces {} and {}, not {}",
                self.asset_a, self.asset_b, symbol
            )));
        }
        self.subscribed.insert(symbol.to_string());
        Ok(())
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<Tick>, MarketDataError> {
        if self.started {
            return Err(MarketDataError::AlreadyStarted);
        }
        self.started = true;

        let (tx, rx) = mpsc::channel(self.channel_buffer);
        let mut walk = PairRandomWalk::new(self.seed);
        let emit_a = self.subscribed.contains(&self.asset_a);
        let emit_b = self.subscribed.contains(&self.asset_b);
        let asset_a = self.asset_a.clone();
        let asset_b = self.asset_b.clone();
        let tick_interval = self.tick_interval;
        let steps = self.steps;

        info!(
            asset_a = %asset_a,
            asset_b = %asset_b,
            interval_ms = tick_interval.as_millis() as u64,
            steps = ?steps,
            "simulated feed started"
        );

        tokio::spawn(async move {
            let mut pacing = (!tick_interval.is_zero()).then(|| time::interval(tick_interval));
            let mut step = 0u64;

            loop {
                if steps.is_some_and(|limit| step >= limit) {
                    break;
                }
                match pacing.as_mut() {
                    Some(interval) => {
                        interval.tick().await;
                    }
                    None => tokio::task::yield_now().await,
                }

                let (price_a, price_b) = walk.step();
                let now = chrono::Utc::now().timestamp_millis();
                step += 1;

                if emit_b && tx.send(Tick::new(asset_b.clone(), price_b, now)).await.is_err() {
                    break;
                }
                if emit_a && tx.send(Tick::new(asset_a.clone(), price_a, now)).await.is_err() {
                    break;
                }
            }
            debug!(steps = step, "simulated feed finished");
        });

        Ok(rx)
    }
}
