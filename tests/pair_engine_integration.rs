//! Pair Engine Integration Tests
//!
//! End-to-end checks through the public API:
//! 1. Simulated feed -> runner -> engine -> paper ledger + CSV audit log
//! 2. Replayed tick file with a constructed mean-reversion episode (real model)
//! 3. Model recovery and stop-loss settlement through the paper ledger
//!
//! All tests are deterministic (seeded RNG, no network).

use std::io::Write;
use std::time::Duration;

use approx::assert_relative_eq;
use tempfile::{tempdir, NamedTempFile};

use pairs_arb::adapters::{CsvAuditLog, CsvReplayFeed, PaperExecution, SimulatedFeed};
use pairs_arb::application::{StopReason, TradingRunner};
use pairs_arb::domain::{ActionTag, OrderSide, SpreadPosition, Tick, AUDIT_HEADER};
use pairs_arb::ports::{ExecutionPort, SpreadModel};
use pairs_arb::strategy::{MeanReversionModel, PairSignalEngine, StrategyConfig};

// ============================================================================
// Test Fixtures
// ============================================================================

fn test_config() -> StrategyConfig {
    StrategyConfig::default()
        .with_assets("ETH", "BTC")
        .with_window(60)
        .with_thresholds(2.0, 4.0)
        .with_risk_per_trade(0.1)
}

/// Spread model that reports a fixed z-score sequence, one per update
struct FixedZScores {
    zs: std::vec::IntoIter<f64>,
    current: Option<f64>,
}

impl FixedZScores {
    fn new(zs: Vec<f64>) -> Self {
        Self { zs: zs.into_iter(), current: None }
    }
}

impl SpreadModel for FixedZScores {
    fn update(&mut self, _value: f64) {
        self.current = self.zs.next();
    }

    fn zscore(&self, _value: f64) -> f64 {
        self.current.unwrap_or(0.0)
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }

    fn mu(&self) -> f64 {
        0.0
    }

    fn theta(&self) -> f64 {
        0.0
    }
}

/// Ratio path with AR(1) coefficient `beta` around `mu`, driven by a small LCG
fn ar1_ratio_path(n: usize, mu: f64, beta: f64, noise: f64, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let mut x = mu;
    let mut path = Vec::with_capacity(n);
    for _ in 0..n {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let u = (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5;
        x = mu + beta * (x - mu) + noise * u;
        path.push(x);
    }
    path
}

// ============================================================================
// Simulated feed end-to-end
// ============================================================================

#[tokio::test]
async fn test_simulated_run_writes_full_audit_trail() {
    let dir = tempdir().unwrap();
    let audit_path = dir.path().join("trade_log.csv");

    let audit = CsvAuditLog::create(&audit_path).unwrap();
    let execution = PaperExecution::new(10_000.0).with_fill_price(100.0);
    let engine = PairSignalEngine::new(test_config(), execution, audit);
    let mut runner = TradingRunner::new(engine);

    let feed = SimulatedFeed::new("ETH", "BTC")
        .with_tick_interval(Duration::ZERO)
        .with_seed(11)
        .with_steps(1_500);
    let report = runner.run(feed).await.unwrap();

    assert_eq!(report.reason, StopReason::FeedExhausted);
    assert_eq!(report.ticks_received, 3_000);
    // First tick is BTC alone; every later tick is evaluated
    assert_eq!(report.status.ticks_evaluated, 2_999);
    assert_relative_eq!(report.status.mu, 0.06, epsilon = 0.002);

    let content = std::fs::read_to_string(&audit_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some(AUDIT_HEADER));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len() as u64, report.status.ticks_evaluated);

    // Entries and exits must alternate in the log
    let mut open = false;
    for row in &rows {
        let action = row.rsplit(',').next().unwrap();
        match action {
            "OPEN_LONG" | "OPEN_SHORT" => {
                assert!(!open);
                open = true;
            }
            "CLOSE" | "STOP_LOSS" => {
                assert!(open);
                open = false;
            }
            "HOLD" => {}
            other => panic!("unexpected action {}", other),
        }
    }
    assert_eq!(open, report.status.position.is_open());

    let execution = runner.engine().executor();
    assert_eq!(
        execution.fills().len() as u64,
        2 * (report.status.spreads_opened + report.status.spreads_closed)
    );
}

// ============================================================================
// Replay with a constructed episode
// ============================================================================

/// One parsed audit row: (ratio, z-score, action)
fn audit_rows(content: &str) -> Vec<(f64, f64, String)> {
    content
        .lines()
        .skip(1)
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            (
                fields[3].parse().unwrap(),
                fields[6].parse().unwrap(),
                fields[7].to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_replayed_episode_opens_and_closes_spread() {
    let config = StrategyConfig::default()
        .with_assets("ETH", "BTC")
        .with_window(200)
        .with_thresholds(3.0, 10.0);

    // Calm AR(1) history (stationary std ~0.00026), a spike of ~6 std that
    // keeps the refit stationary, then a drop below the mean
    let mut ratios = ar1_ratio_path(400, 0.06, 0.9, 0.0004, 5);
    ratios.extend([0.0616, 0.0601, 0.0598, 0.0598]);

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "symbol,price,timestamp").unwrap();
    writeln!(file, "BTC,50000,0").unwrap();
    for (i, ratio) in ratios.iter().enumerate() {
        writeln!(file, "ETH,{},{}", ratio * 50_000.0, i + 1).unwrap();
    }
    file.flush().unwrap();

    let dir = tempdir().unwrap();
    let audit_path = dir.path().join("episode.csv");
    let engine = PairSignalEngine::new(
        config,
        PaperExecution::default(),
        CsvAuditLog::create(&audit_path).unwrap(),
    );
    let mut runner = TradingRunner::new(engine);
    let report = runner.run(CsvReplayFeed::new(file.path())).await.unwrap();

    assert_eq!(report.status.ticks_evaluated, ratios.len() as u64);
    assert!(report.status.model_ready);

    let rows = audit_rows(&std::fs::read_to_string(&audit_path).unwrap());
    assert_eq!(rows.len(), ratios.len());
    // Nothing trades on the calm history
    assert!(rows[..400].iter().all(|(_, _, action)| action == "HOLD"));

    let (spike_ratio, spike_z, spike_action) = &rows[400];
    assert!(*spike_z > 3.0 && *spike_z < 10.0, "spike z = {}", spike_z);
    assert_eq!(spike_action, "OPEN_SHORT");

    let (_, close_z, close_action) = rows[401..]
        .iter()
        .find(|(_, _, action)| action != "HOLD")
        .expect("spread never closed");
    assert_eq!(close_action, "CLOSE");
    assert!(*close_z <= 0.0);

    let execution = runner.engine().executor();
    let intents: Vec<_> = execution.fills().iter().map(|f| &f.intent).collect();
    assert_eq!(intents.len(), 4);
    assert_eq!(intents[0].side, OrderSide::Sell);
    assert_eq!(intents[0].symbol, "ETH");
    assert_eq!(intents[1].side, OrderSide::Buy);
    assert_eq!(intents[1].symbol, "BTC");
    assert_relative_eq!(intents[1].quantity, 0.1 * spike_ratio, epsilon = 1e-12);
    assert!(intents[2..].iter().all(|i| i.side == OrderSide::Flatten));
    assert_eq!(execution.position("ETH"), 0.0);
    assert_eq!(execution.position("BTC"), 0.0);
    assert_eq!(report.status.position, SpreadPosition::Flat);
}

// ============================================================================
// Model and engine invariants
// ============================================================================

#[test]
fn test_model_recovers_known_process() {
    let path = ar1_ratio_path(3_500, 1.5, 0.8, 0.01, 17);
    let mut model = MeanReversionModel::new(3_000);
    for value in &path[..3_000] {
        model.update(*value);
    }
    // Full window but nothing evicted yet
    assert!(!model.is_ready());

    for value in &path[3_000..] {
        model.update(*value);
    }

    assert!(model.is_ready());
    assert_relative_eq!(model.theta(), -(0.8f64).ln(), epsilon = 0.05);
    assert_relative_eq!(model.mu(), 1.5, epsilon = 0.002);
    assert_eq!(model.zscore(model.mu()), 0.0);
}

#[test]
fn test_stop_loss_flattens_paper_ledger() {
    let dir = tempdir().unwrap();
    let audit_path = dir.path().join("audit.csv");

    let mut engine = PairSignalEngine::with_model(
        test_config(),
        FixedZScores::new(vec![-2.5, -3.0, -4.5]),
        PaperExecution::new(10_000.0).with_fill_price(100.0),
        CsvAuditLog::create(&audit_path).unwrap(),
    );

    engine.on_tick(&Tick::new("ETH", 3_000.0, 1));
    engine.on_tick(&Tick::new("BTC", 50_000.0, 2));
    assert_eq!(engine.position(), SpreadPosition::LongSpread);
    assert_relative_eq!(engine.executor().position("ETH"), 0.1);
    assert_relative_eq!(engine.executor().position("BTC"), -0.006, epsilon = 1e-12);

    engine.on_tick(&Tick::new("ETH", 2_990.0, 3));
    let record = engine.on_tick(&Tick::new("ETH", 2_950.0, 4)).unwrap();
    engine.finish();

    assert_eq!(record.action, ActionTag::StopLoss);
    assert_eq!(engine.position(), SpreadPosition::Flat);
    assert_eq!(engine.executor().position("ETH"), 0.0);
    assert_eq!(engine.executor().position("BTC"), 0.0);
    // BUY 0.1 and SELL 0.006 at the fixed fill price, flattens settle nothing
    assert_relative_eq!(engine.executor().balance(), 10_000.0 - 10.0 + 0.6, epsilon = 1e-9);

    let content = std::fs::read_to_string(&audit_path).unwrap();
    let actions: Vec<&str> = content
        .lines()
        .skip(1)
        .map(|l| l.rsplit(',').next().unwrap())
        .collect();
    assert_eq!(actions, vec!["OPEN_LONG", "HOLD", "STOP_LOSS"]);
}
