//! pairs-arb - Online Pairs Statistical-Arbitrage Engine
//!
//! Paper-trades the spread between two assets from a simulated, live or
//! recorded tick feed.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use pairs_arb::adapters::cli::{CliApp, Command, ReplayCmd, RunCmd};
use pairs_arb::adapters::{
    BinanceTradeFeed, CsvAuditLog, CsvReplayFeed, NullAuditSink, PaperExecution, SimulatedFeed,
};
use pairs_arb::application::{RunReport, TradingRunner};
use pairs_arb::config::{load_config, Config, FeedMode};
use pairs_arb::ports::{AuditSink, MarketDataPort};
use pairs_arb::strategy::{PairSignalEngine, StrategyConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (PAIRS_* overrides may live there)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    match app.command {
        Command::Run(cmd) => run_command(cmd, app.verbose, app.debug).await,
        Command::Replay(cmd) => replay_command(cmd, app.verbose, app.debug).await,
    }
}

/// Flags beat the config level; RUST_LOG beats both
fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        config_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    Ok(())
}

fn load(path: &Path, verbose: bool, debug: bool) -> Result<Config> {
    let config = load_config(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    init_logging(verbose, debug, &config.logging.level)?;
    Ok(config)
}

async fn run_command(cmd: RunCmd, verbose: bool, debug: bool) -> Result<()> {
    let config = load(&cmd.config, verbose, debug)?;
    let audit = build_audit(&config, cmd.audit)?;
    let strategy = &config.strategy;
    let feed_cfg = &config.feed;

    match cmd.feed.unwrap_or(feed_cfg.mode) {
        FeedMode::Simulated => {
            let mut feed = SimulatedFeed::new(&strategy.asset_a, &strategy.asset_b)
                .with_tick_interval(Duration::from_millis(feed_cfg.tick_interval_ms))
                .with_channel_buffer(feed_cfg.channel_buffer);
            if let Some(seed) = feed_cfg.seed {
                feed = feed.with_seed(seed);
            }
            if let Some(steps) = cmd.steps {
                feed = feed.with_steps(steps);
            }
            drive(&config, feed, audit).await
        }
        FeedMode::Binance => {
            if cmd.steps.is_some() {
                tracing::warn!("--steps only applies to the simulated feed; ignoring");
            }
            let feed = BinanceTradeFeed::new()
                .with_ws_url(&feed_cfg.ws_url)
                .with_quote_asset(&feed_cfg.quote_asset)
                .with_reconnect_backoff(Duration::from_millis(feed_cfg.reconnect_backoff_ms))
                .with_channel_buffer(feed_cfg.channel_buffer);
            tracing::warn!("PAPER TRADING MODE - live prices, simulated fills");
            drive(&config, feed, audit).await
        }
    }
}

async fn replay_command(cmd: ReplayCmd, verbose: bool, debug: bool) -> Result<()> {
    let config = load(&cmd.config, verbose, debug)?;
    if !cmd.ticks.exists() {
        anyhow::bail!("Tick file not found: {}", cmd.ticks.display());
    }

    let audit = build_audit(&config, cmd.audit)?;
    let feed = CsvReplayFeed::new(&cmd.ticks).with_channel_buffer(config.feed.channel_buffer);
    drive(&config, feed, audit).await
}

/// CSV log at the override or configured path; discard when disabled
fn build_audit(config: &Config, path_override: Option<PathBuf>) -> Result<Box<dyn AuditSink>> {
    let path = match path_override {
        Some(path) => path,
        None if config.audit.enabled => config.audit.expanded_path(),
        None => {
            tracing::info!("Audit log disabled");
            return Ok(Box::new(NullAuditSink));
        }
    };

    let log = CsvAuditLog::create(&path)
        .with_context(|| format!("Failed to create audit log at {}", path.display()))?;
    tracing::info!("Writing audit log to {}", path.display());
    Ok(Box::new(log))
}

async fn drive<F: MarketDataPort>(
    config: &Config,
    feed: F,
    audit: Box<dyn AuditSink>,
) -> Result<()> {
    let mut execution = PaperExecution::new(config.execution.starting_balance);
    if let Some(price) = config.execution.fill_price {
        execution = execution.with_fill_price(price);
    }

    let engine = PairSignalEngine::new(StrategyConfig::from(config), execution, audit);
    let mut runner = TradingRunner::new(engine);

    // Setup Ctrl+C handler
    let handle = runner.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            handle.stop();
        }
    });

    let report = runner.run(feed).await.context("Trading run failed")?;
    print_report(&report, runner.engine().executor(), config);
    Ok(())
}

fn print_report(report: &RunReport, execution: &PaperExecution, config: &Config) {
    let status = &report.status;
    let strategy = &config.strategy;

    println!("Stopped: {:?}", report.reason);
    println!(
        "Ticks: {} received, {} evaluated, {} ignored",
        report.ticks_received, status.ticks_evaluated, status.ticks_ignored
    );
    println!(
        "Model: {} (mu {:.6}, theta {:.4})",
        if status.model_ready { "calibrated" } else { "not calibrated" },
        status.mu,
        status.theta
    );
    if let Some(z) = status.last_z {
        println!("Last z-score: {:.3}", z);
    }
    println!(
        "Spreads: {} opened, {} closed ({} stop-loss), now {}",
        status.spreads_opened, status.spreads_closed, status.stop_losses, status.position
    );
    println!(
        "Positions: {} {:.6} | {} {:.6}",
        strategy.asset_a, report.position_a, strategy.asset_b, report.position_b
    );
    println!(
        "Balance: {:.2} (start {:.2}, {} fills)",
        report.balance,
        execution.starting_balance(),
        execution.fills().len()
    );
}
