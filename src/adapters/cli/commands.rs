//! CLI Command Definitions
//!
//! Argument parsing for the pairs-arb binary. Handlers live in `main.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::FeedMode;

/// pairs-arb - Online pairs-trading engine on a mean-reverting price ratio
#[derive(Parser, Debug)]
#[command(
    name = "pairs-arb",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Online pairs-trading engine on a mean-reverting price ratio",
    long_about = "pairs-arb recalibrates an Ornstein-Uhlenbeck model on the price ratio of \
                  two assets every tick and trades spread deviations with z-score entries, \
                  mean-reversion exits and a hard stop-loss. Execution is paper only."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Trade a live or simulated feed until Ctrl-C
    Run(RunCmd),

    /// Replay a recorded tick file through the engine
    Replay(ReplayCmd),
}

/// Start the trading loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/pairs.toml")]
    pub config: PathBuf,

    /// Override the configured feed
    #[arg(long, value_enum, value_name = "MODE")]
    pub feed: Option<FeedMode>,

    /// Override the audit log path
    #[arg(long, value_name = "FILE")]
    pub audit: Option<PathBuf>,

    /// Stop the simulated feed after N steps
    #[arg(long, value_name = "N")]
    pub steps: Option<u64>,
}

/// Replay recorded ticks
#[derive(Parser, Debug)]
pub struct ReplayCmd {
    /// Tick file with `symbol,price,timestamp` rows
    #[arg(value_name = "TICKS_CSV")]
    pub ticks: PathBuf,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/pairs.toml")]
    pub config: PathBuf,

    /// Override the audit log path
    #[arg(long, value_name = "FILE")]
    pub audit: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_app_parse_run() {
        let args = vec!["pairs-arb", "run", "--config", "test.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("test.toml"));
                assert!(cmd.feed.is_none());
                assert!(cmd.steps.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_app_parse_run_with_overrides() {
        let args = vec![
            "pairs-arb", "run", "--feed", "binance", "--audit", "out.csv", "--steps", "500",
        ];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.feed, Some(FeedMode::Binance));
                assert_eq!(cmd.audit, Some(PathBuf::from("out.csv")));
                assert_eq!(cmd.steps, Some(500));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_app_parse_run_invalid_feed() {
        let args = vec!["pairs-arb", "run", "--feed", "kraken"];
        assert!(CliApp::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_app_parse_replay() {
        let args = vec!["pairs-arb", "replay", "ticks.csv", "-c", "alt.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Replay(cmd) => {
                assert_eq!(cmd.ticks, PathBuf::from("ticks.csv"));
                assert_eq!(cmd.config, PathBuf::from("alt.toml"));
                assert!(cmd.audit.is_none());
            }
            _ => panic!("Expected Replay command"),
        }
    }

    #[test]
    fn test_replay_requires_tick_file() {
        assert!(CliApp::try_parse_from(vec!["pairs-arb", "replay"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = vec!["pairs-arb", "--verbose", "run"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.verbose);
        assert!(!app.debug);

        let args = vec!["pairs-arb", "replay", "t.csv", "--debug"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.debug);
    }

    #[test]
    fn test_default_config_path() {
        let app = CliApp::try_parse_from(vec!["pairs-arb", "run"]).unwrap();
        match app.command {
            Command::Run(cmd) => assert_eq!(cmd.config, PathBuf::from("config/pairs.toml")),
            _ => panic!("Expected Run command"),
        }
    }
}
