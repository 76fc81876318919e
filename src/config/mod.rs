//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, FeedMode, LoaderError, load_config, AUDIT_PATH_ENV, WS_URL_ENV,
};
