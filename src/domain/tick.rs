use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped trade price for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    /// Unix milliseconds
    pub timestamp: i64,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: i64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp,
        }
    }

    /// Usable prices are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}
