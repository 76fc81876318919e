use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::domain::{AuditRecord, OrderSide, TradeIntent};
use super::audit::AuditSink;
use super::execution::ExecutionPort;
use super::strategy::SpreadModel;

/// Execution sink that records every intent and keeps a naive position map
///
/// Clones share the same storage, so a test can keep a handle after moving
/// one copy into the engine.
#[derive(Debug, Default, Clone)]
pub struct RecordingExecution {
    intents: Arc<Mutex<Vec<TradeIntent>>>,
    positions: Arc<Mutex<HashMap<String, f64>>>,
}

impl RecordingExecution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded intents
    pub fn intents(&self) -> Vec<TradeIntent> {
        self.intents.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.intents.lock().unwrap().clear();
    }
}

impl ExecutionPort for RecordingExecution {
    fn execute(&mut self, intent: TradeIntent) {
        {
            let mut positions = self.positions.lock().unwrap();
            let entry = positions.entry(intent.symbol.clone()).or_insert(0.0);
            match intent.side {
                OrderSide::Buy => *entry += intent.quantity,
                OrderSide::Sell => *entry -= intent.quantity,
                OrderSide::Flatten => *entry = 0.0,
            }
        }
        self.intents.lock().unwrap().push(intent);
    }

    fn position(&self, symbol: &str) -> f64 {
        self.positions.lock().unwrap().get(symbol).copied().unwrap_or(0.0)
    }

    fn balance(&self) -> f64 {
        0.0
    }
}

/// Audit sink that keeps records in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<AuditRecord> {
        self.records.lock().unwrap().last().cloned()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, record: &AuditRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// Spread model that replays a fixed list of z-scores, one per update
///
/// Lets engine tests hit exact thresholds. Once the script runs out the
/// model reports not-ready.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    script: VecDeque<Option<f64>>,
    current: Option<f64>,
    updates: usize,
}

impl ScriptedModel {
    /// `None` entries simulate an uncalibrated model for that tick
    pub fn new(script: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            current: None,
            updates: 0,
        }
    }

    /// Every tick is calibrated and yields the given z-score
    pub fn ready(zs: impl IntoIterator<Item = f64>) -> Self {
        Self::new(zs.into_iter().map(Some))
    }

    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl SpreadModel for ScriptedModel {
    fn update(&mut self, _value: f64) {
        self.updates += 1;
        self.current = self.script.pop_front().flatten();
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_execution_shares_state() {
        let handle = RecordingExecution::new();
        let mut sink = handle.clone();

        sink.execute(TradeIntent::market("ETH", OrderSide::Buy, 2.0, "t-1"));
        sink.execute(TradeIntent::market("ETH", OrderSide::Sell, 0.5, "t-2"));

        assert_eq!(handle.intents().len(), 2);
        assert_eq!(handle.position("ETH"), 1.5);

        sink.execute(TradeIntent::flatten("ETH", "t-3"));
        assert_eq!(handle.position("ETH"), 0.0);
    }

    #[test]
    fn test_scripted_model() {
        let mut model = ScriptedModel::new([None, Some(1.5)]);
        assert!(!model.is_ready());

        model.update(1.0);
        assert!(!model.is_ready());
        assert_eq!(model.zscore(1.0), 0.0);

        model.update(1.0);
        assert!(model.is_ready());
        assert_eq!(model.zscore(1.0), 1.5);

        model.update(1.0);
        assert!(!model.is_ready());
        assert_eq!(model.updates(), 3);
    }
}
