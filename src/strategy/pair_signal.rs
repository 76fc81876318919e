//! Pair Signal Engine
//!
//! Turns ticks for two assets into spread trades. Each tick updates the
//! last price of its leg, the ratio A/B feeds the mean-reversion model, and
//! the model's z-score drives a three-state machine:
//!
//! | State        | Condition              | Next         | Tag        |
//! |--------------|------------------------|--------------|------------|
//! | FLAT         | model not ready        | FLAT         | HOLD       |
//! | FLAT         | z >  z_trigger         | SHORT_SPREAD | OPEN_SHORT |
//! | FLAT         | z < -z_trigger         | LONG_SPREAD  | OPEN_LONG  |
//! | SHORT_SPREAD | \|z\| > stop_loss_z    | FLAT         | STOP_LOSS  |
//! | SHORT_SPREAD | z <= 0                 | FLAT         | CLOSE      |
//! | LONG_SPREAD  | \|z\| > stop_loss_z    | FLAT         | STOP_LOSS  |
//! | LONG_SPREAD  | z >= 0                 | FLAT         | CLOSE      |
//!
//! Stop-loss wins the label when both exit conditions hold; either way both
//! legs are flattened. Every evaluated tick produces exactly one audit
//! record.
//!
//! The engine is not re-entrant: callers must deliver ticks one at a time,
//! in timestamp order per symbol.

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::domain::{ActionTag, AuditRecord, OrderSide, SpreadPosition, Tick, TradeIntent};
use crate::ports::{AuditSink, ExecutionPort, SpreadModel};
use crate::strategy::mean_reversion::MeanReversionModel;
use crate::strategy::params::StrategyConfig;
use crate::strategy::sizing::{hedge_quantity, FixedFractionSizer, PositionSizer};

/// Last known prices and the open spread, if any
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SignalState {
    /// 0.0 until the first tick for asset A
    pub price_a: f64,
    /// 0.0 until the first tick for asset B
    pub price_b: f64,
    pub position: SpreadPosition,
}

impl SignalState {
    pub fn has_both_prices(&self) -> bool {
        self.price_a > 0.0 && self.price_b > 0.0
    }

    pub fn is_position_open(&self) -> bool {
        self.position.is_open()
    }
}

/// Result of one state-machine step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub next: SpreadPosition,
    pub action: ActionTag,
}

impl Decision {
    fn hold(position: SpreadPosition) -> Self {
        Self { next: position, action: ActionTag::Hold }
    }
}

/// Pure transition function of the spread state machine
pub fn evaluate(
    position: SpreadPosition,
    model_ready: bool,
    z: f64,
    z_trigger: f64,
    stop_loss_z: f64,
) -> Decision {
    // An unready model reports 0.0, which must not read as a mean crossing.
    if !model_ready {
        return Decision::hold(position);
    }

    let flat = |action| Decision { next: SpreadPosition::Flat, action };

    match position {
        SpreadPosition::Flat => {
            if z > z_trigger {
                Decision { next: SpreadPosition::ShortSpread, action: ActionTag::OpenShort }
            } else if z < -z_trigger {
                Decision { next: SpreadPosition::LongSpread, action: ActionTag::OpenLong }
            } else {
                Decision::hold(position)
            }
        }
        SpreadPosition::ShortSpread => {
            if z.abs() > stop_loss_z {
                flat(ActionTag::StopLoss)
            } else if z <= 0.0 {
                flat(ActionTag::Close)
            } else {
                Decision::hold(position)
            }
        }
        SpreadPosition::LongSpread => {
            if z.abs() > stop_loss_z {
                flat(ActionTag::StopLoss)
            } else if z >= 0.0 {
                flat(ActionTag::Close)
            } else {
                Decision::hold(position)
            }
        }
    }
}

/// Counters and last values for status reporting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStatus {
    pub price_a: f64,
    pub price_b: f64,
    pub ratio: Option<f64>,
    pub position: SpreadPosition,
    pub model_ready: bool,
    pub mu: f64,
    pub theta: f64,
    pub last_z: Option<f64>,
    pub ticks_evaluated: u64,
    pub ticks_ignored: u64,
    pub spreads_opened: u64,
    pub spreads_closed: u64,
    pub stop_losses: u64,
}

/// Online pairs-trading engine over assets A and B
pub struct PairSignalEngine<E, A, M = MeanReversionModel> {
    config: StrategyConfig,
    model: M,
    executor: E,
    audit: A,
    sizer: Box<dyn PositionSizer>,
    state: SignalState,
    /// Sequence for correlation ids
    seq: u64,
    status: EngineStatus,
}

impl<E: ExecutionPort, A: AuditSink> PairSignalEngine<E, A> {
    /// Engine with the AR(1) model and fixed-fraction sizing from `config`
    pub fn new(config: StrategyConfig, executor: E, audit: A) -> Self {
        let model = MeanReversionModel::new(config.window_size);
        Self::with_model(config, model, executor, audit)
    }
}

impl<E: ExecutionPort, A: AuditSink, M: SpreadModel> PairSignalEngine<E, A, M> {
    pub fn with_model(config: StrategyConfig, model: M, executor: E, audit: A) -> Self {
        let sizer = Box::new(FixedFractionSizer::new(config.risk_per_trade));
        Self {
            config,
            model,
            executor,
            audit,
            sizer,
            state: SignalState::default(),
            seq: 0,
            status: EngineStatus::default(),
        }
    }

    /// Replace the entry sizing policy
    pub fn with_sizer(mut self, sizer: impl PositionSizer + 'static) -> Self {
        self.sizer = Box::new(sizer);
        self
    }

    /// Process one tick
    ///
    /// Returns the audit record when the tick reached the model, `None` when
    /// it was ignored (invalid price, unknown symbol, or a leg still
    /// unpriced).
    pub fn on_tick(&mut self, tick: &Tick) -> Option<AuditRecord> {
        if !tick.is_valid() {
            debug!(symbol = %tick.symbol, price = tick.price, "ignoring tick with unusable price");
            self.status.ticks_ignored += 1;
            return None;
        }

        if tick.symbol == self.config.asset_a {
            self.state.price_a = tick.price;
        } else if tick.symbol == self.config.asset_b {
            self.state.price_b = tick.price;
        } else {
            trace!(symbol = %tick.symbol, "ignoring tick for unknown symbol");
            self.status.ticks_ignored += 1;
            return None;
        }

        if !self.state.has_both_prices() {
            return None;
        }

        let ratio = self.state.price_a / self.state.price_b;
        self.model.update(ratio);

        let z = self.model.zscore(ratio);
        let ready = self.model.is_ready();

        if ready {
            debug!(
                ratio = format_args!("{:.5}", ratio),
                mu = format_args!("{:.5}", self.model.mu()),
                z = format_args!("{:.2}", z),
                position = %self.state.position,
                "spread status"
            );
        }

        let decision = evaluate(
            self.state.position,
            ready,
            z,
            self.config.z_trigger,
            self.config.stop_loss_z,
        );
        self.apply(decision, z, ratio);

        let record = AuditRecord {
            timestamp: tick.timestamp,
            price_a: self.state.price_a,
            price_b: self.state.price_b,
            ratio,
            mu: self.model.mu(),
            theta: self.model.theta(),
            z_score: z,
            action: decision.action,
        };
        self.audit.record(&record);

        self.status.ticks_evaluated += 1;
        self.status.ratio = Some(ratio);
        self.status.last_z = Some(z);

        Some(record)
    }

    fn apply(&mut self, decision: Decision, z: f64, ratio: f64) {
        let action = decision.action;
        if action == ActionTag::Hold {
            return;
        }

        self.seq += 1;
        let seq = self.seq;
        let id = |leg: &str| format!("{}-{}-{}", action.as_str().to_lowercase(), seq, leg);
        let asset_a = self.config.asset_a.clone();
        let asset_b = self.config.asset_b.clone();

        let intents = match action {
            ActionTag::OpenShort | ActionTag::OpenLong => {
                let qty_a = self.sizer.leg_a_quantity(z, ratio);
                let qty_b = hedge_quantity(qty_a, ratio);
                let (side_a, side_b) = if action == ActionTag::OpenShort {
                    (OrderSide::Sell, OrderSide::Buy)
                } else {
                    (OrderSide::Buy, OrderSide::Sell)
                };
                info!(
                    action = %action,
                    z = format_args!("{:.2}", z),
                    ratio = format_args!("{:.5}", ratio),
                    "{} {} {}, {} {} {}",
                    side_a, qty_a, asset_a, side_b, qty_b, asset_b
                );
                self.status.spreads_opened += 1;
                [
                    TradeIntent::market(asset_a.clone(), side_a, qty_a, id("a")),
                    TradeIntent::market(asset_b.clone(), side_b, qty_b, id("b")),
                ]
            }
            ActionTag::Close | ActionTag::StopLoss => {
                if action == ActionTag::StopLoss {
                    warn!(
                        z = format_args!("{:.2}", z),
                        stop_loss_z = self.config.stop_loss_z,
                        from = %self.state.position,
                        "stop loss triggered, flattening spread"
                    );
                    self.status.stop_losses += 1;
                } else {
                    info!(
                        z = format_args!("{:.2}", z),
                        from = %self.state.position,
                        "mean reversion reached, closing spread"
                    );
                }
                self.status.spreads_closed += 1;
                [
                    TradeIntent::flatten(asset_a.clone(), id("a")),
                    TradeIntent::flatten(asset_b.clone(), id("b")),
                ]
            }
            ActionTag::Hold => return,
        };

        for intent in intents {
            self.executor.execute(intent);
        }
        self.state.position = decision.next;
    }

    /// Flush the audit sink; call once delivery has stopped
    pub fn finish(&mut self) {
        self.audit.flush();
    }

    pub fn snapshot(&self) -> EngineStatus {
        EngineStatus {
            price_a: self.state.price_a,
            price_b: self.state.price_b,
            position: self.state.position,
            model_ready: self.model.is_ready(),
            mu: self.model.mu(),
            theta: self.model.theta(),
            ..self.status.clone()
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn state(&self) -> &SignalState {
        &self.state
    }

    pub fn position(&self) -> SpreadPosition {
        self.state.position
    }

    pub fn is_position_open(&self) -> bool {
        self.state.is_position_open()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}
