//! Paper Execution Ledger
//!
//! Fills every intent immediately and tracks signed positions per symbol.
//! With a fixed fill price the ledger also moves cash (BUY debits, SELL
//! credits `qty * fill_price`); without one the balance never changes.
//! FLATTEN only zeroes the position.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::domain::{OrderSide, TradeIntent};
use crate::ports::ExecutionPort;

pub const DEFAULT_STARTING_BALANCE: f64 = 10_000.0;

/// One executed paper intent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperFill {
    pub seq: u64,
    pub intent: TradeIntent,
    /// Position in the intent's symbol after the fill
    pub position_after: f64,
    /// Cash change caused by the fill
    pub cash_delta: f64,
}

#[derive(Debug, Clone)]
pub struct PaperExecution {
    starting_balance: f64,
    balance: f64,
    fill_price: Option<f64>,
    positions: HashMap<String, f64>,
    fills: Vec<PaperFill>,
}

impl PaperExecution {
    pub fn new(starting_balance: f64) -> Self {
        Self {
            starting_balance,
            balance: starting_balance,
            fill_price: None,
            positions: HashMap::new(),
            fills: Vec::new(),
        }
    }

    /// Settle BUY and SELL in cash at a constant price
    pub fn with_fill_price(mut self, fill_price: f64) -> Self {
        self.fill_price = Some(fill_price);
        self
    }

    pub fn fills(&self) -> &[PaperFill] {
        &self.fills
    }

    pub fn starting_balance(&self) -> f64 {
        self.starting_balance
    }

    /// Non-zero positions, sorted by symbol
    pub fn open_positions(&self) -> Vec<(String, f64)> {
        let mut open: Vec<(String, f64)> = self
            .positions
            .iter()
            .filter(|(_, qty)| **qty != 0.0)
            .map(|(symbol, qty)| (symbol.clone(), *qty))
            .collect();
        open.sort_by(|a, b| a.0.cmp(&b.0));
        open
    }
}

impl Default for PaperExecution {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}

impl ExecutionPort for PaperExecution {
    fn execute(&mut self, intent: TradeIntent) {
        let position = self.positions.entry(intent.symbol.clone()).or_insert(0.0);
        let price = self.fill_price.unwrap_or(0.0);

        let cash_delta = match intent.side {
            OrderSide::Buy => {
                *position += intent.quantity;
                -intent.quantity * price
            }
            OrderSide::Sell => {
                *position -= intent.quantity;
                intent.quantity * price
            }
            OrderSide::Flatten => {
                *position = 0.0;
                0.0
            }
        };
        let position_after = *position;
        self.balance += cash_delta;

        info!(
            intent = %intent,
            position = position_after,
            balance = format_args!("{:.2}", self.balance),
            "paper fill"
        );

        self.fills.push(PaperFill {
            seq: self.fills.len() as u64 + 1,
            intent,
            position_after,
            cash_delta,
        });
    }

    fn position(&self, symbol: &str) -> f64 {
        self.positions.get(symbol).copied().unwrap_or(0.0)
    }

    fn balance(&self) -> f64 {
        self.balance
    }
}
