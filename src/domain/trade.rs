use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a single-leg order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
    /// Close the whole leg back to zero
    Flatten,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
            OrderSide::Flatten => write!(f, "FLATTEN"),
        }
    }
}

/// Price instruction attached to an intent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LimitPrice {
    Market,
    Limit(f64),
}

impl fmt::Display for LimitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitPrice::Market => write!(f, "MKT"),
            LimitPrice::Limit(px) => write!(f, "{}", px),
        }
    }
}

/// Order request handed to an execution sink
///
/// Intents are fire-and-forget: the sink owns fills, retries and idempotency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub limit_price: LimitPrice,
    pub correlation_id: String,
}

impl TradeIntent {
    pub fn market(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: f64,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            limit_price: LimitPrice::Market,
            correlation_id: correlation_id.into(),
        }
    }

    /// Market order closing the whole leg
    pub fn flatten(symbol: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::market(symbol, OrderSide::Flatten, 0.0, correlation_id)
    }
}

impl fmt::Display for TradeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {} [{}]",
            self.side, self.quantity, self.symbol, self.limit_price, self.correlation_id
        )
    }
}
