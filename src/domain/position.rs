use serde::{Deserialize, Serialize};
use std::fmt;

/// Spread position held by the pair engine
///
/// At most one spread is open at a time; `Flat` is the only state without
/// exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpreadPosition {
    #[default]
    Flat,
    /// Long asset A, short asset B (ratio below equilibrium)
    LongSpread,
    /// Short asset A, long asset B (ratio above equilibrium)
    ShortSpread,
}

impl SpreadPosition {
    pub fn is_open(&self) -> bool {
        !matches!(self, SpreadPosition::Flat)
    }
}

impl fmt::Display for SpreadPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadPosition::Flat => write!(f, "FLAT"),
            SpreadPosition::LongSpread => write!(f, "LONG_SPREAD"),
            SpreadPosition::ShortSpread => write!(f, "SHORT_SPREAD"),
        }
    }
}
