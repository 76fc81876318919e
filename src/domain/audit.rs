use serde::{Deserialize, Serialize};

use super::signal::ActionTag;

/// Column order shared by every audit writer
pub const AUDIT_HEADER: &str = "Timestamp,PriceA,PriceB,Ratio,Mu,Theta,ZScore,Action";

/// One evaluation of the pair engine
///
/// Produced for every tick that reaches the model, whether or not a trade
/// followed. Field order matches `AUDIT_HEADER`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: i64,
    pub price_a: f64,
    pub price_b: f64,
    pub ratio: f64,
    pub mu: f64,
    pub theta: f64,
    pub z_score: f64,
    pub action: ActionTag,
}

impl AuditRecord {
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{}",
            self.timestamp,
            self.price_a,
            self.price_b,
            self.ratio,
            self.mu,
            self.theta,
            self.z_score,
            self.action
        )
    }
}
