use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one tick evaluation, as written to the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionTag {
    Hold,
    OpenLong,
    OpenShort,
    Close,
    StopLoss,
}

impl ActionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTag::Hold => "HOLD",
            ActionTag::OpenLong => "OPEN_LONG",
            ActionTag::OpenShort => "OPEN_SHORT",
            ActionTag::Close => "CLOSE",
            ActionTag::StopLoss => "STOP_LOSS",
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, ActionTag::OpenLong | ActionTag::OpenShort)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, ActionTag::Close | ActionTag::StopLoss)
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_strings() {
        assert_eq!(ActionTag::Hold.to_string(), "HOLD");
        assert_eq!(ActionTag::OpenLong.to_string(), "OPEN_LONG");
        assert_eq!(ActionTag::OpenShort.to_string(), "OPEN_SHORT");
        assert_eq!(ActionTag::Close.to_string(), "CLOSE");
        assert_eq!(ActionTag::StopLoss.to_string(), "STOP_LOSS");
    }

    #[test]
    fn test_tag_serde_matches_display() {
        let json = serde_json::to_string(&ActionTag::StopLoss).unwrap();
        assert_eq!(json, "\"STOP_LOSS\"");
    }

    #[test]
    fn test_entry_exit_classification() {
        assert!(ActionTag::OpenShort.is_entry());
        assert!(!ActionTag::OpenShort.is_exit());
        assert!(ActionTag::StopLoss.is_exit());
        assert!(!ActionTag::Hold.is_entry() && !ActionTag::Hold.is_exit());
    }
}
