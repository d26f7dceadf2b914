use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire name used when a category code does not map to a known category.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Lowest and highest urgency level an event can carry.
pub const MIN_URGENCY: u8 = 1;
pub const MAX_URGENCY: u8 = 5;

/// Closed set of event kinds the generator simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Transaction,
    Log,
    Notification,
    Command,
    Query,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Transaction,
        EventCategory::Log,
        EventCategory::Notification,
        EventCategory::Command,
        EventCategory::Query,
    ];

    /// Stable numeric code, also used as the table index.
    pub fn code(self) -> u8 {
        match self {
            EventCategory::Transaction => 0,
            EventCategory::Log => 1,
            EventCategory::Notification => 2,
            EventCategory::Command => 3,
            EventCategory::Query => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Lowercase name sent in the `X-Event-Type` header.
    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Transaction => "transaction",
            EventCategory::Log => "log",
            EventCategory::Notification => "notification",
            EventCategory::Command => "command",
            EventCategory::Query => "query",
        }
    }

    /// Wire name for a raw category code, `"unknown"` when the code is out of range.
    /// The `X-Event-Type` header is derived through this mapping.
    pub fn label_for_code(code: u8) -> &'static str {
        Self::from_code(code)
            .map(Self::as_str)
            .unwrap_or(UNKNOWN_CATEGORY)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown event category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for EventCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
