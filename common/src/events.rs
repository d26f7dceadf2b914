use crate::types::{EventCategory, MAX_URGENCY, MIN_URGENCY};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("urgency level {0} outside 1..=5")]
    InvalidUrgency(u8),
}

/// A single generated event, handed to the dispatcher and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub id: Uuid,
    pub category: EventCategory,
    pub urgency: u8,
    pub timestamp: DateTime<Utc>,
}

impl EventDescriptor {
    /// Fresh descriptor with a random v4 id.
    pub fn build(
        category: EventCategory,
        urgency: u8,
        now: DateTime<Utc>,
    ) -> Result<Self, DescriptorError> {
        if !(MIN_URGENCY..=MAX_URGENCY).contains(&urgency) {
            return Err(DescriptorError::InvalidUrgency(urgency));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            category,
            urgency,
            timestamp: now,
        })
    }

    /// RFC 3339 timestamp with second precision, as sent on the wire.
    pub fn request_time(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
