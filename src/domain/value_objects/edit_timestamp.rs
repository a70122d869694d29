use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix milliseconds used to order the edits of one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditTimestamp(i64);

impl EditTimestamp {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Strictly after `previous`, so edits created within the same millisecond keep their order.
    pub fn next_after(previous: Option<EditTimestamp>, now: EditTimestamp) -> Self {
        match previous {
            Some(prev) if prev.0 >= now.0 => Self(prev.0.saturating_add(1)),
            _ => now,
        }
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EditTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
