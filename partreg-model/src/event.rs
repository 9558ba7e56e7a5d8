use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::PartitionId;

/// A readiness signal against a partition.
///
/// LOCK means "write in progress, not yet safe to read"; UNLOCK means
/// "commit durable and visible". These are watermarks, not concurrency
/// locks: nothing blocks on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Lock,
    Unlock,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Lock => "LOCK",
            EventKind::Unlock => "UNLOCK",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LOCK" => Some(EventKind::Lock),
            "UNLOCK" => Some(EventKind::Unlock),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An appended event row. Append-only; for any partition only the event
/// with the greatest `registered_at` is its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredEvent {
    pub partition_id: PartitionId,
    pub kind: EventKind,
    pub registered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        assert_eq!(EventKind::parse("LOCK"), Some(EventKind::Lock));
        assert_eq!(EventKind::parse("UNLOCK"), Some(EventKind::Unlock));
        assert_eq!(EventKind::parse("lock"), None);
        assert_eq!(EventKind::Lock.as_str(), "LOCK");
    }
}
