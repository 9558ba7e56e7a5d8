//! Readiness evaluation.
//!
//! Given the partitions intersecting a requested window and their latest
//! events, a strategy decides whether the window is comprehensively and
//! currently covered. Two strategies exist behind the same contract: the
//! canonical gap scan and the last-writer-wins interval cut.

mod gap_scan;
mod interval_cut;

pub use gap_scan::GapScan;
pub use interval_cut::IntervalCut;

use partreg_model::{PartitionId, RegisteredEvent, Window};

/// One candidate partition as seen by a readiness strategy: its window and
/// its latest event, if it has any event history at all.
#[derive(Debug, Clone)]
pub struct PartitionState {
    pub id: PartitionId,
    pub window: Window,
    pub last_event: Option<RegisteredEvent>,
}

/// Terminal outcome of a readiness query. `NotReady` is not an error; it
/// always carries a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady { reason: String },
}

impl Readiness {
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Readiness::NotReady {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Readiness::Ready => None,
            Readiness::NotReady { reason } => Some(reason),
        }
    }
}

/// Pure decision procedure over candidate partitions. Implementations must
/// not consult any state beyond their arguments.
pub trait ReadinessStrategy: Send + Sync {
    fn evaluate(&self, requested: Window, partitions: &[PartitionState]) -> Readiness;
}
