use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{PartitionId, ProviderId, SourceId};

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `start < end` strictly; zero-length and inverted windows are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(ModelError::Validation(format!(
                "window start {} must be strictly before end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Symmetric half-open intersection test:
    /// `[a.start, a.end)` meets `[b.start, b.end)` iff
    /// `a.start < b.end && b.start < a.end`.
    pub fn intersects(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} : {})", self.start, self.end)
    }
}

/// A partition accepted by the registry: one window owned by one
/// (source, provider) pair. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredPartition {
    pub id: PartitionId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source_id: SourceId,
    pub provider_id: ProviderId,
    pub registered_at: DateTime<Utc>,
}

impl RegisteredPartition {
    pub fn window(&self) -> Window {
        Window::new(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn inverted_and_empty_windows_are_invalid() {
        assert!(Window::new(at(2), at(1)).validate().is_err());
        assert!(Window::new(at(1), at(1)).validate().is_err());
        assert!(Window::new(at(1), at(2)).validate().is_ok());
    }

    #[test]
    fn intersection_is_symmetric() {
        let a = Window::new(at(1), at(5));
        let b = Window::new(at(4), at(9));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_half_open_windows_do_not_intersect() {
        let a = Window::new(at(1), at(5));
        let b = Window::new(at(5), at(9));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn containment_intersects() {
        let outer = Window::new(at(1), at(9));
        let inner = Window::new(at(3), at(4));
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn disjoint_windows_do_not_intersect() {
        let a = Window::new(at(1), at(2));
        let b = Window::new(at(3), at(4));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }
}
