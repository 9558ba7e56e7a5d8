use chrono::{DateTime, Utc};

use partreg_model::{EventKind, Window};

use super::{PartitionState, Readiness, ReadinessStrategy};

/// Last-writer-wins readiness: each partition's latest event is a state
/// report over its window, clamped to the requested window; where reports
/// overlap, the most recently registered one wins. The window is ready iff
/// every point of it is covered by a winning UNLOCK report.
///
/// This resolves conflicting overlap differently from [`super::GapScan`]:
/// a locked partition can be superseded by a later unlock that spans it,
/// instead of blocking the whole query.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalCut;

struct Report {
    window: Window,
    kind: EventKind,
    registered_at: DateTime<Utc>,
}

impl ReadinessStrategy for IntervalCut {
    fn evaluate(&self, requested: Window, partitions: &[PartitionState]) -> Readiness {
        let mut reports: Vec<Report> = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let Some(event) = &partition.last_event else {
                continue;
            };
            let start = partition.window.start.max(requested.start);
            let end = partition.window.end.min(requested.end);
            if start < end {
                reports.push(Report {
                    window: Window::new(start, end),
                    kind: event.kind,
                    registered_at: event.registered_at,
                });
            }
        }
        if reports.is_empty() {
            return Readiness::not_ready(
                "partitions are registered for the interval but none has any events",
            );
        }

        // Elementary segments between consecutive report boundaries; within
        // one segment the winning report never changes.
        let mut bounds: Vec<DateTime<Utc>> = Vec::with_capacity(reports.len() * 2 + 2);
        bounds.push(requested.start);
        bounds.push(requested.end);
        for report in &reports {
            bounds.push(report.window.start);
            bounds.push(report.window.end);
        }
        bounds.sort_unstable();
        bounds.dedup();

        for pair in bounds.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let winner = reports
                .iter()
                .filter(|r| r.window.start <= lo && hi <= r.window.end)
                .max_by_key(|r| r.registered_at);
            match winner {
                None => {
                    return Readiness::not_ready(format!(
                        "no state reported between {lo} and {hi}"
                    ));
                }
                Some(report) if report.kind == EventKind::Lock => {
                    return Readiness::not_ready(format!(
                        "interval between {lo} and {hi} last reported locked"
                    ));
                }
                Some(_) => {}
            }
        }

        Readiness::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use partreg_model::{PartitionId, RegisteredEvent};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, day, 0, 0, 0).unwrap()
    }

    fn window(start_day: u32, end_day: u32) -> Window {
        Window::new(at(start_day), at(end_day))
    }

    fn state(id: i64, start_day: u32, end_day: u32, kind: EventKind, event_day: u32) -> PartitionState {
        PartitionState {
            id: PartitionId(id),
            window: window(start_day, end_day),
            last_event: Some(RegisteredEvent {
                partition_id: PartitionId(id),
                kind,
                registered_at: at(event_day),
            }),
        }
    }

    #[test]
    fn later_unlock_supersedes_earlier_lock_over_the_same_span() {
        let states = [
            state(1, 1, 10, EventKind::Lock, 11),
            state(2, 1, 10, EventKind::Unlock, 12),
        ];
        assert!(IntervalCut.evaluate(window(1, 10), &states).is_ready());
    }

    #[test]
    fn later_lock_supersedes_earlier_unlock() {
        let states = [
            state(1, 1, 10, EventKind::Unlock, 11),
            state(2, 4, 6, EventKind::Lock, 12),
        ];
        let verdict = IntervalCut.evaluate(window(1, 10), &states);
        assert!(verdict.reason().unwrap().contains("locked"));
    }

    #[test]
    fn uncovered_segment_is_not_ready() {
        let states = [state(1, 1, 5, EventKind::Unlock, 11)];
        let verdict = IntervalCut.evaluate(window(1, 10), &states);
        assert!(verdict.reason().unwrap().contains("no state reported"));
    }

    #[test]
    fn adjacent_unlocked_reports_cover_the_window() {
        let states = [
            state(1, 1, 5, EventKind::Unlock, 11),
            state(2, 5, 10, EventKind::Unlock, 12),
        ];
        assert!(IntervalCut.evaluate(window(1, 10), &states).is_ready());
    }

    #[test]
    fn reports_are_clamped_to_the_requested_window() {
        // The lock lies entirely outside the requested window.
        let states = [
            state(1, 1, 10, EventKind::Unlock, 11),
            state(2, 10, 20, EventKind::Lock, 12),
        ];
        assert!(IntervalCut.evaluate(window(1, 10), &states).is_ready());
    }
}
