use partreg_model::{EventKind, Window};

use super::{PartitionState, Readiness, ReadinessStrategy};

/// The canonical readiness check: any locked partition blocks the whole
/// window; otherwise the partitions with event history must cover the
/// window edge to edge with no gap between consecutive intervals.
///
/// O(n log n) in the number of intersecting partitions, dominated by the
/// sort; no merged-coverage index is maintained between queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapScan;

impl ReadinessStrategy for GapScan {
    fn evaluate(&self, requested: Window, partitions: &[PartitionState]) -> Readiness {
        for partition in partitions {
            if let Some(event) = &partition.last_event
                && event.kind == EventKind::Lock
            {
                return Readiness::not_ready(format!(
                    "locked by partition <{}> {}",
                    partition.id, partition.window
                ));
            }
        }

        // Partitions with no event history have unknown state: they never
        // block, but they cannot cover anything either.
        let mut covering: Vec<&PartitionState> = partitions
            .iter()
            .filter(|p| p.last_event.is_some())
            .collect();
        if covering.is_empty() {
            return Readiness::not_ready(
                "partitions are registered for the interval but none has any events",
            );
        }

        covering.sort_by_key(|p| p.window.start);

        let first = covering[0];
        if first.window.start > requested.start {
            return Readiness::not_ready(format!(
                "interval not covered between {} and {}",
                requested.start, first.window.start
            ));
        }

        let furthest_end = covering
            .iter()
            .map(|p| p.window.end)
            .max()
            .unwrap_or(first.window.end);
        if furthest_end < requested.end {
            return Readiness::not_ready(format!(
                "interval not covered between {} and {}",
                furthest_end, requested.end
            ));
        }

        let mut current_end = covering[0].window.end;
        for partition in &covering[1..] {
            if current_end < partition.window.start {
                return Readiness::not_ready(format!(
                    "gap between {} and {}",
                    current_end, partition.window.start
                ));
            }
            // max, not plain assignment: a nested partition must not shrink
            // the running coverage edge.
            current_end = current_end.max(partition.window.end);
        }

        Readiness::Ready
    }
}
