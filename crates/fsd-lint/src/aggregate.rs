//! Thread-safe collection of findings.

use crate::types::Finding;
use parking_lot::Mutex;

/// Append-only finding collector.
///
/// Appends from several threads never lose or duplicate entries. Order is
/// the order in which `record` calls acquired the lock, so callers that
/// need a deterministic order merge per-worker batches in a fixed sequence.
#[derive(Debug, Default)]
pub struct Aggregator {
    findings: Mutex<Vec<Finding>>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, finding: Finding) {
        self.findings.lock().push(finding);
    }

    /// Appends a batch under a single lock so it stays contiguous.
    pub fn record_all(&self, batch: impl IntoIterator<Item = Finding>) {
        self.findings.lock().extend(batch);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.lock().is_empty()
    }

    /// Snapshot of everything recorded so far, in insertion order.
    #[must_use]
    pub fn results(&self) -> Vec<Finding> {
        self.findings.lock().clone()
    }

    #[must_use]
    pub fn into_results(self) -> Vec<Finding> {
        self.findings.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleKind, Violation};
    use crate::types::{Location, Severity};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn finding(n: usize) -> Finding {
        Finding::new(
            Violation {
                rule: RuleKind::Encapsulation,
                from_layer: "features".into(),
                to_layer: "entities".into(),
                to_slice: Some("user".into()),
                specifier: format!("@entities/user/model/{n}"),
            },
            Severity::Error,
            Location::new(PathBuf::from(format!("src/features/f{n}/index.ts")), n, 1),
            "internal",
        )
    }

    #[test]
    fn preserves_insertion_order() {
        let agg = Aggregator::new();
        agg.record(finding(2));
        agg.record(finding(1));
        agg.record_all([finding(3), finding(0)]);

        let lines: Vec<_> = agg.results().iter().map(|f| f.location.line).collect();
        assert_eq!(lines, [2, 1, 3, 0]);
        assert_eq!(agg.len(), 4);
    }

    #[test]
    fn empty_by_default() {
        let agg = Aggregator::new();
        assert!(agg.is_empty());
        assert!(agg.into_results().is_empty());
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let agg = Arc::new(Aggregator::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let agg = Arc::clone(&agg);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        agg.record(finding(t * 100 + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("worker thread panicked");
        }

        let mut lines: Vec<_> = agg.results().iter().map(|f| f.location.line).collect();
        assert_eq!(lines.len(), 400);
        lines.sort_unstable();
        lines.dedup();
        assert_eq!(lines.len(), 400);
    }
}
