//! Progress observation for generation streams.

use crate::dispatch::DispatchError;
use common::EventCategory;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Receives per-stream progress. Purely observational.
pub trait ProgressObserver: Send + Sync {
    /// Called once per iteration with the stream's cumulative count.
    fn on_progress(&self, category: EventCategory, count: u64);

    fn on_dispatch(&self, _category: EventCategory, _outcome: &Result<(), DispatchError>) {}

    /// Called when an event could not be built and was skipped.
    fn on_skipped(&self, _category: EventCategory) {}

    fn on_completed(&self, _category: EventCategory, _count: u64) {}
}

impl<A: ProgressObserver, B: ProgressObserver> ProgressObserver for (A, B) {
    fn on_progress(&self, category: EventCategory, count: u64) {
        self.0.on_progress(category, count);
        self.1.on_progress(category, count);
    }

    fn on_dispatch(&self, category: EventCategory, outcome: &Result<(), DispatchError>) {
        self.0.on_dispatch(category, outcome);
        self.1.on_dispatch(category, outcome);
    }

    fn on_skipped(&self, category: EventCategory) {
        self.0.on_skipped(category);
        self.1.on_skipped(category);
    }

    fn on_completed(&self, category: EventCategory, count: u64) {
        self.0.on_completed(category, count);
        self.1.on_completed(category, count);
    }
}

/// Logs every event at debug level and every `log_every`-th at info.
#[derive(Debug, Clone)]
pub struct TracingProgress {
    log_every: u64,
}

impl TracingProgress {
    pub fn new(log_every: u64) -> Self {
        Self {
            log_every: log_every.max(1),
        }
    }
}

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, category: EventCategory, count: u64) {
        if count % self.log_every == 0 {
            info!("Generated request for event type: {} Total: {}", category, count);
        } else {
            debug!("Generated request for event type: {} Total: {}", category, count);
        }
    }

    fn on_completed(&self, category: EventCategory, count: u64) {
        info!("Stream {} completed after {} events", category, count);
    }
}

/// Per-category tallies for a run.
#[derive(Debug, Default)]
pub struct RunStats {
    generated: [AtomicU64; 5],
    sent: [AtomicU64; 5],
    failed: [AtomicU64; 5],
    skipped: [AtomicU64; 5],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryStats {
    pub generated: u64,
    pub sent: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, category: EventCategory) -> CategoryStats {
        let idx = category.code() as usize;
        CategoryStats {
            generated: self.generated[idx].load(Ordering::Relaxed),
            sent: self.sent[idx].load(Ordering::Relaxed),
            failed: self.failed[idx].load(Ordering::Relaxed),
            skipped: self.skipped[idx].load(Ordering::Relaxed),
        }
    }

    pub fn print_summary(&self) {
        println!("=== Generation Summary ===");
        println!(
            "{:<14}{:>12}{:>12}{:>12}{:>12}",
            "type", "generated", "sent", "failed", "skipped"
        );
        for category in EventCategory::ALL {
            let stats = self.snapshot(category);
            println!(
                "{:<14}{:>12}{:>12}{:>12}{:>12}",
                category.as_str(),
                stats.generated,
                stats.sent,
                stats.failed,
                stats.skipped
            );
        }
    }
}

impl ProgressObserver for RunStats {
    fn on_progress(&self, category: EventCategory, _count: u64) {
        self.generated[category.code() as usize].fetch_add(1, Ordering::Relaxed);
    }

    fn on_dispatch(&self, category: EventCategory, outcome: &Result<(), DispatchError>) {
        let counter = match outcome {
            Ok(()) => &self.sent,
            Err(_) => &self.failed,
        };
        counter[category.code() as usize].fetch_add(1, Ordering::Relaxed);
    }

    fn on_skipped(&self, category: EventCategory) {
        self.skipped[category.code() as usize].fetch_add(1, Ordering::Relaxed);
    }
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for std::sync::Arc<T> {
    fn on_progress(&self, category: EventCategory, count: u64) {
        (**self).on_progress(category, count);
    }

    fn on_dispatch(&self, category: EventCategory, outcome: &Result<(), DispatchError>) {
        (**self).on_dispatch(category, outcome);
    }

    fn on_skipped(&self, category: EventCategory) {
        (**self).on_skipped(category);
    }

    fn on_completed(&self, category: EventCategory, count: u64) {
        (**self).on_completed(category, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_run_stats_tallies_outcomes() {
        let stats = RunStats::new();
        stats.on_progress(EventCategory::Log, 1);
        stats.on_dispatch(EventCategory::Log, &Ok(()));
        stats.on_progress(EventCategory::Log, 2);
        stats.on_dispatch(EventCategory::Log, &Err(DispatchError::Rejected { status: 500 }));
        stats.on_progress(EventCategory::Log, 3);
        stats.on_skipped(EventCategory::Log);

        assert_eq!(
            stats.snapshot(EventCategory::Log),
            CategoryStats {
                generated: 3,
                sent: 1,
                failed: 1,
                skipped: 1,
            }
        );
        assert_eq!(stats.snapshot(EventCategory::Query), CategoryStats::default());
    }

    #[test]
    fn test_pair_forwards_to_both() {
        let left = Arc::new(RunStats::new());
        let right = Arc::new(RunStats::new());
        let pair = (left.clone(), right.clone());

        pair.on_progress(EventCategory::Command, 1);
        pair.on_dispatch(EventCategory::Command, &Ok(()));

        assert_eq!(left.snapshot(EventCategory::Command).sent, 1);
        assert_eq!(right.snapshot(EventCategory::Command).generated, 1);
    }
}
