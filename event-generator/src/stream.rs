//! Per-category generation loop.

use crate::dispatch::{DispatchError, Dispatcher};
use crate::progress::ProgressObserver;
use crate::sampler::UrgencySampler;
use chrono::Utc;
use common::{EventCategory, EventDescriptor, GenerationQuota};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Running,
    Completed,
}

/// Emits `quota.count` events for one category, one after another.
///
/// The stream owns its sampler and counter; nothing it mutates is shared
/// with other streams. Dispatch failures and skipped events are reported to
/// the progress observer and never stop the loop.
pub struct StreamGenerator {
    category: EventCategory,
    quota: GenerationQuota,
    sampler: UrgencySampler,
    dispatcher: Arc<dyn Dispatcher>,
    progress: Arc<dyn ProgressObserver>,
    send_timeout: Option<Duration>,
    state: StreamState,
    counter: u64,
}

impl StreamGenerator {
    pub fn new(
        category: EventCategory,
        quota: GenerationQuota,
        sampler: UrgencySampler,
        dispatcher: Arc<dyn Dispatcher>,
        progress: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            category,
            quota,
            sampler,
            dispatcher,
            progress,
            send_timeout: None,
            state: StreamState::Idle,
            counter: 0,
        }
    }

    /// Upper bound on a single send, on top of whatever the dispatcher enforces.
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = Some(send_timeout);
        self
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub async fn run(&mut self) {
        if self.state != StreamState::Idle {
            warn!("Stream {} already started ({:?}), ignoring run", self.category, self.state);
            return;
        }
        self.state = StreamState::Running;
        info!(
            "Stream {} started: {} events, {:?} delay",
            self.category, self.quota.count, self.quota.delay
        );

        while self.counter < self.quota.count {
            self.counter += 1;
            self.generate_one().await;

            if !self.quota.delay.is_zero() {
                tokio::time::sleep(self.quota.delay).await;
            }
            self.progress.on_progress(self.category, self.counter);
        }

        self.state = StreamState::Completed;
        self.progress.on_completed(self.category, self.counter);
    }

    async fn generate_one(&mut self) {
        let urgency = self.sampler.draw(self.category);
        // Sampled levels are always in range today; a failed build only skips this event.
        let event = match EventDescriptor::build(self.category, urgency, Utc::now()) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping {} event #{}: {}", self.category, self.counter, e);
                self.progress.on_skipped(self.category);
                return;
            }
        };

        let outcome = match self.send_timeout {
            Some(limit) => match timeout(limit, self.dispatcher.send(&event)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(DispatchError::Timeout(limit)),
            },
            None => self.dispatcher.send(&event).await,
        };
        if let Err(e) = &outcome {
            warn!("Error making request for {} event {}: {}", self.category, event.id, e);
        }
        self.progress.on_dispatch(self.category, &outcome);
    }
}
