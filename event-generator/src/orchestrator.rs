//! Launches one stream per category and waits for all of them.

use crate::dispatch::Dispatcher;
use crate::progress::ProgressObserver;
use crate::sampler::UrgencySampler;
use crate::stream::StreamGenerator;
use common::{DistributionTable, EventCategory, GenerationQuota, GeneratorConfig};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub struct StreamOrchestrator {
    table: Arc<DistributionTable>,
    quotas: BTreeMap<EventCategory, GenerationQuota>,
    dispatcher: Arc<dyn Dispatcher>,
    progress: Arc<dyn ProgressObserver>,
    run_seed: u64,
    send_timeout: Option<Duration>,
}

impl StreamOrchestrator {
    pub fn new(
        table: Arc<DistributionTable>,
        quotas: BTreeMap<EventCategory, GenerationQuota>,
        dispatcher: Arc<dyn Dispatcher>,
        progress: Arc<dyn ProgressObserver>,
        run_seed: u64,
    ) -> Self {
        Self {
            table,
            quotas,
            dispatcher,
            progress,
            run_seed,
            send_timeout: None,
        }
    }

    pub fn from_config(
        config: &GeneratorConfig,
        dispatcher: Arc<dyn Dispatcher>,
        progress: Arc<dyn ProgressObserver>,
        run_seed: u64,
    ) -> anyhow::Result<Self> {
        let table = Arc::new(config.distribution_table()?);
        let quotas = EventCategory::ALL
            .into_iter()
            .map(|category| (category, config.quota_for(category)))
            .collect();
        Ok(Self::new(table, quotas, dispatcher, progress, run_seed)
            .with_send_timeout(config.timeout()))
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = Some(send_timeout);
        self
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    fn stream_for(&self, category: EventCategory, quota: GenerationQuota) -> StreamGenerator {
        let sampler = UrgencySampler::seeded(self.table.clone(), self.run_seed, category);
        let stream = StreamGenerator::new(
            category,
            quota,
            sampler,
            self.dispatcher.clone(),
            self.progress.clone(),
        );
        match self.send_timeout {
            Some(limit) => stream.with_send_timeout(limit),
            None => stream,
        }
    }

    /// Runs one concurrent stream per distinct category and returns once every
    /// stream has completed. There is no cancellation path.
    pub async fn run_all(&self, categories: &[EventCategory]) {
        let categories: BTreeSet<EventCategory> = categories.iter().copied().collect();
        info!("Starting {} streams with seed {}", categories.len(), self.run_seed);

        let mut handles = Vec::with_capacity(categories.len());
        for category in categories {
            let Some(quota) = self.quotas.get(&category).copied() else {
                error!("No quota configured for {}, stream not started", category);
                continue;
            };
            let mut stream = self.stream_for(category, quota);
            handles.push(tokio::spawn(async move {
                stream.run().await;
                (stream.category(), stream.counter())
            }));
        }

        for result in join_all(handles).await {
            match result {
                Ok((category, count)) => {
                    info!("Stream {} finished with {} events", category, count)
                }
                Err(e) => error!("Stream task failed: {}", e),
            }
        }
        info!("All streams completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchError;
    use crate::progress::RunStats;
    use async_trait::async_trait;
    use common::EventDescriptor;

    struct Accepting;

    #[async_trait]
    impl Dispatcher for Accepting {
        async fn send(&self, _event: &EventDescriptor) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_duplicate_categories_run_once() {
        let mut config = GeneratorConfig::default();
        config.set_count(7);
        let stats = Arc::new(RunStats::new());
        let orchestrator =
            StreamOrchestrator::from_config(&config, Arc::new(Accepting), stats.clone(), 3)
                .unwrap();

        orchestrator
            .run_all(&[EventCategory::Log, EventCategory::Log, EventCategory::Query])
            .await;

        assert_eq!(stats.snapshot(EventCategory::Log).sent, 7);
        assert_eq!(stats.snapshot(EventCategory::Query).sent, 7);
        assert_eq!(stats.snapshot(EventCategory::Command).generated, 0);
    }

    #[tokio::test]
    async fn test_missing_quota_skips_stream() {
        let stats = Arc::new(RunStats::new());
        let mut quotas = BTreeMap::new();
        quotas.insert(
            EventCategory::Command,
            GenerationQuota {
                count: 2,
                delay: Duration::ZERO,
            },
        );
        let orchestrator = StreamOrchestrator::new(
            Arc::new(DistributionTable::default()),
            quotas,
            Arc::new(Accepting),
            stats.clone(),
            0,
        );

        orchestrator.run_all(&EventCategory::ALL).await;

        assert_eq!(stats.snapshot(EventCategory::Command).sent, 2);
        assert_eq!(stats.snapshot(EventCategory::Transaction).generated, 0);
    }
}
