use crate::distribution::{DistributionError, DistributionTable, UrgencyDistribution};
use crate::types::EventCategory;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8181/event";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_EVENT_COUNT: u64 = 100_000;
pub const DEFAULT_LOG_EVERY: u64 = 1_000;

/// How many events a stream emits and how long it pauses after each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationQuota {
    pub count: u64,
    pub delay: Duration,
}

/// Per-category section of the generator config.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub count: u64,
    pub delay_ms: u64,
    /// Weights for urgency levels 1..=5, in order. Falls back to the reference table.
    pub urgency_weights: Option<Vec<f64>>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_EVENT_COUNT,
            delay_ms: 0,
            urgency_weights: None,
        }
    }
}

/// Generator configuration, loaded from `generator.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Fixed run seed; a time-derived one is used when absent.
    pub seed: Option<u64>,
    pub log_every: u64,
    /// Keyed by lowercase category name.
    pub categories: BTreeMap<String, CategoryConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            seed: None,
            log_every: DEFAULT_LOG_EVERY,
            categories: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Reads and validates a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read generator config: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid generator config: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).context("Failed to parse generator config")?;

        // Canonicalise category keys so lookups by `EventCategory::as_str` hit.
        let mut categories = BTreeMap::new();
        for (name, section) in std::mem::take(&mut config.categories) {
            let category: EventCategory = name.parse()?;
            if categories.insert(category.as_str().to_string(), section).is_some() {
                anyhow::bail!("Category {} configured more than once", category);
            }
        }
        config.categories = categories;

        config
            .distribution_table()
            .context("Invalid urgency weights")?;
        Ok(config)
    }

    pub fn category(&self, category: EventCategory) -> CategoryConfig {
        self.categories
            .get(category.as_str())
            .cloned()
            .unwrap_or_default()
    }

    pub fn quota_for(&self, category: EventCategory) -> GenerationQuota {
        let section = self.category(category);
        GenerationQuota {
            count: section.count,
            delay: Duration::from_millis(section.delay_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Overrides the event count of every category.
    pub fn set_count(&mut self, count: u64) {
        for category in EventCategory::ALL {
            self.section_mut(category).count = count;
        }
    }

    /// Overrides the inter-event delay of every category.
    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        for category in EventCategory::ALL {
            self.section_mut(category).delay_ms = delay_ms;
        }
    }

    fn section_mut(&mut self, category: EventCategory) -> &mut CategoryConfig {
        self.categories
            .entry(category.as_str().to_string())
            .or_default()
    }

    pub fn distribution_table(&self) -> Result<DistributionTable, DistributionError> {
        DistributionTable::try_from_fn(|category| match self.category(category).urgency_weights {
            Some(weights) => UrgencyDistribution::from_weights(&weights),
            None => Ok(UrgencyDistribution::reference(category)),
        })
    }

    pub fn debug_print(&self) {
        println!("=== Generator Configuration ===");
        println!("Endpoint: {} (timeout {} ms)", self.endpoint, self.timeout_ms);
        match self.seed {
            Some(seed) => println!("Seed: {}", seed),
            None => println!("Seed: time-derived"),
        }
        for category in EventCategory::ALL {
            let section = self.category(category);
            println!(
                "  {:<12} count={} delay={}ms weights={}",
                category.as_str(),
                section.count,
                section.delay_ms,
                match &section.urgency_weights {
                    Some(weights) => format!("{:?}", weights),
                    None => "reference".to_string(),
                }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = GeneratorConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        for category in EventCategory::ALL {
            let quota = config.quota_for(category);
            assert_eq!(quota.count, DEFAULT_EVENT_COUNT);
            assert_eq!(quota.delay, Duration::ZERO);
        }
    }

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
endpoint = "http://10.0.0.5:8181/event"
seed = 7

[categories.Transaction]
count = 5
delay_ms = 250
urgency_weights = [0.2, 0.2, 0.2, 0.2, 0.2]

[categories.log]
count = 12
"#
        )
        .unwrap();

        let config = GeneratorConfig::load(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://10.0.0.5:8181/event");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);

        let quota = config.quota_for(EventCategory::Transaction);
        assert_eq!(quota.count, 5);
        assert_eq!(quota.delay, Duration::from_millis(250));
        assert_eq!(config.quota_for(EventCategory::Log).count, 12);
        assert_eq!(config.quota_for(EventCategory::Query).count, DEFAULT_EVENT_COUNT);

        let table = config.distribution_table().unwrap();
        assert_eq!(
            table.distribution_for(EventCategory::Transaction).entries()[0],
            (1, 0.2)
        );
        assert_eq!(
            table.distribution_for(EventCategory::Query),
            &UrgencyDistribution::reference(EventCategory::Query)
        );
    }

    #[test]
    fn test_rejects_unknown_category() {
        let err = GeneratorConfig::parse("[categories.metric]\ncount = 1\n").unwrap_err();
        assert!(format!("{:#}", err).contains("metric"));
    }

    #[test]
    fn test_rejects_negative_weights() {
        let err = GeneratorConfig::parse(
            "[categories.query]\nurgency_weights = [0.5, -0.5]\n",
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("urgency"));
    }

    #[test]
    fn test_overrides_apply_to_every_category() {
        let mut config = GeneratorConfig::parse("[categories.command]\ncount = 3\n").unwrap();
        config.set_count(42);
        config.set_delay_ms(10);
        for category in EventCategory::ALL {
            assert_eq!(config.quota_for(category).count, 42);
            assert_eq!(config.quota_for(category).delay, Duration::from_millis(10));
        }
    }
}
