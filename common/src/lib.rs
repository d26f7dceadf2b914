//! Shared event model for the synthetic-traffic generator: the closed
//! category set, urgency distributions, event descriptors and run config.

pub mod config;
pub mod distribution;
pub mod events;
pub mod types;

pub use config::{CategoryConfig, GenerationQuota, GeneratorConfig};
pub use distribution::{DistributionError, DistributionTable, UrgencyDistribution};
pub use events::{DescriptorError, EventDescriptor};
pub use types::{EventCategory, MAX_URGENCY, MIN_URGENCY};
