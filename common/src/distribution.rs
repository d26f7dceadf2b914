use crate::types::{EventCategory, MAX_URGENCY, MIN_URGENCY};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    #[error("urgency level {0} outside 1..=5")]
    InvalidLevel(u8),
    #[error("weight for urgency level {level} must be finite and non-negative, got {weight}")]
    InvalidWeight { level: u8, weight: f64 },
    #[error("distribution has {0} weights, at most 5 urgency levels exist")]
    TooManyLevels(usize),
    #[error("distribution has no entries")]
    Empty,
}

/// Discrete weights over urgency levels, walked in insertion order.
///
/// Weights are expected to sum to 1.0 but this is not enforced; the sampler
/// falls back to level 1 for any mass the table does not cover.
#[derive(Debug, Clone, PartialEq)]
pub struct UrgencyDistribution {
    entries: Vec<(u8, f64)>,
}

impl UrgencyDistribution {
    pub fn new(entries: Vec<(u8, f64)>) -> Result<Self, DistributionError> {
        if entries.is_empty() {
            return Err(DistributionError::Empty);
        }
        for &(level, weight) in &entries {
            if !(MIN_URGENCY..=MAX_URGENCY).contains(&level) {
                return Err(DistributionError::InvalidLevel(level));
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(DistributionError::InvalidWeight { level, weight });
            }
        }
        Ok(Self { entries })
    }

    /// Builds a distribution from one weight per level, starting at level 1.
    pub fn from_weights(weights: &[f64]) -> Result<Self, DistributionError> {
        if weights.len() > MAX_URGENCY as usize {
            return Err(DistributionError::TooManyLevels(weights.len()));
        }
        let entries = weights
            .iter()
            .enumerate()
            .map(|(idx, weight)| (idx as u8 + MIN_URGENCY, *weight))
            .collect();
        Self::new(entries)
    }

    pub fn entries(&self) -> &[(u8, f64)] {
        &self.entries
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }

    /// Reference weights for a category, levels 1 through 5.
    pub fn reference(category: EventCategory) -> Self {
        let weights: [f64; 5] = match category {
            EventCategory::Transaction => [0.05, 0.10, 0.15, 0.30, 0.40],
            EventCategory::Log => [0.40, 0.30, 0.15, 0.05, 0.10],
            EventCategory::Notification => [0.10, 0.20, 0.30, 0.30, 0.10],
            EventCategory::Command => [0.05, 0.15, 0.35, 0.35, 0.10],
            EventCategory::Query => [0.30, 0.30, 0.25, 0.10, 0.05],
        };
        Self {
            entries: weights
                .iter()
                .enumerate()
                .map(|(idx, weight)| (idx as u8 + MIN_URGENCY, *weight))
                .collect(),
        }
    }
}

/// Immutable category -> distribution lookup, built once at startup.
#[derive(Debug, Clone)]
pub struct DistributionTable {
    // Indexed by `EventCategory::code`, one entry per category.
    distributions: Vec<UrgencyDistribution>,
}

impl DistributionTable {
    /// Builds a table by asking `f` for each category in code order.
    pub fn from_fn(f: impl FnMut(EventCategory) -> UrgencyDistribution) -> Self {
        Self {
            distributions: EventCategory::ALL.into_iter().map(f).collect(),
        }
    }

    pub fn try_from_fn<E>(
        f: impl FnMut(EventCategory) -> Result<UrgencyDistribution, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            distributions: EventCategory::ALL
                .into_iter()
                .map(f)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn distribution_for(&self, category: EventCategory) -> &UrgencyDistribution {
        &self.distributions[category.code() as usize]
    }
}

impl Default for DistributionTable {
    fn default() -> Self {
        Self::from_fn(UrgencyDistribution::reference)
    }
}
