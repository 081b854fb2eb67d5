use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{config::AnalysisConfig, error::PipelineError, record::OpinionRecord};

/// Classified records grouped by provider, then aspect.
///
/// Every provider owns a bucket for every aspect, so the provider set is
/// identical across aspects. Buckets only grow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OpinionStore {
    aspects: Vec<String>,
    buckets: IndexMap<String, IndexMap<String, Vec<OpinionRecord>>>,
}

impl OpinionStore {
    /// Creates empty buckets for every provider × aspect pair, in the given order.
    #[must_use]
    pub fn new<P, A>(providers: P, aspects: A) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let aspects: Vec<String> = aspects.into_iter().map(Into::into).collect();
        let buckets = providers
            .into_iter()
            .map(|provider| {
                let per_aspect = aspects
                    .iter()
                    .map(|aspect| (aspect.clone(), Vec::new()))
                    .collect();
                (provider.into(), per_aspect)
            })
            .collect();
        Self { aspects, buckets }
    }

    /// Creates empty buckets for the configured universe.
    #[must_use]
    pub fn for_config(config: &AnalysisConfig) -> Self {
        Self::new(config.providers.keys().cloned(), config.aspects.keys().cloned())
    }

    /// Files `record` under its own provider and aspect.
    pub fn push(&mut self, record: OpinionRecord) -> Result<(), PipelineError> {
        let per_aspect = self
            .buckets
            .get_mut(&record.provider)
            .ok_or_else(|| PipelineError::UnknownProvider(record.provider.clone()))?;
        let bucket = per_aspect
            .get_mut(&record.aspect)
            .ok_or_else(|| PipelineError::UnknownAspect(record.aspect.clone()))?;
        bucket.push(record);
        Ok(())
    }

    /// Provider ids in insertion order.
    pub fn providers(&self) -> impl Iterator<Item = &str> + '_ {
        self.buckets.keys().map(String::as_str)
    }

    /// Aspect names in insertion order.
    #[must_use]
    pub fn aspects(&self) -> &[String] {
        &self.aspects
    }

    /// Records of one bucket; empty for unknown pairs.
    #[must_use]
    pub fn bucket(&self, provider: &str, aspect: &str) -> &[OpinionRecord] {
        self.buckets
            .get(provider)
            .and_then(|per_aspect| per_aspect.get(aspect))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All records, provider-major then aspect, in append order.
    pub fn records(&self) -> impl Iterator<Item = &OpinionRecord> + '_ {
        self.buckets
            .values()
            .flat_map(|per_aspect| per_aspect.values().flatten())
    }

    /// Total records across buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(IndexMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Whether no record has been filed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the store has no providers or no aspects to rank.
    #[must_use]
    pub fn has_universe(&self) -> bool {
        !self.buckets.is_empty() && !self.aspects.is_empty()
    }
}
