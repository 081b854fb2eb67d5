use serde::Serialize;

use crate::{
    comparative::ranking::AspectRankings,
    extraction::truncate_chars,
    record::SentimentLabel,
    store::OpinionStore,
};

/// One (aspect, provider) row of the long-form ranking summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryRow {
    /// Aspect name.
    pub aspect: String,
    /// Provider id.
    pub provider: String,
    /// 1-based position within the aspect.
    pub rank: usize,
    /// `positive_ratio - negative_ratio`.
    pub sentiment_score: f64,
    /// Share of Positive records.
    pub positive_ratio: f64,
    /// Share of Negative records.
    pub negative_ratio: f64,
    /// Records in the bucket.
    pub total_opinions: usize,
    /// Mean confidence.
    pub avg_confidence: f64,
    /// Ranked first.
    pub is_best: bool,
    /// Ranked last.
    pub is_worst: bool,
}

/// Builds one row per (aspect, provider), aspects in order, providers best first.
#[must_use]
pub fn summary_rows(rankings: &AspectRankings) -> Vec<SummaryRow> {
    let mut rows = Vec::new();
    for (aspect, ranking) in rankings {
        let count = ranking.len();
        for (idx, (provider, score)) in ranking.ranked().enumerate() {
            let rank = idx + 1;
            rows.push(SummaryRow {
                aspect: aspect.clone(),
                provider: provider.to_string(),
                rank,
                sentiment_score: score.sentiment_score,
                positive_ratio: score.positive_ratio,
                negative_ratio: score.negative_ratio,
                total_opinions: score.total_opinions,
                avg_confidence: score.avg_confidence,
                is_best: rank == 1,
                is_worst: rank == count,
            });
        }
    }
    rows
}

/// Provider × aspect grid of sentiment scores.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ComparisonMatrix {
    /// Row labels.
    pub providers: Vec<String>,
    /// Column labels.
    pub aspects: Vec<String>,
    /// `cells[row][column]`.
    pub cells: Vec<Vec<f64>>,
}

impl ComparisonMatrix {
    /// Builds the grid from the providers of the first aspect.
    ///
    /// # Panics
    ///
    /// Every aspect must rank the same providers. Rankings produced by
    /// [`rank_providers`](crate::comparative::rank_providers) always do; hand-built
    /// rankings that miss a provider in a later aspect panic.
    #[must_use]
    pub fn from_rankings(rankings: &AspectRankings) -> Self {
        let Some((_, first)) = rankings.first() else {
            return Self::default();
        };
        let providers: Vec<String> = first.scores().keys().cloned().collect();
        let aspects: Vec<String> = rankings.keys().cloned().collect();
        let cells = providers
            .iter()
            .map(|provider| {
                rankings
                    .values()
                    .map(|ranking| ranking.scores()[provider.as_str()].sentiment_score)
                    .collect()
            })
            .collect();
        Self {
            providers,
            aspects,
            cells,
        }
    }

    /// Score at (provider, aspect).
    #[must_use]
    pub fn get(&self, provider: &str, aspect: &str) -> Option<f64> {
        let row = self.providers.iter().position(|p| p == provider)?;
        let column = self.aspects.iter().position(|a| a == aspect)?;
        self.cells.get(row)?.get(column).copied()
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty() || self.aspects.is_empty()
    }
}

/// Label counts of one non-empty bucket.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BucketSummaryRow {
    /// Provider id.
    pub provider: String,
    /// Aspect name.
    pub aspect: String,
    /// Records in the bucket.
    pub total: usize,
    /// Positive records.
    pub positive: usize,
    /// Negative records.
    pub negative: usize,
    /// Neutral records.
    pub neutral: usize,
    /// Positive share in percent.
    pub positive_pct: f64,
    /// Negative share in percent.
    pub negative_pct: f64,
    /// Neutral share in percent.
    pub neutral_pct: f64,
    /// Mean confidence.
    pub avg_confidence: f64,
}

/// Per-bucket label counts, provider-major; empty buckets are skipped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bucket_summaries(store: &OpinionStore) -> Vec<BucketSummaryRow> {
    let mut rows = Vec::new();
    for provider in store.providers() {
        for aspect in store.aspects() {
            let records = store.bucket(provider, aspect);
            if records.is_empty() {
                continue;
            }
            let count = |label: SentimentLabel| records.iter().filter(|r| r.sentiment == label).count();
            let (positive, negative, neutral) = (
                count(SentimentLabel::Positive),
                count(SentimentLabel::Negative),
                count(SentimentLabel::Neutral),
            );
            let total = records.len();
            let pct = |n: usize| n as f64 / total as f64 * 100.0;
            rows.push(BucketSummaryRow {
                provider: provider.to_string(),
                aspect: aspect.clone(),
                total,
                positive,
                negative,
                neutral,
                positive_pct: pct(positive),
                negative_pct: pct(negative),
                neutral_pct: pct(neutral),
                avg_confidence: records.iter().map(|r| r.confidence).sum::<f64>() / total as f64,
            });
        }
    }
    rows
}

/// Flattened record for display and export.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DetailedRow {
    /// Provider id.
    pub provider: String,
    /// Aspect name.
    pub aspect: String,
    /// Sentiment label.
    pub sentiment: SentimentLabel,
    /// Classifier confidence.
    pub confidence: f64,
    /// Sentence cut to the preview length.
    pub sentence: String,
    /// Origin tag.
    pub source: String,
    /// Link.
    pub url: String,
}

/// One row per stored record, sentences cut to `preview_chars`.
#[must_use]
pub fn detailed_rows(store: &OpinionStore, preview_chars: usize) -> Vec<DetailedRow> {
    store
        .records()
        .map(|record| DetailedRow {
            provider: record.provider.clone(),
            aspect: record.aspect.clone(),
            sentiment: record.sentiment,
            confidence: record.confidence,
            sentence: truncate_chars(&record.sentence, preview_chars).to_string(),
            source: record.source.clone(),
            url: record.url.clone(),
        })
        .collect()
}
