use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    record::{OpinionRecord, SentimentLabel},
    store::OpinionStore,
};

/// Sentiment statistics of one provider within one aspect.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ProviderAspectScore {
    /// `positive_ratio - negative_ratio`, in `[-1, 1]`.
    pub sentiment_score: f64,
    /// Share of Positive records.
    pub positive_ratio: f64,
    /// Share of Negative records.
    pub negative_ratio: f64,
    /// Records in the bucket, including Neutral and Error.
    pub total_opinions: usize,
    /// Mean confidence over the bucket.
    pub avg_confidence: f64,
}

impl ProviderAspectScore {
    /// Score of an empty bucket: neutral, not penalised.
    pub const ZERO: Self = Self {
        sentiment_score: 0.0,
        positive_ratio: 0.0,
        negative_ratio: 0.0,
        total_opinions: 0,
        avg_confidence: 0.0,
    };

    /// Computes the statistics of a bucket.
    ///
    /// Error and Neutral records count towards the total only.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records(records: &[OpinionRecord]) -> Self {
        if records.is_empty() {
            return Self::ZERO;
        }
        let mut positive = 0usize;
        let mut negative = 0usize;
        let mut confidence_sum = 0.0;
        for record in records {
            match record.sentiment {
                SentimentLabel::Positive => positive += 1,
                SentimentLabel::Negative => negative += 1,
                SentimentLabel::Neutral | SentimentLabel::Error => {}
            }
            confidence_sum += record.confidence;
        }
        let total = records.len() as f64;
        let positive_ratio = positive as f64 / total;
        let negative_ratio = negative as f64 / total;
        Self {
            sentiment_score: positive_ratio - negative_ratio,
            positive_ratio,
            negative_ratio,
            total_opinions: records.len(),
            avg_confidence: confidence_sum / total,
        }
    }
}

/// Providers of one aspect ordered by sentiment score.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AspectRanking {
    scores: IndexMap<String, ProviderAspectScore>,
    ranked: Vec<String>,
    best_provider: Option<String>,
    worst_provider: Option<String>,
}

impl AspectRanking {
    /// Ranks `scores` by sentiment score, descending.
    ///
    /// The sort is stable, so equal scores keep the order of `scores`.
    #[must_use]
    pub fn from_scores(scores: IndexMap<String, ProviderAspectScore>) -> Self {
        let mut ranked: Vec<(&String, f64)> = scores
            .iter()
            .map(|(provider, score)| (provider, score.sentiment_score))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let ranked: Vec<String> = ranked.into_iter().map(|(p, _)| p.clone()).collect();
        Self {
            best_provider: ranked.first().cloned(),
            worst_provider: ranked.last().cloned(),
            scores,
            ranked,
        }
    }

    /// Scores keyed by provider, in provider enumeration order.
    #[must_use]
    pub fn scores(&self) -> &IndexMap<String, ProviderAspectScore> {
        &self.scores
    }

    /// Score of one provider.
    #[must_use]
    pub fn score(&self, provider: &str) -> Option<&ProviderAspectScore> {
        self.scores.get(provider)
    }

    /// Providers best first.
    #[must_use]
    pub fn ranked_providers(&self) -> &[String] {
        &self.ranked
    }

    /// `(provider, score)` pairs best first.
    pub fn ranked(&self) -> impl Iterator<Item = (&str, &ProviderAspectScore)> + '_ {
        self.ranked
            .iter()
            .filter_map(|provider| Some((provider.as_str(), self.scores.get(provider)?)))
    }

    /// Highest-scoring provider; `None` without providers.
    #[must_use]
    pub fn best_provider(&self) -> Option<&str> {
        self.best_provider.as_deref()
    }

    /// Lowest-scoring provider; `None` without providers.
    #[must_use]
    pub fn worst_provider(&self) -> Option<&str> {
        self.worst_provider.as_deref()
    }

    /// Number of ranked providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Whether the aspect has no providers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Rankings keyed by aspect, in aspect order.
pub type AspectRankings = IndexMap<String, AspectRanking>;

/// Scores and ranks every provider for every aspect of `store`.
///
/// Returns an empty map when the store has no providers or no aspects.
/// Deterministic for a given store.
#[must_use]
pub fn rank_providers(store: &OpinionStore) -> AspectRankings {
    if !store.has_universe() {
        return AspectRankings::new();
    }
    store
        .aspects()
        .iter()
        .map(|aspect| {
            let scores = store
                .providers()
                .map(|provider| {
                    (
                        provider.to_string(),
                        ProviderAspectScore::from_records(store.bucket(provider, aspect)),
                    )
                })
                .collect();
            (aspect.clone(), AspectRanking::from_scores(scores))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn record(provider: &str, aspect: &str, sentiment: SentimentLabel, confidence: f64) -> OpinionRecord {
        OpinionRecord {
            sentence: format!("{provider} {aspect}"),
            sentiment,
            confidence,
            source: "r/Cloud - Comment".into(),
            url: String::new(),
            provider: provider.into(),
            aspect: aspect.into(),
        }
    }

    #[test]
    fn empty_bucket_is_neutral() {
        let store = OpinionStore::new(["AWS", "Azure"], ["cost"]);
        let rankings = rank_providers(&store);
        let score = rankings["cost"].score("AWS").unwrap();
        assert_eq!(*score, ProviderAspectScore::ZERO);
        assert_eq!(score.total_opinions, 0);
    }

    #[test]
    fn error_records_count_only_towards_total() {
        let records = vec![
            record("AWS", "cost", SentimentLabel::Positive, 0.9),
            record("AWS", "cost", SentimentLabel::Negative, 0.7),
            record("AWS", "cost", SentimentLabel::Error, 0.0),
            record("AWS", "cost", SentimentLabel::Positive, 0.8),
        ];
        let score = ProviderAspectScore::from_records(&records);
        assert_eq!(score.total_opinions, 4);
        assert!((score.positive_ratio - 0.5).abs() < 1e-12);
        assert!((score.negative_ratio - 0.25).abs() < 1e-12);
        assert!((score.sentiment_score - 0.25).abs() < 1e-12);
        assert!((score.avg_confidence - 0.6).abs() < 1e-12);
    }

    #[test]
    fn ranking_orders_by_score_with_stable_ties() {
        let mut store = OpinionStore::new(["AWS", "Azure", "GCP", "IBM Cloud"], ["support"]);
        store.push(record("AWS", "support", SentimentLabel::Positive, 0.9)).unwrap();
        store.push(record("Azure", "support", SentimentLabel::Negative, 0.9)).unwrap();
        store.push(record("IBM Cloud", "support", SentimentLabel::Positive, 0.6)).unwrap();

        let ranking = &rank_providers(&store)["support"];
        assert_eq!(ranking.ranked_providers(), ["AWS", "IBM Cloud", "GCP", "Azure"]);
        assert_eq!(ranking.best_provider(), Some("AWS"));
        assert_eq!(ranking.worst_provider(), Some("Azure"));
    }

    #[test]
    fn no_providers_means_no_rankings() {
        let store = OpinionStore::new(Vec::<String>::new(), ["cost"]);
        assert!(rank_providers(&store).is_empty());
        let ranking = AspectRanking::from_scores(IndexMap::new());
        assert!(ranking.best_provider().is_none());
        assert!(ranking.worst_provider().is_none());
    }

    #[test]
    fn randomized_stores_respect_score_bounds_and_order() {
        let providers = ["AWS", "Azure", "GCP", "IBM Cloud"];
        let aspects = ["cost", "security", "performance"];
        let labels = [
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
            SentimentLabel::Error,
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..25 {
            let mut store = OpinionStore::new(providers, aspects);
            for _ in 0..rng.gen_range(0..60) {
                let provider = providers[rng.gen_range(0..providers.len())];
                let aspect = aspects[rng.gen_range(0..aspects.len())];
                let label = labels[rng.gen_range(0..labels.len())];
                let confidence = if label == SentimentLabel::Error {
                    0.0
                } else {
                    rng.gen_range(0.0..=1.0)
                };
                store.push(record(provider, aspect, label, confidence)).unwrap();
            }
            for ranking in rank_providers(&store).values() {
                let ordered: Vec<f64> = ranking.ranked().map(|(_, s)| s.sentiment_score).collect();
                assert!(ordered.windows(2).all(|w| w[0] >= w[1]));
                for (_, score) in ranking.ranked() {
                    assert!((-1.0..=1.0).contains(&score.sentiment_score));
                    assert!((0.0..=1.0).contains(&score.positive_ratio));
                    assert!((0.0..=1.0).contains(&score.negative_ratio));
                    assert!(score.positive_ratio + score.negative_ratio <= 1.0 + 1e-12);
                    assert!((0.0..=1.0).contains(&score.avg_confidence));
                }
                let best = ranking.best_provider().unwrap();
                let best_score = ranking.score(best).unwrap().sentiment_score;
                assert!(ranking
                    .scores()
                    .values()
                    .all(|s| best_score >= s.sentiment_score));
            }
        }
    }
}
