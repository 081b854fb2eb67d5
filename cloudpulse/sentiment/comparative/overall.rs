use std::cmp::Ordering;

use serde::Serialize;

use crate::comparative::ranking::AspectRankings;

/// Cross-aspect standing of one provider.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverallScore {
    /// Provider id.
    pub provider: String,
    /// Dampened mean aspect score; the ranking key.
    pub score: f64,
    /// Undampened mean of the aspect scores.
    pub mean_score: f64,
    /// Opinions summed over all aspects.
    pub total_opinions: usize,
}

/// Ranks providers by mean aspect score scaled by `min(1, opinions / dampening_divisor)`.
///
/// Providers come from the first aspect; an aspect with no opinions for a
/// provider contributes `0.0` to its mean. Empty input yields an empty list.
/// Equal scores keep provider order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overall_rankings(rankings: &AspectRankings, dampening_divisor: f64) -> Vec<OverallScore> {
    let Some((_, first)) = rankings.first() else {
        return Vec::new();
    };
    let mut overall: Vec<OverallScore> = first
        .scores()
        .keys()
        .map(|provider| {
            let mut sum = 0.0;
            let mut aspects = 0usize;
            let mut total_opinions = 0usize;
            for ranking in rankings.values() {
                if let Some(score) = ranking.score(provider) {
                    sum += score.sentiment_score;
                    aspects += 1;
                    total_opinions += score.total_opinions;
                }
            }
            let mean_score = if aspects == 0 { 0.0 } else { sum / aspects as f64 };
            let dampening = (total_opinions as f64 / dampening_divisor).min(1.0);
            OverallScore {
                provider: provider.clone(),
                score: mean_score * dampening,
                mean_score,
                total_opinions,
            }
        })
        .collect();
    overall.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    overall
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        comparative::ranking::rank_providers,
        record::{OpinionRecord, SentimentLabel},
        store::OpinionStore,
    };

    fn push(store: &mut OpinionStore, provider: &str, aspect: &str, label: SentimentLabel, n: usize) {
        for _ in 0..n {
            store
                .push(OpinionRecord {
                    sentence: format!("{provider} on {aspect}"),
                    sentiment: label,
                    confidence: 0.8,
                    source: "r/Cloud - Post".into(),
                    url: String::new(),
                    provider: provider.into(),
                    aspect: aspect.into(),
                })
                .unwrap();
        }
    }

    #[test]
    fn sparse_data_is_dampened() {
        let mut store = OpinionStore::new(["AWS"], ["cost", "support"]);
        // cost: 25 records, score 1.0; support: 25 records, score 0.6.
        push(&mut store, "AWS", "cost", SentimentLabel::Positive, 25);
        push(&mut store, "AWS", "support", SentimentLabel::Positive, 20);
        push(&mut store, "AWS", "support", SentimentLabel::Negative, 5);

        let overall = overall_rankings(&rank_providers(&store), 100.0);
        assert_eq!(overall.len(), 1);
        assert_eq!(overall[0].total_opinions, 50);
        assert!((overall[0].mean_score - 0.8).abs() < 1e-12);
        assert!((overall[0].score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn dense_data_is_not_amplified() {
        let mut store = OpinionStore::new(["AWS", "Azure"], ["cost"]);
        push(&mut store, "AWS", "cost", SentimentLabel::Positive, 150);
        push(&mut store, "Azure", "cost", SentimentLabel::Positive, 10);

        let overall = overall_rankings(&rank_providers(&store), 100.0);
        assert_eq!(overall[0].provider, "AWS");
        assert!((overall[0].score - 1.0).abs() < 1e-12);
        assert!((overall[1].score - 0.1).abs() < 1e-12);
    }

    #[test]
    fn ties_and_empty_input() {
        let store = OpinionStore::new(["GCP", "AWS"], ["cost"]);
        let overall = overall_rankings(&rank_providers(&store), 100.0);
        let order: Vec<_> = overall.iter().map(|o| o.provider.as_str()).collect();
        assert_eq!(order, ["GCP", "AWS"]);
        assert!(overall_rankings(&AspectRankings::new(), 100.0).is_empty());
    }
}
