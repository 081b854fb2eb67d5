//! Comparative post-processing: rankings, overall scores, insights and tables.

/// Insight statements.
pub mod insights;
/// Cross-aspect ranking.
pub mod overall;
/// Per-aspect scoring and ranking.
pub mod ranking;
/// Tabular views for export.
pub mod tables;

use serde::Serialize;

use crate::{config::AnalysisConfig, store::OpinionStore};

pub use insights::{sample_std_dev, title_case, InsightGenerator, NO_DATA_INSIGHT};
pub use overall::{overall_rankings, OverallScore};
pub use ranking::{rank_providers, AspectRanking, AspectRankings, ProviderAspectScore};
pub use tables::{
    bucket_summaries, detailed_rows, summary_rows, BucketSummaryRow, ComparisonMatrix,
    DetailedRow, SummaryRow,
};

/// Everything derived from one opinion store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparativeReport {
    /// Per-aspect rankings.
    pub aspect_rankings: AspectRankings,
    /// Providers by dampened cross-aspect score.
    pub overall_rankings: Vec<OverallScore>,
    /// Readable statements; never empty when rankings are empty.
    pub insights: Vec<String>,
    /// Long-form ranking summary.
    pub summary: Vec<SummaryRow>,
    /// Provider × aspect score grid.
    pub matrix: ComparisonMatrix,
}

impl ComparativeReport {
    /// Whether there was nothing to rank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aspect_rankings.is_empty()
    }
}

/// Runs every comparative stage over `store`.
///
/// Calibration comes from `config`, and insight lines use its provider display
/// names. The store is only read.
#[must_use]
pub fn postprocess(store: &OpinionStore, config: &AnalysisConfig) -> ComparativeReport {
    let aspect_rankings = rank_providers(store);
    let overall_rankings =
        overall_rankings(&aspect_rankings, config.calibration.dampening_divisor);
    let insights = InsightGenerator::new(config.calibration.materiality_threshold)
        .with_display_names(config.providers.clone())
        .generate(&aspect_rankings);
    let summary = summary_rows(&aspect_rankings);
    let matrix = ComparisonMatrix::from_rankings(&aspect_rankings);
    ComparativeReport {
        aspect_rankings,
        overall_rankings,
        insights,
        summary,
        matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{OpinionRecord, SentimentLabel};

    #[test]
    fn empty_store_yields_fallback_only() {
        let report = postprocess(&OpinionStore::default(), &AnalysisConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.insights, [NO_DATA_INSIGHT]);
        assert!(report.summary.is_empty());
        assert!(report.matrix.is_empty());
        assert!(report.overall_rankings.is_empty());
    }

    #[test]
    fn report_bundles_all_views() {
        let config = AnalysisConfig::default();
        let mut store = OpinionStore::for_config(&config);
        for (provider, sentiment) in [
            ("AWS", SentimentLabel::Positive),
            ("AWS", SentimentLabel::Positive),
            ("Azure", SentimentLabel::Negative),
        ] {
            store
                .push(OpinionRecord {
                    sentence: format!("{provider} pricing"),
                    sentiment,
                    confidence: 0.9,
                    source: "r/Cloud - Post".into(),
                    url: String::new(),
                    provider: provider.into(),
                    aspect: "cost".into(),
                })
                .unwrap();
        }
        let report = postprocess(&store, &config);
        assert_eq!(report.aspect_rankings.len(), 5);
        assert_eq!(report.summary.len(), 30);
        assert_eq!(report.matrix.providers.len(), 6);
        assert_eq!(report.overall_rankings[0].provider, "AWS");
        assert_eq!(
            report.insights[0],
            "Cost: AWS leads with 100.0% positive sentiment vs Azure at 0.0%"
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["aspect_rankings"]["cost"]["best_provider"], "AWS");
    }
}
