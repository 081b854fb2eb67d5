use indexmap::IndexMap;

use crate::comparative::ranking::AspectRankings;

/// Statement returned when there is nothing to compare.
pub const NO_DATA_INSIGHT: &str = "No data available for comparative analysis.";

/// Turns aspect rankings into readable comparative statements.
#[derive(Debug, Clone)]
pub struct InsightGenerator {
    materiality_threshold: f64,
    display_names: IndexMap<String, String>,
}

impl InsightGenerator {
    /// Creates a generator emitting per-aspect lines only for gaps above `materiality_threshold`.
    #[must_use]
    pub fn new(materiality_threshold: f64) -> Self {
        Self {
            materiality_threshold,
            display_names: IndexMap::new(),
        }
    }

    /// Names providers by display name instead of id.
    #[must_use]
    pub fn with_display_names(mut self, names: IndexMap<String, String>) -> Self {
        self.display_names = names;
        self
    }

    /// Builds the statements.
    ///
    /// Per-aspect lines come first in aspect order, followed by the most
    /// controversial aspect (largest sample standard deviation of provider
    /// scores, first aspect on ties). Empty rankings yield [`NO_DATA_INSIGHT`].
    #[must_use]
    pub fn generate(&self, rankings: &AspectRankings) -> Vec<String> {
        if rankings.is_empty() {
            return vec![NO_DATA_INSIGHT.to_string()];
        }
        let mut insights = Vec::new();
        for (aspect, ranking) in rankings {
            if ranking.len() < 2 {
                continue;
            }
            let (Some(best), Some(worst)) = (ranking.best_provider(), ranking.worst_provider())
            else {
                continue;
            };
            let (Some(best_score), Some(worst_score)) = (ranking.score(best), ranking.score(worst))
            else {
                continue;
            };
            let score_diff = best_score.sentiment_score - worst_score.sentiment_score;
            if score_diff > self.materiality_threshold {
                insights.push(format!(
                    "{}: {} leads with {} positive sentiment vs {} at {}",
                    title_case(aspect),
                    self.name(best),
                    percent(best_score.positive_ratio),
                    self.name(worst),
                    percent(worst_score.positive_ratio),
                ));
            }
        }

        let mut controversial: Option<(&str, f64)> = None;
        for (aspect, ranking) in rankings {
            let scores: Vec<f64> = ranking.ranked().map(|(_, s)| s.sentiment_score).collect();
            let Some(deviation) = sample_std_dev(&scores) else {
                continue;
            };
            if controversial.map_or(true, |(_, max)| deviation > max) {
                controversial = Some((aspect.as_str(), deviation));
            }
        }
        if let Some((aspect, _)) = controversial {
            insights.push(format!(
                "Most controversial aspect: {aspect} (highest sentiment variance)"
            ));
        }
        insights
    }

    fn name<'a>(&'a self, provider: &'a str) -> &'a str {
        self.display_names
            .get(provider)
            .map_or(provider, String::as_str)
    }
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(0.10)
    }
}

/// Sample standard deviation; `None` for fewer than two values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((squares / (n - 1.0)).sqrt())
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Capitalises the first letter of every word and lowercases the rest.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
