//! Sentiment classifier contract and the adapter the pipeline calls through.

/// Rule-based fallback classifier.
pub mod lexicon;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{error::ClassifyError, extraction::truncate_chars, record::SentimentLabel};

pub use lexicon::LexiconClassifier;

/// Label and confidence for one sentence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    /// Sentiment label.
    pub label: SentimentLabel,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Classification {
    /// Creates a classification, clamping confidence into `[0, 1]`.
    #[must_use]
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { label, confidence }
    }

    /// Outcome recorded when the classifier fails.
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            label: SentimentLabel::Error,
            confidence: 0.0,
        }
    }
}

/// Raw score for one model label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelScore {
    /// Model label, e.g. `4 stars`.
    pub label: String,
    /// Probability assigned by the model.
    pub score: f64,
}

/// Picks the highest-scoring label from a full model distribution and maps it.
///
/// The first label wins on equal scores.
pub fn best_label(scores: &[LabelScore]) -> Result<Classification, ClassifyError> {
    let mut best: Option<&LabelScore> = None;
    for candidate in scores {
        if best.map_or(true, |current| candidate.score > current.score) {
            best = Some(candidate);
        }
    }
    let best = best.ok_or(ClassifyError::EmptyOutput)?;
    Ok(Classification::new(
        SentimentLabel::from_model_label(&best.label),
        best.score,
    ))
}

/// A sentence sentiment model.
pub trait SentimentClassifier: Send + Sync {
    /// Classifies one (already truncated) sentence.
    fn classify(&self, sentence: &str) -> Result<Classification, ClassifyError>;
}

impl<F> SentimentClassifier for F
where
    F: Fn(&str) -> Result<Classification, ClassifyError> + Send + Sync,
{
    fn classify(&self, sentence: &str) -> Result<Classification, ClassifyError> {
        self(sentence)
    }
}

/// Wraps a classifier with input truncation and failure mapping.
///
/// Never fails: a classifier error becomes [`Classification::failed`].
#[derive(Clone)]
pub struct ClassifierAdapter {
    inner: Arc<dyn SentimentClassifier>,
    max_chars: usize,
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("max_chars", &self.max_chars)
            .finish_non_exhaustive()
    }
}

impl ClassifierAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new(inner: Arc<dyn SentimentClassifier>, max_chars: usize) -> Self {
        Self {
            inner,
            max_chars: max_chars.max(1),
        }
    }

    /// Truncation limit in characters.
    #[must_use]
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Classifies `sentence`, returning the failure outcome on error.
    #[must_use]
    pub fn classify(&self, sentence: &str) -> Classification {
        self.try_classify(sentence)
            .unwrap_or_else(|_| Classification::failed())
    }

    /// Classifies `sentence`, surfacing the classifier error.
    pub fn try_classify(&self, sentence: &str) -> Result<Classification, ClassifyError> {
        let input = truncate_chars(sentence, self.max_chars);
        let result = self.inner.classify(input)?;
        Ok(Classification::new(result.label, result.confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn best_label_takes_maximum_score() {
        let scores = vec![
            LabelScore {
                label: "1 star".into(),
                score: 0.1,
            },
            LabelScore {
                label: "4 stars".into(),
                score: 0.6,
            },
            LabelScore {
                label: "5 stars".into(),
                score: 0.3,
            },
        ];
        let result = best_label(&scores).unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!((result.confidence - 0.6).abs() < 1e-12);
        assert!(matches!(best_label(&[]), Err(ClassifyError::EmptyOutput)));
    }

    #[test]
    fn adapter_maps_failures_to_error_label() {
        let failing = |_: &str| -> Result<Classification, ClassifyError> {
            Err(ClassifyError::Inference("model unavailable".into()))
        };
        let adapter = ClassifierAdapter::new(Arc::new(failing), 512);
        assert_eq!(adapter.classify("AWS is cheap."), Classification::failed());
        assert!(adapter.try_classify("AWS is cheap.").is_err());
    }

    #[test]
    fn adapter_truncates_before_classifying() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let recording = move |sentence: &str| -> Result<Classification, ClassifyError> {
            sink.lock().unwrap().push(sentence.chars().count());
            Ok(Classification::new(SentimentLabel::Neutral, 1.7))
        };
        let adapter = ClassifierAdapter::new(Arc::new(recording), 8);
        let result = adapter.classify(&"é".repeat(20));
        assert_eq!(*seen.lock().unwrap(), vec![8]);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }
}
