use std::collections::HashMap;

use crate::{error::ClassifyError, record::SentimentLabel};

use super::{Classification, SentimentClassifier};

const POSITIVE: &[(&str, f64)] = &[
    ("affordable", 0.7),
    ("amazing", 0.8),
    ("best", 0.7),
    ("better", 0.5),
    ("cheap", 0.5),
    ("easy", 0.5),
    ("efficient", 0.6),
    ("excellent", 0.8),
    ("fast", 0.6),
    ("good", 0.5),
    ("great", 0.7),
    ("helpful", 0.6),
    ("impressive", 0.7),
    ("love", 0.8),
    ("recommend", 0.6),
    ("reliable", 0.7),
    ("responsive", 0.6),
    ("robust", 0.6),
    ("scalable", 0.5),
    ("secure", 0.5),
    ("smooth", 0.5),
    ("solid", 0.5),
    ("stable", 0.5),
];

const NEGATIVE: &[(&str, f64)] = &[
    ("awful", -0.8),
    ("bad", -0.6),
    ("breach", -0.7),
    ("broken", -0.7),
    ("buggy", -0.6),
    ("confusing", -0.5),
    ("downtime", -0.6),
    ("expensive", -0.6),
    ("frustrating", -0.7),
    ("hate", -0.8),
    ("nightmare", -0.8),
    ("outage", -0.7),
    ("overpriced", -0.7),
    ("painful", -0.6),
    ("poor", -0.6),
    ("slow", -0.6),
    ("terrible", -0.8),
    ("unreliable", -0.7),
    ("useless", -0.8),
    ("vulnerable", -0.6),
    ("worse", -0.6),
    ("worst", -0.8),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "isn't", "isnt", "aren't", "arent", "wasn't", "wasnt", "don't", "dont",
    "doesn't", "doesnt", "didn't", "didnt", "won't", "wont", "can't", "cant", "cannot", "hardly",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("really", 1.4),
    ("extremely", 1.8),
    ("super", 1.5),
    ("incredibly", 1.7),
    ("quite", 1.2),
    ("somewhat", 0.7),
    ("slightly", 0.6),
];

/// Tokens after a negation that it still flips.
const NEGATION_WINDOW: usize = 3;

/// Word-polarity classifier for cloud-provider chatter.
///
/// Scores are summed per sentence with negation flipping and intensifier
/// scaling; the sign picks the label and the magnitude the confidence.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    neutral_band: f64,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    /// Creates the classifier with the built-in lexicon.
    #[must_use]
    pub fn new() -> Self {
        let words = POSITIVE
            .iter()
            .chain(NEGATIVE)
            .map(|(word, score)| ((*word).to_string(), *score))
            .collect();
        let intensifiers = INTENSIFIERS
            .iter()
            .map(|(word, factor)| ((*word).to_string(), *factor))
            .collect();
        Self {
            words,
            intensifiers,
            neutral_band: 0.05,
        }
    }

    /// Adds or overrides a word polarity.
    #[must_use]
    pub fn with_word(mut self, word: &str, score: f64) -> Self {
        self.words.insert(word.to_lowercase(), score);
        self
    }

    /// Raw polarity of `sentence`, unbounded.
    #[must_use]
    pub fn polarity(&self, sentence: &str) -> f64 {
        let tokens = tokenize(sentence);
        let mut total = 0.0;
        let mut negate_for = 0usize;
        let mut boost = 1.0;
        for token in &tokens {
            if NEGATIONS.contains(&token.as_str()) {
                negate_for = NEGATION_WINDOW;
                continue;
            }
            if let Some(factor) = self.intensifiers.get(token) {
                boost = *factor;
                continue;
            }
            if let Some(score) = self.words.get(token) {
                let signed = if negate_for > 0 { -score } else { *score };
                total += signed * boost;
            }
            boost = 1.0;
            negate_for = negate_for.saturating_sub(1);
        }
        total
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, sentence: &str) -> Result<Classification, ClassifyError> {
        let polarity = self.polarity(sentence);
        let label = if polarity > self.neutral_band {
            SentimentLabel::Positive
        } else if polarity < -self.neutral_band {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        let confidence = if label == SentimentLabel::Neutral {
            0.5
        } else {
            // Squash magnitude into (0.5, 1.0).
            0.5 + 0.5 * polarity.abs().tanh()
        };
        Ok(Classification::new(label, confidence))
    }
}

fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_polarity() {
        let classifier = LexiconClassifier::new();
        let positive = classifier.classify("AWS is fast and reliable.").unwrap();
        assert_eq!(positive.label, SentimentLabel::Positive);
        assert!(positive.confidence > 0.5);

        let negative = classifier.classify("Azure billing is a nightmare.").unwrap();
        assert_eq!(negative.label, SentimentLabel::Negative);

        let neutral = classifier.classify("GCP has a pricing page.").unwrap();
        assert_eq!(neutral.label, SentimentLabel::Neutral);
    }

    #[test]
    fn negation_flips_and_intensifiers_scale() {
        let classifier = LexiconClassifier::new();
        assert!(classifier.polarity("IBM Cloud is not cheap") < 0.0);
        let plain = classifier.polarity("AWS is slow");
        let boosted = classifier.polarity("AWS is extremely slow");
        assert!(boosted < plain);
    }

    #[test]
    fn custom_words_override_lexicon() {
        let classifier = LexiconClassifier::new().with_word("Pricey", -0.6);
        let result = classifier.classify("GCP is pricey").unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
    }
}
