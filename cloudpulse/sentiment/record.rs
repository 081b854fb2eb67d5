use serde::{Deserialize, Serialize};

/// Discrete sentiment assigned to a sentence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    /// Favourable opinion.
    Positive,
    /// Unfavourable opinion.
    Negative,
    /// Neither, or a middle rating.
    Neutral,
    /// The classifier could not score the sentence.
    Error,
}

impl SentimentLabel {
    /// Maps a raw model label onto the four-way taxonomy.
    ///
    /// Binary (`POSITIVE`/`NEGATIVE`), star-rating (`1 star` .. `5 stars`)
    /// and indexed (`LABEL_0`/`LABEL_2`) heads are recognised; every other
    /// label, including `3 stars` and `LABEL_1`, is neutral.
    #[must_use]
    pub fn from_model_label(label: &str) -> Self {
        match label {
            "POSITIVE" | "4 stars" | "5 stars" | "LABEL_2" => Self::Positive,
            "NEGATIVE" | "1 star" | "2 stars" | "LABEL_0" => Self::Negative,
            _ => Self::Neutral,
        }
    }

    /// Returns the label text used in exports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Error => "Error",
        }
    }
}

/// One classified sentence, filed under the (provider, aspect) pair it was extracted for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpinionRecord {
    /// Sentence text as extracted.
    pub sentence: String,
    /// Classified sentiment.
    pub sentiment: SentimentLabel,
    /// Classifier confidence in `[0, 1]`; `0.0` when classification failed.
    pub confidence: f64,
    /// Origin tag, e.g. `r/Cloud - Comment`.
    pub source: String,
    /// Link to the originating post.
    pub url: String,
    /// Provider id.
    pub provider: String,
    /// Aspect name.
    pub aspect: String,
}

/// Whether a unit is a top-level post or a reply.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Top-level submission.
    #[default]
    Post,
    /// Reply under a post.
    Comment,
}

/// A post or comment handed to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Post or comment; posts when omitted.
    #[serde(default)]
    pub kind: UnitKind,
    /// Body text; `None` is treated as empty.
    #[serde(default)]
    pub text: Option<String>,
    /// Origin tag copied onto every record.
    pub source: String,
    /// Link copied onto every record.
    #[serde(default)]
    pub url: String,
}

impl SourceUnit {
    /// Creates a unit.
    #[must_use]
    pub fn new(text: impl Into<String>, source: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Post,
            text: Some(text.into()),
            source: source.into(),
            url: url.into(),
        }
    }

    /// Marks the unit as `kind`.
    #[must_use]
    pub const fn with_kind(mut self, kind: UnitKind) -> Self {
        self.kind = kind;
        self
    }

    /// Body text, empty when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_model_labels() {
        assert_eq!(SentimentLabel::from_model_label("5 stars"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_model_label("LABEL_0"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_model_label("1 star"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_model_label("3 stars"), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_model_label("positive"), SentimentLabel::Neutral);
    }

    #[test]
    fn missing_text_reads_as_empty() {
        let unit: SourceUnit = serde_json::from_str(r#"{"source":"r/Cloud - Post"}"#).unwrap();
        assert_eq!(unit.text(), "");
        assert!(unit.url.is_empty());
        assert_eq!(unit.kind, UnitKind::Post);

        let unit: SourceUnit =
            serde_json::from_str(r#"{"kind":"comment","text":"hi","source":"r/aws - Comment"}"#)
                .unwrap();
        assert_eq!(unit.kind, UnitKind::Comment);
    }
}
