//! Relevance extraction: provider- and aspect-relevant sentences from raw text.

/// Whole-word matching and truncation helpers.
pub mod helper;
/// Sentence boundary detection.
pub mod segment;

use regex::Regex;

use crate::{config::AnalysisConfig, error::ConfigError};

pub use helper::{contains_whole_word, truncate_chars, whole_word};
pub use segment::split_sentences;

/// Returns the sentences of `text` that name `provider` and at least one of
/// `keywords`, both as whole words, ignoring case.
///
/// Empty text yields nothing. A term that cannot be compiled never matches.
#[must_use]
pub fn extract<K: AsRef<str>>(text: &str, provider: &str, keywords: &[K]) -> Vec<String> {
    let Ok(provider_re) = whole_word(provider) else {
        return Vec::new();
    };
    let keyword_res: Vec<Regex> = keywords
        .iter()
        .filter_map(|kw| whole_word(kw.as_ref()).ok())
        .collect();
    split_sentences(text)
        .into_iter()
        .filter(|sentence| {
            provider_re.is_match(sentence) && keyword_res.iter().any(|re| re.is_match(sentence))
        })
        .collect()
}

/// Pre-compiled matcher for one provider/keyword-set pair.
#[derive(Debug, Clone)]
pub struct RelevanceMatcher {
    provider: Regex,
    keywords: Vec<Regex>,
}

impl RelevanceMatcher {
    /// Compiles the matcher.
    pub fn new<K: AsRef<str>>(provider: &str, keywords: &[K]) -> Result<Self, ConfigError> {
        Ok(Self {
            provider: whole_word(provider)?,
            keywords: keywords
                .iter()
                .map(|kw| whole_word(kw.as_ref()))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Whether `sentence` names the provider and one of the keywords.
    #[must_use]
    pub fn is_relevant(&self, sentence: &str) -> bool {
        self.provider.is_match(sentence) && self.keywords.iter().any(|re| re.is_match(sentence))
    }
}

/// Sentence found relevant to one (provider, aspect) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevantSentence<'a> {
    /// Provider id.
    pub provider: &'a str,
    /// Aspect name.
    pub aspect: &'a str,
    /// Sentence text.
    pub sentence: String,
}

/// Matchers for every provider × aspect pair of a configuration.
#[derive(Debug, Clone)]
pub struct RelevanceIndex {
    pairs: Vec<(String, String, RelevanceMatcher)>,
}

impl RelevanceIndex {
    /// Compiles matchers for the configured universe, matching on display names.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        let mut pairs = Vec::with_capacity(config.providers.len() * config.aspects.len());
        for (provider, display) in &config.providers {
            for (aspect, keywords) in &config.aspects {
                pairs.push((
                    provider.clone(),
                    aspect.clone(),
                    RelevanceMatcher::new(display, keywords.as_slice())?,
                ));
            }
        }
        Ok(Self { pairs })
    }

    /// Number of (provider, aspect) pairs scanned per text.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Scans `text` once per pair.
    ///
    /// Results are ordered provider, then aspect, then sentence position. A
    /// sentence relevant to several pairs is returned once per pair.
    #[must_use]
    pub fn scan(&self, text: &str) -> Vec<RelevantSentence<'_>> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }
        let mut found = Vec::new();
        for (provider, aspect, matcher) in &self.pairs {
            for sentence in &sentences {
                if matcher.is_relevant(sentence) {
                    found.push(RelevantSentence {
                        provider,
                        aspect,
                        sentence: sentence.clone(),
                    });
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_requires_provider_and_keyword() {
        assert!(extract("mainframe is nice", "AI", &["nice"]).is_empty());
        assert_eq!(
            extract("AI is powerful", "AI", &["powerful"]),
            ["AI is powerful"]
        );
        let text = "AWS pricing is wild. Azure is fine. AWS rocks.";
        assert_eq!(
            extract(text, "aws", &["price", "pricing"]),
            ["AWS pricing is wild."]
        );
    }

    #[test]
    fn extract_reads_across_line_breaks() {
        assert_eq!(
            extract("I moved to AWS\npricing is great there", "AWS", &["pricing"]),
            ["I moved to AWS pricing is great there"]
        );
    }

    #[test]
    fn extract_on_empty_text_is_empty() {
        assert!(extract("", "AWS", &["cost"]).is_empty());
    }

    #[test]
    fn index_duplicates_sentences_across_pairs() {
        let config = AnalysisConfig::from_parts(
            ["AWS", "Azure"],
            [
                ("cost".to_string(), vec!["cheap"]),
                ("performance".to_string(), vec!["fast"]),
            ],
        );
        let index = RelevanceIndex::from_config(&config).unwrap();
        assert_eq!(index.pair_count(), 4);
        let found = index.scan("AWS is cheap and fast. Azure is cheap. Nothing else.");
        let pairs: Vec<_> = found.iter().map(|r| (r.provider, r.aspect)).collect();
        assert_eq!(
            pairs,
            [("AWS", "cost"), ("AWS", "performance"), ("Azure", "cost")]
        );
        assert_eq!(found[0].sentence, found[1].sentence);
        assert_eq!(found[2].sentence, "Azure is cheap.");
    }

    #[test]
    fn index_matches_display_names() {
        let mut config = AnalysisConfig::from_parts(
            Vec::<String>::new(),
            [("support".to_string(), vec!["documentation"])],
        );
        config.providers.insert("gcp".into(), "Google Cloud".into());
        let index = RelevanceIndex::from_config(&config).unwrap();
        let found = index.scan("Google Cloud documentation is thorough.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].provider, "gcp");
    }
}
