use std::{fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable constants of the comparative stage.
///
/// Both defaults reproduce the historical behaviour; they are calibration
/// knobs, not invariants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Calibration {
    /// Minimum best-vs-worst score gap before an aspect earns an insight line.
    pub materiality_threshold: f64,
    /// Opinion count at which the overall score stops being dampened.
    pub dampening_divisor: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            materiality_threshold: 0.10,
            dampening_divisor: 100.0,
        }
    }
}

/// Classifier adapter settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Sentences are cut to this many characters before classification.
    pub max_chars: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self { max_chars: 512 }
    }
}

/// Display settings for flattened exports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportSettings {
    /// Sentence preview length in detailed rows.
    pub sentence_preview_chars: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sentence_preview_chars: 200,
        }
    }
}

/// Provider/aspect universe plus calibration for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Provider id → name matched in text, in ranking tie-break order.
    pub providers: IndexMap<String, String>,
    /// Aspect → keywords, in report order.
    pub aspects: IndexMap<String, Vec<String>>,
    /// Comparative stage constants.
    pub calibration: Calibration,
    /// Classifier adapter settings.
    pub classifier: ClassifierSettings,
    /// Export settings.
    pub export: ExportSettings,
}

const DEFAULT_PROVIDERS: &[&str] = &[
    "AWS",
    "Azure",
    "Google Cloud",
    "GCP",
    "IBM Cloud",
    "Amazon Web Services",
];

const DEFAULT_ASPECTS: &[(&str, &[&str])] = &[
    (
        "cost",
        &[
            "cheap",
            "expensive",
            "price",
            "affordable",
            "pricing",
            "cost",
            "pay-as-you-go",
            "free tier",
            "discount",
            "billing",
        ],
    ),
    (
        "scalability",
        &[
            "scalable",
            "scale",
            "elastic",
            "autoscale",
            "capacity",
            "grow",
            "shrink",
            "dynamic",
            "load balancing",
        ],
    ),
    (
        "security",
        &[
            "secure",
            "security",
            "vulnerable",
            "encryption",
            "breach",
            "compliance",
            "firewall",
            "attack",
            "access control",
            "IAM",
        ],
    ),
    (
        "performance",
        &[
            "fast",
            "slow",
            "latency",
            "throughput",
            "speed",
            "efficient",
            "optimization",
            "response time",
        ],
    ),
    (
        "support",
        &[
            "support",
            "help",
            "documentation",
            "customer service",
            "forum",
            "ticket",
            "response",
            "tutorial",
        ],
    ),
];

impl Default for AnalysisConfig {
    fn default() -> Self {
        let providers = DEFAULT_PROVIDERS
            .iter()
            .map(|name| ((*name).to_string(), (*name).to_string()))
            .collect();
        let aspects = DEFAULT_ASPECTS
            .iter()
            .map(|(aspect, keywords)| {
                (
                    (*aspect).to_string(),
                    keywords.iter().map(|kw| (*kw).to_string()).collect(),
                )
            })
            .collect();
        Self {
            providers,
            aspects,
            calibration: Calibration::default(),
            classifier: ClassifierSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Builds a config from explicit provider names (id == display name) and aspects.
    #[must_use]
    pub fn from_parts<P, A, K>(providers: P, aspects: A) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        A: IntoIterator<Item = (String, K)>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            providers: providers
                .into_iter()
                .map(|name| {
                    let name = name.into();
                    (name.clone(), name)
                })
                .collect(),
            aspects: aspects
                .into_iter()
                .map(|(aspect, keywords)| (aspect, keywords.into_iter().map(Into::into).collect()))
                .collect(),
            ..Self::default()
        }
    }

    /// Reads and validates a JSON config. Omitted sections take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (id, display) in &self.providers {
            if display.trim().is_empty() {
                return Err(ConfigError::EmptyProviderName(id.clone()));
            }
        }
        for (aspect, keywords) in &self.aspects {
            if keywords.is_empty() {
                return Err(ConfigError::NoKeywords(aspect.clone()));
            }
            if keywords.iter().any(|kw| kw.trim().is_empty()) {
                return Err(ConfigError::EmptyKeyword(aspect.clone()));
            }
        }
        let calibration = self.calibration;
        let threshold = calibration.materiality_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        let divisor = calibration.dampening_divisor;
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(ConfigError::InvalidDivisor(divisor));
        }
        if self.classifier.max_chars == 0 {
            return Err(ConfigError::ZeroMaxChars);
        }
        Ok(())
    }

    /// Display name for a provider id, falling back to the id.
    #[must_use]
    pub fn display_name<'a>(&'a self, provider: &'a str) -> &'a str {
        self.providers.get(provider).map_or(provider, String::as_str)
    }
}
