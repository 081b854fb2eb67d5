use thiserror::Error;

/// Invalid analysis configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Provider display name is blank.
    #[error("provider {0:?} has an empty display name")]
    EmptyProviderName(String),
    /// Aspect has no keywords, so nothing could ever match it.
    #[error("aspect {0:?} has no keywords")]
    NoKeywords(String),
    /// A keyword is blank.
    #[error("aspect {0:?} contains an empty keyword")]
    EmptyKeyword(String),
    /// Materiality threshold negative or not finite.
    #[error("materiality threshold must be finite and >= 0, got {0}")]
    InvalidThreshold(f64),
    /// Dampening divisor not a finite positive number.
    #[error("dampening divisor must be finite and > 0, got {0}")]
    InvalidDivisor(f64),
    /// Classifier truncation limit of zero.
    #[error("classifier max_chars must be > 0")]
    ZeroMaxChars,
    /// A provider name or keyword could not be compiled into a matcher.
    #[error("cannot build matcher for {term:?}: {reason}")]
    Pattern {
        /// Offending term.
        term: String,
        /// Regex compiler message.
        reason: String,
    },
}

/// Failure reported by a sentiment classifier.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Model returned no label scores.
    #[error("classifier returned no labels")]
    EmptyOutput,
    /// Model raised an error.
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Errors raised by the pipeline driver.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Classified record names a provider outside the configuration.
    #[error("unknown provider {0:?}")]
    UnknownProvider(String),
    /// Classified record names an aspect outside the configuration.
    #[error("unknown aspect {0:?}")]
    UnknownAspect(String),
}
