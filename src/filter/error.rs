//! Filter configuration errors.

/// A malformed ignore pattern or substitution expression.
///
/// Every variant names the input that was rejected.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An ignore regex failed to compile.
    #[error("Invalid ignore pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// Substitution shorter than the minimal `s///`.
    #[error("Substitution {input:?} is too short")]
    TooShort { input: String },
    /// Substitution does not follow `s<d>SEARCH<d>REPLACE<d>FLAGS`.
    #[error("Malformed substitution {input:?}: {reason}")]
    Malformed { input: String, reason: &'static str },
    /// The search part of a substitution failed to compile.
    #[error("Invalid search pattern in substitution {input:?}: {source}")]
    InvalidSearch {
        input: String,
        #[source]
        source: regex::Error,
    },
}

impl ConfigError {
    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidPattern { pattern, .. } => pattern,
            Self::TooShort { input }
            | Self::Malformed { input, .. }
            | Self::InvalidSearch { input, .. } => input,
        }
    }
}
