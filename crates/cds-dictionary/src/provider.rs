use cds_model::Dictionary;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("no schema found for file '{filename}', filename should fit a schema name")]
    SchemaNotFound { filename: String },
    #[error("dictionary '{name}' version '{version}' not found")]
    NotFound { name: String, version: String },
    #[error("no published versions for dictionary '{name}'")]
    NoVersions { name: String },
    #[error("dictionary backend failure: {0}")]
    Backend(String),
}

/// Narrow interface over the external dictionary service.
pub trait DictionaryProvider {
    /// Fetch a published dictionary. Published versions are immutable, so
    /// results are safe to cache indefinitely (see `CachedDictionaryProvider`).
    fn fetch_dictionary(&self, name: &str, version: &str) -> Result<Dictionary, DictionaryError>;

    /// Fetch the latest dictionary for a language. "Latest" is a mutable
    /// pointer; callers must never cache the result.
    fn fetch_latest_dictionary(&self, language: &str) -> Result<Dictionary, DictionaryError>;
}

/// Pick the numerically greatest version among published version strings.
/// Versions compare as floats, matching the service's version scheme
/// (e.g. "5.12" > "5.9").
pub fn latest_version(versions: &[String]) -> Option<&str> {
    versions
        .iter()
        .filter_map(|v| v.trim().parse::<f64>().ok().map(|n| (n, v.as_str())))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, v)| v)
}
