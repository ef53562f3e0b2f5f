//! Dictionary access for the validation core.
//!
//! The dictionary service itself is an external collaborator; this crate
//! holds the narrow provider interface, the forever-cache for published
//! (name, version) pairs, and the filename-to-schema selection logic.

mod cache;
mod provider;
mod selector;

pub use cache::{CachedDictionaryProvider, VersionCache};
pub use provider::{DictionaryError, DictionaryProvider, latest_version};
pub use selector::{sanitize, select_schema};
