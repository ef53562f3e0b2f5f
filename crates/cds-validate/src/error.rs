use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidateError {
    /// The minimum entity set for cross-validation was not submitted.
    #[error("cannot proceed to validation, missing data: {0}")]
    MissingData(String),
    #[error("schema '{0}' is not part of the dictionary")]
    UnknownSchema(String),
    #[error("invalid regex restriction on field '{field}': {source}")]
    BadRegex {
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error(transparent)]
    Dictionary(#[from] cds_dictionary::DictionaryError),
    #[error(transparent)]
    Ingest(#[from] cds_ingest::IngestError),
    #[error(transparent)]
    Store(#[from] cds_store::StoreError),
    #[error(transparent)]
    Registry(#[from] cds_model::RegistryError),
}

pub type Result<T> = std::result::Result<T, ValidateError>;
