pub mod dictionary;
pub mod record;
pub mod registration;
pub mod report;
pub mod table;

pub use dictionary::{Dictionary, Field, Restrictions, Schema, ValueType};
pub use record::{HEADER_OFFSET, ProcessedRecord, Record, TypedValue, is_blank};
pub use registration::{
    InMemorySampleRegistry, RegistryError, SAMPLE_KEY_FIELDS, SampleRegistrationKey, SampleRegistry,
};
pub use report::{
    ErrorKind, FileValidationStatus, SubmissionValidationReport, SystemError, ValidationError,
};
pub use table::Table;
