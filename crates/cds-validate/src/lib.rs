//! Submission validation pipeline.
//!
//! Per-file validation (schema selection, typed record checks, referential
//! checks, chunked with a global error budget) and whole-submission
//! cross-validation (orphan joins, declarative rules over assembled study
//! facts). External collaborators (dictionary service, object store, sample
//! registry) are consumed through the narrow traits of the sibling crates.

mod assemble;
mod batch;
mod error;
mod orchestrator;
mod orphan;
mod record;
mod referential;

pub use assemble::assemble_studies;
pub use batch::{BatchOptions, per_file_allotment, validate_file_entries};
pub use error::{Result, ValidateError};
pub use orchestrator::{
    SubmissionValidator, ValidationConfig, registration_keys, write_report_json,
};
pub use orphan::find_orphans;
pub use record::{BatchResult, validate_records};
pub use referential::validate_registered;

/// Entity (schema) names of the clinical dictionary, lowercased as table
/// keys during cross-validation.
pub mod entity {
    pub const STUDY: &str = "study";
    pub const PARTICIPANT: &str = "participant";
    pub const BIOSPECIMEN: &str = "biospecimen";
    pub const SAMPLE_REGISTRATION: &str = "sample_registration";
    pub const PHENOTYPE: &str = "phenotype";
    pub const DIAGNOSIS: &str = "diagnosis";
    pub const TREATMENT: &str = "treatment";
    pub const FOLLOW_UP: &str = "follow_up";
    pub const EXPOSURE: &str = "exposure";
    pub const FAMILY_RELATIONSHIP: &str = "family_relationship";
    pub const FAMILY_HISTORY: &str = "family_history";
}
