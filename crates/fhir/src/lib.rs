//! FHIR XML boundary support for the extraction pipeline.
//!
//! This crate provides **document loading**, **field resolution** and **resource decoding** for
//! FHIR XML documents:
//! - [`SourceDocument`]: read and parse one document into a tree
//! - [`Resolver`]: namespace-aware path lookup with ordered fallback chains
//! - decoders for DiagnosticReport, Condition and Observation into flat records
//!
//! This crate focuses on:
//! - tolerant decoding (absent fields become `Missing`, never errors)
//! - reference normalisation (`ResourceType/id` to bare `id`)
//!
//! It does not validate documents against the FHIR schema, walk directories or join records;
//! those concerns live in `extract-core`.

pub mod condition;
pub mod diagnostic_report;
pub mod document;
pub mod observation;
pub mod reference;
pub mod resolve;
pub mod resource;

// Re-export facades
pub use condition::Condition;
pub use diagnostic_report::DiagnosticReport;
pub use observation::Observation;

// Re-export public domain-level types
pub use condition::ConditionData;
pub use diagnostic_report::DiagnosticReportData;
pub use document::{Namespace, SourceDocument, FHIR_NAMESPACE};
pub use observation::{ObservationData, ReferenceRange};
pub use reference::{normalize, ResourceReference};
pub use resolve::{FieldLink, Resolver};
pub use resource::{locate, FhirResource, PartyRef, Quantity, Resource, ResourceKind, ResultResource};

// Re-export shared value types
pub use extract_types::{FieldValue, Identifier, MISSING_MARKER};

use std::path::PathBuf;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("failed to read {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}", path = path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("failed to decode {path} as {encoding}", path = path.display())]
    Decode { path: PathBuf, encoding: String },

    #[error("unsupported resource type: {0}")]
    UnsupportedResourceType(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
