//! FHIR DiagnosticReport decoding.
//!
//! Responsibilities:
//! - Define the flat domain-level record for a DiagnosticReport
//! - Capture the patient (normalised id + display name)
//! - Capture the raw `result` references in document order
//!
//! Notes:
//! - Result references are not resolved here. They are kept exactly as found so that a later,
//!   independent pass can join them against observations and conditions loaded from elsewhere.

use crate::reference::ResourceReference;
use crate::resolve::{FieldLink, Resolver};
use crate::resource::{FhirResource, PartyRef, ResourceKind};
use extract_types::FieldValue;
use roxmltree::Node;
use serde::Serialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for diagnostic report data (flat structure).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticReportData {
    /// Resource id.
    pub id: FieldValue,

    /// Business identifier (`identifier/value`), distinct from the resource id.
    pub identifier: FieldValue,

    pub status: FieldValue,

    /// Category text, else the coded display.
    pub category: FieldValue,

    /// Code text, else the coded display.
    pub code: FieldValue,

    /// The patient the report is about.
    pub patient: PartyRef,

    /// Clinically relevant time of the report.
    pub date: FieldValue,

    pub issued: FieldValue,

    /// Display name of the first performer.
    pub performer: FieldValue,

    /// Result references in document order, unresolved.
    pub results: Vec<ResourceReference>,
}

// ============================================================================
// Field chains
// ============================================================================

const ID: &[FieldLink] = &[FieldLink::value("id")];
const IDENTIFIER: &[FieldLink] = &[FieldLink::value("identifier/value")];
const STATUS: &[FieldLink] = &[FieldLink::value("status")];
const CATEGORY: &[FieldLink] = &[
    FieldLink::value("category/text"),
    FieldLink::value("category/coding/display"),
];
const CODE: &[FieldLink] = &[
    FieldLink::value("code/text"),
    FieldLink::value("code/coding/display"),
];
const DATE: &[FieldLink] = &[
    FieldLink::value("effectiveDateTime"),
    FieldLink::value("effectivePeriod/start"),
];
const ISSUED: &[FieldLink] = &[FieldLink::value("issued")];
const PERFORMER: &[FieldLink] = &[
    FieldLink::value("performer/display"),
    FieldLink::value("performer/actor/display"),
];
const PATIENT_REFERENCE: &[FieldLink] = &[
    FieldLink::value("subject/reference"),
    FieldLink::value("patient/reference"),
];
const PATIENT_DISPLAY: &[FieldLink] = &[
    FieldLink::value("subject/display"),
    FieldLink::value("patient/display"),
];
const RESULT_REFERENCE: &[FieldLink] = &[FieldLink::value("reference")];
const RESULT_DISPLAY: &[FieldLink] = &[FieldLink::value("display")];

// ============================================================================
// Public DiagnosticReport operations
// ============================================================================

/// DiagnosticReport resource operations.
///
/// This is a zero-sized type used for namespacing report-related operations.
pub struct DiagnosticReport;

impl DiagnosticReport {
    /// Decode a `DiagnosticReport` element into a [`DiagnosticReportData`].
    pub fn decode(resolver: &Resolver<'_>, node: Node<'_, '_>) -> DiagnosticReportData {
        DiagnosticReportData {
            id: resolver.first_of(node, ID),
            identifier: resolver.first_of(node, IDENTIFIER),
            status: resolver.first_of(node, STATUS),
            category: resolver.first_of(node, CATEGORY),
            code: resolver.first_of(node, CODE),
            patient: PartyRef::resolve(resolver, node, PATIENT_REFERENCE, PATIENT_DISPLAY),
            date: resolver.first_of(node, DATE),
            issued: resolver.first_of(node, ISSUED),
            performer: resolver.first_of(node, PERFORMER),
            results: Self::results(resolver, node),
        }
    }

    fn results(resolver: &Resolver<'_>, node: Node<'_, '_>) -> Vec<ResourceReference> {
        resolver
            .find_all(node, "result")
            .into_iter()
            .map(|result| ResourceReference {
                reference: resolver.first_of(result, RESULT_REFERENCE),
                display: resolver.first_of(result, RESULT_DISPLAY),
            })
            .collect()
    }
}

impl FhirResource for DiagnosticReportData {
    const KIND: ResourceKind = ResourceKind::DiagnosticReport;

    fn decode(resolver: &Resolver<'_>, node: Node<'_, '_>) -> Self {
        DiagnosticReport::decode(resolver, node)
    }

    fn id(&self) -> &FieldValue {
        &self.id
    }
}
