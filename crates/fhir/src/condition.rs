//! FHIR Condition decoding.
//!
//! Conditions are linkable result records, like observations: a report that cites
//! `Condition/<id>` gets the condition attached. For tabular output the condition's recorded
//! date is its date and its clinical status is its value.
//!
//! Field chains accept both the older (`patient`, `dateRecorded`, coded `clinicalStatus`) and
//! the current (`subject`, `recordedDate`, CodeableConcept `clinicalStatus`) element layouts.

use crate::resolve::{FieldLink, Resolver};
use crate::resource::{FhirResource, PartyRef, ResourceKind};
use extract_types::FieldValue;
use roxmltree::Node;
use serde::Serialize;

/// Domain-level carrier for condition data (flat structure).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConditionData {
    pub id: FieldValue,

    /// Condition text, else the coded display.
    pub name: FieldValue,

    /// The code of the first coding.
    pub code: FieldValue,

    pub category: FieldValue,

    pub recorded_date: FieldValue,

    pub clinical_status: FieldValue,

    pub verification_status: FieldValue,

    pub onset_date: FieldValue,

    pub patient: PartyRef,

    pub asserter: PartyRef,
}

const ID: &[FieldLink] = &[FieldLink::value("id")];
const NAME: &[FieldLink] = &[
    FieldLink::value("code/text"),
    FieldLink::value("code/coding/display"),
];
const CODE: &[FieldLink] = &[FieldLink::value("code/coding/code")];
const CATEGORY: &[FieldLink] = &[
    FieldLink::value("category/text"),
    FieldLink::value("category/coding/display"),
];
const RECORDED_DATE: &[FieldLink] = &[
    FieldLink::value("recordedDate"),
    FieldLink::value("dateRecorded"),
];
const CLINICAL_STATUS: &[FieldLink] = &[
    FieldLink::value("clinicalStatus/text"),
    FieldLink::value("clinicalStatus/coding/code"),
    FieldLink::value("clinicalStatus"),
];
const VERIFICATION_STATUS: &[FieldLink] = &[
    FieldLink::value("verificationStatus/text"),
    FieldLink::value("verificationStatus/coding/code"),
    FieldLink::value("verificationStatus"),
];
const ONSET_DATE: &[FieldLink] = &[
    FieldLink::value("onsetDateTime"),
    FieldLink::value("onsetPeriod/start"),
];
const PATIENT_REFERENCE: &[FieldLink] = &[
    FieldLink::value("subject/reference"),
    FieldLink::value("patient/reference"),
];
const PATIENT_DISPLAY: &[FieldLink] = &[
    FieldLink::value("subject/display"),
    FieldLink::value("patient/display"),
];
const ASSERTER_REFERENCE: &[FieldLink] = &[FieldLink::value("asserter/reference")];
const ASSERTER_DISPLAY: &[FieldLink] = &[FieldLink::value("asserter/display")];

/// Condition resource operations.
pub struct Condition;

impl Condition {
    /// Decode a `Condition` element into a [`ConditionData`].
    pub fn decode(resolver: &Resolver<'_>, node: Node<'_, '_>) -> ConditionData {
        ConditionData {
            id: resolver.first_of(node, ID),
            name: resolver.first_of(node, NAME),
            code: resolver.first_of(node, CODE),
            category: resolver.first_of(node, CATEGORY),
            recorded_date: resolver.first_of(node, RECORDED_DATE),
            clinical_status: resolver.first_of(node, CLINICAL_STATUS),
            verification_status: resolver.first_of(node, VERIFICATION_STATUS),
            onset_date: resolver.first_of(node, ONSET_DATE),
            patient: PartyRef::resolve(resolver, node, PATIENT_REFERENCE, PATIENT_DISPLAY),
            asserter: PartyRef::resolve(resolver, node, ASSERTER_REFERENCE, ASSERTER_DISPLAY),
        }
    }
}

impl FhirResource for ConditionData {
    const KIND: ResourceKind = ResourceKind::Condition;

    fn decode(resolver: &Resolver<'_>, node: Node<'_, '_>) -> Self {
        Condition::decode(resolver, node)
    }

    fn id(&self) -> &FieldValue {
        &self.id
    }
}
