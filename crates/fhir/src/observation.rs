//! FHIR Observation decoding.
//!
//! Responsibilities:
//! - Define the flat domain-level record for an Observation
//! - Declare the fallback chain used for every field
//! - Decode an Observation element into the record
//!
//! Notes:
//! - Observations usually arrive one per document, outside any Bundle
//! - Every field is decoded; absent ones become `Missing`

use crate::resolve::{FieldLink, Resolver};
use crate::resource::{FhirResource, PartyRef, Quantity, ResourceKind};
use extract_types::FieldValue;
use roxmltree::Node;
use serde::Serialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for observation data (flat structure).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ObservationData {
    /// Resource id.
    pub id: FieldValue,

    /// Human readable name: code text, else the coded display.
    pub name: FieldValue,

    /// Category text, else the coded display.
    pub category: FieldValue,

    /// When the observation applies.
    pub date: FieldValue,

    /// Primary value: the quantity value, else the string value.
    pub value: FieldValue,

    /// Unit of the quantity value.
    pub unit: FieldValue,

    pub interpretation: FieldValue,

    /// The `valueString` field on its own.
    pub value_string: FieldValue,

    pub reference_range: ReferenceRange,

    /// The patient the observation is about.
    pub subject: PartyRef,
}

/// Low and high bounds of an observation's reference range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceRange {
    pub low: Quantity,
    pub high: Quantity,
}

// ============================================================================
// Field chains
// ============================================================================

const ID: &[FieldLink] = &[FieldLink::value("id")];
const NAME: &[FieldLink] = &[
    FieldLink::value("code/text"),
    FieldLink::value("code/coding/display"),
];
const CATEGORY: &[FieldLink] = &[
    FieldLink::value("category/text"),
    FieldLink::value("category/coding/display"),
];
const DATE: &[FieldLink] = &[
    FieldLink::value("effectiveDateTime"),
    FieldLink::value("effectivePeriod/start"),
    FieldLink::value("issued"),
];
const VALUE: &[FieldLink] = &[
    FieldLink::value("valueQuantity/value"),
    FieldLink::value("valueString"),
];
const UNIT: &[FieldLink] = &[
    FieldLink::value("valueQuantity/unit"),
    FieldLink::value("valueQuantity/code"),
];
const INTERPRETATION: &[FieldLink] = &[
    FieldLink::value("interpretation/text"),
    FieldLink::value("interpretation/coding/display"),
];
const VALUE_STRING: &[FieldLink] = &[FieldLink::value("valueString")];
const RANGE_LOW_VALUE: &[FieldLink] = &[FieldLink::value("referenceRange/low/value")];
const RANGE_LOW_UNIT: &[FieldLink] = &[FieldLink::value("referenceRange/low/unit")];
const RANGE_HIGH_VALUE: &[FieldLink] = &[FieldLink::value("referenceRange/high/value")];
const RANGE_HIGH_UNIT: &[FieldLink] = &[FieldLink::value("referenceRange/high/unit")];
const SUBJECT_REFERENCE: &[FieldLink] = &[FieldLink::value("subject/reference")];
const SUBJECT_DISPLAY: &[FieldLink] = &[FieldLink::value("subject/display")];

// ============================================================================
// Public Observation operations
// ============================================================================

/// Observation resource operations.
///
/// This is a zero-sized type used for namespacing observation-related operations.
pub struct Observation;

impl Observation {
    /// Decode an `Observation` element into an [`ObservationData`].
    pub fn decode(resolver: &Resolver<'_>, node: Node<'_, '_>) -> ObservationData {
        ObservationData {
            id: resolver.first_of(node, ID),
            name: resolver.first_of(node, NAME),
            category: resolver.first_of(node, CATEGORY),
            date: resolver.first_of(node, DATE),
            value: resolver.first_of(node, VALUE),
            unit: resolver.first_of(node, UNIT),
            interpretation: resolver.first_of(node, INTERPRETATION),
            value_string: resolver.first_of(node, VALUE_STRING),
            reference_range: ReferenceRange {
                low: Quantity {
                    value: resolver.first_of(node, RANGE_LOW_VALUE),
                    unit: resolver.first_of(node, RANGE_LOW_UNIT),
                },
                high: Quantity {
                    value: resolver.first_of(node, RANGE_HIGH_VALUE),
                    unit: resolver.first_of(node, RANGE_HIGH_UNIT),
                },
            },
            subject: PartyRef::resolve(resolver, node, SUBJECT_REFERENCE, SUBJECT_DISPLAY),
        }
    }
}

impl FhirResource for ObservationData {
    const KIND: ResourceKind = ResourceKind::Observation;

    fn decode(resolver: &Resolver<'_>, node: Node<'_, '_>) -> Self {
        Observation::decode(resolver, node)
    }

    fn id(&self) -> &FieldValue {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Namespace;
    use roxmltree::Document;

    fn decode(xml: &str) -> ObservationData {
        let doc = Document::parse(xml).expect("test xml");
        let namespace = Namespace::fhir();
        Observation::decode(&Resolver::new(&namespace), doc.root_element())
    }

    #[test]
    fn decodes_full_observation() {
        let obs = decode(
            r#"<Observation xmlns="http://hl7.org/fhir">
  <id value="O1"/>
  <category><coding><display value="Laboratory"/></coding></category>
  <code><text value="Glucose"/><coding><display value="Glucose [Mass/volume]"/></coding></code>
  <subject><reference value="Patient/123"/><display value="Jane Doe"/></subject>
  <effectiveDateTime value="2024-01-01"/>
  <valueQuantity><value value="95"/><unit value="mg/dL"/></valueQuantity>
  <interpretation><text value="Normal"/></interpretation>
  <referenceRange>
    <low><value value="70"/><unit value="mg/dL"/></low>
    <high><value value="99"/><unit value="mg/dL"/></high>
  </referenceRange>
</Observation>"#,
        );

        assert_eq!(obs.id, FieldValue::present("O1"));
        assert_eq!(obs.name, FieldValue::present("Glucose"));
        assert_eq!(obs.category, FieldValue::present("Laboratory"));
        assert_eq!(obs.date, FieldValue::present("2024-01-01"));
        assert_eq!(obs.value, FieldValue::present("95"));
        assert_eq!(obs.unit, FieldValue::present("mg/dL"));
        assert_eq!(obs.interpretation, FieldValue::present("Normal"));
        assert!(obs.value_string.is_missing());
        assert_eq!(obs.reference_range.low.value, FieldValue::present("70"));
        assert_eq!(obs.reference_range.high.unit, FieldValue::present("mg/dL"));
        assert_eq!(obs.subject.id, FieldValue::present("123"));
        assert_eq!(obs.subject.name, FieldValue::present("Jane Doe"));
    }

    #[test]
    fn name_falls_back_to_coded_display() {
        let obs = decode(
            r#"<Observation xmlns="http://hl7.org/fhir">
  <id value="O2"/>
  <code><coding><display value="Hemoglobin"/></coding></code>
  <valueQuantity><value value="13.5"/></valueQuantity>
</Observation>"#,
        );
        assert_eq!(obs.name, FieldValue::present("Hemoglobin"));
        assert_eq!(obs.value, FieldValue::present("13.5"));
        assert!(obs.date.is_missing());
        assert!(obs.unit.is_missing());
    }

    #[test]
    fn value_falls_back_to_value_string() {
        let obs = decode(
            r#"<Observation xmlns="http://hl7.org/fhir">
  <id value="O3"/>
  <valueString value="positive"/>
</Observation>"#,
        );
        assert_eq!(obs.value, FieldValue::present("positive"));
        assert_eq!(obs.value_string, FieldValue::present("positive"));
    }

    #[test]
    fn empty_observation_is_all_missing() {
        let obs = decode(r#"<Observation xmlns="http://hl7.org/fhir"/>"#);
        assert_eq!(obs, ObservationData::default());
        assert_eq!(obs.name.to_string(), "N/A");
    }
}
