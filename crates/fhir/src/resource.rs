//! Resource kinds and the shared decode contract.
//!
//! Responsibilities:
//! - Name the supported resource kinds and parse them from user input
//! - Locate embedded resources of one kind in a parsed document (Bundle or single resource)
//! - Provide the record types shared by every decoder

use crate::resolve::{FieldLink, Resolver};
use crate::{ConditionData, DiagnosticReportData, FhirError, ObservationData};
use extract_types::FieldValue;
use roxmltree::{Document, Node};
use serde::Serialize;
use std::str::FromStr;

/// Resource kinds the extractor knows how to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    DiagnosticReport,
    Condition,
    Observation,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::DiagnosticReport,
        ResourceKind::Condition,
        ResourceKind::Observation,
    ];

    /// The XML element name of this resource kind.
    pub fn element_name(self) -> &'static str {
        match self {
            ResourceKind::DiagnosticReport => "DiagnosticReport",
            ResourceKind::Condition => "Condition",
            ResourceKind::Observation => "Observation",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.element_name())
    }
}

impl FromStr for ResourceKind {
    type Err = FhirError;

    /// Parse a resource type name. Matching ignores ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.element_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FhirError::UnsupportedResourceType(s.to_owned()))
    }
}

/// A record decoded from one resource element.
pub trait FhirResource: Clone + Sized {
    const KIND: ResourceKind;

    /// Decode `node`, which must be the resource element itself. Never fails: absent fields
    /// decode to [`FieldValue::Missing`].
    fn decode(resolver: &Resolver<'_>, node: Node<'_, '_>) -> Self;

    /// The resource id as decoded; may be missing.
    fn id(&self) -> &FieldValue;
}

/// Find the resource elements of `kind` in a parsed document.
///
/// - A `Bundle` root yields every `entry/resource/<kind>` in entry order; entries wrapping
///   other resource types are skipped.
/// - Any other root yields the root itself if it is of `kind`, otherwise the first element of
///   `kind` below it, otherwise nothing.
pub fn locate<'a, 'input>(
    resolver: &Resolver<'_>,
    doc: &'a Document<'input>,
    kind: ResourceKind,
) -> Vec<Node<'a, 'input>> {
    let root = doc.root_element();
    let namespace = resolver.namespace();

    if namespace.matches(root, "Bundle") {
        let path = format!("entry/resource/{}", kind.element_name());
        return resolver.find_all(root, &path);
    }

    if namespace.matches(root, kind.element_name()) {
        return vec![root];
    }

    let path = format!(".//{}", kind.element_name());
    resolver.find(root, &path).into_iter().collect()
}

/// A referenced party (patient, asserter) reduced to bare id and display name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PartyRef {
    pub id: FieldValue,
    pub name: FieldValue,
}

impl PartyRef {
    /// Resolve a party from a chain of reference fields and a chain of display fields.
    pub fn resolve(
        resolver: &Resolver<'_>,
        node: Node<'_, '_>,
        reference_chain: &[FieldLink],
        display_chain: &[FieldLink],
    ) -> Self {
        Self {
            id: resolver.reference_id(node, reference_chain),
            name: resolver.first_of(node, display_chain),
        }
    }
}

/// A simple quantity (value + unit) such as a reference range bound.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Quantity {
    pub value: FieldValue,
    pub unit: FieldValue,
}

/// Any decoded resource, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    DiagnosticReport(DiagnosticReportData),
    Condition(ConditionData),
    Observation(ObservationData),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::DiagnosticReport(_) => ResourceKind::DiagnosticReport,
            Resource::Condition(_) => ResourceKind::Condition,
            Resource::Observation(_) => ResourceKind::Observation,
        }
    }

    pub fn id(&self) -> &FieldValue {
        match self {
            Resource::DiagnosticReport(r) => r.id(),
            Resource::Condition(c) => c.id(),
            Resource::Observation(o) => o.id(),
        }
    }
}

/// A record a report can cite as a result: an Observation or a Condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "resourceType")]
pub enum ResultResource {
    Observation(ObservationData),
    Condition(ConditionData),
}

impl ResultResource {
    pub fn id(&self) -> &FieldValue {
        match self {
            ResultResource::Observation(o) => &o.id,
            ResultResource::Condition(c) => &c.id,
        }
    }

    /// Display name of the observation or condition.
    pub fn name(&self) -> &FieldValue {
        match self {
            ResultResource::Observation(o) => &o.name,
            ResultResource::Condition(c) => &c.name,
        }
    }

    /// Effective date of an observation, recorded date of a condition.
    pub fn date(&self) -> &FieldValue {
        match self {
            ResultResource::Observation(o) => &o.date,
            ResultResource::Condition(c) => &c.recorded_date,
        }
    }

    /// Primary value of an observation, clinical status of a condition.
    pub fn value(&self) -> &FieldValue {
        match self {
            ResultResource::Observation(o) => &o.value,
            ResultResource::Condition(c) => &c.clinical_status,
        }
    }
}

impl From<ObservationData> for ResultResource {
    fn from(value: ObservationData) -> Self {
        ResultResource::Observation(value)
    }
}

impl From<ConditionData> for ResultResource {
    fn from(value: ConditionData) -> Self {
        ResultResource::Condition(value)
    }
}
