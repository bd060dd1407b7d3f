//! Resource references.
//!
//! FHIR points from one resource to another with strings shaped `ResourceType/Identifier`
//! (e.g. `Patient/123`, `Observation/O1`). Joins only ever use the bare identifier.

use extract_types::FieldValue;
use serde::Serialize;

/// Strip the type prefix from a reference, keeping the suffix after the last `/`.
///
/// Total and idempotent: the result never contains `/`, so normalising it again is a no-op.
/// A reference ending in `/` normalises to the empty string.
pub fn normalize(reference: &str) -> &str {
    match reference.rfind('/') {
        Some(index) => &reference[index + 1..],
        None => reference,
    }
}

/// A raw reference as captured from a document, with its optional display text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResourceReference {
    pub reference: FieldValue,
    pub display: FieldValue,
}

impl ResourceReference {
    /// The bare identifier this reference points at, or `None` when the reference is missing
    /// or normalises to nothing.
    pub fn target_id(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(normalize)
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_type_prefix() {
        assert_eq!(normalize("Patient/123"), "123");
        assert_eq!(normalize("Observation/O1"), "O1");
    }

    #[test]
    fn keeps_suffix_after_last_slash() {
        assert_eq!(normalize("http://example.org/fhir/Observation/O1"), "O1");
        assert_eq!(normalize("Observation/O1/_history/2"), "2");
    }

    #[test]
    fn bare_and_degenerate_inputs() {
        assert_eq!(normalize("O1"), "O1");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("Observation/"), "");
        assert_eq!(normalize("/"), "");
    }

    #[test]
    fn normalisation_is_idempotent() {
        let inputs = [
            "",
            "/",
            "//",
            "O1",
            "Patient/123",
            "a/b/c",
            "trailing/",
            "http://example.org/fhir/Observation/O1",
            " spaced / id ",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(once), once, "input {input:?}");
        }
    }

    #[test]
    fn target_id_skips_missing_and_empty() {
        let reference = ResourceReference {
            reference: FieldValue::present("Observation/O1"),
            display: FieldValue::present("Glucose"),
        };
        assert_eq!(reference.target_id(), Some("O1"));

        assert_eq!(ResourceReference::default().target_id(), None);

        let dangling = ResourceReference {
            reference: FieldValue::present("Observation/"),
            display: FieldValue::Missing,
        };
        assert_eq!(dangling.target_id(), None);
    }
}
