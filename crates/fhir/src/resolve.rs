//! Path-based field resolution with ordered fallbacks.
//!
//! Paths are `/`-separated element local names relative to a node, e.g. `code/coding/display`.
//! A leading `.//` matches the first segment anywhere below the node instead of only among its
//! children. Every segment is matched in the resolver's [`Namespace`].
//!
//! Lookups never fail: an absent element or attribute resolves to [`FieldValue::Missing`].

use crate::document::Namespace;
use crate::reference;
use extract_types::FieldValue;
use roxmltree::Node;

/// One link in a fallback chain: an element path and the attribute read from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLink {
    pub path: &'static str,
    pub attribute: &'static str,
}

impl FieldLink {
    /// Read the `value` attribute of the element at `path`; FHIR XML primitives carry their
    /// value there.
    pub const fn value(path: &'static str) -> Self {
        Self {
            path,
            attribute: "value",
        }
    }
}

/// Resolves field paths against a tree in one namespace.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'ns> {
    namespace: &'ns Namespace,
}

impl<'ns> Resolver<'ns> {
    pub fn new(namespace: &'ns Namespace) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &'ns Namespace {
        self.namespace
    }

    /// First element reached by `path`, in document order.
    pub fn find<'a, 'input>(&self, node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
        let mut found = Vec::new();
        self.walk(node, path, &mut found, true);
        found.into_iter().next()
    }

    /// Every element reached by `path`, in document order.
    pub fn find_all<'a, 'input>(&self, node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
        let mut found = Vec::new();
        self.walk(node, path, &mut found, false);
        found
    }

    /// Resolve one path. Returns [`FieldValue::Missing`] when the element or the attribute is
    /// absent.
    pub fn resolve(&self, node: Node<'_, '_>, path: &str, attribute: &str) -> FieldValue {
        self.find(node, path)
            .and_then(|target| target.attribute(attribute))
            .map(str::to_owned)
            .into()
    }

    /// Evaluate a fallback chain left to right; the first present value wins.
    pub fn first_of(&self, node: Node<'_, '_>, chain: &[FieldLink]) -> FieldValue {
        chain
            .iter()
            .map(|link| self.resolve(node, link.path, link.attribute))
            .find(FieldValue::is_present)
            .unwrap_or_default()
    }

    /// Evaluate a chain of reference fields and normalise the winner to a bare identifier.
    pub fn reference_id(&self, node: Node<'_, '_>, chain: &[FieldLink]) -> FieldValue {
        self.first_of(node, chain)
            .map(|raw| reference::normalize(raw).trim().to_owned())
    }

    fn walk<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        path: &str,
        found: &mut Vec<Node<'a, 'input>>,
        first_only: bool,
    ) {
        let (descendant, path) = match path.strip_prefix(".//") {
            Some(rest) => (true, rest),
            None => (false, path),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((head, rest)) = segments.split_first() else {
            return;
        };

        let starts: Vec<Node<'a, 'input>> = if descendant {
            node.descendants()
                .skip(1)
                .filter(|n| self.namespace.matches(*n, head))
                .collect()
        } else {
            node.children()
                .filter(|n| self.namespace.matches(*n, head))
                .collect()
        };

        for start in starts {
            self.descend(start, rest, found, first_only);
            if first_only && !found.is_empty() {
                return;
            }
        }
    }

    fn descend<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        segments: &[&str],
        found: &mut Vec<Node<'a, 'input>>,
        first_only: bool,
    ) {
        let Some((head, rest)) = segments.split_first() else {
            found.push(node);
            return;
        };
        for child in node.children().filter(|n| self.namespace.matches(*n, head)) {
            self.descend(child, rest, found, first_only);
            if first_only && !found.is_empty() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const OBSERVATION: &str = r#"<Observation xmlns="http://hl7.org/fhir">
  <id value="O2"/>
  <code>
    <coding><system value="http://loinc.org"/><display value="Hemoglobin"/></coding>
    <coding><display value="Hb"/></coding>
  </code>
  <category><text value="Laboratory"/><coding><display value="Lab"/></coding></category>
  <subject><reference value="Patient/123 "/></subject>
</Observation>"#;

    fn with_root<T>(xml: &str, f: impl FnOnce(Resolver<'_>, Node<'_, '_>) -> T) -> T {
        let doc = Document::parse(xml).expect("test xml");
        let namespace = Namespace::fhir();
        f(Resolver::new(&namespace), doc.root_element())
    }

    #[test]
    fn resolves_attribute_at_path() {
        with_root(OBSERVATION, |resolver, root| {
            assert_eq!(
                resolver.resolve(root, "id", "value"),
                FieldValue::present("O2")
            );
            assert_eq!(
                resolver.resolve(root, "code/coding/display", "value"),
                FieldValue::present("Hemoglobin")
            );
        });
    }

    #[test]
    fn missing_element_or_attribute_is_missing() {
        with_root(OBSERVATION, |resolver, root| {
            assert!(resolver.resolve(root, "code/text", "value").is_missing());
            assert!(resolver.resolve(root, "code", "value").is_missing());
        });
    }

    #[test]
    fn descendant_prefix_searches_below_node() {
        with_root(OBSERVATION, |resolver, root| {
            assert_eq!(
                resolver.resolve(root, ".//display", "value"),
                FieldValue::present("Hemoglobin")
            );
        });
    }

    #[test]
    fn find_all_keeps_document_order() {
        with_root(OBSERVATION, |resolver, root| {
            let displays: Vec<_> = resolver
                .find_all(root, "code/coding/display")
                .into_iter()
                .filter_map(|n| n.attribute("value"))
                .collect();
            assert_eq!(displays, vec!["Hemoglobin", "Hb"]);
        });
    }

    #[test]
    fn chain_prefers_primary_when_both_present() {
        with_root(OBSERVATION, |resolver, root| {
            let chain = [
                FieldLink::value("category/text"),
                FieldLink::value("category/coding/display"),
            ];
            assert_eq!(resolver.first_of(root, &chain), FieldValue::present("Laboratory"));
        });
    }

    #[test]
    fn chain_falls_back_when_primary_missing() {
        with_root(OBSERVATION, |resolver, root| {
            let chain = [
                FieldLink::value("code/text"),
                FieldLink::value("code/coding/display"),
            ];
            assert_eq!(resolver.first_of(root, &chain), FieldValue::present("Hemoglobin"));
        });
    }

    #[test]
    fn chain_with_all_links_missing_is_missing() {
        with_root(OBSERVATION, |resolver, root| {
            let chain = [FieldLink::value("valueQuantity/value"), FieldLink::value("valueString")];
            assert!(resolver.first_of(root, &chain).is_missing());
            assert!(resolver.first_of(root, &[]).is_missing());
        });
    }

    #[test]
    fn reference_id_is_normalised() {
        with_root(OBSERVATION, |resolver, root| {
            let chain = [
                FieldLink::value("subject/reference"),
                FieldLink::value("patient/reference"),
            ];
            assert_eq!(resolver.reference_id(root, &chain), FieldValue::present("123"));
            assert!(resolver
                .reference_id(root, &[FieldLink::value("asserter/reference")])
                .is_missing());
        });
    }

    #[test]
    fn reference_id_matches_result_reference_target() {
        let xml = r#"<Condition xmlns="http://hl7.org/fhir">
  <subject><reference value=" Patient/ 123 "/></subject>
</Condition>"#;
        with_root(xml, |resolver, root| {
            let chain = [FieldLink::value("subject/reference")];
            let raw = resolver.first_of(root, &chain);
            let as_result = crate::ResourceReference {
                reference: raw,
                display: FieldValue::Missing,
            };

            assert_eq!(resolver.reference_id(root, &chain), FieldValue::present("123"));
            assert_eq!(as_result.target_id(), Some("123"));
        });
    }

    #[test]
    fn other_namespace_does_not_match() {
        let xml = r#"<Observation xmlns="urn:not-fhir"><id value="O1"/></Observation>"#;
        let doc = Document::parse(xml).expect("test xml");

        let fhir = Namespace::fhir();
        assert!(Resolver::new(&fhir)
            .resolve(doc.root_element(), "id", "value")
            .is_missing());

        let other = Namespace::uri("urn:not-fhir");
        assert_eq!(
            Resolver::new(&other).resolve(doc.root_element(), "id", "value"),
            FieldValue::present("O1")
        );
    }
}
