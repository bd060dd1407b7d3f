//! Document loading.
//!
//! A [`SourceDocument`] owns the raw text of one file; [`SourceDocument::parse`] borrows it into
//! a navigable `roxmltree` tree. Parsing is all-or-nothing: a malformed document yields
//! [`FhirError::Parse`] carrying the path and the syntax diagnostic, never a partial tree.
//!
//! Element matching is namespace-aware through [`Namespace`], which is passed explicitly to the
//! resolver instead of living in process-wide state.

use crate::{FhirError, FhirResult};
use encoding_rs::{Encoding, UTF_8};
use roxmltree::{Document, Node, ParsingOptions};
use std::path::{Path, PathBuf};

/// Namespace URI used by FHIR XML documents.
pub const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

/// Namespace that element names are matched in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Namespace {
    /// Only elements in this namespace URI match.
    Uri(String),
    /// Elements match on local name alone, whatever their namespace.
    Any,
}

impl Namespace {
    /// The standard FHIR namespace.
    pub fn fhir() -> Self {
        Self::Uri(FHIR_NAMESPACE.to_owned())
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    /// Returns true when `node` is an element named `local_name` in this namespace.
    pub fn matches(&self, node: Node<'_, '_>, local_name: &str) -> bool {
        if !node.is_element() {
            return false;
        }
        let tag = node.tag_name();
        if tag.name() != local_name {
            return false;
        }
        match self {
            Self::Uri(uri) => tag.namespace() == Some(uri.as_str()),
            Self::Any => true,
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::fhir()
    }
}

/// The raw text of one document together with the path it was read from.
#[derive(Clone, Debug)]
pub struct SourceDocument {
    path: PathBuf,
    text: String,
}

impl SourceDocument {
    /// Read a document from disk and decode it to UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Read`] if the file cannot be read, or [`FhirError::Decode`] if its
    /// bytes are not valid in the declared encoding.
    pub fn read(path: impl Into<PathBuf>) -> FhirResult<Self> {
        let path = path.into();
        let bytes = std::fs::read(&path).map_err(|source| FhirError::Read {
            path: path.clone(),
            source,
        })?;
        let text = decode(&bytes).map_err(|encoding| FhirError::Decode {
            path: path.clone(),
            encoding,
        })?;
        Ok(Self { path, text })
    }

    /// Wrap text that is already in memory. `path` is only used for diagnostics.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the document into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Parse`] if the text is not well-formed XML.
    pub fn parse(&self) -> FhirResult<Document<'_>> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        Document::parse_with_options(&self.text, options).map_err(|source| FhirError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Decode raw document bytes. On failure returns the name of the encoding that was tried.
fn decode(bytes: &[u8]) -> Result<String, String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => match declared_encoding(bytes) {
            Some(label) => (
                Encoding::for_label(label.as_bytes()).ok_or_else(|| label.to_owned())?,
                bytes,
            ),
            None => (UTF_8, bytes),
        },
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| encoding.name().to_owned())
}

/// The `encoding` label of the XML declaration, if the document starts with one.
fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    let head = bytes.strip_prefix(b"<?xml")?;
    let end = head.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&head[..end]).ok()?;

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    Some(&rest[..rest.find(quote)?])
}
