//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the extraction services. Nothing in the core reads environment variables while
//! extracting; binaries resolve the values and hand over a [`CoreConfig`].

use crate::constants::DEFAULT_DOCUMENT_EXTENSION;
use crate::{ExtractError, ExtractResult};
use fhir::Namespace;
use std::path::Path;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    namespace: Namespace,
    document_extension: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// A leading `.` on `document_extension` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidInput`] if the extension is empty, or if the namespace
    /// URI is empty.
    pub fn new(namespace: Namespace, document_extension: &str) -> ExtractResult<Self> {
        let document_extension = document_extension.trim().trim_start_matches('.');
        if document_extension.is_empty() {
            return Err(ExtractError::InvalidInput(
                "document extension cannot be empty".into(),
            ));
        }
        if let Namespace::Uri(uri) = &namespace {
            if uri.trim().is_empty() {
                return Err(ExtractError::InvalidInput(
                    "namespace URI cannot be empty".into(),
                ));
            }
        }

        Ok(Self {
            namespace,
            document_extension: document_extension.to_ascii_lowercase(),
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn document_extension(&self) -> &str {
        &self.document_extension
    }

    /// Whether `path` carries the configured document extension (ASCII case-insensitive).
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.document_extension))
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            namespace: Namespace::fhir(),
            document_extension: DEFAULT_DOCUMENT_EXTENSION.to_owned(),
        }
    }
}

/// Parse the namespace from an optional string value.
///
/// - `None` or empty/whitespace: the standard FHIR namespace
/// - `*` or `any`: match elements on local name only
/// - anything else: that namespace URI
pub fn namespace_from_env_value(value: Option<String>) -> Namespace {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Namespace::fhir(),
        Some("*") => Namespace::Any,
        Some(v) if v.eq_ignore_ascii_case("any") => Namespace::Any,
        Some(v) => Namespace::uri(v),
    }
}

/// Parse the document extension from an optional string value.
///
/// `None` or empty/whitespace falls back to [`DEFAULT_DOCUMENT_EXTENSION`]; validation happens
/// in [`CoreConfig::new`].
pub fn extension_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_EXTENSION.to_owned())
}
