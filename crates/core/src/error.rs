use fhir::{FhirError, ResourceKind};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(
        "failed to read directory {path}: {source}",
        path = path.display()
    )]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("FHIR error: {0}")]
    Fhir(#[from] FhirError),
    #[error("failed to write table: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// A problem with one document. Issues never stop the batch they occur in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentIssue {
    pub path: PathBuf,
    pub kind: IssueKind,
}

impl DocumentIssue {
    pub fn new(path: &Path, kind: IssueKind) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
        }
    }

    /// Issues that mean a document was lost, as opposed to merely contributing nothing.
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, IssueKind::Unreadable(_) | IssueKind::Malformed(_))
    }
}

impl std::fmt::Display for DocumentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum IssueKind {
    /// The file could not be read.
    Unreadable(String),
    /// The file is not well-formed XML.
    Malformed(String),
    /// The document holds no resource of the requested kind.
    NoMatchingResource(ResourceKind),
    /// A resource was found but has no usable id, so it was skipped.
    MissingIdentifier(ResourceKind),
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::Unreadable(reason) => write!(f, "unreadable: {reason}"),
            IssueKind::Malformed(reason) => write!(f, "malformed XML: {reason}"),
            IssueKind::NoMatchingResource(kind) => write!(f, "no {kind} resource found"),
            IssueKind::MissingIdentifier(kind) => write!(f, "{kind} resource without id skipped"),
        }
    }
}

impl From<&FhirError> for IssueKind {
    fn from(err: &FhirError) -> Self {
        match err {
            FhirError::Read { source, .. } => IssueKind::Unreadable(source.to_string()),
            FhirError::Parse { source, .. } => IssueKind::Malformed(source.to_string()),
            FhirError::Decode { encoding, .. } => {
                IssueKind::Malformed(format!("not valid {encoding}"))
            }
            FhirError::UnsupportedResourceType(_) => IssueKind::Unreadable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_serialises_with_kind_and_detail() {
        let issue = DocumentIssue::new(
            Path::new("in/o1.xml"),
            IssueKind::MissingIdentifier(ResourceKind::Observation),
        );
        let json = serde_json::to_value(&issue).expect("serialise");
        assert_eq!(json["path"], "in/o1.xml");
        assert_eq!(json["kind"]["kind"], "missing_identifier");
        assert_eq!(json["kind"]["detail"], "Observation");
        assert!(!issue.is_failure());
    }

    #[test]
    fn parse_errors_become_malformed_issues() {
        let source = fhir::SourceDocument::from_text("bad.xml", "<a>");
        let err = source.parse().expect_err("malformed");
        let kind = IssueKind::from(&err);
        assert!(matches!(kind, IssueKind::Malformed(_)));
        assert!(DocumentIssue::new(Path::new("bad.xml"), kind).is_failure());
    }
}
