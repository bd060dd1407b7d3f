//! Request and response bodies for the REST API.
//!
//! These are transport shapes only. Missing fields arrive from the core as `N/A` strings so
//! every row in a response has all five columns.

use extract_core::{DocumentIssue, IssueKind, LinkOutcome, LinkRequest, Row, RunSummary};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Directories to extract from, as seen by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtractReq {
    pub bundle_dir: String,
    pub observation_dirs: Vec<String>,
    #[serde(default)]
    pub condition_dirs: Vec<String>,
}

impl ExtractReq {
    pub fn into_request(self) -> LinkRequest {
        LinkRequest {
            bundle_dir: PathBuf::from(self.bundle_dir),
            observation_dirs: self.observation_dirs.into_iter().map(PathBuf::from).collect(),
            condition_dirs: self.condition_dirs.into_iter().map(PathBuf::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RowRes {
    pub patient_name: String,
    pub patient_id: String,
    pub resource_name: String,
    pub date: String,
    pub value: String,
}

impl From<&Row> for RowRes {
    fn from(row: &Row) -> Self {
        let [patient_name, patient_id, resource_name, date, value] =
            row.columns().map(str::to_owned);
        Self {
            patient_name,
            patient_id,
            resource_name,
            date,
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IssueRes {
    pub path: String,
    pub kind: String,
    pub message: String,
}

impl From<&DocumentIssue> for IssueRes {
    fn from(issue: &DocumentIssue) -> Self {
        let kind = match issue.kind {
            IssueKind::Unreadable(_) => "unreadable",
            IssueKind::Malformed(_) => "malformed",
            IssueKind::NoMatchingResource(_) => "no_matching_resource",
            IssueKind::MissingIdentifier(_) => "missing_identifier",
        };
        Self {
            path: issue.path.display().to_string(),
            kind: kind.to_owned(),
            message: issue.kind.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummaryRes {
    pub documents: usize,
    pub reports: usize,
    pub results: usize,
    pub linked_results: usize,
    pub unresolved_references: usize,
    pub issues: usize,
}

impl From<RunSummary> for SummaryRes {
    fn from(summary: RunSummary) -> Self {
        Self {
            documents: summary.documents,
            reports: summary.reports,
            results: summary.results,
            linked_results: summary.linked_results,
            unresolved_references: summary.unresolved_references,
            issues: summary.issues,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtractRes {
    pub rows: Vec<RowRes>,
    pub issues: Vec<IssueRes>,
    pub summary: SummaryRes,
}

impl From<&LinkOutcome> for ExtractRes {
    fn from(outcome: &LinkOutcome) -> Self {
        Self {
            rows: outcome.rows().iter().map(RowRes::from).collect(),
            issues: outcome.issues.iter().map(IssueRes::from).collect(),
            summary: outcome.summary.into(),
        }
    }
}
