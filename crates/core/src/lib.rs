//! # Extract Core
//!
//! Core extraction and linking logic for FHIR XML exports.
//!
//! This crate walks input directories, decodes resources through the `fhir` crate and joins
//! them into patient-level rows:
//! - per-kind extraction into insertion-ordered, id-keyed maps ([`Extractor`])
//! - report-to-result linking and row flattening ([`linker`])
//! - CSV rendering of rows and detailed per-kind exports ([`table`])
//!
//! **No transport concerns**: argument parsing, HTTP servers and logging setup belong in the
//! CLI and `api-rest` crates. Configuration is resolved by the binaries and passed in as a
//! [`CoreConfig`].

pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod linker;
pub mod table;

pub use config::{extension_from_env_value, namespace_from_env_value, CoreConfig};
pub use error::{DocumentIssue, ExtractError, ExtractResult, IssueKind};
pub use extractor::{Extraction, Extractor};
pub use linker::{flatten, link, LinkedReport, Row};
pub use table::{write_table, TableRecord};

use fhir::{
    ConditionData, DiagnosticReportData, ObservationData, Resource, ResourceKind, ResultResource,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Input locations for one extract-and-link run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkRequest {
    /// Directory of Bundle documents holding the DiagnosticReports.
    pub bundle_dir: PathBuf,
    /// Directories of single-Observation documents, in precedence order.
    pub observation_dirs: Vec<PathBuf>,
    /// Directories of single-Condition documents, in precedence order.
    pub condition_dirs: Vec<PathBuf>,
}

/// Counts describing one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub documents: usize,
    pub reports: usize,
    pub results: usize,
    pub linked_results: usize,
    pub unresolved_references: usize,
    pub issues: usize,
}

/// The result of an extract-and-link run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkOutcome {
    pub linked: Vec<LinkedReport>,
    pub issues: Vec<DocumentIssue>,
    pub summary: RunSummary,
}

impl LinkOutcome {
    /// Rows in report order, then citation order.
    pub fn rows(&self) -> Vec<Row> {
        flatten(&self.linked)
    }
}

/// Extraction and linking operations over a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct ExtractionService {
    config: CoreConfig,
}

impl ExtractionService {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn extractor(&self) -> Extractor<'_> {
        Extractor::new(&self.config)
    }

    /// Extract every DiagnosticReport from the Bundle documents in `bundle_dir`.
    pub fn extract_reports(&self, bundle_dir: &Path) -> ExtractResult<Extraction<DiagnosticReportData>> {
        self.extractor().extract_dir(bundle_dir)
    }

    pub fn extract_observations<P: AsRef<Path>>(
        &self,
        dirs: &[P],
    ) -> ExtractResult<Extraction<ObservationData>> {
        self.extractor().extract_dirs(dirs)
    }

    pub fn extract_conditions<P: AsRef<Path>>(
        &self,
        dirs: &[P],
    ) -> ExtractResult<Extraction<ConditionData>> {
        self.extractor().extract_dirs(dirs)
    }

    /// Extract observations and conditions into one result map.
    ///
    /// Observations are inserted first; a condition sharing an id with an observation replaces
    /// it.
    pub fn extract_results<P: AsRef<Path>>(
        &self,
        observation_dirs: &[P],
        condition_dirs: &[P],
    ) -> ExtractResult<Extraction<ResultResource>> {
        let mut results = self
            .extract_observations(observation_dirs)?
            .map_records(ResultResource::from);
        results.merge(
            self.extract_conditions(condition_dirs)?
                .map_records(ResultResource::from),
        );
        Ok(results)
    }

    /// Extract resources of a kind chosen at runtime from one directory.
    pub fn extract_kind(&self, dir: &Path, kind: ResourceKind) -> ExtractResult<Extraction<Resource>> {
        self.extractor().extract_kind(dir, kind)
    }

    /// Run the whole pipeline: extract reports and results, link them and summarise.
    ///
    /// # Errors
    ///
    /// Fails only if one of the input directories cannot be listed. Problems with individual
    /// documents are reported in [`LinkOutcome::issues`].
    pub fn link(&self, request: &LinkRequest) -> ExtractResult<LinkOutcome> {
        let reports = self.extract_reports(&request.bundle_dir)?;
        let results = self.extract_results(&request.observation_dirs, &request.condition_dirs)?;

        let mut issues = reports.issues;
        issues.extend(results.issues);

        let mut summary = RunSummary {
            documents: reports.documents + results.documents,
            reports: reports.records.len(),
            results: results.records.len(),
            issues: issues.len(),
            ..RunSummary::default()
        };

        let linked = link(reports.records, &results.records);
        summary.linked_results = linked.iter().map(|l| l.results.len()).sum();
        summary.unresolved_references = linked.iter().map(LinkedReport::unresolved).sum();

        tracing::info!(
            "linked {} result(s) across {} report(s) from {} document(s); {} unresolved reference(s), {} issue(s)",
            summary.linked_results,
            summary.reports,
            summary.documents,
            summary.unresolved_references,
            summary.issues
        );

        Ok(LinkOutcome {
            linked,
            issues,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BUNDLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Bundle xmlns="http://hl7.org/fhir">
  <type value="collection"/>
  <entry>
    <resource>
      <DiagnosticReport>
        <id value="R1"/>
        <status value="final"/>
        <subject>
          <reference value="Patient/123"/>
          <display value="Jane Doe"/>
        </subject>
        <effectiveDateTime value="2024-01-01"/>
        <result><reference value="Observation/O1"/><display value="Glucose"/></result>
        <result><reference value="Observation/O2"/><display value="Hemoglobin"/></result>
        <result><reference value="Observation/GONE"/></result>
      </DiagnosticReport>
    </resource>
  </entry>
  <entry>
    <resource>
      <Patient><id value="123"/></Patient>
    </resource>
  </entry>
</Bundle>"#;

    fn observation(id: &str, name: &str, date: &str, value: &str) -> String {
        format!(
            r#"<Observation xmlns="http://hl7.org/fhir">
  <id value="{id}"/>
  <status value="final"/>
  <code><text value="{name}"/></code>
  <effectiveDateTime value="{date}"/>
  <valueQuantity><value value="{value}"/><unit value="mg/dL"/></valueQuantity>
</Observation>"#
        )
    }

    struct Fixture {
        _temp: TempDir,
        request: LinkRequest,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let bundles = temp.path().join("bundles");
        let observations = temp.path().join("observations");
        let conditions = temp.path().join("conditions");
        for dir in [&bundles, &observations, &conditions] {
            fs::create_dir(dir).unwrap();
        }

        fs::write(bundles.join("bundle.xml"), BUNDLE).unwrap();
        fs::write(bundles.join("broken.xml"), "<Bundle><entry>").unwrap();
        fs::write(
            observations.join("o1.xml"),
            observation("O1", "Glucose", "2024-01-01", "95"),
        )
        .unwrap();
        fs::write(
            observations.join("o2.xml"),
            r#"<Observation xmlns="http://hl7.org/fhir">
  <id value="O2"/>
  <code><coding><display value="Hemoglobin"/></coding></code>
  <valueQuantity><value value="13.5"/><unit value="g/dL"/></valueQuantity>
</Observation>"#,
        )
        .unwrap();

        Fixture {
            request: LinkRequest {
                bundle_dir: bundles,
                observation_dirs: vec![observations],
                condition_dirs: vec![conditions],
            },
            _temp: temp,
        }
    }

    #[test]
    fn links_bundle_reports_to_flat_observations() {
        let fixture = fixture();
        let outcome = ExtractionService::default()
            .link(&fixture.request)
            .unwrap();

        let rows: Vec<_> = outcome.rows();
        let cells: Vec<_> = rows.iter().map(Row::columns).collect();
        assert_eq!(
            cells,
            vec![
                ["Jane Doe", "123", "Glucose", "2024-01-01", "95"],
                ["Jane Doe", "123", "Hemoglobin", "N/A", "13.5"],
            ]
        );

        assert_eq!(outcome.summary.reports, 1);
        assert_eq!(outcome.summary.results, 2);
        assert_eq!(outcome.summary.linked_results, 2);
        assert_eq!(outcome.summary.unresolved_references, 1);
        assert_eq!(outcome.summary.documents, 4);
    }

    #[test]
    fn malformed_bundle_does_not_abort_run() {
        let fixture = fixture();
        let outcome = ExtractionService::default()
            .link(&fixture.request)
            .unwrap();

        let failures: Vec<_> = outcome.issues.iter().filter(|i| i.is_failure()).collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].path.ends_with("broken.xml"));
        assert_eq!(outcome.linked.len(), 1);
    }

    #[test]
    fn conditions_are_linkable_results() {
        let fixture = fixture();
        fs::write(
            fixture.request.condition_dirs[0].join("c1.xml"),
            r#"<Condition xmlns="http://hl7.org/fhir">
  <id value="O2"/>
  <clinicalStatus><coding><code value="active"/></coding></clinicalStatus>
  <code><text value="Anaemia"/></code>
  <recordedDate value="2023-12-01"/>
</Condition>"#,
        )
        .unwrap();

        let outcome = ExtractionService::default()
            .link(&fixture.request)
            .unwrap();
        let rows = outcome.rows();

        assert_eq!(
            rows[1].columns(),
            ["Jane Doe", "123", "Anaemia", "2023-12-01", "active"]
        );
    }

    #[test]
    fn missing_bundle_directory_fails() {
        let fixture = fixture();
        let request = LinkRequest {
            bundle_dir: fixture.request.bundle_dir.join("nope"),
            ..fixture.request.clone()
        };

        let err = ExtractionService::default()
            .link(&request)
            .expect_err("missing directory");
        assert!(matches!(err, ExtractError::DirectoryRead { .. }));
    }

    #[test]
    fn rows_render_to_csv() {
        let fixture = fixture();
        let outcome = ExtractionService::default()
            .link(&fixture.request)
            .unwrap();

        let mut out = Vec::new();
        write_table(&mut out, &outcome.rows()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Patient Name,Patient ID,Observation/Condition Name,Date,Value\n\
             Jane Doe,123,Glucose,2024-01-01,95\n\
             Jane Doe,123,Hemoglobin,N/A,13.5\n"
        );
    }
}
