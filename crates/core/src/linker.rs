//! Report-to-result linking and row flattening.
//!
//! Responsibilities:
//! - Resolve each report's `result` references against the extracted observations and
//!   conditions, keeping the report's own citation order
//! - Drop references that resolve to nothing, without failing the report
//! - Flatten linked reports into `(patient name, patient id, result name, date, value)` rows

use fhir::{DiagnosticReportData, FieldValue, Identifier, ResultResource};
use indexmap::IndexMap;
use serde::Serialize;

/// A report together with the results it cites that could be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkedReport {
    pub report: DiagnosticReportData,
    pub results: Vec<ResultResource>,
}

impl LinkedReport {
    pub fn patient_name(&self) -> &FieldValue {
        &self.report.patient.name
    }

    pub fn patient_id(&self) -> &FieldValue {
        &self.report.patient.id
    }

    /// Number of cited results that could not be resolved.
    pub fn unresolved(&self) -> usize {
        self.report.results.len() - self.results.len()
    }
}

/// Link every report, in report order.
pub fn link(
    reports: IndexMap<Identifier, DiagnosticReportData>,
    results: &IndexMap<Identifier, ResultResource>,
) -> Vec<LinkedReport> {
    reports
        .into_values()
        .map(|report| link_report(report, results))
        .collect()
}

/// Resolve one report's result references.
///
/// References are normalised to bare ids before lookup. Missing, empty and dangling
/// references are skipped.
pub fn link_report(
    report: DiagnosticReportData,
    results: &IndexMap<Identifier, ResultResource>,
) -> LinkedReport {
    let resolved: Vec<ResultResource> = report
        .results
        .iter()
        .filter_map(|reference| reference.target_id())
        .filter_map(|id| results.get(id))
        .cloned()
        .collect();

    let dropped = report.results.len() - resolved.len();
    if dropped > 0 {
        tracing::debug!(
            "report {} has {dropped} unresolved result reference(s)",
            report.id
        );
    }

    LinkedReport {
        report,
        results: resolved,
    }
}

/// One output row: a patient paired with one linked result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    pub patient_name: FieldValue,
    pub patient_id: FieldValue,
    pub resource_name: FieldValue,
    pub date: FieldValue,
    pub value: FieldValue,
}

impl Row {
    pub fn new(linked: &LinkedReport, result: &ResultResource) -> Self {
        Self {
            patient_name: linked.patient_name().clone(),
            patient_id: linked.patient_id().clone(),
            resource_name: result.name().clone(),
            date: result.date().clone(),
            value: result.value().clone(),
        }
    }

    /// The five cells, with missing fields rendered as `N/A`.
    pub fn columns(&self) -> [&str; 5] {
        [
            self.patient_name.as_str(),
            self.patient_id.as_str(),
            self.resource_name.as_str(),
            self.date.as_str(),
            self.value.as_str(),
        ]
    }
}

/// Flatten linked reports into rows: report order first, then citation order.
///
/// A report with no resolved results contributes no rows.
pub fn flatten(linked: &[LinkedReport]) -> Vec<Row> {
    linked
        .iter()
        .flat_map(|report| report.results.iter().map(move |result| Row::new(report, result)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::{ConditionData, ObservationData, PartyRef, ResourceReference};

    fn id(value: &str) -> Identifier {
        Identifier::new(value).unwrap()
    }

    fn reference(value: &str) -> ResourceReference {
        ResourceReference {
            reference: FieldValue::present(value),
            display: FieldValue::Missing,
        }
    }

    fn report(report_id: &str, refs: &[&str]) -> DiagnosticReportData {
        DiagnosticReportData {
            id: FieldValue::present(report_id),
            patient: PartyRef {
                id: FieldValue::present("123"),
                name: FieldValue::present("Jane Doe"),
            },
            results: refs.iter().map(|r| reference(r)).collect(),
            ..DiagnosticReportData::default()
        }
    }

    fn observation(obs_id: &str, name: &str, date: &str, value: &str) -> ResultResource {
        ResultResource::Observation(ObservationData {
            id: FieldValue::present(obs_id),
            name: FieldValue::present(name),
            date: FieldValue::present(date),
            value: FieldValue::present(value),
            ..ObservationData::default()
        })
    }

    fn results() -> IndexMap<Identifier, ResultResource> {
        let mut map = IndexMap::new();
        map.insert(id("A"), observation("A", "Glucose", "2024-01-01", "95"));
        map.insert(id("C"), observation("C", "Hemoglobin", "2024-01-02", "13.5"));
        map
    }

    #[test]
    fn keeps_citation_order_and_drops_unresolved() {
        let linked = link_report(
            report("R1", &["Observation/B", "Observation/A", "Observation/C"]),
            &results(),
        );

        let ids: Vec<_> = linked.results.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(linked.unresolved(), 1);
    }

    #[test]
    fn bare_and_prefixed_references_resolve_alike() {
        let linked = link_report(report("R1", &["A", "Observation/C"]), &results());
        assert_eq!(linked.results.len(), 2);
    }

    #[test]
    fn empty_or_missing_references_are_skipped() {
        let mut data = report("R1", &["", "Observation/A"]);
        data.results.push(ResourceReference::default());

        let linked = link_report(data, &results());
        assert_eq!(linked.results.len(), 1);
        assert_eq!(linked.results[0].id().as_str(), "A");
    }

    #[test]
    fn reports_with_nothing_resolved_produce_no_rows() {
        let mut reports = IndexMap::new();
        reports.insert(id("R1"), report("R1", &["Observation/X"]));
        reports.insert(id("R2"), report("R2", &[]));

        let linked = link(reports, &results());
        assert_eq!(linked.len(), 2);
        assert!(flatten(&linked).is_empty());
    }

    #[test]
    fn flattens_in_report_then_citation_order() {
        let mut reports = IndexMap::new();
        reports.insert(id("R2"), report("R2", &["Observation/C"]));
        reports.insert(id("R1"), report("R1", &["Observation/A", "Observation/C"]));

        let rows = flatten(&link(reports, &results()));
        let cells: Vec<_> = rows.iter().map(Row::columns).collect();
        assert_eq!(
            cells,
            vec![
                ["Jane Doe", "123", "Hemoglobin", "2024-01-02", "13.5"],
                ["Jane Doe", "123", "Glucose", "2024-01-01", "95"],
                ["Jane Doe", "123", "Hemoglobin", "2024-01-02", "13.5"],
            ]
        );
    }

    #[test]
    fn conditions_link_with_recorded_date_and_status() {
        let mut results = IndexMap::new();
        results.insert(
            id("C1"),
            ResultResource::Condition(ConditionData {
                id: FieldValue::present("C1"),
                name: FieldValue::present("Asthma"),
                recorded_date: FieldValue::present("2023-05-01"),
                clinical_status: FieldValue::present("active"),
                ..ConditionData::default()
            }),
        );

        let mut data = report("R1", &["Condition/C1"]);
        data.patient.name = FieldValue::Missing;
        let rows = flatten(&[link_report(data, &results)]);

        assert_eq!(
            rows[0].columns(),
            ["N/A", "123", "Asthma", "2023-05-01", "active"]
        );
    }
}
