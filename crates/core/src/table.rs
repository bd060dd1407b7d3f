//! Tabular (CSV) rendering of extracted records.
//!
//! Every table starts with a fixed header row. Missing fields are written as `N/A`, so a
//! row always has exactly as many cells as the header.

use crate::constants::{
    CONDITION_TABLE_HEADERS, LINKED_TABLE_HEADERS, OBSERVATION_TABLE_HEADERS,
    REPORT_TABLE_HEADERS, RESULTS_SEPARATOR,
};
use crate::linker::Row;
use crate::ExtractResult;
use fhir::{
    ConditionData, DiagnosticReportData, ObservationData, ResourceReference, MISSING_MARKER,
};
use std::io;

/// A record that renders as one table row.
pub trait TableRecord {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TableRecord for Row {
    const HEADERS: &'static [&'static str] = &LINKED_TABLE_HEADERS;

    fn cells(&self) -> Vec<String> {
        self.columns().into_iter().map(str::to_owned).collect()
    }
}

impl TableRecord for ObservationData {
    const HEADERS: &'static [&'static str] = &OBSERVATION_TABLE_HEADERS;

    fn cells(&self) -> Vec<String> {
        [
            &self.id,
            &self.subject.name,
            &self.subject.id,
            &self.date,
            &self.category,
            &self.name,
            &self.value,
            &self.unit,
            &self.interpretation,
            &self.value_string,
            &self.reference_range.low.value,
            &self.reference_range.low.unit,
            &self.reference_range.high.value,
            &self.reference_range.high.unit,
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }
}

impl TableRecord for ConditionData {
    const HEADERS: &'static [&'static str] = &CONDITION_TABLE_HEADERS;

    fn cells(&self) -> Vec<String> {
        [
            &self.id,
            &self.patient.name,
            &self.patient.id,
            &self.asserter.name,
            &self.asserter.id,
            &self.recorded_date,
            &self.name,
            &self.code,
            &self.category,
            &self.clinical_status,
            &self.verification_status,
            &self.onset_date,
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }
}

impl TableRecord for DiagnosticReportData {
    const HEADERS: &'static [&'static str] = &REPORT_TABLE_HEADERS;

    fn cells(&self) -> Vec<String> {
        let mut cells: Vec<String> = [
            &self.id,
            &self.patient.name,
            &self.patient.id,
            &self.date,
            &self.identifier,
            &self.status,
            &self.category,
            &self.code,
            &self.issued,
            &self.performer,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        cells.push(results_cell(&self.results));
        cells
    }
}

/// Flatten result references as `display (ID: id)` joined by `; `.
fn results_cell(results: &[ResourceReference]) -> String {
    if results.is_empty() {
        return MISSING_MARKER.to_owned();
    }
    results
        .iter()
        .map(|r| {
            format!(
                "{} (ID: {})",
                r.display,
                r.target_id().unwrap_or(MISSING_MARKER)
            )
        })
        .collect::<Vec<_>>()
        .join(RESULTS_SEPARATOR)
}

/// Write `records` as CSV with `T::HEADERS` as the first row.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn write_table<'a, W, T, I>(writer: W, records: I) -> ExtractResult<()>
where
    W: io::Write,
    T: TableRecord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(T::HEADERS)?;
    for record in records {
        csv.write_record(record.cells())?;
    }
    csv.flush()?;
    Ok(())
}
