//! Constants used throughout the extraction core.

/// File extension of documents picked up from input directories.
pub const DEFAULT_DOCUMENT_EXTENSION: &str = "xml";

/// Header row of the linked patient/result table.
pub const LINKED_TABLE_HEADERS: [&str; 5] = [
    "Patient Name",
    "Patient ID",
    "Observation/Condition Name",
    "Date",
    "Value",
];

/// Header row of the detailed observation export.
pub const OBSERVATION_TABLE_HEADERS: [&str; 14] = [
    "id",
    "subject_name",
    "subject_id",
    "date",
    "category",
    "code",
    "value",
    "unit",
    "interpretation",
    "value_string",
    "reference_range_low_value",
    "reference_range_low_unit",
    "reference_range_high_value",
    "reference_range_high_unit",
];

/// Header row of the detailed condition export.
pub const CONDITION_TABLE_HEADERS: [&str; 12] = [
    "id",
    "patient_name",
    "patient_id",
    "asserter_name",
    "asserter_id",
    "date_recorded",
    "condition_text",
    "condition_code",
    "category",
    "clinical_status",
    "verification_status",
    "onset_date_time",
];

/// Header row of the detailed diagnostic report export.
pub const REPORT_TABLE_HEADERS: [&str; 11] = [
    "report_id",
    "patient_name",
    "patient_id",
    "effective_date_time",
    "identifier",
    "status",
    "category",
    "code",
    "issued",
    "performer",
    "results",
];

/// Separator between flattened result references in the report export.
pub const RESULTS_SEPARATOR: &str = "; ";
