use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Immutable input to one verification run.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub document_path: PathBuf,
    pub selfie_path: Option<PathBuf>,
    pub claimed_name: String,
    pub claimed_primary_id: Option<String>,
    pub claimed_secondary_id: Option<String>,
}

/// Terminal status of a verification run. `Pending` exists only while the
/// pipeline is still progressing; a returned result always carries one of the
/// other four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
    ValidDocument,
    Error,
}

/// Which stages completed successfully. Flags are only ever set while the
/// pipeline is progressing, never after a terminal return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStepFlags {
    pub object_detection_ran: bool,
    pub ocr_completed: bool,
    pub pattern_valid: bool,
    pub data_matched: bool,
    pub face_matched: bool,
}

impl VerificationStepFlags {
    pub fn all_set() -> Self {
        VerificationStepFlags {
            object_detection_ran: true,
            ocr_completed: true,
            pattern_valid: true,
            data_matched: true,
            face_matched: true,
        }
    }
}

/// Fixed set of diagnostic fields. Unset fields are omitted from the JSON
/// output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_doc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_match_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_objects: Option<Vec<String>>,
}

/// Structured fields recovered from the document text. Fields the OCR text
/// did not yield are empty strings, not errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub full_name: String,
    pub pan_number: String,
    pub secondary_id_type: String,
    pub secondary_id_number: String,
    pub date_of_birth: String,
    pub address: String,
    pub gender: String,
}

/// The output record of one verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub status: VerificationStatus,
    pub steps: VerificationStepFlags,
    pub reason: String,
    pub details: VerificationDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ExtractedData>,
}
