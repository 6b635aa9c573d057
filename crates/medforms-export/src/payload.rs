use jiff::Timestamp;
use medforms_engine::{ResultTree, Submission};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExportError;

/// What leaves the system when a form is submitted: the flattened answers
/// plus enough context to file them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionExport {
    pub form_id: Option<Uuid>,
    pub title: String,
    pub submitted_at: Timestamp,
    pub answers: ResultTree,
}

impl From<&Submission> for SubmissionExport {
    fn from(submission: &Submission) -> Self {
        Self {
            form_id: submission.form_id,
            title: submission.title.clone(),
            submitted_at: submission.submitted_at,
            answers: submission.result.clone(),
        }
    }
}

/// Pretty JSON export of a submission.
pub fn submission_json(submission: &Submission) -> Result<String, ExportError> {
    let export = SubmissionExport::from(submission);
    Ok(serde_json::to_string_pretty(&export)?)
}
