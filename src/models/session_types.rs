use crate::error::{AppError, ErrorKind};
use crate::models::analysis_types::AnalysisResult;
use crate::models::image_types::PreviewState;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    ImageSelected,
    Submitting,
    Succeeded,
    Failed,
}

/// Why the last exchange failed. Only present while `Failed`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FailureDetail {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: String,
}

impl From<&AppError> for FailureDetail {
    fn from(err: &AppError) -> Self {
        FailureDetail {
            kind: err.kind(),
            message: err.user_message(),
            detail: err.to_string(),
        }
    }
}

/// Everything a view needs to render the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub file_name: Option<String>,
    pub media_type: Option<String>,
    pub preview: PreviewState,
    pub result: Option<AnalysisResult>,
    pub failure: Option<FailureDetail>,
    pub can_submit: bool,
}
