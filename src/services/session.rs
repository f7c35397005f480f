//! Analysis session controller.
//!
//! Owns the selected image, its preview, the last result and the last
//! failure. Transitions are synchronous; the two asynchronous effects
//! (preview generation and the network exchange) are described by the
//! tickets returned from [`AnalysisSession::select_image`] and
//! [`AnalysisSession::submit`], and their outcomes come back through
//! [`AnalysisSession::complete_preview`] and
//! [`AnalysisSession::complete_analysis`].

use crate::error::AppError;
use crate::models::analysis_types::AnalysisResult;
use crate::models::image_types::{PreviewRepresentation, PreviewState, SelectedImage};
use crate::models::session_types::{FailureDetail, SessionSnapshot, SessionStatus};

/// Preview work for one selection.
#[derive(Debug, Clone)]
pub struct PreviewTicket {
    pub selection: u64,
    pub image: SelectedImage,
}

/// Network exchange for one accepted submission.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    pub sequence: u64,
    pub image: SelectedImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    /// The session moved on before the completion arrived.
    Stale,
}

#[derive(Debug)]
pub struct AnalysisSession {
    status: SessionStatus,
    image: Option<SelectedImage>,
    preview: PreviewState,
    result: Option<AnalysisResult>,
    failure: Option<FailureDetail>,
    selection_seq: u64,
    submission_seq: u64,
    in_flight: Option<u64>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            image: None,
            preview: PreviewState::Absent,
            result: None,
            failure: None,
            selection_seq: 0,
            submission_seq: 0,
            in_flight: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn failure(&self) -> Option<&FailureDetail> {
        self.failure.as_ref()
    }

    /// Sequence number of the exchange the session is waiting on, if any.
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn can_submit(&self) -> bool {
        self.image.is_some() && self.status != SessionStatus::Submitting
    }

    /// Replace the selection. Valid from every state.
    ///
    /// Result and failure are dropped immediately, and any outstanding
    /// exchange is abandoned: its completion will be reported as stale.
    pub fn select_image(&mut self, image: SelectedImage) -> PreviewTicket {
        if let Some(abandoned) = self.in_flight.take() {
            tracing::info!(
                "abandoning submission #{}: {} selected",
                abandoned,
                image.file_name()
            );
        }

        self.selection_seq += 1;
        self.image = Some(image.clone());
        self.preview = PreviewState::Pending;
        self.result = None;
        self.failure = None;
        self.transition(SessionStatus::ImageSelected);

        PreviewTicket {
            selection: self.selection_seq,
            image,
        }
    }

    /// Start an exchange for the current image.
    ///
    /// Returns `Ok(None)` while another exchange is outstanding; the caller
    /// must not issue a second request. Without an image the status is left
    /// untouched and [`AppError::MissingInput`] is returned.
    pub fn submit(&mut self) -> Result<Option<SubmissionTicket>, AppError> {
        let image = match &self.image {
            Some(image) => image.clone(),
            None => return Err(AppError::MissingInput),
        };

        if self.status == SessionStatus::Submitting {
            tracing::debug!("submit ignored: submission #{:?} outstanding", self.in_flight);
            return Ok(None);
        }

        self.submission_seq += 1;
        self.in_flight = Some(self.submission_seq);
        self.result = None;
        self.failure = None;
        self.transition(SessionStatus::Submitting);

        Ok(Some(SubmissionTicket {
            sequence: self.submission_seq,
            image,
        }))
    }

    pub fn complete_preview(
        &mut self,
        selection: u64,
        outcome: Result<PreviewRepresentation, AppError>,
    ) -> Applied {
        if selection != self.selection_seq {
            tracing::debug!(
                "dropping preview for selection #{} (current #{})",
                selection,
                self.selection_seq
            );
            return Applied::Stale;
        }

        self.preview = match outcome {
            Ok(preview) => PreviewState::Ready(preview),
            Err(e) => {
                // Submission never depends on the preview
                tracing::warn!("preview unavailable: {}", e);
                PreviewState::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        Applied::Accepted
    }

    pub fn complete_analysis(
        &mut self,
        sequence: u64,
        outcome: Result<AnalysisResult, AppError>,
    ) -> Applied {
        if self.status != SessionStatus::Submitting || self.in_flight != Some(sequence) {
            tracing::info!(
                "discarding stale response for submission #{} (status {:?}, waiting on {:?})",
                sequence,
                self.status,
                self.in_flight
            );
            return Applied::Stale;
        }

        self.in_flight = None;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.failure = None;
                self.transition(SessionStatus::Succeeded);
            }
            Err(e) => {
                tracing::warn!("submission #{} failed ({:?}): {}", sequence, e.kind(), e);
                self.result = None;
                self.failure = Some(FailureDetail::from(&e));
                self.transition(SessionStatus::Failed);
            }
        }
        Applied::Accepted
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            file_name: self.image.as_ref().map(|i| i.file_name().to_string()),
            media_type: self.image.as_ref().map(|i| i.media_type().to_string()),
            preview: self.preview.clone(),
            result: self.result.clone(),
            failure: self.failure.clone(),
            can_submit: self.can_submit(),
        }
    }

    fn transition(&mut self, next: SessionStatus) {
        tracing::debug!("session {:?} -> {:?}", self.status, next);
        self.status = next;
    }
}
