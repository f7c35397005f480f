use crate::error::AppError;
use crate::models::analysis_types::AnalysisResult;
use crate::models::image_types::{PreviewRepresentation, SelectedImage};
use crate::models::session_types::SessionSnapshot;
use crate::services::inference_client::InferenceClient;
use crate::services::preview_service::PreviewGenerator;
use crate::services::session::{AnalysisSession, Applied, PreviewTicket, SubmissionTicket};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

enum Completion {
    Preview {
        selection: u64,
        outcome: Result<PreviewRepresentation, AppError>,
    },
    Analysis {
        sequence: u64,
        outcome: Result<AnalysisResult, AppError>,
    },
}

/// What happened when a completion reached the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    Preview { selection: u64, applied: Applied },
    Analysis { sequence: u64, applied: Applied },
}

/// Runs the session's effects on the current task.
///
/// Outstanding work lives in a `FuturesUnordered`; completions are applied
/// to the session one at a time as they resolve, so state is only ever
/// touched from the task polling the driver. Nothing is cancelled: an
/// abandoned exchange still runs to completion and is then reported stale.
pub struct SessionDriver<C: InferenceClient, P: PreviewGenerator> {
    session: AnalysisSession,
    client: Arc<C>,
    previews: Arc<P>,
    pending: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl<C: InferenceClient, P: PreviewGenerator> SessionDriver<C, P> {
    pub fn new(client: C, previews: P) -> Self {
        Self {
            session: AnalysisSession::new(),
            client: Arc::new(client),
            previews: Arc::new(previews),
            pending: FuturesUnordered::new(),
        }
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn select_image(&mut self, image: SelectedImage) {
        let ticket = self.session.select_image(image);
        self.spawn_preview(ticket);
    }

    /// Returns whether a new exchange was started.
    pub fn submit(&mut self) -> Result<bool, AppError> {
        match self.session.submit()? {
            Some(ticket) => {
                self.spawn_analysis(ticket);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Wait for the next outstanding effect and apply it. `None` when idle.
    pub async fn next_completion(&mut self) -> Option<DriverEvent> {
        let completion = self.pending.next().await?;
        let event = match completion {
            Completion::Preview { selection, outcome } => DriverEvent::Preview {
                selection,
                applied: self.session.complete_preview(selection, outcome),
            },
            Completion::Analysis { sequence, outcome } => DriverEvent::Analysis {
                sequence,
                applied: self.session.complete_analysis(sequence, outcome),
            },
        };
        Some(event)
    }

    /// Drain every outstanding effect.
    pub async fn settle(&mut self) -> Vec<DriverEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_completion().await {
            events.push(event);
        }
        events
    }

    fn spawn_preview(&mut self, ticket: PreviewTicket) {
        let generator = Arc::clone(&self.previews);
        let PreviewTicket { selection, image } = ticket;
        self.pending.push(Box::pin(async move {
            let outcome = tokio::task::spawn_blocking(move || generator.generate(&image))
                .await
                .unwrap_or_else(|e| {
                    Err(AppError::PreviewGeneration(format!("preview task failed: {}", e)))
                });
            Completion::Preview { selection, outcome }
        }));
    }

    fn spawn_analysis(&mut self, ticket: SubmissionTicket) {
        let client = Arc::clone(&self.client);
        let SubmissionTicket { sequence, image } = ticket;
        tracing::debug!("submission #{} started for {}", sequence, image.file_name());
        self.pending.push(Box::pin(async move {
            let outcome = client.analyze(image).await;
            Completion::Analysis { sequence, outcome }
        }));
    }
}
