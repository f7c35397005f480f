use serde::Serialize;

/// User-facing message shared by every failure of the network exchange.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to process image";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please select an image first")]
    MissingInput,

    #[error("Failed to generate preview: {0}")]
    PreviewGeneration(String),

    #[error("Could not reach the inference service: {0}")]
    Transport(String),

    #[error("Inference service rejected the request: HTTP {status}")]
    RemoteRejection { status: u16 },

    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Classification of an [`AppError`], stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingInput,
    PreviewGeneration,
    Transport,
    RemoteRejection,
    MalformedResponse,
    UnsupportedMedia,
    Config,
    Io,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::MissingInput => ErrorKind::MissingInput,
            AppError::PreviewGeneration(_) => ErrorKind::PreviewGeneration,
            AppError::Transport(_) => ErrorKind::Transport,
            AppError::RemoteRejection { .. } => ErrorKind::RemoteRejection,
            AppError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            AppError::UnsupportedMedia(_) => ErrorKind::UnsupportedMedia,
            AppError::Config(_) => ErrorKind::Config,
            AppError::Io(_) => ErrorKind::Io,
        }
    }

    /// Message shown to the operator. Exchange failures collapse into one
    /// generic retry-eligible message; the kind keeps them apart.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport(_)
            | AppError::RemoteRejection { .. }
            | AppError::MalformedResponse(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::PreviewGeneration(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}
