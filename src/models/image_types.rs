use crate::error::AppError;
use image::ImageFormat;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Raw image chosen by the operator. Replaced wholesale on every selection.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    bytes: Arc<[u8]>,
    media_type: String,
    file_name: String,
}

impl SelectedImage {
    pub fn new(
        bytes: impl Into<Arc<[u8]>>,
        media_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Build a selection from raw bytes, accepting only `image/*` payloads.
    pub fn from_bytes(bytes: Vec<u8>, file_name: &str) -> Result<Self, AppError> {
        let media_type = detect_media_type(file_name, &bytes).ok_or_else(|| {
            AppError::UnsupportedMedia(format!("{} is not a recognised image", file_name))
        })?;
        Ok(Self::new(bytes, media_type, file_name))
    }

    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read image {}: {}", path.display(), e),
            ))
        })?;
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self::from_bytes(bytes, &file_name)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Media type from the file extension, falling back to content sniffing.
pub fn detect_media_type(file_name: &str, bytes: &[u8]) -> Option<&'static str> {
    let by_extension = Path::new(file_name)
        .extension()
        .and_then(ImageFormat::from_extension);

    by_extension
        .or_else(|| image::guess_format(bytes).ok())
        .map(|format| format.to_mime_type())
        .filter(|mime| mime.starts_with("image/"))
}

/// Renderable stand-in for a [`SelectedImage`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRepresentation {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PreviewState {
    Absent,
    Pending,
    Ready(PreviewRepresentation),
    Unavailable { reason: String },
}

impl PreviewState {
    pub fn representation(&self) -> Option<&PreviewRepresentation> {
        match self {
            PreviewState::Ready(preview) => Some(preview),
            _ => None,
        }
    }
}
