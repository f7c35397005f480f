use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::image_types::{PreviewRepresentation, SelectedImage};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::time::Instant;

/// Turns a selected image into something a view can render.
///
/// Implementations are synchronous; the session driver runs them off the
/// event loop and delivers the outcome as a completion.
pub trait PreviewGenerator: Send + Sync + 'static {
    fn generate(&self, image: &SelectedImage) -> Result<PreviewRepresentation, AppError>;
}

/// Data-URI previews, downsized and orientation-corrected when needed.
#[derive(Debug, Clone)]
pub struct DataUriPreviewGenerator {
    max_edge: u32,
    quality: u8,
}

impl DataUriPreviewGenerator {
    pub fn new(max_edge: u32, quality: u8) -> Self {
        Self { max_edge, quality }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.preview_max_edge, config.preview_quality)
    }
}

impl PreviewGenerator for DataUriPreviewGenerator {
    fn generate(&self, image: &SelectedImage) -> Result<PreviewRepresentation, AppError> {
        let start = Instant::now();
        let bytes = image.bytes();
        let orientation = read_orientation(bytes);

        let (width, height) = reader(bytes)?.into_dimensions()?;

        // Small upright images render as-is
        if orientation == 1 && width <= self.max_edge && height <= self.max_edge {
            tracing::debug!(
                "preview {} passthrough {}x{} in {:?}",
                image.file_name(),
                width,
                height,
                start.elapsed()
            );
            return Ok(PreviewRepresentation {
                data_uri: data_uri(image.media_type(), bytes),
                width,
                height,
            });
        }

        let mut img = downsize(reader(bytes)?.decode()?, self.max_edge);

        if orientation != 1 {
            img = apply_orientation(img, orientation);
        }

        let encoded = encode_jpeg(&img, self.quality)?;
        tracing::debug!(
            "preview {} re-encoded {}x{} -> {}x{} in {:?}",
            image.file_name(),
            width,
            height,
            img.width(),
            img.height(),
            start.elapsed()
        );

        Ok(PreviewRepresentation {
            data_uri: data_uri("image/jpeg", &encoded),
            width: img.width(),
            height: img.height(),
        })
    }
}

fn downsize(mut img: DynamicImage, max_edge: u32) -> DynamicImage {
    // Nearest-neighbour first when far larger than the target box
    let intermediate = max_edge.saturating_mul(2);
    let coarse_limit = intermediate.saturating_mul(2);
    if img.width() > coarse_limit || img.height() > coarse_limit {
        img = img.resize(intermediate, intermediate, FilterType::Nearest);
    }
    if img.width() > max_edge || img.height() > max_edge {
        img = img.resize(max_edge, max_edge, FilterType::Triangle);
    }
    img
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, AppError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::PreviewGeneration(e.to_string()))
}

pub fn data_uri(media_type: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", media_type, b64)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, AppError> {
    // JPEG carries no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| AppError::PreviewGeneration(format!("Failed to encode preview: {}", e)))?;
    Ok(buffer.into_inner())
}

/// EXIF orientation tag, defaulting to 1 when absent or unreadable.
fn read_orientation(bytes: &[u8]) -> u32 {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => *v.first().unwrap_or(&1) as u32,
            exif::Value::Long(ref v) => *v.first().unwrap_or(&1),
            _ => 1,
        },
        None => 1,
    }
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}
