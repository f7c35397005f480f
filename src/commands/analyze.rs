use crate::commands::render;
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::image_types::SelectedImage;
use crate::models::session_types::{SessionSnapshot, SessionStatus};
use crate::services::inference_client::{HttpInferenceClient, InferenceClient};
use crate::services::preview_service::{DataUriPreviewGenerator, PreviewGenerator};
use crate::services::presentation::{shape_result, ResultView};
use crate::services::session_driver::SessionDriver;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub session: SessionSnapshot,
    pub view: Option<ResultView>,
}

/// Select, submit and wait for everything outstanding to land.
pub async fn run_analysis<C: InferenceClient, P: PreviewGenerator>(
    driver: &mut SessionDriver<C, P>,
    image: SelectedImage,
) -> Result<AnalysisReport, AppError> {
    driver.select_image(image);
    driver.submit()?;
    driver.settle().await;

    let session = driver.snapshot();
    let view = session.result.as_ref().map(shape_result);
    Ok(AnalysisReport { session, view })
}

pub async fn analyze(
    config: &ClientConfig,
    path: &Path,
    json: bool,
) -> Result<SessionStatus, AppError> {
    let image = SelectedImage::from_path(path).await?;
    let client = HttpInferenceClient::new(config)?;
    let mut driver = SessionDriver::new(client, DataUriPreviewGenerator::from_config(config));

    let report = run_analysis(&mut driver, image).await?;
    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
        println!("{}", out);
    } else {
        render::write_snapshot(&mut std::io::stdout(), &report.session)?;
    }
    Ok(report.session.status)
}
