use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::analysis_types::{parse_predict_response, AnalysisResult, ServiceHealth};
use crate::models::image_types::SelectedImage;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::time::{Duration, Instant};

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// One network exchange per call, no retries.
pub trait InferenceClient: Send + Sync + 'static {
    fn analyze(
        &self,
        image: SelectedImage,
    ) -> impl Future<Output = Result<AnalysisResult, AppError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    client: reqwest::Client,
    predict_url: String,
    health_url: String,
}

impl HttpInferenceClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            predict_url: config.predict_url(),
            health_url: config.health_url(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// Probe the service root.
    pub async fn health(&self) -> Result<ServiceHealth, AppError> {
        let response = self.client.get(&self.health_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RemoteRejection {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl InferenceClient for HttpInferenceClient {
    async fn analyze(&self, image: SelectedImage) -> Result<AnalysisResult, AppError> {
        let start = Instant::now();
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.media_type())
            .map_err(|e| {
                AppError::Transport(format!(
                    "cannot build upload for media type {:?}: {}",
                    image.media_type(),
                    e
                ))
            })?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::debug!(
            "POST {} ({}, {} bytes)",
            self.predict_url,
            image.file_name(),
            image.bytes().len()
        );

        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Body is not part of the contract; keep it for the log only
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                "inference service returned HTTP {} for {}: {}",
                status,
                image.file_name(),
                body.chars().take(200).collect::<String>()
            );
            return Err(AppError::RemoteRejection {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let result = parse_predict_response(&body)?;
        tracing::info!(
            "{} classified as {} ({:.3}) in {:?}",
            image.file_name(),
            result.predicted_class,
            result.confidence,
            start.elapsed()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn rejects_invalid_endpoint_at_construction() {
        let config = ClientConfig {
            endpoint: "not a url".to_string(),
            ..ClientConfig::default()
        };
        let err = HttpInferenceClient::new(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn targets_predict_route() {
        let client = HttpInferenceClient::new(&ClientConfig::default())
            .expect("default config should build a client");
        assert_eq!(client.predict_url(), "http://localhost:8000/predict");
    }

    #[tokio::test]
    async fn unencodable_media_type_fails_as_exchange_error() {
        let client = HttpInferenceClient::new(&ClientConfig::default())
            .expect("default config should build a client");
        let image = SelectedImage::new(vec![1, 2, 3], "not a media type", "scan.jpg");

        let err = client.analyze(image).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.user_message(), crate::error::ANALYSIS_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("listener should have an address");
        drop(listener);

        let config = ClientConfig {
            endpoint: format!("http://{}", addr),
            request_timeout_secs: 5,
            ..ClientConfig::default()
        };
        let client = HttpInferenceClient::new(&config).expect("client should build");
        let image = SelectedImage::new(vec![1, 2, 3], "image/jpeg", "scan.jpg");

        let err = client.analyze(image).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
