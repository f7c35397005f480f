use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Largest preview edge accepted from configuration.
pub const MAX_PREVIEW_EDGE: u32 = 8192;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_preview_max_edge")]
    pub preview_max_edge: u32,
    #[serde(default = "default_preview_quality")]
    pub preview_quality: u8,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_preview_max_edge() -> u32 {
    512
}

fn default_preview_quality() -> u8 {
    80
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            preview_max_edge: default_preview_max_edge(),
            preview_quality: default_preview_quality(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| AppError::Config(format!("endpoint {:?}: {}", self.endpoint, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::Config(format!(
                "endpoint {:?} must use http or https",
                self.endpoint
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config("request_timeout_secs must be positive".into()));
        }
        if self.preview_max_edge == 0 || self.preview_max_edge > MAX_PREVIEW_EDGE {
            return Err(AppError::Config(format!(
                "preview_max_edge {} must be within 1..={}",
                self.preview_max_edge, MAX_PREVIEW_EDGE
            )));
        }
        if !(1..=100).contains(&self.preview_quality) {
            return Err(AppError::Config(format!(
                "preview_quality {} must be within 1..=100",
                self.preview_quality
            )));
        }
        Ok(())
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.endpoint.trim_end_matches('/'))
    }

    pub fn health_url(&self) -> String {
        format!("{}/", self.endpoint.trim_end_matches('/'))
    }
}

pub fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("heartscan").join("config.json")
}

pub fn load_or_default(path: &Path) -> ClientConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<ClientConfig>(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring unreadable config {}: {}", path.display(), e);
                ClientConfig::default()
            }
        },
        Err(_) => ClientConfig::default(),
    }
}

pub fn save(path: &Path, config: &ClientConfig) -> Result<(), AppError> {
    let parent = path
        .parent()
        .ok_or_else(|| AppError::Config("config path has no parent directory".into()))?;
    fs::create_dir_all(parent)?;
    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Config(e.to_string()))?;
    fs::write(path, contents)?;
    Ok(())
}
