pub mod analyze;
pub mod console;
pub mod health;
pub mod render;
pub mod show_config;

use crate::config::{self, ClientConfig};
use crate::error::AppError;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "heartscan")]
#[command(about = "Submit cardiac scans to a classification service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Base URL of the inference service
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Explicit tracing filter directives, e.g. `heartscan_lib=debug`
    #[arg(long, global = true, value_name = "DIRECTIVES")]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit one image and print the diagnosis
    Analyze {
        /// Image file to analyse
        image: PathBuf,

        /// Print the session snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the inference service is reachable
    Health,
    /// Interactive session reading commands from stdin
    Console,
    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(config::default_config_path)
    }

    /// File values first, then command-line overrides.
    pub fn resolve_config(&self) -> Result<ClientConfig, AppError> {
        let path = self.config_path();
        let mut resolved = config::load_or_default(&path);

        if let Some(endpoint) = &self.endpoint {
            resolved.endpoint = endpoint.trim().to_string();
        }
        if let Some(timeout) = self.timeout {
            resolved.request_timeout_secs = timeout;
        }

        resolved.validate()?;
        tracing::debug!("using config {:?} (from {})", resolved, path.display());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_global_flags() {
        let cli = Cli::try_parse_from([
            "heartscan",
            "analyze",
            "scan.jpg",
            "--json",
            "--endpoint",
            "http://10.1.1.1:8000",
            "-vv",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.endpoint.as_deref(), Some("http://10.1.1.1:8000"));
        match cli.command {
            Commands::Analyze { image, json } => {
                assert_eq!(image, PathBuf::from("scan.jpg"));
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "endpoint": "http://from-file:8000", "request_timeout_secs": 5 }"#)
            .expect("fixture should write");

        let cli = Cli::try_parse_from([
            "heartscan",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "30",
            "health",
        ])
        .unwrap();
        let resolved = cli.resolve_config().expect("config should resolve");
        assert_eq!(resolved.endpoint, "http://from-file:8000");
        assert_eq!(resolved.request_timeout_secs, 30);

        let cli = Cli::try_parse_from([
            "heartscan",
            "--config",
            path.to_str().unwrap(),
            "--endpoint",
            "http://override:9000",
            "health",
        ])
        .unwrap();
        assert_eq!(cli.resolve_config().unwrap().endpoint, "http://override:9000");
    }

    #[test]
    fn parses_config_save() {
        let cli = Cli::try_parse_from(["heartscan", "config", "--save", "--timeout", "9"])
            .expect("arguments should parse");
        assert!(matches!(cli.command, Commands::Config { save: true }));
        assert_eq!(cli.timeout, Some(9));
    }

    #[test]
    fn invalid_override_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let cli = Cli::try_parse_from([
            "heartscan",
            "--config",
            dir.path().join("absent.json").to_str().unwrap(),
            "--endpoint",
            "nowhere",
            "console",
        ])
        .unwrap();
        assert!(cli.resolve_config().is_err());
    }
}
