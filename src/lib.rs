pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

use clap::Parser;
use commands::{render, Cli, Commands};
use models::session_types::SessionStatus;
use std::process::ExitCode;

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet, cli.log.as_deref());

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            render::print_error(&e);
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    let config_path = cli.config_path();
    runtime.block_on(async move {
        match cli.command {
            Commands::Analyze { image, json } => {
                match commands::analyze::analyze(&config, &image, json).await {
                    Ok(SessionStatus::Succeeded) => ExitCode::SUCCESS,
                    Ok(status) => {
                        tracing::info!("analysis ended as {:?}", status);
                        ExitCode::from(1)
                    }
                    Err(e) => {
                        render::print_error(&e);
                        ExitCode::from(2)
                    }
                }
            }
            Commands::Health => match commands::health::health(&config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    render::print_error(&e);
                    ExitCode::from(1)
                }
            },
            Commands::Config { save } => {
                let mut stdout = std::io::stdout();
                match commands::show_config::show_config(&mut stdout, &config, &config_path, save) {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(e) => {
                        render::print_error(&e);
                        ExitCode::from(1)
                    }
                }
            }
            Commands::Console => match commands::console::console(&config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    render::print_error(&e);
                    ExitCode::from(1)
                }
            },
        }
    })
}
