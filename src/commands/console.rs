use crate::commands::render;
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::image_types::SelectedImage;
use crate::models::session_types::SessionStatus;
use crate::services::inference_client::{HttpInferenceClient, InferenceClient};
use crate::services::preview_service::{DataUriPreviewGenerator, PreviewGenerator};
use crate::services::session::Applied;
use crate::services::session_driver::{DriverEvent, SessionDriver};
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

const HELP: &str = "commands: select <path> | submit | status | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Select(PathBuf),
    Submit,
    Status,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "select" | "open" => {
            if rest.is_empty() {
                return Err("select needs a file path".to_string());
            }
            ConsoleCommand::Select(PathBuf::from(rest))
        }
        "submit" | "analyze" => ConsoleCommand::Submit,
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command {:?}; {}", other, HELP)),
    };
    Ok(Some(command))
}

pub async fn console(config: &ClientConfig) -> Result<(), AppError> {
    let client = HttpInferenceClient::new(config)?;
    let driver = SessionDriver::new(client, DataUriPreviewGenerator::from_config(config));
    let mut out = std::io::stdout();
    writeln!(out, "heartscan console, service at {}", config.endpoint)?;
    writeln!(out, "{}", HELP)?;
    run_console(driver, BufReader::new(tokio::io::stdin()), &mut out).await
}

/// Read commands line by line while applying completions as they land.
pub async fn run_console<C, P, R, W>(
    mut driver: SessionDriver<C, P>,
    input: R,
    out: &mut W,
) -> Result<(), AppError>
where
    C: InferenceClient,
    P: PreviewGenerator,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    prompt(out)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Some(ConsoleCommand::Quit)) => break,
                    Ok(Some(command)) => handle(&mut driver, command, out).await?,
                    Ok(None) => {}
                    Err(message) => writeln!(out, "{}", message)?,
                }
                prompt(out)?;
            }
            Some(event) = driver.next_completion(), if driver.has_pending() => {
                report(&driver, event, out)?;
            }
        }
    }

    if driver.has_pending() {
        tracing::info!("leaving with outstanding work; results are dropped");
    }
    Ok(())
}

async fn handle<C: InferenceClient, P: PreviewGenerator>(
    driver: &mut SessionDriver<C, P>,
    command: ConsoleCommand,
    out: &mut impl Write,
) -> io::Result<()> {
    match command {
        ConsoleCommand::Select(path) => match SelectedImage::from_path(&path).await {
            Ok(image) => {
                driver.select_image(image);
                writeln!(out, "{}", render::status_line(&driver.snapshot()))
            }
            Err(e) => writeln!(out, "error: {}", e),
        },
        ConsoleCommand::Submit => match driver.submit() {
            Ok(true) => writeln!(out, "{}", render::status_line(&driver.snapshot())),
            Ok(false) => writeln!(out, "analysis already in progress"),
            Err(e) => writeln!(out, "{}", e.user_message()),
        },
        ConsoleCommand::Status => render::write_snapshot(out, &driver.snapshot()),
        ConsoleCommand::Help => writeln!(out, "{}", HELP),
        ConsoleCommand::Quit => Ok(()),
    }
}

fn report<C: InferenceClient, P: PreviewGenerator>(
    driver: &SessionDriver<C, P>,
    event: DriverEvent,
    out: &mut impl Write,
) -> io::Result<()> {
    match event {
        DriverEvent::Analysis {
            applied: Applied::Accepted,
            ..
        } => {
            writeln!(out)?;
            render::write_snapshot(out, &driver.snapshot())?;
            prompt(out)
        }
        DriverEvent::Preview {
            applied: Applied::Accepted,
            ..
        } if driver.snapshot().status != SessionStatus::Submitting => {
            writeln!(out)?;
            writeln!(out, "{}", render::status_line(&driver.snapshot()))?;
            prompt(out)
        }
        _ => Ok(()),
    }
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}
