use crate::error::AppError;
use crate::models::image_types::PreviewState;
use crate::models::session_types::{SessionSnapshot, SessionStatus};
use crate::services::presentation::{format_percent, shape_result, ResultView, Severity};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

const BAR_WIDTH: usize = 30;

fn paint(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Benign => text.green(),
        Severity::Concerning => text.red(),
        Severity::Unknown => text.blue(),
    }
}

/// Horizontal bar proportional to `probability`, clamped to [0, 1].
pub fn bar(probability: f64, width: usize) -> String {
    let filled = (probability.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let file = snapshot.file_name.as_deref().unwrap_or("no image");
    let preview = match &snapshot.preview {
        PreviewState::Absent => "no preview".to_string(),
        PreviewState::Pending => "preview pending".to_string(),
        PreviewState::Ready(p) => format!("preview {}x{}", p.width, p.height),
        PreviewState::Unavailable { .. } => "preview unavailable".to_string(),
    };
    let status = match snapshot.status {
        SessionStatus::Idle => "idle",
        SessionStatus::ImageSelected => "image selected",
        SessionStatus::Submitting => "analyzing",
        SessionStatus::Succeeded => "done",
        SessionStatus::Failed => "failed",
    };
    format!("[{}] {} ({})", status, file, preview)
}

pub fn write_result(out: &mut impl Write, view: &ResultView) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Diagnosis: {}",
        paint(&view.predicted_class, view.severity).bold()
    )?;
    writeln!(out, "Confidence: {}", format_percent(view.confidence))?;
    if let Some(description) = view.description {
        writeln!(out, "{}", description.dimmed())?;
    }
    writeln!(out)?;
    writeln!(out, "Probability distribution")?;

    let label_width = view
        .ranked
        .iter()
        .map(|entry| entry.label.chars().count())
        .max()
        .unwrap_or(0);
    for entry in &view.ranked {
        let bar = bar(entry.probability, BAR_WIDTH);
        let bar = if entry.is_predicted {
            paint(&bar, entry.severity)
        } else {
            paint(&bar, entry.severity).dimmed()
        };
        writeln!(
            out,
            "  {:<width$}  {}  {:>6}",
            entry.label,
            bar,
            format_percent(entry.probability),
            width = label_width
        )?;
    }
    Ok(())
}

pub fn write_snapshot(out: &mut impl Write, snapshot: &SessionSnapshot) -> io::Result<()> {
    writeln!(out, "{}", status_line(snapshot))?;
    match snapshot.status {
        SessionStatus::Succeeded => {
            if let Some(result) = &snapshot.result {
                write_result(out, &shape_result(result))?;
            }
        }
        SessionStatus::Failed => {
            if let Some(failure) = &snapshot.failure {
                writeln!(out, "{}", failure.message.red())?;
                writeln!(out, "{}", failure.detail.dimmed())?;
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn print_error(err: &AppError) {
    eprintln!("{} {}", "error:".red().bold(), err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image_types::PreviewRepresentation;
    use crate::models::session_types::FailureDetail;

    fn snapshot(status: SessionStatus, preview: PreviewState) -> SessionSnapshot {
        SessionSnapshot {
            status,
            file_name: Some("scan.jpg".to_string()),
            media_type: Some("image/jpeg".to_string()),
            preview,
            result: None,
            failure: None,
            can_submit: status != SessionStatus::Submitting,
        }
    }

    #[test]
    fn bar_scales_with_probability() {
        assert_eq!(bar(0.0, 4), "░░░░");
        assert_eq!(bar(0.5, 4), "██░░");
        assert_eq!(bar(1.0, 4), "████");
        assert_eq!(bar(1.7, 4), "████");
    }

    #[test]
    fn status_line_names_file_and_preview() {
        let ready = PreviewState::Ready(PreviewRepresentation {
            data_uri: String::new(),
            width: 64,
            height: 48,
        });
        assert_eq!(
            status_line(&snapshot(SessionStatus::ImageSelected, ready)),
            "[image selected] scan.jpg (preview 64x48)"
        );
        assert_eq!(
            status_line(&snapshot(SessionStatus::Submitting, PreviewState::Pending)),
            "[analyzing] scan.jpg (preview pending)"
        );
    }

    #[test]
    fn failed_snapshot_shows_generic_message_and_detail() {
        let mut failed = snapshot(SessionStatus::Failed, PreviewState::Absent);
        failed.failure = Some(FailureDetail::from(&AppError::RemoteRejection { status: 502 }));
        let mut out = Vec::new();

        write_snapshot(&mut out, &failed).expect("write to memory");

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[failed] scan.jpg (no preview)"));
        assert!(text.contains("Failed to process image"));
        assert!(text.contains("HTTP 502"));
    }
}
