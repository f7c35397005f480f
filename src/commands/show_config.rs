use crate::config::{self, ClientConfig};
use crate::error::AppError;
use std::io::Write;
use std::path::Path;

/// Print the effective configuration, optionally persisting it so later
/// runs pick up the command-line overrides.
pub fn show_config(
    out: &mut impl Write,
    resolved: &ClientConfig,
    path: &Path,
    save: bool,
) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(resolved)
        .map_err(|e| AppError::Config(e.to_string()))?;
    writeln!(out, "{}", json)?;

    if save {
        config::save(path, resolved)?;
        writeln!(out, "saved to {}", path.display())?;
    } else {
        writeln!(out, "config file: {}", path.display())?;
    }
    Ok(())
}
