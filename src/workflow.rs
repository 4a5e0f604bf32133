//! GitHub Actions workflow commands and step outputs.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Escape data for a workflow command line.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format a workflow command such as `::error::message`.
pub fn format_command(command: &str, message: &str) -> String {
    format!("::{}::{}", command, escape_data(message))
}

fn issue_command(command: &str, message: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{}", format_command(command, message));
    let _ = handle.flush();
}

/// Emit an error annotation.
pub fn error(message: &str) {
    issue_command("error", message);
}

/// Emit a warning annotation.
pub fn warning(message: &str) {
    issue_command("warning", message);
}

/// Append `name=value` pairs to the file named by `GITHUB_OUTPUT`.
///
/// Does nothing outside of a workflow run (variable unset).
pub fn set_outputs(outputs: &[(&str, String)]) -> Result<()> {
    match env::var("GITHUB_OUTPUT") {
        Ok(path) if !path.is_empty() => write_outputs(Path::new(&path), outputs),
        _ => Ok(()),
    }
}

fn write_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    for (name, value) in outputs {
        let written = if value.contains('\n') {
            // Multiline values need the heredoc form.
            let delimiter = format!("pr_assist_{}_eof", name);
            writeln!(file, "{}<<{}\n{}\n{}", name, delimiter, value, delimiter)
        } else {
            writeln!(file, "{}={}", name, value)
        };
        written.with_context(|| format!("Failed to write output '{}'", name))?;
    }

    Ok(())
}
