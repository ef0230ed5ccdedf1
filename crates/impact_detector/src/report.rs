//! Rendering of analysis results.

use crate::affected::{ChangeKind, ImpactedTest};
use crate::analysis::AnalysisReport;
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing output.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot write {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output format for the impacted test list.
#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// Colored, human readable lines.
    #[default]
    Text,
    /// The full report as pretty-printed JSON.
    Json,
}

/// Write `report` to `out` in the requested format.
///
/// # Errors
/// Fails if writing or serialization fails.
pub fn render(
    out: &mut impl Write,
    report: &AnalysisReport,
    format: OutputFormat,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Text => render_text(out, report),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
            Ok(())
        }
    }
}

/// Write the notice for a change set with no files.
///
/// # Errors
/// Fails if writing or serialization fails.
pub fn render_no_changes(out: &mut impl Write, format: OutputFormat) -> Result<(), ReportError> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", "No changed files found.".yellow())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &AnalysisReport::default())?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn render_text(out: &mut impl Write, report: &AnalysisReport) -> Result<(), ReportError> {
    let mut summary = format!(
        "Scanned {} files, {} changed, {} impacted",
        report.files_scanned, report.files_changed, report.files_impacted
    );
    if report.parse_failures > 0 {
        summary.push_str(&format!(", {} skipped (parse errors)", report.parse_failures));
    }
    writeln!(out, "{}", summary.dimmed())?;

    if report.impacted_tests.is_empty() {
        writeln!(out, "{}", "No tests impacted.".green())?;
        return Ok(());
    }

    writeln!(out, "\n{}", "Impacted Tests:".bold())?;
    for test in &report.impacted_tests {
        writeln!(out, "{}", test_line(test))?;
    }
    Ok(())
}

fn test_line(test: &ImpactedTest) -> ColoredString {
    let line = format!(
        "[{}] {}",
        test.change_type.as_str().to_uppercase(),
        test.test_name
    );
    match test.change_type {
        ChangeKind::Added => line.green(),
        ChangeKind::Modified => line.yellow(),
        ChangeKind::Deleted => line.red(),
    }
}

/// Write a graph adjacency mapping as pretty JSON to `path`.
///
/// # Errors
/// Fails if the file cannot be written.
pub fn write_graph(
    path: &Path,
    adjacency: &BTreeMap<String, Vec<String>>,
) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(adjacency)?;
    std::fs::write(path, json).map_err(|source| ReportError::File {
        path: path.to_path_buf(),
        source,
    })
}
