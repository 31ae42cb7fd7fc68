//! Study export
//!
//! Renders a [`StudyReport`] as text, CSV or JSON and writes the renderings
//! into a fresh per-study directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::StudyReport;
use crate::analysis::SweepRecord;
use crate::error::Result;

/// Output formats for a study report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Txt,
    Csv,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Txt, ExportFormat::Csv, ExportFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// One output file rendered in memory, not yet written
#[derive(Debug, Clone, PartialEq)]
pub struct Rendering {
    pub file_name: String,
    pub contents: String,
}

/// Render a report in the given format
pub fn render(report: &StudyReport, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Txt => Ok(to_txt(report)),
        ExportFormat::Csv => Ok(to_csv(report)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Render a report in every requested format
pub fn render_all(report: &StudyReport, formats: &[ExportFormat]) -> Result<Vec<Rendering>> {
    formats
        .iter()
        .map(|&format| {
            Ok(Rendering {
                file_name: format!("{}.{}", report.name, format.extension()),
                contents: render(report, format)?,
            })
        })
        .collect()
}

const UNKNOWN: &str = "unknown";

pub fn to_txt(report: &StudyReport) -> String {
    let mut out = format!(
        "Study: {}\n\
         Protocol: {}\n\
         Start Time: {}\n\
         Channel: {} ({})\n\
         Sweep Count: {}\n\
         Checksum: {}\n",
        report.name,
        report.protocol.as_deref().unwrap_or(UNKNOWN),
        report
            .start_time
            .map_or_else(|| UNKNOWN.to_string(), |t| t.to_rfc3339()),
        report.channel.name,
        report.channel.units,
        report.sweep_count,
        report.checksum.as_deref().unwrap_or(UNKNOWN),
    );

    for record in &report.records {
        out.push('\n');
        out.push_str(&record.to_txt());
    }

    if !report.failures.is_empty() {
        out.push_str("\nFailed Sweeps:\n");
        for failure in &report.failures {
            out.push_str(&format!(
                "  Sweep {}: {} ({})\n",
                failure.sweep_id, failure.message, failure.code
            ));
        }
    }
    out
}

const STUDY_COLUMNS: [&str; 6] = [
    "Study",
    "Protocol",
    "Start Time",
    "Channel",
    "Units",
    "Sweep Count",
];

/// One row per analysed sweep, prefixed by the study's metadata
pub fn to_csv(report: &StudyReport) -> String {
    let header = STUDY_COLUMNS
        .iter()
        .chain(SweepRecord::SCALAR_COLUMNS.iter())
        .map(|column| csv_field(column))
        .collect::<Vec<_>>()
        .join(",");

    let study = [
        report.name.clone(),
        report.protocol.clone().unwrap_or_default(),
        report.start_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
        report.channel.name.clone(),
        report.channel.units.clone(),
        report.sweep_count.to_string(),
    ];

    let mut out = header;
    out.push('\n');
    for record in &report.records {
        let row = study
            .iter()
            .map(String::as_str)
            .chain(record.scalar_values().iter().map(String::as_str))
            .map(csv_field)
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&row);
        out.push('\n');
    }
    out
}

/// Quote a field when it holds a separator, a quote or a line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Create `<root>/<name>`, or `<name>_1`, `<name>_2`, ... if taken
///
/// `create_dir` fails on an existing directory, so two studies with the
/// same name racing for a slot never share a directory.
pub fn create_unique_dir(root: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(root)?;
    let mut suffix = 0usize;
    loop {
        let candidate = match suffix {
            0 => root.join(name),
            n => root.join(format!("{}_{}", name, n)),
        };
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Write pre-rendered outputs into a fresh directory named after the study
///
/// Either every file is written or the directory is removed again.
pub fn write_renderings(root: &Path, name: &str, renderings: &[Rendering]) -> Result<PathBuf> {
    let dir = create_unique_dir(root, name)?;
    let written = renderings
        .iter()
        .try_for_each(|rendering| fs::write(dir.join(&rendering.file_name), &rendering.contents));

    if let Err(e) = written {
        warn!(study = name, output = %dir.display(), error = %e, "Removing incomplete output");
        if let Err(cleanup) = fs::remove_dir_all(&dir) {
            error!(output = %dir.display(), error = %cleanup, "Failed to remove incomplete output");
        }
        return Err(e.into());
    }

    info!(study = name, output = %dir.display(), "Saved study");
    Ok(dir)
}

/// Render and save a report
pub fn save_report(
    report: &StudyReport,
    root: &Path,
    formats: &[ExportFormat],
) -> Result<PathBuf> {
    let renderings = render_all(report, formats)?;
    write_renderings(root, &report.name, &renderings)
}
