//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::{Result, RonflexError};
use crate::source::open_recording;
use crate::study::{analyse_and_save, BatchOptions, BatchReport, ExportFormat, FailurePolicy};

/// Analyse a recording or directory and save one report per study.
pub fn analyse(
    path: &Path,
    output: &Path,
    config_path: Option<&Path>,
    policy: FailurePolicy,
    formats: &[ExportFormat],
    plots: bool,
) -> Result<BatchReport> {
    let config = AnalysisConfig::load(config_path)?;
    info!("Analysing {} into {}", path.display(), output.display());

    let options = BatchOptions {
        output: output.to_path_buf(),
        policy,
        formats: formats.to_vec(),
        plots,
    };
    let report = analyse_and_save(path, &config, &options)?;

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &BatchReport) {
    println!(
        "Studies: {} saved, {} failed",
        report.saved.len(),
        report.failed.len()
    );
    for saved in &report.saved {
        println!(
            "  saved  {} -> {} ({} sweeps, {} skipped)",
            saved.source.display(),
            saved.output_dir.display(),
            saved.records,
            saved.failed_sweeps
        );
    }
    for failed in &report.failed {
        println!(
            "  failed {} [{}] {}",
            failed.source.display(),
            failed.code,
            failed.message
        );
    }
}

/// Print a recording's metadata and sweep count.
pub fn inspect(path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = AnalysisConfig::load(config_path)?;
    let source = open_recording(path, &config)?;
    let metadata = source.metadata();

    println!("Recording: {}", metadata.name);
    println!(
        "Protocol: {}",
        metadata.protocol.as_deref().unwrap_or("unknown")
    );
    match metadata.start_time {
        Some(time) => println!("Start time: {}", time.to_rfc3339()),
        None => println!("Start time: unknown"),
    }
    println!("Channels:");
    for (index, channel) in metadata.channels.iter().enumerate() {
        let marker = if index == config.default_channel { "*" } else { " " };
        println!("  {}{} {} ({})", marker, index, channel.name, channel.units);
    }
    println!("Sweeps: {}", source.sweep_count()?);

    Ok(())
}

/// Print the default configuration.
pub fn default_config() -> Result<()> {
    let json = serde_json::to_string_pretty(&AnalysisConfig::default())?;
    println!("{}", json);
    Ok(())
}

/// Fail when an aborting batch still reports failures.
pub fn check_policy(report: &BatchReport, policy: FailurePolicy) -> Result<()> {
    if policy == FailurePolicy::Abort && !report.failed.is_empty() {
        return Err(RonflexError::BatchAborted {
            failed: report.failed.len(),
            total: report.total(),
        });
    }
    Ok(())
}
