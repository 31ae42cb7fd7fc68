//! Batch analysis
//!
//! Finds every recording under a path, analyses the studies in parallel and
//! saves their reports. All renderings are produced in memory first so an
//! aborted batch leaves the output directory untouched.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use super::export::{render_all, write_renderings, ExportFormat, Rendering};
use super::plot::sweep_svg;
use super::{FailurePolicy, Study, StudyReport};
use crate::config::AnalysisConfig;
use crate::error::{Result, RonflexError};
use crate::source::is_recording;

/// Where and how a batch writes its results
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub output: PathBuf,
    pub policy: FailurePolicy,
    pub formats: Vec<ExportFormat>,
    /// Also draw one SVG plot per sweep
    pub plots: bool,
}

impl BatchOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            policy: FailurePolicy::default(),
            formats: ExportFormat::ALL.to_vec(),
            plots: false,
        }
    }
}

/// A study whose outputs were written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedStudy {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub records: usize,
    pub failed_sweeps: usize,
}

/// A study that produced no output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedStudy {
    pub source: PathBuf,
    pub code: String,
    pub message: String,
}

impl FailedStudy {
    fn new(source: &Path, error: &RonflexError) -> Self {
        Self {
            source: source.to_path_buf(),
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub saved: Vec<SavedStudy>,
    pub failed: Vec<FailedStudy>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.saved.len() + self.failed.len()
    }
}

/// Recordings at `path`: the file itself, or every recording below a
/// directory, sorted
pub fn collect_recordings(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(RonflexError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut recordings = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.map_err(|e| {
            RonflexError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
            )
        })?;
        if entry.file_type().is_file() && is_recording(entry.path()) {
            recordings.push(entry.into_path());
        }
    }
    recordings.sort();
    Ok(recordings)
}

/// Open, analyse and render one recording
fn prepare_study(
    path: &Path,
    config: &AnalysisConfig,
    options: &BatchOptions,
) -> Result<(StudyReport, Vec<Rendering>)> {
    let study = Study::open(path, config)?;
    let report = study.analyse(options.policy)?;
    let mut renderings = render_all(&report, &options.formats)?;

    if options.plots {
        for sweep in study.sweeps() {
            if let Some(svg) = sweep_svg(sweep, study.name(), study.channel())? {
                renderings.push(Rendering {
                    file_name: format!("{}_sweep_{}.svg", study.name(), sweep.id()),
                    contents: svg,
                });
            }
        }
    }
    Ok((report, renderings))
}

/// Analyse every recording under `path` and save the reports
///
/// # Errors
/// * `FileNotFound` - `path` does not exist
/// * `BatchAborted` - the policy is [`FailurePolicy::Abort`] and a study
///   failed; nothing has been written
pub fn analyse_and_save(
    path: &Path,
    config: &AnalysisConfig,
    options: &BatchOptions,
) -> Result<BatchReport> {
    config.validate()?;
    let recordings = collect_recordings(path)?;
    if recordings.is_empty() {
        warn!(path = %path.display(), "No recordings found");
        return Ok(BatchReport::default());
    }
    info!(path = %path.display(), studies = recordings.len(), "Starting batch");

    let prepared: Vec<_> = recordings
        .par_iter()
        .map(|recording| {
            let outcome = prepare_study(recording, config, options);
            if let Err(e) = &outcome {
                error!(study = %recording.display(), error = %e, "Study failed");
            }
            (recording, outcome)
        })
        .collect();

    let failed_count = prepared.iter().filter(|(_, o)| o.is_err()).count();
    if options.policy == FailurePolicy::Abort && failed_count > 0 {
        return Err(RonflexError::BatchAborted {
            failed: failed_count,
            total: prepared.len(),
        });
    }

    let outcomes: Vec<_> = prepared
        .into_par_iter()
        .map(|(recording, outcome)| {
            let written = outcome.and_then(|(report, renderings)| {
                let dir = write_renderings(&options.output, &report.name, &renderings)?;
                Ok(SavedStudy {
                    source: recording.clone(),
                    output_dir: dir,
                    records: report.records.len(),
                    failed_sweeps: report.failures.len(),
                })
            });
            (recording, written)
        })
        .collect();

    let mut report = BatchReport::default();
    for (recording, outcome) in outcomes {
        match outcome {
            Ok(saved) => report.saved.push(saved),
            Err(e) => report.failed.push(FailedStudy::new(recording, &e)),
        }
    }

    info!(
        saved = report.saved.len(),
        failed = report.failed.len(),
        "Finished batch"
    );
    Ok(report)
}
