//! CLI Module
//!
//! Command-line interface for batch evoked-response analysis.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::study::{ExportFormat, FailurePolicy};

/// Ronflex - evoked response analysis for electrophysiology sweeps
#[derive(Parser, Debug)]
#[command(name = "ronflex-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyse a recording, or every recording below a directory
    #[command(name = "analyse")]
    Analyse {
        /// Recording file or directory searched recursively
        path: PathBuf,

        /// Directory receiving one sub-directory per study
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Analysis configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// What to do when a sweep or study fails
        #[arg(long, value_enum, default_value_t = FailurePolicy::Skip)]
        on_error: FailurePolicy,

        /// Output formats
        #[arg(long, value_enum, value_delimiter = ',', default_values_t = ExportFormat::ALL)]
        format: Vec<ExportFormat>,

        /// Also save an SVG plot of every sweep
        #[arg(long)]
        plot: bool,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Print a recording's metadata and sweep count
    #[command(name = "inspect")]
    Inspect {
        /// Recording file
        path: PathBuf,

        /// Analysis configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration as JSON
    #[command(name = "default-config")]
    DefaultConfig,
}
