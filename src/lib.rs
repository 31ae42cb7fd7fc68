//! Ronflex - Evoked Response Analysis
//!
//! Ronflex measures evoked responses in electrophysiology recordings. Each
//! sweep is cropped to an analysis window, thresholded into spikes, split
//! into a stimulus artifact and its responses, and integrated over the
//! inferred response window and a fixed-width control window.
//!
//! # Architecture
//!
//! - [`signal`]: cropped sample series and spike detection
//! - [`analysis`]: per-sweep boundaries, areas and lazily cached metrics
//! - [`source`]: recording providers (JSON sweeps, WAV)
//! - [`study`]: per-recording analysis, export and batch runs
//! - [`cli`]: command-line front end

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod signal;
pub mod source;
pub mod study;

pub use config::AnalysisConfig;
pub use error::{Result, RonflexError};
