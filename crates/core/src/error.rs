//! Error types for simulation construction and visualizer output

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling a simulation
///
/// Nothing in the tick loop returns these: once a [`crate::Simulation`]
/// exists, every step runs to completion.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("failed to read configuration {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("field '{field}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        field: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error(
        "rule '{rule}' requires the neighborhood field '{field}', \
         which '{neighborhood}' does not provide"
    )]
    IncompatibleRule {
        rule: &'static str,
        field: &'static str,
        neighborhood: &'static str,
    },
}

/// Errors raised by a visualizer sink
///
/// The driver reports these through the observer and keeps feeding the
/// remaining sinks.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
