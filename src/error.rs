//! Error types for the simulator.
//!
//! The simulation core itself never fails: malformed input collapses into an empty trace. These
//! errors cover the surfaces around it, namely playback control, configuration and terminal I/O.

use thiserror::Error;

/// Errors raised by playback transitions.
#[derive(Debug, Error, PartialEq)]
pub enum PlaybackError {
    #[error(
        "playback speed must be a positive finite multiplier with a schedulable period, got {speed}"
    )]
    InvalidSpeed { speed: f64 },
}

/// Errors raised while validating the command line configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'speed' must lie within [{min}, {max}], got {speed}")]
    SpeedOutOfRange { speed: f64, min: f64, max: f64 },

    #[error("unable to read reference file '{path}': {source}")]
    ReferenceFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top level error for running a simulation session from the command line.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to encode trace: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
