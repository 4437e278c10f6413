use crate::error::ConfigError;
use crate::policy::Policy;
use crate::reference::ReferenceSequence;
use crate::{DEFAULT_FRAMES, DEFAULT_REFERENCES, DEFAULT_SPEED, MAX_FRAMES, MAX_SPEED, MIN_SPEED};
use clap::{Parser, ValueEnum};
use std::env;

/// How the simulation is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Print the whole trace at once.
    Trace,
    /// Auto-play the trace live.
    Play,
    /// Drive playback by hand from standard input.
    Step,
    /// Summarise every policy on the same references.
    Compare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = env_or_default_str("SIM_REFERENCES", DEFAULT_REFERENCES))]
    pub references: String,

    /// Read the reference string from a file instead of `--references` (env: SIM_FILE_REFERENCES).
    #[arg(long)]
    pub file_references: Option<String>,

    #[arg(long, default_value_t = env_or_default_u32("SIM_FRAMES", DEFAULT_FRAMES))]
    pub frames: u32,

    #[arg(long, value_enum, default_value_t = env_or_default_enum("SIM_POLICY", Policy::Fifo))]
    pub policy: Policy,

    #[arg(long, default_value_t = env_or_default_f64("SIM_SPEED", DEFAULT_SPEED))]
    pub speed: f64,

    #[arg(long, value_enum, default_value_t = env_or_default_enum("SIM_MODE", RunMode::Trace))]
    pub mode: RunMode,

    #[arg(long, value_enum, default_value_t = env_or_default_enum("SIM_FORMAT", Format::Text))]
    pub format: Format,

    /// Hide the per-step rationale.
    #[arg(long)]
    pub quiet_details: bool,
}

impl Config {
    /// Check the values clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// The playback speed must lie within `[MIN_SPEED, MAX_SPEED]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(ConfigError::SpeedOutOfRange {
                speed: self.speed,
                min: MIN_SPEED,
                max: MAX_SPEED,
            });
        }
        Ok(())
    }

    /// Number of frames to simulate, clamped into `[1, MAX_FRAMES]`.
    pub fn capacity(&self) -> usize {
        self.frames.clamp(1, MAX_FRAMES) as usize
    }

    /// Resolve the reference sequence, preferring a reference file when one is configured.
    ///
    /// # Errors
    ///
    /// Fails when the configured reference file cannot be read.
    pub fn load_references(&self) -> Result<ReferenceSequence, ConfigError> {
        let file = self
            .file_references
            .clone()
            .or_else(|| env::var("SIM_FILE_REFERENCES").ok());
        match file {
            Some(path) => ReferenceSequence::read_file(&path)
                .map_err(|source| ConfigError::ReferenceFile { path, source }),
            None => Ok(ReferenceSequence::parse(&self.references)),
        }
    }

    pub fn display(&self) {
        println!("simulation configuration values: ");
        println!("{:#?}", self);
    }
}

fn env_or_default_str(varname: &str, default: &str) -> String {
    match env::var(varname) {
        Ok(val) => val,
        _ => String::from(default),
    }
}

fn env_or_default_u32(varname: &str, default: u32) -> u32 {
    match env::var(varname) {
        Ok(val) => val
            .parse()
            .unwrap_or_else(|_| panic!("expected unsigned int for env var: '{}'", varname)),
        _ => default,
    }
}

fn env_or_default_f64(varname: &str, default: f64) -> f64 {
    match env::var(varname) {
        Ok(val) => val
            .parse()
            .unwrap_or_else(|_| panic!("expected a number for env var: '{}'", varname)),
        _ => default,
    }
}

fn env_or_default_enum<T: ValueEnum>(varname: &str, default: T) -> T {
    match env::var(varname) {
        Ok(val) => T::from_str(&val, true)
            .unwrap_or_else(|_| panic!("unrecognised value '{}' for env var: '{}'", val, varname)),
        _ => default,
    }
}
