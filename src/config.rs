//! Simulation Configuration
//!
//! Settings that every device in a rack reads while stepping. A [`SimConfig`]
//! is validated once, then handed to [`Rack::new`](crate::rack::Rack::new),
//! which passes it down to each device as it is registered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample rate used when none is given
pub const DEFAULT_SAMPLE_RATE: f64 = 8000.0;

/// Errors raised while building configuration, before any tick runs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("output gain must be finite, got {0} dB")]
    InvalidGain(f64),
}

/// Per-run simulation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSimConfig")]
pub struct SimConfig {
    sample_rate: f64,
    verbose: bool,
}

impl SimConfig {
    /// Create a configuration at the given sample rate (samples per second)
    pub fn new(sample_rate: f64) -> Result<Self, ConfigError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            sample_rate,
            verbose: false,
        })
    }

    /// Enable per-tick diagnostic records
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Duration of one tick in seconds
    pub fn delta_time(&self) -> f64 {
        1.0 / self.sample_rate
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Unvalidated form read from a settings file
#[derive(Deserialize)]
struct RawSimConfig {
    sample_rate: f64,
    #[serde(default)]
    verbose: bool,
}

impl TryFrom<RawSimConfig> for SimConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSimConfig) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.sample_rate)?.with_verbose(raw.verbose))
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            verbose: false,
        }
    }
}
