//! Sample Output
//!
//! Turns rack outputs into a raw PCM stream: 16-bit signed little-endian,
//! mono, no header, one sample per tick. The stream format is the whole
//! contract with whatever player consumes it.

use crate::config::ConfigError;
use crate::device::DeviceId;
use crate::rack::{Rack, RackError};
use libm::Libm;
use std::io::{self, Write};
use thiserror::Error;

/// Peak integer amplitude of a normalized sample at 0 dB
pub const FULL_SCALE: f64 = 10000.0;

/// Errors writing the sample stream. Any of these ends the run.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot write sample: {0}")]
    Io(#[from] io::Error),

    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

/// Linear output multiplier derived from a decibel setting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputGain {
    linear: f64,
}

impl OutputGain {
    /// Convert decibels with `10^(db / 10)`
    pub fn from_db(db: f64) -> Result<Self, ConfigError> {
        if !db.is_finite() {
            return Err(ConfigError::InvalidGain(db));
        }
        Ok(Self {
            linear: Libm::<f64>::pow(10.0, db / 10.0),
        })
    }

    pub fn linear(&self) -> f64 {
        self.linear
    }

    /// Scale a normalized sample and truncate it toward zero.
    /// Out-of-range values saturate; NaN becomes silence.
    pub fn quantize(&self, norm: f64) -> i16 {
        (norm * self.linear * FULL_SCALE) as i16
    }
}

impl Default for OutputGain {
    fn default() -> Self {
        Self { linear: 1.0 }
    }
}

/// Sums selected device outputs and divides by a fixed divisor
#[derive(Debug, Clone, PartialEq)]
pub struct Mixer {
    taps: Vec<DeviceId>,
    divisor: f64,
}

impl Mixer {
    pub fn new(divisor: f64) -> Self {
        Self {
            taps: Vec::new(),
            divisor,
        }
    }

    /// Add a device output to the mix
    pub fn tap(&mut self, rack: &Rack, id: DeviceId) -> Result<(), RackError> {
        rack.validate_device(id)?;
        self.taps.push(id);
        Ok(())
    }

    pub fn taps(&self) -> &[DeviceId] {
        &self.taps
    }

    pub fn divisor(&self) -> f64 {
        self.divisor
    }

    /// Normalized mix of the tapped outputs for the current tick
    pub fn mix(&self, rack: &Rack) -> f64 {
        let sum: f64 = self.taps.iter().filter_map(|&id| rack.z(id)).sum();
        sum / self.divisor
    }
}

/// Writes samples as 16-bit little-endian PCM
pub struct PcmWriter<W: Write> {
    inner: W,
    samples: u64,
}

impl<W: Write> PcmWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, samples: 0 }
    }

    /// Write one sample. A partial write is an error, never retried.
    pub fn put(&mut self, sample: i16) -> Result<(), SinkError> {
        let bytes = sample.to_le_bytes();
        let written = self.inner.write(&bytes)?;
        if written != bytes.len() {
            return Err(SinkError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }
        self.samples += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Samples written so far
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Run the rack for `ticks` ticks, writing one mixed sample per tick.
/// Returns the number of samples written.
pub fn render<W: Write>(
    rack: &mut Rack,
    mixer: &Mixer,
    gain: OutputGain,
    out: &mut PcmWriter<W>,
    ticks: u64,
) -> Result<u64, SinkError> {
    for _ in 0..ticks {
        rack.step();
        out.put(gain.quantize(mixer.mix(rack)))?;
    }
    out.flush()?;
    Ok(ticks)
}
