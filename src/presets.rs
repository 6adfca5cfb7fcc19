//! Preset Library
//!
//! Ready-made racks: each preset registers its devices and cables in update
//! order and chooses which outputs go to the mix.
//!
//! # Example
//!
//! ```
//! use cvrack::prelude::*;
//!
//! let library = PresetLibrary::new();
//! let preset = library.get("ring").unwrap();
//! let mut built = preset.build(SimConfig::new(48000.0).unwrap()).unwrap();
//!
//! built.rack.step();
//! let sample = built.mixer.mix(&built.rack);
//! assert!(sample.abs() <= 1.0);
//! ```

use crate::config::SimConfig;
use crate::device::Knobs;
use crate::oscillator::Vfo;
use crate::rack::{Rack, RackError};
use crate::sink::Mixer;
use thiserror::Error;

/// Name of the preset the CLI plays by default
pub const DEFAULT_PRESET: &str = "ring";

/// Error type for preset operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PresetError {
    #[error("preset not found: {0}")]
    NotFound(String),

    #[error("failed to build preset: {0}")]
    Build(#[from] RackError),
}

/// Preset metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// A rack together with the mixer that reads it
pub struct BuiltPatch {
    pub rack: Rack,
    pub mixer: Mixer,
}

type BuildFn = fn(SimConfig) -> Result<BuiltPatch, RackError>;

/// A buildable preset
#[derive(Clone)]
pub struct Preset {
    pub info: PresetInfo,
    build: BuildFn,
}

impl Preset {
    /// Construct and wire the rack
    pub fn build(&self, config: SimConfig) -> Result<BuiltPatch, PresetError> {
        Ok((self.build)(config)?)
    }
}

impl std::fmt::Debug for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preset").field("info", &self.info).finish()
    }
}

/// Preset library containing all available presets
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    _private: (),
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// All presets, in display order
    pub fn list(&self) -> Vec<PresetInfo> {
        Self::all().into_iter().map(|p| p.info).collect()
    }

    /// Get a preset by name
    pub fn get(&self, name: &str) -> Option<Preset> {
        Self::all().into_iter().find(|p| p.info.name == name)
    }

    /// Build a preset by name
    pub fn build(&self, name: &str, config: SimConfig) -> Result<BuiltPatch, PresetError> {
        self.get(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?
            .build(config)
    }

    fn all() -> Vec<Preset> {
        vec![
            Preset {
                info: PresetInfo {
                    name: "ring",
                    description: "Three slow oscillators modulating each other in a loop, \
                                  each sweeping an audio oscillator",
                },
                build: ring,
            },
            Preset {
                info: PresetInfo {
                    name: "tone",
                    description: "A single steady 440 Hz sine",
                },
                build: tone,
            },
        ]
    }
}

fn vfo(name: &str, gain: f64, sensitivity: f64, base: f64) -> Vfo {
    Vfo::new(
        Knobs::new(name)
            .with_gain(gain)
            .with_sensitivity(sensitivity)
            .with_base(base),
    )
}

/// L1 -> L2 -> L3 -> L1 feedback ring; each Ln sweeps Vn.
/// V1 and V2 are mixed; V3 runs but is left out of the mix.
fn ring(config: SimConfig) -> Result<BuiltPatch, RackError> {
    let mut rack = Rack::new(config);

    let l1 = rack.add(vfo("L1", 1.0, 1.1, 10.0));
    let l2 = rack.add(vfo("L2", 1.0, 1.2, 13.0));
    let l3 = rack.add(vfo("L3", 1.0, 1.3, 3.0));

    let v1 = rack.add(vfo("V1", 1.0, 1.0, 555.0));
    let v2 = rack.add(vfo("V2", 1.0, 1.0, 858.0));
    let v3 = rack.add(vfo("V3", 0.2, 1.0, 1000.0));

    rack.connect(l1, l2)?;
    rack.connect(l2, l3)?;
    rack.connect(l3, l1)?;

    rack.connect(l1, v1)?;
    rack.connect(l2, v2)?;
    rack.connect(l3, v3)?;

    let mut mixer = Mixer::new(3.0);
    mixer.tap(&rack, v1)?;
    mixer.tap(&rack, v2)?;

    Ok(BuiltPatch { rack, mixer })
}

fn tone(config: SimConfig) -> Result<BuiltPatch, RackError> {
    let mut rack = Rack::new(config);
    let osc = rack.add(vfo("tone", 1.0, 0.0, 440.0));

    let mut mixer = Mixer::new(1.0);
    mixer.tap(&rack, osc)?;

    Ok(BuiltPatch { rack, mixer })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_library_list() {
        let names: Vec<_> = PresetLibrary::new().list().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["ring", "tone"]);
    }

    #[test]
    fn test_preset_not_found() {
        let err = PresetLibrary::new()
            .build("moog", SimConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, PresetError::NotFound("moog".into()));
        assert_eq!(err.to_string(), "preset not found: moog");
    }

    #[test]
    fn test_ring_structure() {
        let built = PresetLibrary::new()
            .build(DEFAULT_PRESET, SimConfig::default())
            .unwrap();
        let rack = &built.rack;

        let names: Vec<_> = rack.devices().map(|(_, d)| d.name().to_string()).collect();
        assert_eq!(names, vec!["L1", "L2", "L3", "V1", "V2", "V3"]);
        assert_eq!(rack.connection_count(), 6);
        assert_eq!(built.mixer.taps().len(), 2);
        assert_eq!(built.mixer.divisor(), 3.0);

        let v3 = rack.find("V3").unwrap();
        assert_eq!(rack.device(v3).unwrap().knobs().gain, 0.2);

        // first cable closes L1 into L2
        let first = &rack.connections()[0];
        assert_eq!(first.source(), rack.find("L1").unwrap());
        assert_eq!(first.destination(), rack.find("L2").unwrap());
    }

    #[test]
    fn test_ring_stays_in_range() {
        let mut built = PresetLibrary::new()
            .build("ring", SimConfig::new(8000.0).unwrap())
            .unwrap();
        for _ in 0..20_000 {
            built.rack.step();
            let mix = built.mixer.mix(&built.rack);
            assert!(mix.abs() <= 2.0 / 3.0 + 1e-12);
        }
    }

    #[test]
    fn test_ring_modulation_moves_pitch() {
        let mut built = PresetLibrary::new()
            .build("ring", SimConfig::new(8000.0).unwrap())
            .unwrap();
        built.rack.run(2000);

        let v1 = built.rack.find("V1").unwrap();
        let a = built.rack.device(v1).unwrap().knobs().a();
        assert!(a != 0.0, "V1 should be receiving L1's output");
    }

    #[test]
    fn test_tone_preset() {
        let mut built = PresetLibrary::new()
            .build("tone", SimConfig::new(44100.0).unwrap())
            .unwrap();
        built.rack.step();
        let expected = (440.0_f64 / 44100.0).sin();
        assert!((built.mixer.mix(&built.rack) - expected).abs() < 1e-12);
    }
}
