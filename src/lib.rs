//! # cvrack: Modular Synthesizer Rack Simulation
//!
//! `cvrack` simulates an analog-style modular synthesizer one sample at a
//! time. Devices expose a uniform control-voltage surface (inputs A and B,
//! output Z), cables route one device's output into another's input, and a
//! rack advances everything in lockstep.
//!
//! ## Architecture
//!
//! - **Voltage range** - every observed signal is pinned to `[MIN, MAX]`
//! - **Devices** - shared [`Knobs`] state plus a per-type `step`
//! - **Connections** - cables resolved by [`DeviceId`] against the rack's arena
//! - **Rack** - two-phase tick: all devices, then all connections
//! - **Sink** - mixing, gain, and 16-bit PCM serialization
//!
//! ## Quick Start
//!
//! ```rust
//! use cvrack::prelude::*;
//!
//! let config = SimConfig::new(44100.0).unwrap();
//! let mut rack = Rack::new(config);
//!
//! // A slow oscillator sweeping an audio-rate one
//! let lfo = rack.add(Vfo::new(Knobs::new("lfo").with_gain(1.0).with_base(2.0)));
//! let vco = rack.add(Vfo::new(
//!     Knobs::new("vco").with_gain(1.0).with_base(440.0).with_sensitivity(1.0),
//! ));
//! rack.connect(lfo, vco).unwrap();
//!
//! rack.step();
//! let z = rack.z(vco).unwrap();
//! assert!((-1.0..=1.0).contains(&z));
//! ```

pub mod config;
pub mod connection;
pub mod device;
pub mod oscillator;
pub mod presets;
pub mod rack;
pub mod sink;
pub mod telemetry;
pub mod voltage;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigError, SimConfig, DEFAULT_SAMPLE_RATE};
    pub use crate::connection::{Connection, ZToA};
    pub use crate::device::{Device, DeviceId, Devices, Knobs};
    pub use crate::oscillator::{wrap_phase, Vfo};
    pub use crate::presets::{
        BuiltPatch, Preset, PresetError, PresetInfo, PresetLibrary, DEFAULT_PRESET,
    };
    pub use crate::rack::{ConnectionId, Rack, RackError};
    pub use crate::sink::{render, Mixer, OutputGain, PcmWriter, SinkError, FULL_SCALE};
    pub use crate::telemetry::{init_tracing, TelemetryError};
    pub use crate::voltage::{clamp, GND, MAX, MIN};
}

pub use prelude::*;
