//! Devices and Their Shared Control Surface
//!
//! Every module in a rack exposes the same control-voltage interface: two
//! inputs (A and B), one output (Z), two output-shaping knobs (bias, gain)
//! and two input-shaping knobs (base, sensitivity). That state lives in
//! [`Knobs`], which each concrete device embeds; the device itself only
//! supplies the per-tick behaviour through [`Device::step`].

use crate::config::SimConfig;
use crate::voltage;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a device registered in a [`Rack`](crate::rack::Rack)
    pub struct DeviceId;
}

/// Arena of devices addressed by handle
pub type Devices = SlotMap<DeviceId, Box<dyn Device>>;

/// Panel state shared by all device types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knobs {
    /// Diagnostic label, no effect on the signal
    pub name: String,

    /// Offset added to the output
    pub bias: f64,

    /// Output amplitude
    pub gain: f64,

    /// Unmodulated input setting (an oscillator's center frequency in Hz)
    pub base: f64,

    /// How strongly input A moves the device (octaves per volt for a VFO)
    pub sensitivity: f64,

    a: f64,
    b: f64,
    z: f64,
}

impl Knobs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bias: 0.0,
            gain: 0.0,
            base: 0.0,
            sensitivity: 0.0,
            a: 0.0,
            b: 0.0,
            z: 0.0,
        }
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Preload input A (clamped like any other write)
    pub fn with_a(mut self, a: f64) -> Self {
        self.set_a(a);
        self
    }

    pub fn set_a(&mut self, v: f64) {
        self.a = voltage::clamp(v);
    }

    pub fn set_b(&mut self, v: f64) {
        self.b = voltage::clamp(v);
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// Output as seen from outside the device, always within range
    pub fn z(&self) -> f64 {
        voltage::clamp(self.z)
    }

    /// Output register as last computed, before clamping
    pub fn raw_z(&self) -> f64 {
        self.z
    }

    /// Store a freshly computed output. Clamping happens on read.
    pub fn store_z(&mut self, z: f64) {
        self.z = z;
    }

    /// Return the signal registers to ground
    pub fn clear_signals(&mut self) {
        self.a = 0.0;
        self.b = 0.0;
        self.z = 0.0;
    }
}

impl Default for Knobs {
    fn default() -> Self {
        Self::new("")
    }
}

/// A module that can sit in a rack and be advanced one sample at a time
pub trait Device: Send {
    /// Shared control surface
    fn knobs(&self) -> &Knobs;

    fn knobs_mut(&mut self) -> &mut Knobs;

    /// Advance one sample period and recompute Z from the current inputs
    fn step(&mut self);

    /// Pick up rack-wide settings; called when the device is registered
    fn configure(&mut self, _config: &SimConfig) {}

    /// Ground the signal registers and clear any internal state.
    /// Shaping knobs are kept.
    fn reset(&mut self) {
        self.knobs_mut().clear_signals();
    }

    /// Device type identifier for diagnostics
    fn type_id(&self) -> &'static str {
        "unknown"
    }

    fn name(&self) -> &str {
        &self.knobs().name
    }

    fn set_a(&mut self, v: f64) {
        self.knobs_mut().set_a(v);
    }

    fn set_b(&mut self, v: f64) {
        self.knobs_mut().set_b(v);
    }

    fn get_z(&self) -> f64 {
        self.knobs().z()
    }

    fn out_bias(&mut self, v: f64) {
        self.knobs_mut().bias = v;
    }

    fn out_gain(&mut self, v: f64) {
        self.knobs_mut().gain = v;
    }

    fn in_base(&mut self, v: f64) {
        self.knobs_mut().base = v;
    }

    fn in_sensitivity(&mut self, v: f64) {
        self.knobs_mut().sensitivity = v;
    }
}
