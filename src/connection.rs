//! Patch Cables
//!
//! A connection copies one value from a source device to a destination
//! device each time it is stepped. Connections hold device handles, not
//! devices, and resolve them against the rack's arena at step time.

use crate::device::{DeviceId, Devices};

/// A directed patch between two devices
pub trait Connection: Send {
    /// Perform exactly one read from the source and one write to the destination
    fn step(&self, devices: &mut Devices);

    fn source(&self) -> DeviceId;

    fn destination(&self) -> DeviceId;

    /// Connection type identifier for diagnostics
    fn type_id(&self) -> &'static str {
        "unknown"
    }
}

/// Routes the source's Z output into the destination's A input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZToA {
    pub from: DeviceId,
    pub to: DeviceId,
}

impl ZToA {
    pub fn new(from: DeviceId, to: DeviceId) -> Self {
        Self { from, to }
    }
}

impl Connection for ZToA {
    fn step(&self, devices: &mut Devices) {
        // Handles are checked when the cable is patched into a rack
        let Some(z) = devices.get(self.from).map(|d| d.get_z()) else {
            return;
        };
        if let Some(dest) = devices.get_mut(self.to) {
            dest.set_a(z);
        }
    }

    fn source(&self) -> DeviceId {
        self.from
    }

    fn destination(&self) -> DeviceId {
        self.to
    }

    fn type_id(&self) -> &'static str {
        "z2a"
    }
}
