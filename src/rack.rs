//! The Rack
//!
//! A rack owns an arena of devices and an ordered list of connections. Each
//! call to [`Rack::step`] is one tick, split into two phases:
//!
//! 1. every device steps, in registration order;
//! 2. every connection steps, in registration order.
//!
//! Because connections run after all devices, a cable always carries the
//! source's output from the current tick, and the destination consumes it
//! on the next tick. When several cables land on the same input, the one
//! registered last wins.

use crate::config::SimConfig;
use crate::connection::{Connection, ZToA};
use crate::device::{Device, DeviceId, Devices};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Unique identifier for a connection, its position in the update order
pub type ConnectionId = usize;

/// Errors raised while wiring a rack
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RackError {
    #[error("device {0:?} is not registered in this rack")]
    UnknownDevice(DeviceId),
}

/// Ordered collection of devices and connections advanced together
pub struct Rack {
    devices: Devices,
    order: Vec<DeviceId>,
    connections: Vec<Box<dyn Connection>>,
    config: SimConfig,
    ticks: u64,
}

impl Rack {
    /// Create an empty rack
    pub fn new(config: SimConfig) -> Self {
        Self {
            devices: Devices::with_key(),
            order: Vec::new(),
            connections: Vec::new(),
            config,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate()
    }

    /// Register a device. Devices step in the order they are added.
    pub fn add<D: Device + 'static>(&mut self, device: D) -> DeviceId {
        self.add_boxed(Box::new(device))
    }

    pub fn add_boxed(&mut self, mut device: Box<dyn Device>) -> DeviceId {
        device.configure(&self.config);
        let id = self.devices.insert(device);
        self.order.push(id);
        id
    }

    /// Patch `from`'s output into `to`'s A input
    pub fn connect(&mut self, from: DeviceId, to: DeviceId) -> Result<ConnectionId, RackError> {
        self.patch(ZToA::new(from, to))
    }

    /// Register any connection. Connections step in the order they are added.
    pub fn patch<C: Connection + 'static>(
        &mut self,
        connection: C,
    ) -> Result<ConnectionId, RackError> {
        self.validate_device(connection.source())?;
        self.validate_device(connection.destination())?;
        if self.config.verbose() {
            debug!(
                kind = connection.type_id(),
                from = self.get_name(connection.source()).unwrap_or_default(),
                to = self.get_name(connection.destination()).unwrap_or_default(),
                "patched"
            );
        }
        self.connections.push(Box::new(connection));
        Ok(self.connections.len() - 1)
    }

    /// Patch one output into the A input of several devices
    pub fn mult(&mut self, from: DeviceId, to: &[DeviceId]) -> Result<Vec<ConnectionId>, RackError> {
        to.iter().map(|&dest| self.connect(from, dest)).collect()
    }

    pub fn validate_device(&self, id: DeviceId) -> Result<(), RackError> {
        if self.devices.contains_key(id) {
            Ok(())
        } else {
            Err(RackError::UnknownDevice(id))
        }
    }

    /// Advance the whole rack by one sample period
    pub fn step(&mut self) {
        for &id in &self.order {
            if let Some(device) = self.devices.get_mut(id) {
                device.step();
            }
        }
        for connection in &self.connections {
            connection.step(&mut self.devices);
        }

        if self.config.verbose() {
            debug!(tick = self.ticks, outputs = %Outputs(self), "rack step");
        }
        self.ticks += 1;
    }

    /// Advance `ticks` times
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Clamped output of a device
    pub fn z(&self, id: DeviceId) -> Option<f64> {
        self.devices.get(id).map(|d| d.get_z())
    }

    pub fn device(&self, id: DeviceId) -> Option<&dyn Device> {
        self.devices.get(id).map(|d| d.as_ref())
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut (dyn Device + 'static)> {
        self.devices.get_mut(id).map(|d| d.as_mut())
    }

    pub fn get_name(&self, id: DeviceId) -> Option<&str> {
        self.devices.get(id).map(|d| d.name())
    }

    /// Find a device by its diagnostic name (first match in registration order)
    pub fn find(&self, name: &str) -> Option<DeviceId> {
        self.order
            .iter()
            .copied()
            .find(|&id| self.get_name(id) == Some(name))
    }

    /// Iterate over devices in update order
    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &dyn Device)> {
        self.order
            .iter()
            .filter_map(move |&id| self.devices.get(id).map(|d| (id, d.as_ref())))
    }

    pub fn connections(&self) -> &[Box<dyn Connection>] {
        &self.connections
    }

    pub fn device_count(&self) -> usize {
        self.order.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of ticks run since creation or the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Reset every device and the tick counter
    pub fn reset(&mut self) {
        for (_, device) in &mut self.devices {
            device.reset();
        }
        self.ticks = 0;
    }
}

/// `name=z` pairs for the verbose per-tick record
struct Outputs<'a>(&'a Rack);

impl fmt::Display for Outputs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, device)) in self.0.devices().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={:10.6}", device.name(), device.get_z())?;
        }
        Ok(())
    }
}
