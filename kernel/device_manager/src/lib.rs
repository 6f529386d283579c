//! Binds platform drivers to the platform devices described by the device tree.
//!
//! A [`PlatformDevice`] carries the `compatible` strings of its device-tree
//! node. A [`PlatformDriver`] lists the strings it handles in its
//! `of_match_table()`. Whenever a driver or a device is registered, every
//! unbound device is matched against every driver; on a match the driver's
//! `attach()` runs, and the device is bound only if it succeeds.

#![no_std]

extern crate alloc;

use alloc::{string::String, sync::Arc, vec::Vec};
use errno::{Errno, Result};
use log::{debug, info, warn};
use spin::Mutex;

#[cfg(test)]
mod test;

/// A device node the platform bus knows about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformDevice {
    name: String,
    compatible: Vec<&'static str>,
}

impl PlatformDevice {
    pub fn new(name: &str, compatible: &[&'static str]) -> Self {
        PlatformDevice {
            name: String::from(name),
            compatible: compatible.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The device's `compatible` strings, most specific first.
    pub fn compatible(&self) -> &[&'static str] {
        &self.compatible
    }

    /// Whether any of this device's `compatible` strings is in `table`.
    pub fn matches(&self, table: &[&str]) -> bool {
        self.compatible.iter().any(|c| table.contains(c))
    }
}

/// A driver for platform devices.
pub trait PlatformDriver: Send + Sync {
    /// The driver's unique name.
    fn name(&self) -> &'static str;

    /// The `compatible` strings this driver handles.
    fn of_match_table(&self) -> &'static [&'static str];

    /// Sets up `dev`. The device is only bound if this succeeds.
    fn attach(&self, dev: &PlatformDevice) -> Result<()>;

    /// Tears down a device that `attach()` set up.
    fn remove(&self, dev: &PlatformDevice) -> Result<()>;
}

struct DeviceEntry {
    dev: PlatformDevice,
    driver: Option<Arc<dyn PlatformDriver>>,
}

struct Bus {
    drivers: Vec<Arc<dyn PlatformDriver>>,
    devices: Vec<DeviceEntry>,
}

impl Bus {
    /// Attaches every unbound device `driver` matches, returning how many got bound.
    fn bind_driver(&mut self, driver: &Arc<dyn PlatformDriver>) -> usize {
        let mut bound = 0;
        for entry in self.devices.iter_mut().filter(|e| e.driver.is_none()) {
            if try_attach(driver, &entry.dev) {
                entry.driver = Some(driver.clone());
                bound += 1;
            }
        }
        bound
    }
}

fn try_attach(driver: &Arc<dyn PlatformDriver>, dev: &PlatformDevice) -> bool {
    if !dev.matches(driver.of_match_table()) {
        return false;
    }
    match driver.attach(dev) {
        Ok(()) => {
            info!("{}: bound to {}", dev.name(), driver.name());
            true
        }
        // The driver looked at the device and decided it isn't one of its own.
        Err(Errno::NoSuchDevice) => {
            debug!("{}: {} declined the device", dev.name(), driver.name());
            false
        }
        Err(e) => {
            warn!("{}: attaching driver {} failed with error {}", dev.name(), driver.name(), e.to_raw());
            false
        }
    }
}

/// The platform bus: registered drivers, registered devices and their bindings.
pub struct DeviceManager {
    bus: Mutex<Bus>,
}

impl DeviceManager {
    pub const fn new() -> Self {
        DeviceManager {
            bus: Mutex::new(Bus {
                drivers: Vec::new(),
                devices: Vec::new(),
            }),
        }
    }

    /// Registers `driver` and binds it to every matching unbound device.
    ///
    /// Returns how many devices it was bound to.
    pub fn register_driver(&self, driver: Arc<dyn PlatformDriver>) -> Result<usize> {
        let mut bus = self.bus.lock();
        if bus.drivers.iter().any(|d| d.name() == driver.name()) {
            return Err(Errno::Busy);
        }
        bus.drivers.push(driver.clone());
        Ok(bus.bind_driver(&driver))
    }

    /// Unbinds `name` from all its devices, calling `remove()` on each, and unregisters it.
    pub fn unregister_driver(&self, name: &str) -> Result<()> {
        let mut bus = self.bus.lock();
        let pos = bus
            .drivers
            .iter()
            .position(|d| d.name() == name)
            .ok_or(Errno::NotFound)?;
        let driver = bus.drivers.remove(pos);
        for entry in bus.devices.iter_mut() {
            if entry.driver.as_ref().map_or(false, |d| Arc::ptr_eq(d, &driver)) {
                unbind(entry);
            }
        }
        Ok(())
    }

    /// Registers `dev` and binds the first registered driver that accepts it.
    ///
    /// Returns the name of that driver, if any.
    pub fn register_device(&self, dev: PlatformDevice) -> Result<Option<&'static str>> {
        let mut bus = self.bus.lock();
        if bus.devices.iter().any(|e| e.dev.name() == dev.name()) {
            return Err(Errno::Exists);
        }
        let driver = bus.drivers.iter().find(|d| try_attach(d, &dev)).cloned();
        let name = driver.as_ref().map(|d| d.name());
        bus.devices.push(DeviceEntry { dev, driver });
        Ok(name)
    }

    /// Unbinds `name` from its driver, if bound, and unregisters it.
    pub fn unregister_device(&self, name: &str) -> Result<()> {
        let mut bus = self.bus.lock();
        let pos = bus
            .devices
            .iter()
            .position(|e| e.dev.name() == name)
            .ok_or(Errno::NotFound)?;
        let mut entry = bus.devices.remove(pos);
        unbind(&mut entry);
        Ok(())
    }

    /// Returns the name of the driver bound to device `name`.
    pub fn bound_driver(&self, name: &str) -> Option<&'static str> {
        self.bus
            .lock()
            .devices
            .iter()
            .find(|e| e.dev.name() == name)
            .and_then(|e| e.driver.as_ref())
            .map(|d| d.name())
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

fn unbind(entry: &mut DeviceEntry) {
    if let Some(driver) = entry.driver.take() {
        if let Err(e) = driver.remove(&entry.dev) {
            warn!("{}: remove with driver {} failed with error {}", entry.dev.name(), driver.name(), e.to_raw());
        }
        debug!("{}: unbound from {}", entry.dev.name(), driver.name());
    }
}

static DEVICE_MANAGER: DeviceManager = DeviceManager::new();

/// Registers `driver` on the system-wide platform bus.
pub fn platform_driver_register(driver: Arc<dyn PlatformDriver>) -> Result<usize> {
    DEVICE_MANAGER.register_driver(driver)
}

/// Unregisters driver `name` from the system-wide platform bus.
pub fn platform_driver_unregister(name: &str) -> Result<()> {
    DEVICE_MANAGER.unregister_driver(name)
}

/// Registers `dev` on the system-wide platform bus.
pub fn platform_device_register(dev: PlatformDevice) -> Result<Option<&'static str>> {
    DEVICE_MANAGER.register_device(dev)
}

/// Returns the system-wide platform bus.
pub fn device_manager() -> &'static DeviceManager {
    &DEVICE_MANAGER
}
