//! Access to the Tegra MCE, the on-chip firmware that coordinates
//! CPU power-state transitions.
//!
//! Drivers talk to the MCE through the [`MceFirmware`] trait. On hardware
//! it is implemented by [`ari::Ari`], which issues requests through each
//! core's ARI (Abstract Request Interface) register aperture.

#![no_std]

use errno::Result;
use log::debug;

pub mod ari;


/// The ARI interface major version this generation of drivers speaks (T23x).
pub const TEGRA_ARI_VERSION_MAJOR: u32 = 8;

/// The MCE requests drivers use.
pub trait MceFirmware: Send + Sync {
    /// Returns the `(major, minor)` ARI interface version of the firmware.
    fn read_versions(&self) -> Result<(u32, u32)>;
}

/// Whether the MCE firmware speaks an ARI version these drivers support.
///
/// That is, the version query succeeds and reports a major version of at
/// least [`TEGRA_ARI_VERSION_MAJOR`].
pub fn check_mce_version(mce: &dyn MceFirmware) -> bool {
    match mce.read_versions() {
        Ok((major, minor)) => {
            debug!("MCE ARI version {}.{}", major, minor);
            major >= TEGRA_ARI_VERSION_MAJOR
        }
        Err(e) => {
            debug!("MCE version query failed: {}", e);
            false
        }
    }
}
