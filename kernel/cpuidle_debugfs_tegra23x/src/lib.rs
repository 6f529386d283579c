//! Debugfs knobs to force a Tegra23x CPU into a chosen idle state.
//!
//! Once the driver binds, `tegra_cpuidle/` in debugfs holds two files:
//!
//! * `forced_idle_state` (0644): the idle state selector. `7` picks C7;
//!   a value whose low 4 bits are `8` picks an OEM idle state whose PSCI
//!   parameter is the low 32 bits of the value.
//! * `forced_idle_duration_us` (0200): writing a number of microseconds
//!   forces the writing CPU into the selected state. The write returns
//!   once the CPU wakes up, with the result of the idle entry.
//!
//! ```text
//! # echo 7 > /sys/kernel/debug/tegra_cpuidle/forced_idle_state
//! # echo 1000 > /sys/kernel/debug/tegra_cpuidle/forced_idle_duration_us
//! ```

#![no_std]

extern crate alloc;

use alloc::sync::Arc;
use debugfs::{Debugfs, DirRef, Mode, WriteOnlyAttribute};
use device_manager::{PlatformDevice, PlatformDriver};
use errno::{Errno, Result};
use forced_idle::{ForcedIdle, ForcedIdleState, IdlePlatform, KernelIdlePlatform};
use kernel_config::cpuidle::DEBUGFS_DIR_NAME;
use log::{error, info};
use spin::Mutex;
use tegra_mce::{check_mce_version, MceFirmware};

#[cfg(test)]
mod test;

pub const DRIVER_NAME: &str = "cpuidle-debug-tegra23x";
pub static OF_MATCH_TABLE: [&str; 1] = ["nvidia,tegra23x-cpuidle-debugfs"];

pub const STATE_FILE_NAME: &str = "forced_idle_state";
pub const DURATION_FILE_NAME: &str = "forced_idle_duration_us";

const STATE_FILE_MODE: u16 = 0o644;
const DURATION_FILE_MODE: u16 = 0o200;

/// The platform driver.
pub struct Tegra23xCpuidleDebug<P: IdlePlatform + Send + Sync + 'static> {
    mce: &'static dyn MceFirmware,
    debugfs: &'static Debugfs,
    forced_idle: Arc<ForcedIdle<'static, P>>,
    /// The `tegra_cpuidle` directory, while bound.
    node: Mutex<Option<DirRef>>,
}

impl<P: IdlePlatform + Send + Sync + 'static> Tegra23xCpuidleDebug<P> {
    pub fn new(
        mce: &'static dyn MceFirmware,
        debugfs: &'static Debugfs,
        state: &'static ForcedIdleState,
        platform: P,
    ) -> Self {
        Tegra23xCpuidleDebug {
            mce,
            debugfs,
            forced_idle: Arc::new(ForcedIdle::new(state, platform)),
            node: Mutex::new(None),
        }
    }

    pub fn forced_idle(&self) -> &ForcedIdle<'static, P> {
        &self.forced_idle
    }

    fn create_files(&self, dir: &DirRef) -> Result<()> {
        self.debugfs.create_u64(
            STATE_FILE_NAME,
            Mode::from_bits_truncate(STATE_FILE_MODE),
            Some(dir),
            self.forced_idle.state().as_atomic(),
        )?;

        let forced_idle = self.forced_idle.clone();
        self.debugfs.create_file(
            DURATION_FILE_NAME,
            Mode::from_bits_truncate(DURATION_FILE_MODE),
            Some(dir),
            Arc::new(WriteOnlyAttribute(move |duration_us| forced_idle.trigger(duration_us))),
        )?;
        Ok(())
    }

    fn debugfs_init(&self) -> Result<DirRef> {
        let dir = self.debugfs.create_dir(DEBUGFS_DIR_NAME, None).map_err(|e| {
            error!("Couldn't create debugfs node for cpuidle: {}", e);
            Errno::NoMemory
        })?;
        if let Err(e) = self.create_files(&dir) {
            error!("Couldn't create debugfs files for cpuidle: {}", e);
            self.debugfs.remove_recursive(&dir);
            return Err(Errno::NoMemory);
        }
        Ok(dir)
    }
}

impl<P: IdlePlatform + Send + Sync + 'static> PlatformDriver for Tegra23xCpuidleDebug<P> {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn of_match_table(&self) -> &'static [&'static str] {
        &OF_MATCH_TABLE
    }

    fn attach(&self, dev: &PlatformDevice) -> Result<()> {
        if !check_mce_version(self.mce) {
            error!("{}: Incompatible MCE version", dev.name());
            return Err(Errno::NoSuchDevice);
        }
        let dir = self.debugfs_init().map_err(|e| {
            error!("{}: Initializing cpuidle debugfs failed", dev.name());
            e
        })?;
        *self.node.lock() = Some(dir);
        Ok(())
    }

    fn remove(&self, _dev: &PlatformDevice) -> Result<()> {
        if let Some(dir) = self.node.lock().take() {
            self.debugfs.remove_recursive(&dir);
        }
        Ok(())
    }
}

static FORCED_IDLE_STATE: ForcedIdleState = ForcedIdleState::new();

/// Registers the driver on the system-wide platform bus, using `mce` for
/// the firmware version check and the running kernel to idle.
pub fn init(mce: &'static dyn MceFirmware) -> Result<()> {
    let driver = Tegra23xCpuidleDebug::new(mce, debugfs::debugfs(), &FORCED_IDLE_STATE, KernelIdlePlatform::new());
    let bound = device_manager::platform_driver_register(Arc::new(driver))?;
    info!("{}: registered, bound to {} device(s)", DRIVER_NAME, bound);
    Ok(())
}
