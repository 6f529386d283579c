extern crate std;

use self::std::boxed::Box;
use self::std::sync::Mutex as StdMutex;
use self::std::vec::Vec;
use core::time::Duration;
use debugfs::FileOrDir;
use device_manager::DeviceManager;
use forced_idle::IdlePlatform;
use interrupt_controller::{InterruptController, SuspendedIrqs};

use crate::*;

struct FixedMce(Result<(u32, u32)>);

impl MceFirmware for FixedMce {
    fn read_versions(&self) -> Result<(u32, u32)> {
        self.0
    }
}

/// A platform that only records idle entries.
struct SleepRecorder {
    entries: StdMutex<Vec<(usize, u32)>>,
    armed: StdMutex<Vec<Duration>>,
    result: i32,
}

impl InterruptController for SleepRecorder {
    fn suspend_device_irqs(&self) -> SuspendedIrqs { Vec::new() }
    fn resume_device_irqs(&self, suspended: SuspendedIrqs) -> usize { suspended.len() }
}

impl IdlePlatform for SleepRecorder {
    fn interrupt_controller(&self) -> &dyn InterruptController { self }
    fn preempt_disable(&self) { }
    fn preempt_enable_no_resched(&self) { }
    fn tick_nohz_idle_enter(&self) { }
    fn tick_nohz_idle_exit(&self) { }
    fn stop_critical_timings(&self) { }
    fn start_critical_timings(&self) { }
    fn local_irq_disable(&self) { }
    fn local_irq_enable(&self) { }
    fn ktime_get(&self) -> Duration { Duration::ZERO }
    fn tick_program_event(&self, expires: Duration, _force: bool) -> Result<()> {
        self.armed.lock().unwrap().push(expires);
        Ok(())
    }
    fn cpu_idle_enter(&self, index: usize, psci_param: u32) -> i32 {
        self.entries.lock().unwrap().push((index, psci_param));
        self.result
    }
}

fn leak<T>(t: T) -> &'static T {
    Box::leak(Box::new(t))
}

fn driver(mce_major: u32, result: i32) -> (Tegra23xCpuidleDebug<SleepRecorder>, &'static Debugfs) {
    let fs = leak(Debugfs::new());
    let platform = SleepRecorder {
        entries: StdMutex::new(Vec::new()),
        armed: StdMutex::new(Vec::new()),
        result,
    };
    let drv = Tegra23xCpuidleDebug::new(leak(FixedMce(Ok((mce_major, 0)))), fs, leak(ForcedIdleState::new()), platform);
    (drv, fs)
}

fn device() -> PlatformDevice {
    PlatformDevice::new("cpuidle", &OF_MATCH_TABLE)
}

fn path(file: &str) -> alloc::string::String {
    alloc::format!("{}/{}", DEBUGFS_DIR_NAME, file)
}

#[test]
fn attach_creates_both_files() {
    let (drv, fs) = driver(8, 0);
    drv.attach(&device()).unwrap();

    let state = fs.lookup_file(&path(STATE_FILE_NAME)).unwrap();
    let duration = fs.lookup_file(&path(DURATION_FILE_NAME)).unwrap();
    assert_eq!(state.mode().bits(), 0o644);
    assert_eq!(duration.mode().bits(), 0o200);
    assert!(matches!(fs.lookup(DEBUGFS_DIR_NAME), Some(FileOrDir::Dir(_))));
    assert_eq!(duration.read(&mut [0; 8]), Err(Errno::PermissionDenied));
}

#[test]
fn incompatible_mce_is_no_device() {
    let (drv, fs) = driver(7, 0);
    assert_eq!(drv.attach(&device()), Err(Errno::NoSuchDevice));
    assert!(fs.lookup(DEBUGFS_DIR_NAME).is_none());

    let fs = leak(Debugfs::new());
    let platform = SleepRecorder { entries: StdMutex::new(Vec::new()), armed: StdMutex::new(Vec::new()), result: 0 };
    let drv = Tegra23xCpuidleDebug::new(leak(FixedMce(Err(Errno::TimedOut))), fs, leak(ForcedIdleState::new()), platform);
    assert_eq!(drv.attach(&device()), Err(Errno::NoSuchDevice));
}

#[test]
fn directory_failure_is_no_memory() {
    let (drv, fs) = driver(8, 0);
    fs.create_dir(DEBUGFS_DIR_NAME, None).unwrap();
    assert_eq!(drv.attach(&device()), Err(Errno::NoMemory));
    // The directory that was in the way is left alone.
    assert!(fs.lookup(DEBUGFS_DIR_NAME).is_some());
}

#[test]
fn c7_write_idles_for_the_duration() {
    let (drv, fs) = driver(8, 0);
    drv.attach(&device()).unwrap();
    let state = fs.lookup_file(&path(STATE_FILE_NAME)).unwrap();
    let duration = fs.lookup_file(&path(DURATION_FILE_NAME)).unwrap();

    assert_eq!(state.write(b"7\n"), Ok(2));
    assert_eq!(state.read_to_string().unwrap(), "7\n");
    assert_eq!(duration.write(b"1000\n"), Ok(5));

    let platform = drv.forced_idle().platform();
    assert_eq!(*platform.entries.lock().unwrap(), [(7, 0x4000_0007)]);
    assert_eq!(*platform.armed.lock().unwrap(), [Duration::from_millis(1)]);
}

#[test]
fn oist_write_passes_the_firmware_result_through() {
    let (drv, fs) = driver(8, -1);
    drv.attach(&device()).unwrap();
    let state = fs.lookup_file(&path(STATE_FILE_NAME)).unwrap();
    let duration = fs.lookup_file(&path(DURATION_FILE_NAME)).unwrap();

    state.write(b"0x40000008").unwrap();
    assert_eq!(duration.write(b"500"), Err(Errno::NotPermitted));

    let platform = drv.forced_idle().platform();
    assert_eq!(*platform.entries.lock().unwrap(), [(8, 0x4000_0008)]);
    assert!(platform.armed.lock().unwrap().is_empty());
}

#[test]
fn invalid_selector_fails_the_write() {
    let (drv, fs) = driver(8, 0);
    drv.attach(&device()).unwrap();
    let state = fs.lookup_file(&path(STATE_FILE_NAME)).unwrap();
    let duration = fs.lookup_file(&path(DURATION_FILE_NAME)).unwrap();

    for selector in ["0", "8", "3", "0x3ffffff8"] {
        state.write(selector.as_bytes()).unwrap();
        assert_eq!(duration.write(b"1000"), Err(Errno::InvalidArgs), "selector {}", selector);
    }
    assert_eq!(duration.write(b"soon"), Err(Errno::InvalidArgs));
    assert!(drv.forced_idle().platform().entries.lock().unwrap().is_empty());
}

#[test]
fn remove_deletes_the_directory() {
    let (drv, fs) = driver(8, 0);
    drv.attach(&device()).unwrap();
    let duration = fs.lookup_file(&path(DURATION_FILE_NAME)).unwrap();

    drv.remove(&device()).unwrap();
    assert!(fs.lookup(DEBUGFS_DIR_NAME).is_none());
    assert_eq!(duration.write(b"1000"), Err(Errno::Io));
    // Removing again is harmless, and the driver can bind again.
    drv.remove(&device()).unwrap();
    drv.attach(&device()).unwrap();
}

#[test]
fn binds_through_the_device_manager() {
    let (drv, fs) = driver(8, 0);
    let dm = DeviceManager::new();
    dm.register_device(PlatformDevice::new("cpuidle", &["nvidia,tegra23x-cpuidle-debugfs"])).unwrap();
    assert_eq!(dm.register_driver(Arc::new(drv)), Ok(1));
    assert_eq!(dm.bound_driver("cpuidle"), Some(DRIVER_NAME));
    assert!(fs.lookup(DEBUGFS_DIR_NAME).is_some());

    dm.unregister_driver(DRIVER_NAME).unwrap();
    assert!(fs.lookup(DEBUGFS_DIR_NAME).is_none());
}
