extern crate std;

use self::std::sync::Mutex as StdMutex;
use self::std::string::{String, ToString};
use self::std::vec::Vec;

use crate::*;

struct TestDriver {
    name: &'static str,
    table: &'static [&'static str],
    attach_result: Result<()>,
    log: StdMutex<Vec<String>>,
}

impl TestDriver {
    fn new(name: &'static str, table: &'static [&'static str], attach_result: Result<()>) -> Arc<Self> {
        Arc::new(TestDriver { name, table, attach_result, log: StdMutex::new(Vec::new()) })
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl PlatformDriver for TestDriver {
    fn name(&self) -> &'static str {
        self.name
    }
    fn of_match_table(&self) -> &'static [&'static str] {
        self.table
    }
    fn attach(&self, dev: &PlatformDevice) -> Result<()> {
        self.log.lock().unwrap().push(std::format!("attach {}", dev.name()));
        self.attach_result
    }
    fn remove(&self, dev: &PlatformDevice) -> Result<()> {
        self.log.lock().unwrap().push(std::format!("remove {}", dev.name()));
        Ok(())
    }
}

const CPUIDLE: &str = "nvidia,tegra23x-cpuidle-debugfs";

fn cpuidle_dev() -> PlatformDevice {
    PlatformDevice::new("cpuidle", &[CPUIDLE])
}

#[test]
fn matching() {
    let dev = PlatformDevice::new("uart", &["nvidia,tegra234-uart", "nvidia,tegra20-uart"]);
    assert!(dev.matches(&["nvidia,tegra20-uart"]));
    assert!(!dev.matches(&[CPUIDLE]));
    assert!(!dev.matches(&[]));
}

#[test]
fn driver_registered_after_device_binds() {
    let dm = DeviceManager::new();
    assert_eq!(dm.register_device(cpuidle_dev()), Ok(None));
    dm.register_device(PlatformDevice::new("other", &["vendor,other"])).unwrap();

    let drv = TestDriver::new("cpuidle-debug-tegra23x", &[CPUIDLE], Ok(()));
    assert_eq!(dm.register_driver(drv.clone()), Ok(1));
    assert_eq!(dm.bound_driver("cpuidle"), Some("cpuidle-debug-tegra23x"));
    assert_eq!(dm.bound_driver("other"), None);
    assert_eq!(drv.log(), ["attach cpuidle"]);
}

#[test]
fn device_registered_after_driver_binds() {
    let dm = DeviceManager::new();
    let drv = TestDriver::new("drv", &[CPUIDLE], Ok(()));
    assert_eq!(dm.register_driver(drv), Ok(0));
    assert_eq!(dm.register_device(cpuidle_dev()), Ok(Some("drv")));
    assert_eq!(dm.register_device(cpuidle_dev()), Err(Errno::Exists));
}

#[test]
fn failed_attach_leaves_device_unbound() {
    let dm = DeviceManager::new();
    dm.register_device(cpuidle_dev()).unwrap();
    for err in [Errno::NoSuchDevice, Errno::NoMemory] {
        let drv = TestDriver::new("failing", &[CPUIDLE], Err(err));
        assert_eq!(dm.register_driver(drv.clone()), Ok(0));
        assert_eq!(dm.bound_driver("cpuidle"), None);
        dm.unregister_driver("failing").unwrap();
        // Never bound, so never removed.
        assert_eq!(drv.log(), ["attach cpuidle"]);
    }
}

#[test]
fn unregister_calls_remove() {
    let dm = DeviceManager::new();
    let drv = TestDriver::new("drv", &[CPUIDLE], Ok(()));
    dm.register_driver(drv.clone()).unwrap();
    dm.register_device(cpuidle_dev()).unwrap();
    dm.register_device(PlatformDevice::new("cpuidle2", &[CPUIDLE])).unwrap();

    dm.unregister_device("cpuidle2").unwrap();
    dm.unregister_driver("drv").unwrap();
    assert_eq!(dm.bound_driver("cpuidle"), None);
    assert_eq!(
        drv.log(),
        ["attach cpuidle", "attach cpuidle2", "remove cpuidle2", "remove cpuidle"].map(|s| s.to_string())
    );
    assert_eq!(dm.unregister_driver("drv"), Err(Errno::NotFound));
    assert_eq!(dm.unregister_device("cpuidle2"), Err(Errno::NotFound));
}

#[test]
fn duplicate_driver_names_are_rejected() {
    let dm = DeviceManager::new();
    dm.register_driver(TestDriver::new("drv", &[CPUIDLE], Ok(()))).unwrap();
    assert_eq!(dm.register_driver(TestDriver::new("drv", &[], Ok(()))), Err(Errno::Busy));
}
