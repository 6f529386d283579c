extern crate std;

use self::std::sync::Mutex as StdMutex;
use self::std::vec::Vec;
use errno::Errno;

use crate::*;

type Log = Arc<StdMutex<Vec<(&'static str, CpuPmEvent)>>>;

struct Recorder {
    name: &'static str,
    log: Log,
    refuse_enter: Option<Errno>,
}

impl CpuPmNotifier for Recorder {
    fn notify(&self, event: CpuPmEvent, _cpu: CpuId) -> Result<()> {
        self.log.lock().unwrap().push((self.name, event));
        match (event, self.refuse_enter) {
            (CpuPmEvent::Enter, Some(e)) => Err(e),
            _ => Ok(()),
        }
    }
}

fn chain(refusing: Option<&'static str>) -> (CpuPmChain, Log) {
    let log = Log::default();
    let chain = CpuPmChain::new();
    for name in ["gic", "pmu", "fpu"] {
        chain.register(Arc::new(Recorder {
            name,
            log: log.clone(),
            refuse_enter: (refusing == Some(name)).then_some(Errno::Busy),
        }));
    }
    (chain, log)
}

#[test]
fn idle_enter_brackets_the_low_level_call() {
    let (chain, log) = chain(None);
    let mut seen = None;
    let ret = chain.idle_enter(7, 0x4000_0007, |idx, state| {
        seen = Some((idx, state));
        0
    });
    assert_eq!(ret, 0);
    assert_eq!(seen, Some((7, 0x4000_0007)));
    assert_eq!(
        *log.lock().unwrap(),
        [
            ("gic", CpuPmEvent::Enter),
            ("pmu", CpuPmEvent::Enter),
            ("fpu", CpuPmEvent::Enter),
            ("gic", CpuPmEvent::Exit),
            ("pmu", CpuPmEvent::Exit),
            ("fpu", CpuPmEvent::Exit),
        ]
    );
}

#[test]
fn positive_firmware_results_count_as_success() {
    let (chain, _log) = chain(None);
    assert_eq!(chain.idle_enter(8, 0x4000_0008, |idx, _| idx as i32), 0);
}

#[test]
fn firmware_failure_is_returned_after_exit() {
    let (chain, log) = chain(None);
    assert_eq!(chain.idle_enter(7, 0x4000_0007, |_, _| -1), -1);
    assert_eq!(log.lock().unwrap().last(), Some(&("fpu", CpuPmEvent::Exit)));
}

#[test]
fn refused_enter_rolls_back_and_skips_the_call() {
    let (chain, log) = chain(Some("pmu"));
    let mut called = false;
    let ret = chain.idle_enter(7, 0x4000_0007, |_, _| {
        called = true;
        0
    });
    assert_eq!(ret, Errno::Busy.to_raw());
    assert!(!called);
    assert_eq!(
        *log.lock().unwrap(),
        [
            ("gic", CpuPmEvent::Enter),
            ("pmu", CpuPmEvent::Enter),
            ("gic", CpuPmEvent::EnterFailed),
        ]
    );
}

#[test]
fn index_zero_is_plain_wfi() {
    let (chain, log) = chain(None);
    assert_eq!(chain.idle_enter(0, 0, |_, _| panic!("low-level entry for WFI")), 0);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn unregister() {
    let (chain, _log) = chain(None);
    let extra: Arc<dyn CpuPmNotifier> = Arc::new(Recorder {
        name: "extra",
        log: Log::default(),
        refuse_enter: None,
    });
    assert!(chain.unregister(&extra).is_err());
    chain.register(extra.clone());
    assert_eq!(chain.len(), 4);
    chain.unregister(&extra).unwrap();
    assert_eq!(chain.len(), 3);
}
