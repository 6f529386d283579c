extern crate std;

use self::std::sync::Mutex as StdMutex;
use self::std::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::critical_timings::*;
use crate::*;

struct FakeClock(AtomicU64);

impl FakeClock {
    fn advance_us(&self, us: u64) {
        self.0.fetch_add(us * 1000, Ordering::SeqCst);
    }
}

impl ClockSource for FakeClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.0.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
struct FakeTimer {
    armed: StdMutex<Vec<Duration>>,
}

impl ClockEventDevice for FakeTimer {
    fn name(&self) -> &'static str {
        "fake"
    }
    fn min_delta(&self) -> Duration {
        Duration::from_micros(1)
    }
    fn max_delta(&self) -> Duration {
        Duration::from_secs(20)
    }
    fn set_next_event(&self, delta: Duration) -> Result<()> {
        self.armed.lock().unwrap().push(delta);
        Ok(())
    }
}

fn cpu(n: u32) -> CpuId {
    CpuId::new(n).unwrap()
}

#[test]
fn program_event_in_the_future() {
    let clock = FakeClock(AtomicU64::new(5_000_000));
    let timer = FakeTimer::default();
    let tick = TickDevice::new(&clock, &timer);

    let expires = tick.now() + Duration::from_micros(100);
    assert_eq!(tick.program_event(expires, false), Ok(Duration::from_micros(100)));
    assert_eq!(*timer.armed.lock().unwrap(), [Duration::from_micros(100)]);
}

#[test]
fn expired_deadline_needs_force() {
    let clock = FakeClock(AtomicU64::new(5_000_000));
    let timer = FakeTimer::default();
    let tick = TickDevice::new(&clock, &timer);

    let past = tick.now() - Duration::from_micros(1);
    assert_eq!(tick.program_event(past, false), Err(Errno::TimeExpired));
    assert_eq!(tick.program_event(tick.now(), false), Err(Errno::TimeExpired));
    assert!(timer.armed.lock().unwrap().is_empty());

    assert_eq!(tick.program_event(past, true), Ok(Duration::from_micros(1)));
}

#[test]
fn deltas_are_clamped_to_the_device_range() {
    let clock = FakeClock(AtomicU64::new(0));
    let timer = FakeTimer::default();
    let tick = TickDevice::new(&clock, &timer);

    assert_eq!(tick.program_event(Duration::from_nanos(10), false), Ok(Duration::from_micros(1)));
    assert_eq!(tick.program_event(Duration::from_secs(60), false), Ok(Duration::from_secs(20)));
}

#[test]
fn nohz_idle_accounting() {
    let clock = FakeClock(AtomicU64::new(0));
    let timer = FakeTimer::default();
    let tick = TickDevice::new(&clock, &timer);
    let c = cpu(3);

    tick.nohz_idle_enter(c);
    assert!(tick.idle_stats(c).in_idle);
    clock.advance_us(250);
    tick.nohz_idle_exit(c);

    tick.nohz_idle_enter(c);
    clock.advance_us(50);
    tick.nohz_idle_exit(c);

    let stats = tick.idle_stats(c);
    assert!(!stats.in_idle);
    assert_eq!(stats.idle_sleeps, 2);
    assert_eq!(stats.idle_time, Duration::from_micros(300));
    assert_eq!(tick.idle_stats(cpu(4)), IdleStats::default());
}

#[test]
fn unbalanced_nohz_calls_are_ignored() {
    let clock = FakeClock(AtomicU64::new(0));
    let timer = FakeTimer::default();
    let tick = TickDevice::new(&clock, &timer);
    let c = cpu(1);

    tick.nohz_idle_exit(c);
    assert_eq!(tick.idle_stats(c), IdleStats::default());

    tick.nohz_idle_enter(c);
    tick.nohz_idle_enter(c);
    assert_eq!(tick.idle_stats(c).idle_sleeps, 1);
}

#[test]
fn critical_timings_nest() {
    // A CPU no other test touches, since the table is global.
    let c = cpu(9);
    assert!(!critical_timings_stopped(c));
    stop_critical_timings(c);
    stop_critical_timings(c);
    start_critical_timings(c);
    assert!(critical_timings_stopped(c));
    start_critical_timings(c);
    assert!(!critical_timings_stopped(c));
}

#[test]
#[should_panic(expected = "without being stopped")]
fn critical_timings_underflow_is_a_bug() {
    start_critical_timings(cpu(10));
}
