//! The per-CPU tick: a monotonic clock source, a one-shot clock event
//! device to program wakeups with, and the nohz-idle bookkeeping that
//! tracks when each CPU sits idle with its periodic tick suppressed.
//!
//! Times are expressed as [`Duration`]s since boot, like the kernel's `ktime`.

#![no_std]

use core::time::Duration;
use cpu::CpuId;
use errno::{Errno, Result};
use kernel_config::cpu::MAX_CPU_CORES;
use log::{trace, warn};
use spin::{Mutex, Once};

pub mod critical_timings;
#[cfg(target_arch = "aarch64")]
pub mod generic_timer;

#[cfg(test)]
mod test;

/// A monotonic time source.
pub trait ClockSource: Send + Sync {
    /// Returns the time elapsed since boot.
    fn now(&self) -> Duration;
}

/// A per-CPU timer that raises one interrupt at a programmed point in time.
pub trait ClockEventDevice: Send + Sync {
    fn name(&self) -> &'static str;
    /// The shortest delta the device can be programmed with.
    fn min_delta(&self) -> Duration;
    /// The longest delta the device can be programmed with.
    fn max_delta(&self) -> Duration;
    /// Arms the device to fire `delta` from now on the current CPU.
    fn set_next_event(&self, delta: Duration) -> Result<()>;
}

/// The nohz state of one CPU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdleStats {
    /// Whether the CPU is between [`TickDevice::nohz_idle_enter()`] and `exit`.
    pub in_idle: bool,
    /// When the CPU last entered nohz idle.
    pub idle_entrytime: Duration,
    /// The total time spent in nohz idle.
    pub idle_time: Duration,
    /// How many times the CPU entered nohz idle.
    pub idle_sleeps: u64,
}

impl IdleStats {
    const fn new() -> Self {
        IdleStats {
            in_idle: false,
            idle_entrytime: Duration::ZERO,
            idle_time: Duration::ZERO,
            idle_sleeps: 0,
        }
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const IDLE_STATS_INIT: Mutex<IdleStats> = Mutex::new(IdleStats::new());

/// A clock source and clock event device pair, plus per-CPU nohz state.
pub struct TickDevice<'d> {
    clock: &'d dyn ClockSource,
    event: &'d dyn ClockEventDevice,
    idle: [Mutex<IdleStats>; MAX_CPU_CORES],
}

impl<'d> TickDevice<'d> {
    pub const fn new(clock: &'d dyn ClockSource, event: &'d dyn ClockEventDevice) -> Self {
        TickDevice {
            clock,
            event,
            idle: [IDLE_STATS_INIT; MAX_CPU_CORES],
        }
    }

    /// Returns the current time since boot.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Programs the clock event device to fire at `expires`.
    ///
    /// A deadline that already passed is an error unless `force` is set,
    /// in which case the device is programmed with its minimum delta.
    /// Deltas are clamped to what the device supports.
    /// Returns the delta actually programmed.
    pub fn program_event(&self, expires: Duration, force: bool) -> Result<Duration> {
        let now = self.clock.now();
        if expires <= now && !force {
            return Err(Errno::TimeExpired);
        }
        let delta = expires
            .saturating_sub(now)
            .clamp(self.event.min_delta(), self.event.max_delta());
        trace!("{}: next event in {:?}", self.event.name(), delta);
        self.event.set_next_event(delta)?;
        Ok(delta)
    }

    /// Marks `cpu` as idle with the periodic tick suppressed.
    pub fn nohz_idle_enter(&self, cpu: CpuId) {
        let now = self.clock.now();
        let mut stats = self.idle[cpu.index()].lock();
        if stats.in_idle {
            warn!("CPU {} entered nohz idle twice", cpu);
            return;
        }
        stats.in_idle = true;
        stats.idle_entrytime = now;
        stats.idle_sleeps += 1;
    }

    /// Ends the nohz idle period of `cpu` and accounts the time spent in it.
    pub fn nohz_idle_exit(&self, cpu: CpuId) {
        let now = self.clock.now();
        let mut stats = self.idle[cpu.index()].lock();
        if !stats.in_idle {
            warn!("CPU {} left nohz idle without entering it", cpu);
            return;
        }
        stats.in_idle = false;
        let entrytime = stats.idle_entrytime;
        stats.idle_time += now.saturating_sub(entrytime);
    }

    /// Returns a snapshot of `cpu`'s nohz idle state.
    pub fn idle_stats(&self, cpu: CpuId) -> IdleStats {
        *self.idle[cpu.index()].lock()
    }
}

static TICK_DEVICE: Once<TickDevice<'static>> = Once::new();

/// Registers the system-wide tick device. Can only be done once.
pub fn init(clock: &'static dyn ClockSource, event: &'static dyn ClockEventDevice) -> core::result::Result<(), &'static str> {
    if TICK_DEVICE.is_completed() {
        return Err("tick: the tick device was already registered");
    }
    TICK_DEVICE.call_once(|| TickDevice::new(clock, event));
    Ok(())
}

/// Returns the system-wide tick device, if one was registered.
pub fn tick_device() -> Option<&'static TickDevice<'static>> {
    TICK_DEVICE.get()
}
