//! The aarch64 generic timer as a [`ClockSource`] and [`ClockEventDevice`].
//!
//! Docs: <https://developer.arm.com/documentation/102379/latest/>

use core::time::Duration;
use cortex_a::registers::*;
use errno::Result;
use kernel_config::time::{CLOCK_EVENT_MIN_DELTA_NS, NSEC_PER_SEC};
use tock_registers::interfaces::{Readable, Writeable};

use super::{ClockEventDevice, ClockSource};

/// The system counter, read through `CNTPCT_EL0`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PhysicalSystemCounter;

impl PhysicalSystemCounter {
    /// The counter frequency, from `CNTFRQ_EL0`.
    pub fn frequency_hz() -> u64 {
        CNTFRQ_EL0.get()
    }
}

fn ticks_to_duration(ticks: u64, freq: u64) -> Duration {
    let secs = ticks / freq;
    let rem = ticks % freq;
    Duration::new(secs, ((rem as u128 * NSEC_PER_SEC as u128) / freq as u128) as u32)
}

fn duration_to_ticks(d: Duration, freq: u64) -> u64 {
    let ticks = d.as_nanos() * freq as u128 / NSEC_PER_SEC as u128;
    ticks.min(u64::MAX as u128) as u64
}

impl ClockSource for PhysicalSystemCounter {
    fn now(&self) -> Duration {
        ticks_to_duration(CNTPCT_EL0.get(), Self::frequency_hz())
    }
}

/// The current CPU's EL1 physical timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PhysicalTimer;

impl ClockEventDevice for PhysicalTimer {
    fn name(&self) -> &'static str {
        "arch_sys_timer"
    }

    fn min_delta(&self) -> Duration {
        Duration::from_nanos(CLOCK_EVENT_MIN_DELTA_NS)
    }

    fn max_delta(&self) -> Duration {
        // CNTP_TVAL_EL0 is a signed 32-bit downcounter.
        ticks_to_duration(i32::MAX as u64, PhysicalSystemCounter::frequency_hz())
    }

    fn set_next_event(&self, delta: Duration) -> Result<()> {
        let ticks = duration_to_ticks(delta, PhysicalSystemCounter::frequency_hz());
        enable_timer_interrupt(false);
        CNTP_TVAL_EL0.set(ticks);
        enable_timer_interrupt(true);
        Ok(())
    }
}

/// Enables/disables the generic timer interrupt on the current CPU.
///
/// This writes the `CNTP_CTL_EL0` system register.
pub fn enable_timer_interrupt(enable: bool) {
    CNTP_CTL_EL0.write(
          CNTP_CTL_EL0::IMASK.val(0)
        + CNTP_CTL_EL0::ENABLE.val(enable as u64)
    );
}

pub static SYSTEM_COUNTER: PhysicalSystemCounter = PhysicalSystemCounter;
pub static PHYSICAL_TIMER: PhysicalTimer = PhysicalTimer;

/// Registers the generic timer as the system-wide tick device.
pub fn init() -> core::result::Result<(), &'static str> {
    super::init(&SYSTEM_COUNTER, &PHYSICAL_TIMER)
}
