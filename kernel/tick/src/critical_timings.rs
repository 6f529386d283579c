//! Pausing of the interrupts-off latency bookkeeping.
//!
//! A CPU that deliberately sits with interrupts disabled (e.g., inside a
//! firmware idle call) would otherwise be reported as one huge
//! interrupts-off critical section. Between [`stop_critical_timings()`]
//! and [`start_critical_timings()`] such sections aren't measured.

use core::sync::atomic::{AtomicU8, Ordering};
use cpu::CpuId;
use kernel_config::cpu::MAX_CPU_CORES;

#[allow(clippy::declare_interior_mutable_const)]
const ATOMIC_U8_ZERO: AtomicU8 = AtomicU8::new(0);

/// Per-CPU nesting count of paused critical timings.
static PAUSED: [AtomicU8; MAX_CPU_CORES] = [ATOMIC_U8_ZERO; MAX_CPU_CORES];

/// Stops measuring interrupts-off sections on `cpu`.
pub fn stop_critical_timings(cpu: CpuId) {
    PAUSED[cpu.index()].fetch_add(1, Ordering::Relaxed);
}

/// Resumes measuring interrupts-off sections on `cpu`.
pub fn start_critical_timings(cpu: CpuId) {
    let prev = PAUSED[cpu.index()].fetch_sub(1, Ordering::Relaxed);
    if prev == 0 {
        panic!("BUG: critical timings started on CPU {} without being stopped", cpu);
    }
}

/// Whether interrupts-off sections on `cpu` are currently not measured.
pub fn critical_timings_stopped(cpu: CpuId) -> bool {
    PAUSED[cpu.index()].load(Ordering::Relaxed) != 0
}
