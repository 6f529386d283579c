//! Per-CPU preemption counts.
//!
//! A CPU may be preempted only while its count is zero. Code that must
//! stay on its CPU, such as a forced idle period, raises the count with
//! [`disable_preemption()`] and drops it again with
//! [`enable_preemption_no_resched()`].

#![no_std]

use core::sync::atomic::{AtomicU8, Ordering};
use cpu::CpuId;
use kernel_config::cpu::MAX_CPU_CORES;


#[allow(clippy::declare_interior_mutable_const)]
const PREEMPTION_COUNT_ZERO: PreemptionCount = PreemptionCount::new();

/// The per-core preemption count, indexed by a CPU core's logical ID.
static PREEMPTION_COUNT: [PreemptionCount; MAX_CPU_CORES] = [PREEMPTION_COUNT_ZERO; MAX_CPU_CORES];

/// A nesting count of preemption disables.
pub struct PreemptionCount(AtomicU8);

impl PreemptionCount {
    pub const fn new() -> Self {
        PreemptionCount(AtomicU8::new(0))
    }

    /// Returns `true` if nothing currently holds this count.
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed) == 0
    }

    pub fn depth(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    /// Raises the count. Returns `true` if this disabled preemption.
    pub fn increment(&self) -> bool {
        let prev = self.0.fetch_add(1, Ordering::Relaxed);
        if prev == u8::MAX {
            panic!("BUG: Overflow occurred in the preemption counter");
        }
        prev == 0
    }

    /// Lowers the count. Returns `true` if this re-enabled preemption.
    pub fn decrement(&self) -> bool {
        let prev = self.0.fetch_sub(1, Ordering::Relaxed);
        if prev == 0 {
            panic!("BUG: Underflow occurred in the preemption counter");
        }
        prev == 1
    }
}

impl Default for PreemptionCount {
    fn default() -> Self {
        Self::new()
    }
}

/// The count of `cpu`.
pub fn preemption_count(cpu: CpuId) -> &'static PreemptionCount {
    &PREEMPTION_COUNT[cpu.index()]
}

/// Disables preemption on this CPU.
///
/// Every call must be balanced by exactly one
/// [`enable_preemption_no_resched()`] on the same CPU.
pub fn disable_preemption() {
    preemption_count(cpu::current_cpu()).increment();
}

/// Re-enables preemption disabled by [`disable_preemption()`].
///
/// No reschedule is attempted here, even if this re-enables preemption;
/// the next timer tick picks up any pending task switch.
pub fn enable_preemption_no_resched() {
    preemption_count(cpu::current_cpu()).decrement();
}

/// Returns `true` if preemption is currently enabled on this CPU.
///
/// This is only a snapshot; it may change right after returning.
pub fn preemption_enabled() -> bool {
    preemption_count(cpu::current_cpu()).is_enabled()
}
