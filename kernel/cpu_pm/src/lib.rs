//! CPU power-management notifications around low-power states.
//!
//! Subsystems whose per-CPU hardware state is lost when a core powers down
//! (e.g., the interrupt controller's CPU interface or PMU counters) register
//! a [`CpuPmNotifier`]. Before a core enters such a state, [`cpu_pm_enter()`]
//! tells every notifier to save its state; after the core wakes,
//! [`cpu_pm_exit()`] tells them to restore it.
//!
//! [`cpu_idle_enter()`] wraps a low-level idle entry in that pair.

#![no_std]

extern crate alloc;

use alloc::{sync::Arc, vec::Vec};
use cpu::CpuId;
use errno::Result;
use log::{error, warn};
use spin::RwLock;

#[cfg(test)]
mod test;

/// What a [`CpuPmNotifier`] is being told.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuPmEvent {
    /// The CPU is about to enter a state that may lose its context.
    Enter,
    /// A later notifier refused `Enter`, so the CPU stays up.
    EnterFailed,
    /// The CPU is back from the low-power state.
    Exit,
}

/// A subsystem that saves and restores per-CPU state around low-power states.
pub trait CpuPmNotifier: Send + Sync {
    /// Handles `event` on `cpu`. Errors are only honored for [`CpuPmEvent::Enter`].
    fn notify(&self, event: CpuPmEvent, cpu: CpuId) -> Result<()>;
}

/// An ordered list of [`CpuPmNotifier`]s.
pub struct CpuPmChain {
    notifiers: RwLock<Vec<Arc<dyn CpuPmNotifier>>>,
}

impl CpuPmChain {
    pub const fn new() -> Self {
        CpuPmChain {
            notifiers: RwLock::new(Vec::new()),
        }
    }

    /// Adds `notifier` to the end of the chain.
    pub fn register(&self, notifier: Arc<dyn CpuPmNotifier>) {
        self.notifiers.write().push(notifier);
    }

    /// Removes `notifier` from the chain.
    pub fn unregister(&self, notifier: &Arc<dyn CpuPmNotifier>) -> core::result::Result<(), &'static str> {
        let mut notifiers = self.notifiers.write();
        let pos = notifiers
            .iter()
            .position(|n| Arc::ptr_eq(n, notifier))
            .ok_or("cpu_pm: notifier was not registered")?;
        notifiers.remove(pos);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.notifiers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifies every notifier that `cpu` is about to lose its context.
    ///
    /// If one of them fails, the ones already notified get
    /// [`CpuPmEvent::EnterFailed`] and its error is returned.
    pub fn enter(&self, cpu: CpuId) -> Result<()> {
        let notifiers = self.notifiers.read();
        for (i, notifier) in notifiers.iter().enumerate() {
            if let Err(e) = notifier.notify(CpuPmEvent::Enter, cpu) {
                warn!("CPU {}: CPU PM enter refused by notifier {}: {}", cpu, i, e);
                for earlier in &notifiers[..i] {
                    let _ = earlier.notify(CpuPmEvent::EnterFailed, cpu);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Notifies every notifier that `cpu` is back up.
    pub fn exit(&self, cpu: CpuId) {
        for notifier in self.notifiers.read().iter() {
            if let Err(e) = notifier.notify(CpuPmEvent::Exit, cpu) {
                error!("CPU {}: CPU PM exit notifier failed: {}", cpu, e);
            }
        }
    }

    /// Enters idle state `index` through `low_level_enter`, bracketed by
    /// [`enter()`](Self::enter) and [`exit()`](Self::exit).
    ///
    /// Index `0` is plain WFI and skips the notifications and `low_level_enter`.
    /// Returns `0` on success; otherwise the negative error number from the
    /// notifiers or from `low_level_enter`, in which case `exit` still ran
    /// if `enter` had succeeded.
    pub fn idle_enter<F>(&self, index: usize, state: u32, low_level_enter: F) -> i32
    where
        F: FnOnce(usize, u32) -> i32,
    {
        if index == 0 {
            cpu_do_idle();
            return 0;
        }
        let cpu = cpu::current_cpu();
        if let Err(e) = self.enter(cpu) {
            return e.to_raw();
        }
        let ret = low_level_enter(index, state);
        self.exit(cpu);
        if ret < 0 {
            ret
        } else {
            0
        }
    }
}

impl Default for CpuPmChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for an interrupt without any state-saving.
fn cpu_do_idle() {
    #[cfg(target_arch = "aarch64")]
    cortex_a::asm::wfi();
}

static CPU_PM_CHAIN: CpuPmChain = CpuPmChain::new();

/// Registers `notifier` on the system-wide chain.
pub fn cpu_pm_register_notifier(notifier: Arc<dyn CpuPmNotifier>) {
    CPU_PM_CHAIN.register(notifier);
}

/// Removes `notifier` from the system-wide chain.
pub fn cpu_pm_unregister_notifier(notifier: &Arc<dyn CpuPmNotifier>) -> core::result::Result<(), &'static str> {
    CPU_PM_CHAIN.unregister(notifier)
}

/// Notifies the system-wide chain that the current CPU is entering a low-power state.
pub fn cpu_pm_enter() -> Result<()> {
    CPU_PM_CHAIN.enter(cpu::current_cpu())
}

/// Notifies the system-wide chain that the current CPU left a low-power state.
pub fn cpu_pm_exit() {
    CPU_PM_CHAIN.exit(cpu::current_cpu())
}

/// [`CpuPmChain::idle_enter()`] on the system-wide chain.
pub fn cpu_idle_enter<F>(index: usize, state: u32, low_level_enter: F) -> i32
where
    F: FnOnce(usize, u32) -> i32,
{
    CPU_PM_CHAIN.idle_enter(index, state, low_level_enter)
}

