//! [`IdlePlatform`] on top of the kernel's own subsystems.

use core::time::Duration;
use errno::{Errno, Result};
use interrupt_controller::{InterruptController, IrqDescTable, IRQ_DESCS};

use crate::executor::IdlePlatform;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "aarch64")] {
        use cortex_a::registers::DAIF;
        use tock_registers::interfaces::ReadWriteable;

        fn arch_local_irq_disable() {
            DAIF.modify(DAIF::I::Masked + DAIF::F::Masked);
        }

        fn arch_local_irq_enable() {
            DAIF.modify(DAIF::I::Unmasked + DAIF::F::Unmasked);
        }
    } else {
        fn arch_local_irq_disable() { }
        fn arch_local_irq_enable() { }
    }
}

/// The running kernel: the system-wide IRQ table, this CPU's preemption
/// count and tick, and PSCI `CPU_SUSPEND` under the CPU PM notifiers.
pub struct KernelIdlePlatform {
    irqs: &'static IrqDescTable,
}

impl KernelIdlePlatform {
    pub const fn new() -> Self {
        KernelIdlePlatform { irqs: &IRQ_DESCS }
    }
}

impl Default for KernelIdlePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl IdlePlatform for KernelIdlePlatform {
    fn interrupt_controller(&self) -> &dyn InterruptController {
        self.irqs
    }

    fn preempt_disable(&self) {
        preemption::disable_preemption();
    }

    fn preempt_enable_no_resched(&self) {
        preemption::enable_preemption_no_resched();
    }

    fn tick_nohz_idle_enter(&self) {
        if let Some(tick) = tick::tick_device() {
            tick.nohz_idle_enter(cpu::current_cpu());
        }
    }

    fn tick_nohz_idle_exit(&self) {
        if let Some(tick) = tick::tick_device() {
            tick.nohz_idle_exit(cpu::current_cpu());
        }
    }

    fn stop_critical_timings(&self) {
        tick::critical_timings::stop_critical_timings(cpu::current_cpu());
    }

    fn start_critical_timings(&self) {
        tick::critical_timings::start_critical_timings(cpu::current_cpu());
    }

    fn local_irq_disable(&self) {
        arch_local_irq_disable();
    }

    fn local_irq_enable(&self) {
        arch_local_irq_enable();
    }

    fn ktime_get(&self) -> Duration {
        tick::tick_device().map_or(Duration::ZERO, |tick| tick.now())
    }

    fn tick_program_event(&self, expires: Duration, force: bool) -> Result<()> {
        let tick = tick::tick_device().ok_or(Errno::NoSuchDevice)?;
        tick.program_event(expires, force).map(|_| ())
    }

    fn cpu_idle_enter(&self, index: usize, psci_param: u32) -> i32 {
        cpu_pm::cpu_idle_enter(index, psci_param, psci::cpu_suspend_enter)
    }
}
