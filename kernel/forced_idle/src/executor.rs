//! Running one forced-idle period.

use core::time::Duration;
use errno::Result;
use interrupt_controller::{DeviceIrqsSuspended, InterruptController};
use log::{debug, error};

use crate::state::IdleRequest;

/// The kernel services a forced-idle period is built from.
///
/// Each `enter`/`exit`-style pair is called exactly once per period,
/// in the order [`force_idle()`] documents.
pub trait IdlePlatform {
    /// The interrupt lines to quiesce.
    fn interrupt_controller(&self) -> &dyn InterruptController;

    fn preempt_disable(&self);
    fn preempt_enable_no_resched(&self);

    fn tick_nohz_idle_enter(&self);
    fn tick_nohz_idle_exit(&self);

    fn stop_critical_timings(&self);
    fn start_critical_timings(&self);

    fn local_irq_disable(&self);
    fn local_irq_enable(&self);

    /// The current time since boot.
    fn ktime_get(&self) -> Duration;

    /// Programs this CPU's clock event device to fire at `expires`.
    fn tick_program_event(&self, expires: Duration, force: bool) -> Result<()>;

    /// Enters cpuidle state `index` with PSCI parameter `psci_param`,
    /// bracketed by CPU PM notifications.
    ///
    /// Returns `0` after waking up, or a negative error number.
    fn cpu_idle_enter(&self, index: usize, psci_param: u32) -> i32;
}

/// One step of a forced-idle period, undone when dropped.
struct Stage<'p, P: ?Sized> {
    platform: &'p P,
    exit: fn(&P),
}

impl<'p, P: ?Sized> Stage<'p, P> {
    fn enter(platform: &'p P, enter: fn(&P), exit: fn(&P)) -> Self {
        enter(platform);
        Stage { platform, exit }
    }
}

impl<P: ?Sized> Drop for Stage<'_, P> {
    fn drop(&mut self) {
        (self.exit)(self.platform)
    }
}

/// Forces the calling CPU into the idle state `selector` chooses.
///
/// The request is validated first; an invalid one fails with
/// `InvalidArgs` before anything is touched. Then, in this order:
/// device interrupts are suspended, preemption is disabled, the tick
/// enters nohz idle, critical timings stop, and local interrupts are
/// disabled. For C7 the wake timer is programmed `duration_us` from now.
/// The CPU then idles in firmware until it wakes up, and every step is
/// undone in reverse order, whether or not the idle entry succeeded.
///
/// Returns the result of the idle entry.
pub fn force_idle<P: IdlePlatform + ?Sized>(platform: &P, selector: u64, duration_us: u64) -> Result<()> {
    let request = IdleRequest::from_selector(selector)?;
    let wake_after = request.wake_after(duration_us)?;
    debug!(
        "forced idle: entering {:?} (param {:#x}) for {}us",
        request.kind(), request.psci_param(), duration_us,
    );

    let irqs = DeviceIrqsSuspended::new(platform.interrupt_controller());
    let _preemption = Stage::enter(platform, P::preempt_disable, P::preempt_enable_no_resched);
    let _nohz = Stage::enter(platform, P::tick_nohz_idle_enter, P::tick_nohz_idle_exit);
    let _critical_timings = Stage::enter(platform, P::stop_critical_timings, P::start_critical_timings);
    let _local_irqs = Stage::enter(platform, P::local_irq_disable, P::local_irq_enable);

    if let Some(interval) = wake_after {
        let expires = platform.ktime_get() + interval;
        if let Err(e) = platform.tick_program_event(expires, true) {
            error!("forced idle: failed to program the wake timer: {}", e);
        }
    }

    let ret = platform.cpu_idle_enter(request.index(), request.psci_param());
    if ret < 0 {
        error!(
            "forced idle: idle state {} failed with error {} ({} lines quiesced)",
            request.index(), ret, irqs.suspended(),
        );
    }
    errno::from_ret(ret)
}
