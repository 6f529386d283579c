//! Interrupt descriptors and device-interrupt quiescing.
//!
//! Every interrupt line the kernel knows about has an [`IrqDesc`] in an
//! [`IrqDescTable`]. A descriptor carries the line's action (the handler's
//! name and [`IrqFlags`]), a nesting *disable depth*, and the [`IrqChip`]
//! that masks and unmasks the line in hardware. The chip is only touched on
//! the depth's `0 <-> 1` transitions, so independent disablers nest.
//!
//! [`IrqDescTable::suspend_device_irqs()`] disables every line except
//! timer lines, which must stay live to wake the CPU up again, and hands
//! back the lines it disabled. [`DeviceIrqsSuspended`] keeps those lines
//! and re-enables exactly them when its scope ends.

#![no_std]

extern crate alloc;

use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use bitflags::bitflags;
use errno::{Errno, Result};
use log::{debug, warn};
use spin::RwLock;

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "aarch64", target_os = "none"))] {
        use irq_safety::MutexIrqSafe as DescLock;
    } else {
        // Host builds run in user mode, where interrupts can't be masked.
        use spin::Mutex as DescLock;
    }
}

#[cfg(target_arch = "aarch64")]
pub mod gicv3;


/// An interrupt line number.
pub type InterruptNumber = u32;

bitflags! {
    /// Flags describing how an interrupt line's action behaves.
    pub struct IrqFlags: u32 {
        /// Several actions share this line.
        const SHARED     = 0x0000_0080;
        /// The action is a system timer (a wakeup source).
        const TIMER_BIT  = 0x0000_0200;
        /// The line is per-CPU.
        const PERCPU     = 0x0000_0400;
        /// The line stays enabled across system suspend.
        const NO_SUSPEND = 0x0000_4000;
        /// The action can't be threaded.
        const NO_THREAD  = 0x0001_0000;
        /// Flags a timer action is registered with.
        const TIMER      = Self::TIMER_BIT.bits | Self::NO_SUSPEND.bits | Self::NO_THREAD.bits;
    }
}

/// The hardware side of an interrupt line.
pub trait IrqChip: Send + Sync {
    /// A short name for log messages.
    fn name(&self) -> &'static str;
    /// Stops the line from being forwarded to CPUs.
    fn mask(&self, irq: InterruptNumber);
    /// Lets the line be forwarded to CPUs again.
    fn unmask(&self, irq: InterruptNumber);
}

/// The handler registered on an interrupt line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IrqAction {
    pub name: &'static str,
    pub flags: IrqFlags,
}

impl IrqAction {
    /// Whether this action is flagged as a timer.
    ///
    /// Any bit of [`IrqFlags::TIMER`] counts, so `NO_SUSPEND` lines stay live too.
    pub fn is_timer(&self) -> bool {
        self.flags.intersects(IrqFlags::TIMER)
    }
}

struct IrqDescInner {
    action: Option<IrqAction>,
    /// Nested disable depth; `0` means the line is enabled.
    depth: u32,
}

/// The descriptor of a single interrupt line.
pub struct IrqDesc {
    irq: InterruptNumber,
    chip: Arc<dyn IrqChip>,
    inner: DescLock<IrqDescInner>,
}

impl IrqDesc {
    /// A freshly allocated descriptor has no action and is disabled (depth 1).
    fn new(irq: InterruptNumber, chip: Arc<dyn IrqChip>) -> Self {
        IrqDesc {
            irq,
            chip,
            inner: DescLock::new(IrqDescInner { action: None, depth: 1 }),
        }
    }

    pub fn irq(&self) -> InterruptNumber {
        self.irq
    }

    pub fn action(&self) -> Option<IrqAction> {
        self.inner.lock().action
    }

    /// Returns the current disable depth; `0` means enabled.
    pub fn depth(&self) -> u32 {
        self.inner.lock().depth
    }

    /// Whether this line's action is flagged as a timer.
    pub fn is_timer(&self) -> bool {
        self.inner.lock().action.map_or(false, |a| a.is_timer())
    }

    /// Disables the line, masking it if this is the outermost disable.
    pub fn disable(&self) {
        let mut inner = self.inner.lock();
        Self::disable_locked(self, &mut inner);
    }

    /// Undoes one [`disable()`](Self::disable), unmasking the line on the last one.
    pub fn enable(&self) {
        let mut inner = self.inner.lock();
        Self::enable_locked(self, &mut inner);
    }

    /// Disables the line unless its action is a timer, deciding both
    /// under one hold of the descriptor lock. Returns whether it disabled.
    fn disable_unless_timer(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.action.map_or(false, |a| a.is_timer()) {
            return false;
        }
        self.disable_locked(&mut inner);
        true
    }

    fn disable_locked(&self, inner: &mut IrqDescInner) {
        if inner.depth == 0 {
            self.chip.mask(self.irq);
        }
        inner.depth += 1;
    }

    fn enable_locked(&self, inner: &mut IrqDescInner) {
        match inner.depth {
            0 => warn!("Unbalanced enable for IRQ {} ({})", self.irq, self.chip.name()),
            1 => {
                inner.depth = 0;
                self.chip.unmask(self.irq);
            }
            _ => inner.depth -= 1,
        }
    }
}

/// The table of all known interrupt descriptors, keyed by line number.
pub struct IrqDescTable {
    descs: RwLock<BTreeMap<InterruptNumber, Arc<IrqDesc>>>,
}

impl IrqDescTable {
    pub const fn new() -> Self {
        IrqDescTable {
            descs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Allocates the descriptor for `irq`, driven by `chip`.
    pub fn alloc_desc(&self, irq: InterruptNumber, chip: Arc<dyn IrqChip>) -> Result<Arc<IrqDesc>> {
        let mut descs = self.descs.write();
        if descs.contains_key(&irq) {
            return Err(Errno::Exists);
        }
        let desc = Arc::new(IrqDesc::new(irq, chip));
        descs.insert(irq, desc.clone());
        Ok(desc)
    }

    /// Returns the descriptor for `irq`, if one was allocated.
    pub fn get(&self, irq: InterruptNumber) -> Option<Arc<IrqDesc>> {
        self.descs.read().get(&irq).cloned()
    }

    /// Installs an action on `irq` and enables the line.
    pub fn request_irq(&self, irq: InterruptNumber, name: &'static str, flags: IrqFlags) -> Result<()> {
        let desc = self.get(irq).ok_or(Errno::InvalidArgs)?;
        let mut inner = desc.inner.lock();
        if let Some(existing) = inner.action {
            // Both sides have to agree to share the line; sharing doesn't
            // change the line's enable state.
            return if existing.flags.contains(IrqFlags::SHARED) && flags.contains(IrqFlags::SHARED) {
                Ok(())
            } else {
                Err(Errno::Busy)
            };
        }
        inner.action = Some(IrqAction { name, flags });
        desc.enable_locked(&mut inner);
        debug!("IRQ {} requested by {:?} ({:?})", irq, name, flags);
        Ok(())
    }

    /// Removes the action from `irq` and disables the line.
    pub fn free_irq(&self, irq: InterruptNumber) -> Result<IrqAction> {
        let desc = self.get(irq).ok_or(Errno::InvalidArgs)?;
        let mut inner = desc.inner.lock();
        let action = inner.action.take().ok_or(Errno::NotFound)?;
        desc.disable_locked(&mut inner);
        Ok(action)
    }

    /// Disables the line `irq` (nesting).
    pub fn disable_irq(&self, irq: InterruptNumber) -> Result<()> {
        self.get(irq).ok_or(Errno::InvalidArgs)?.disable();
        Ok(())
    }

    /// Undoes one [`disable_irq()`](Self::disable_irq).
    pub fn enable_irq(&self, irq: InterruptNumber) -> Result<()> {
        self.get(irq).ok_or(Errno::InvalidArgs)?.enable();
        Ok(())
    }

    /// Calls `f` on every descriptor, in line-number order.
    ///
    /// The table lock is released before `f` runs, so `f` may take
    /// descriptor locks without nesting them under the table lock.
    pub fn for_each_irq_desc<F: FnMut(&IrqDesc)>(&self, mut f: F) {
        self.for_each_desc(|desc| f(desc));
    }

    /// Disables every line whose action isn't a timer.
    ///
    /// Each descriptor's lock is held only for its own disable.
    /// Returns the lines disabled, for [`resume_device_irqs()`](Self::resume_device_irqs).
    pub fn suspend_device_irqs(&self) -> SuspendedIrqs {
        let mut suspended = Vec::new();
        self.for_each_desc(|desc| {
            // Don't disable the 'wakeup' interrupt
            if desc.disable_unless_timer() {
                suspended.push(desc.clone());
            }
        });
        suspended
    }

    /// Re-enables the lines a [`suspend_device_irqs()`](Self::suspend_device_irqs) call disabled.
    ///
    /// Lines freed, re-requested or removed from the table in the meantime
    /// are still re-enabled, since the disable they carry is this caller's.
    /// Returns the number of lines enabled.
    pub fn resume_device_irqs(&self, suspended: SuspendedIrqs) -> usize {
        for desc in suspended.iter() {
            desc.enable();
        }
        suspended.len()
    }

    fn for_each_desc<F: FnMut(&Arc<IrqDesc>)>(&self, mut f: F) {
        let snapshot: Vec<Arc<IrqDesc>> = self.descs.read().values().cloned().collect();
        for desc in snapshot.iter() {
            f(desc);
        }
    }
}

impl Default for IrqDescTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The system-wide interrupt descriptor table.
pub static IRQ_DESCS: IrqDescTable = IrqDescTable::new();

/// The lines one suspend call disabled.
pub type SuspendedIrqs = Vec<Arc<IrqDesc>>;

/// Something that can silence every device interrupt except the wake timer.
pub trait InterruptController {
    /// Disables all device interrupt lines except timer lines,
    /// returning the lines it disabled.
    fn suspend_device_irqs(&self) -> SuspendedIrqs;

    /// Re-enables exactly the lines in `suspended`.
    /// Returns the number of lines enabled.
    fn resume_device_irqs(&self, suspended: SuspendedIrqs) -> usize;
}

impl InterruptController for IrqDescTable {
    fn suspend_device_irqs(&self) -> SuspendedIrqs {
        IrqDescTable::suspend_device_irqs(self)
    }

    fn resume_device_irqs(&self, suspended: SuspendedIrqs) -> usize {
        IrqDescTable::resume_device_irqs(self, suspended)
    }
}

/// Keeps device interrupts suspended until dropped.
///
/// Dropping the guard re-enables exactly the lines it suspended,
/// on every exit path of the scope that holds it.
#[must_use = "device interrupts are resumed as soon as the guard is dropped"]
pub struct DeviceIrqsSuspended<'c, C: InterruptController + ?Sized> {
    controller: &'c C,
    lines: SuspendedIrqs,
}

impl<'c, C: InterruptController + ?Sized> DeviceIrqsSuspended<'c, C> {
    /// Suspends device interrupts on `controller`.
    pub fn new(controller: &'c C) -> Self {
        let lines = controller.suspend_device_irqs();
        DeviceIrqsSuspended { controller, lines }
    }

    /// The number of lines this guard suspended.
    pub fn suspended(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Arc<IrqDesc>] {
        &self.lines
    }
}

impl<C: InterruptController + ?Sized> Drop for DeviceIrqsSuspended<'_, C> {
    fn drop(&mut self) {
        let lines = core::mem::take(&mut self.lines);
        let count = lines.len();
        let resumed = self.controller.resume_device_irqs(lines);
        if resumed != count {
            warn!("Resumed {} device IRQs but suspended {}", resumed, count);
        }
    }
}
