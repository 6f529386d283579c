//! A client for the ARM Power State Coordination Interface (PSCI).
//!
//! API Reference: <https://developer.arm.com/documentation/den0022>
//!
//! Firmware is reached through a [`PsciCall`] implementation, which on
//! aarch64 is a [`Conduit`] (an `smc` or `hvc` instruction).
//! [`cpu_suspend_enter()`] is the low-level idle entry that the CPU PM
//! idle wrapper calls with an idle index and a raw power-state parameter.

#![no_std]

use core::sync::atomic::{AtomicUsize, Ordering};
use derive_more::{Display, LowerHex};
use errno::Errno;
use log::{debug, error};
use spin::Once;

#[cfg(target_arch = "aarch64")]
mod conduit;
#[cfg(target_arch = "aarch64")]
pub use conduit::Conduit;


/// PSCI function IDs (SMC Calling Convention, fast calls).
pub mod function_id {
    pub const PSCI_VERSION: u32   = 0x8400_0000;
    pub const CPU_OFF: u32        = 0x8400_0002;
    pub const PSCI_FEATURES: u32  = 0x8400_000A;
    pub const CPU_SUSPEND_64: u32 = 0xC400_0001;
    pub const CPU_ON_64: u32      = 0xC400_0003;
}

/// PSCI return codes.
pub mod ret {
    pub const SUCCESS: i32          = 0;
    pub const NOT_SUPPORTED: i32    = -1;
    pub const INVALID_PARAMS: i32   = -2;
    pub const DENIED: i32           = -3;
    pub const ALREADY_ON: i32       = -4;
    pub const ON_PENDING: i32       = -5;
    pub const INTERNAL_FAILURE: i32 = -6;
    pub const NOT_PRESENT: i32      = -7;
    pub const DISABLED: i32         = -8;
    pub const INVALID_ADDRESS: i32  = -9;
}

/// Translates a PSCI return code into a negative error number, or `0`.
pub fn psci_to_errno(code: i32) -> i32 {
    match code {
        ret::SUCCESS => 0,
        ret::NOT_SUPPORTED => Errno::NotSupported.to_raw(),
        ret::INVALID_PARAMS => Errno::InvalidArgs.to_raw(),
        ret::DENIED => Errno::NotPermitted.to_raw(),
        _ => Errno::InvalidArgs.to_raw(),
    }
}

/// Something that can issue a PSCI function call to firmware.
pub trait PsciCall: Send + Sync {
    /// Calls `function_id` with three arguments and returns `x0`.
    fn call(&self, function_id: u32, arg0: u64, arg1: u64, arg2: u64) -> u64;
}

/// A `CPU_SUSPEND` power-state parameter in the extended StateID format.
#[derive(Clone, Copy, Debug, Display, LowerHex, PartialEq, Eq)]
#[display(fmt = "{:#x}", _0)]
pub struct PowerState(u32);

impl PowerState {
    /// Bit 30: the state is a power-down state.
    pub const TYPE_POWER_DOWN: u32 = 1 << 30;
    const STATE_ID_MASK: u32 = 0x0FFF_FFFF;

    pub const fn new(raw: u32) -> Self {
        PowerState(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether entering this state loses the core's context,
    /// meaning the core comes back through the resume entry point.
    pub const fn loses_context(self) -> bool {
        self.0 & Self::TYPE_POWER_DOWN != 0
    }

    /// The platform-defined state ID.
    pub const fn state_id(self) -> u32 {
        self.0 & Self::STATE_ID_MASK
    }
}

/// PSCI operations on top of a [`PsciCall`].
pub struct Psci<'c> {
    caller: &'c dyn PsciCall,
}

impl<'c> Psci<'c> {
    pub const fn new(caller: &'c dyn PsciCall) -> Self {
        Psci { caller }
    }

    fn call(&self, function_id: u32, arg0: u64, arg1: u64, arg2: u64) -> i32 {
        // Return codes are 32-bit signed values in the low half of x0.
        self.caller.call(function_id, arg0, arg1, arg2) as u32 as i32
    }

    /// Returns the `(major, minor)` PSCI version the firmware implements.
    pub fn version(&self) -> (u16, u16) {
        let v = self.call(function_id::PSCI_VERSION, 0, 0, 0) as u32;
        ((v >> 16) as u16, v as u16)
    }

    /// Whether the firmware implements `function_id`.
    pub fn is_implemented(&self, function_id: u32) -> bool {
        self.call(function_id::PSCI_FEATURES, function_id as u64, 0, 0) >= 0
    }

    /// Suspends the calling core in `state`.
    ///
    /// `entry_point` is the physical address a core comes back at from a
    /// state that loses context, with `context` in `x0`; it is ignored for
    /// other states. Such a state without an entry point fails with
    /// `-EOPNOTSUPP` and firmware is never called.
    ///
    /// For a retention state, returns `0` once the core is running again.
    /// After a power-down the core restarts at `entry_point` instead,
    /// which restores the caller's context and returns `0` on its behalf.
    /// Otherwise returns a negative error number.
    pub fn cpu_suspend(&self, state: PowerState, entry_point: Option<usize>, context: u64) -> i32 {
        let entry_point = match (state.loses_context(), entry_point) {
            (false, _) => 0,
            (true, Some(entry)) if entry != 0 => entry as u64,
            (true, _) => {
                error!("PSCI CPU_SUSPEND to power-down state {} without a resume entry point", state);
                return Errno::NotSupported.to_raw();
            }
        };
        psci_to_errno(self.call(function_id::CPU_SUSPEND_64, state.raw() as u64, entry_point, context))
    }
}

static FIRMWARE: Once<Psci<'static>> = Once::new();

/// Physical address a core resumes at after a context-losing suspend; `0` if unset.
static RESUME_ENTRY: AtomicUsize = AtomicUsize::new(0);

/// Selects how PSCI firmware is called. Can only be done once.
///
/// `resume_entry` is the physical address of the kernel's resume path.
/// Without one, power-down states are refused until [`set_resume_entry()`]
/// provides it.
pub fn init(caller: &'static dyn PsciCall, resume_entry: Option<usize>) -> Result<(), &'static str> {
    if FIRMWARE.is_completed() {
        return Err("psci: firmware conduit was already set");
    }
    let psci = FIRMWARE.call_once(|| Psci::new(caller));
    if let Some(entry) = resume_entry {
        set_resume_entry(entry);
    }
    let (major, minor) = psci.version();
    debug!("PSCI v{}.{} detected, resume entry {:#x}", major, minor, RESUME_ENTRY.load(Ordering::Acquire));
    Ok(())
}

/// Sets the physical address that cores resume at after a power-down suspend.
pub fn set_resume_entry(phys_addr: usize) {
    RESUME_ENTRY.store(phys_addr, Ordering::Release);
}

/// The resume entry set so far.
pub fn resume_entry() -> Option<usize> {
    match RESUME_ENTRY.load(Ordering::Acquire) {
        0 => None,
        entry => Some(entry),
    }
}

/// Suspends the calling core through PSCI `CPU_SUSPEND`.
///
/// This is the low-level half of a CPU PM idle entry: `index` is the idle
/// state index the caller chose and `state` the raw power-state parameter.
pub fn cpu_suspend_enter(index: usize, state: u32) -> i32 {
    let Some(psci) = FIRMWARE.get() else {
        error!("PSCI CPU_SUSPEND for idle state {} without a firmware conduit", index);
        return Errno::NotSupported.to_raw();
    };
    psci.cpu_suspend(PowerState::new(state), resume_entry(), index as u64)
}
