//! Forcing a CPU into a specific idle state, for hardware validation.
//!
//! A forced-idle period puts the calling CPU into C7 for a given number of
//! microseconds, or into an OEM idle state (OIST) until the firmware wakes
//! it, with every device interrupt but the wake timer masked.
//! See [`force_idle()`] for the exact sequence.
//!
//! The kernel services it uses are reached through [`IdlePlatform`];
//! [`KernelIdlePlatform`] binds them to this kernel's subsystems.

#![no_std]

pub mod executor;
pub mod platform;
pub mod state;

pub use executor::{force_idle, IdlePlatform};
pub use platform::KernelIdlePlatform;
pub use state::{ForcedIdleState, IdleRequest, IdleStateKind};


/// A selector cell together with the platform that idles on request.
pub struct ForcedIdle<'s, P: IdlePlatform> {
    state: &'s ForcedIdleState,
    platform: P,
}

impl<'s, P: IdlePlatform> ForcedIdle<'s, P> {
    pub const fn new(state: &'s ForcedIdleState, platform: P) -> Self {
        ForcedIdle { state, platform }
    }

    /// The selector the next period will use.
    pub fn state(&self) -> &'s ForcedIdleState {
        self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Runs one forced-idle period with the current selector.
    pub fn trigger(&self, duration_us: u64) -> errno::Result<()> {
        force_idle(&self.platform, self.state.get(), duration_us)
    }
}
