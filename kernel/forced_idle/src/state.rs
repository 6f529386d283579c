//! Which idle state to force, and whether a request for it is valid.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use errno::{Errno, Result};
use kernel_config::cpuidle::{FORCED_IDLE_MAX_DURATION_US, FORCED_IDLE_MIN_DURATION_US};
use log::error;

/// Selects the idle state kind in a selector value.
pub const IDLE_STATE_KIND_MASK: u64 = 0xF;
/// The PSCI power-state parameter of C7.
pub const C7_PSCI_PARAM: u32 = 0x4000_0007;
/// An OIST parameter must describe a power-down state in the extended StateID format.
pub const POWER_STATE_TYPE_MASK: u32 = psci::PowerState::TYPE_POWER_DOWN;

/// The idle states that can be forced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleStateKind {
    /// The core's deepest power-down state; it wakes on a programmed timer.
    C7,
    /// An OEM idle state, given as a raw PSCI power-state parameter.
    /// The firmware decides when the core wakes up.
    Oist,
}

impl IdleStateKind {
    /// The cpuidle state index of this kind.
    pub const fn index(self) -> usize {
        match self {
            IdleStateKind::C7 => 7,
            IdleStateKind::Oist => 8,
        }
    }
}

/// A validated forced-idle request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdleRequest {
    kind: IdleStateKind,
    psci_param: u32,
}

impl IdleRequest {
    /// Decodes a selector value.
    ///
    /// Bits 0..4 select the kind. For [`IdleStateKind::Oist`] the low 32 bits
    /// are the PSCI parameter and must have [`POWER_STATE_TYPE_MASK`] set.
    pub fn from_selector(selector: u64) -> Result<Self> {
        match selector & IDLE_STATE_KIND_MASK {
            7 => Ok(IdleRequest {
                kind: IdleStateKind::C7,
                psci_param: C7_PSCI_PARAM,
            }),
            8 => {
                let psci_param = selector as u32;
                if psci_param & POWER_STATE_TYPE_MASK == 0 {
                    error!("forced idle: EXT_POWER_STATE_TYPE bit not set in {:#x}", psci_param);
                    return Err(Errno::InvalidArgs);
                }
                Ok(IdleRequest {
                    kind: IdleStateKind::Oist,
                    psci_param,
                })
            }
            other => {
                error!("forced idle: requested invalid idle state {}", other);
                Err(Errno::InvalidArgs)
            }
        }
    }

    pub fn kind(&self) -> IdleStateKind {
        self.kind
    }

    /// The cpuidle state index handed to the idle entry.
    pub fn index(&self) -> usize {
        self.kind.index()
    }

    pub fn psci_param(&self) -> u32 {
        self.psci_param
    }

    /// Returns how long from now the wake timer must fire, if this kind
    /// needs one, after checking `duration_us` against the allowed range.
    ///
    /// OIST wakes on its own, so its duration is ignored.
    pub fn wake_after(&self, duration_us: u64) -> Result<Option<Duration>> {
        match self.kind {
            IdleStateKind::Oist => Ok(None),
            IdleStateKind::C7 => {
                if !(FORCED_IDLE_MIN_DURATION_US..=FORCED_IDLE_MAX_DURATION_US).contains(&duration_us) {
                    error!(
                        "forced idle: C7 duration {}us outside [{}, {}]us",
                        duration_us, FORCED_IDLE_MIN_DURATION_US, FORCED_IDLE_MAX_DURATION_US,
                    );
                    return Err(Errno::InvalidArgs);
                }
                Ok(Some(Duration::from_micros(duration_us)))
            }
        }
    }
}

/// The selector of the idle state to force, as last written.
///
/// Writers don't exclude each other; the last one wins.
pub struct ForcedIdleState(AtomicU64);

impl ForcedIdleState {
    pub const fn new() -> Self {
        ForcedIdleState(AtomicU64::new(0))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, selector: u64) {
        self.0.store(selector, Ordering::Relaxed)
    }

    /// The raw cell, for exposing it as a file.
    pub fn as_atomic(&self) -> &AtomicU64 {
        &self.0
    }
}

impl Default for ForcedIdleState {
    fn default() -> Self {
        Self::new()
    }
}
