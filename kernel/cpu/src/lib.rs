//! An abstraction for identifying CPU cores.
//!
//! A [`CpuId`] is the *logical* index of a core, dense from `0`,
//! which is what per-CPU tables are indexed by.
//! On aarch64 it is derived from the core's `MPIDR_EL1` affinity fields,
//! see [`MpidrValue`].

#![no_std]

use derive_more::{Display, Binary, LowerHex, UpperHex};
use kernel_config::cpu::{CORES_PER_CLUSTER, MAX_CPU_CORES};


cfg_if::cfg_if! {
    if #[cfg(target_arch = "aarch64")] {
        mod aarch64;
        pub use self::aarch64::current_cpu;
    } else {
        /// Returns the ID of the currently executing CPU.
        ///
        /// Builds for other architectures only ever run on the bootstrap CPU.
        pub fn current_cpu() -> CpuId {
            CpuId::BOOTSTRAP
        }
    }
}

/// The logical index of a CPU core.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord,
    Hash, Binary, LowerHex, UpperHex,
)]
#[repr(transparent)]
pub struct CpuId(u32);

impl CpuId {
    /// The CPU that runs first after power-on.
    pub const BOOTSTRAP: CpuId = CpuId(0);

    /// Creates a `CpuId` from a logical index,
    /// returning `None` if it doesn't fit in the per-CPU tables.
    pub const fn new(index: u32) -> Option<CpuId> {
        if (index as usize) < MAX_CPU_CORES {
            Some(CpuId(index))
        } else {
            None
        }
    }

    /// Returns the raw logical index.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the logical index as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A raw value of the `MPIDR_EL1` register.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord,
    Hash, Binary, LowerHex, UpperHex,
)]
#[repr(transparent)]
pub struct MpidrValue(u64);

impl MpidrValue {
    /// Bit 24: the lowest affinity level holds hardware threads,
    /// so cores are numbered one level up.
    const MT: u64 = 1 << 24;

    /// Wraps a raw register value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the inner raw value read from the `MPIDR_EL1` register.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Reads an affinity `level` from this `MpidrValue`.
    ///
    /// Panics if the given affinity level is not 0, 1, 2, or 3.
    pub fn affinity(self, level: u8) -> u8 {
        let shift = match level {
            0 => 0,
            1 => 8,
            2 => 16,
            3 => 32,
            _ => panic!("Valid affinity levels are 0, 1, 2, 3"),
        };
        (self.0 >> shift) as u8
    }

    /// Create an `MpidrValue` from its four affinity numbers
    pub fn new(aff3: u8, aff2: u8, aff1: u8, aff0: u8) -> Self {
        let aff3 = (aff3 as u64) << 32;
        let aff2 = (aff2 as u64) << 16;
        let aff1 = (aff1 as u64) <<  8;
        let aff0 =  aff0 as u64;
        Self(aff3 | aff2 | aff1 | aff0)
    }

    /// Whether the multithreading (`MT`) bit is set.
    pub fn is_multithreaded(self) -> bool {
        self.0 & Self::MT != 0
    }

    /// Returns the `(cluster, core)` pair this value identifies.
    pub fn cluster_and_core(self) -> (u8, u8) {
        if self.is_multithreaded() {
            (self.affinity(2), self.affinity(1))
        } else {
            (self.affinity(1), self.affinity(0))
        }
    }
}

impl TryFrom<MpidrValue> for CpuId {
    type Error = &'static str;

    /// Fails if the core's logical index doesn't fit in the per-CPU tables.
    fn try_from(mpidr: MpidrValue) -> Result<Self, Self::Error> {
        let (cluster, core) = mpidr.cluster_and_core();
        let index = cluster as u32 * CORES_PER_CLUSTER as u32 + core as u32;
        CpuId::new(index).ok_or("MPIDR names a core beyond MAX_CPU_CORES")
    }
}

impl CpuId {
    /// The last logical ID the per-CPU tables have room for.
    pub const LAST: CpuId = CpuId(MAX_CPU_CORES as u32 - 1);

    /// Like `CpuId::try_from(mpidr)`, but a core outside the per-CPU tables
    /// is given the [`LAST`](Self::LAST) slot.
    pub fn from_mpidr_clamped(mpidr: MpidrValue) -> CpuId {
        CpuId::try_from(mpidr).unwrap_or(CpuId::LAST)
    }
}
