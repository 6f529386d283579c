//! Implements functions for accessing CPU-specific information on aarch64.

use cortex_a::registers::MPIDR_EL1;
use tock_registers::interfaces::Readable;

use super::{CpuId, MpidrValue};

/// Returns the ID of the currently executing CPU.
pub fn current_cpu() -> CpuId {
    CpuId::from_mpidr_clamped(MpidrValue::from_raw(MPIDR_EL1.get()))
}
