//! An [`IrqChip`] for the GICv3 found on Tegra234.
//!
//! SPIs (32 and up) are masked in the Distributor; SGIs and PPIs (0..32)
//! are banked per CPU and masked in the current CPU's Redistributor.

use core::hint::spin_loop;
use core::ptr::{read_volatile, write_volatile};

use super::{InterruptNumber, IrqChip};

mod offset {
    pub const CTLR:      usize = 0x000;
    pub const ISENABLER: usize = 0x100;
    pub const ICENABLER: usize = 0x180;
    /// The SGI/PPI frame is the second 64KiB frame of a Redistributor.
    pub const SGI_FRAME: usize = 0x1_0000;
}

/// Register Write Pending in `GICD_CTLR`.
pub(crate) const GICD_CTLR_RWP: u32 = 1 << 31;
/// Register Write Pending in `GICR_CTLR`. Bit 31 there is UWP.
pub(crate) const GICR_CTLR_RWP: u32 = 1 << 3;

/// How many polls of `RWP` before giving up on the write having settled.
const RWP_POLL_LIMIT: usize = 1_000_000;

pub struct GicV3Chip {
    dist_base: usize,
    /// The Redistributor base of each CPU, indexed by logical CPU ID.
    redist_bases: &'static [usize],
}

impl GicV3Chip {
    /// Creates the chip from already-mapped register bases.
    ///
    /// # Safety
    /// `dist_base` and every entry of `redist_bases` must be the virtual
    /// addresses of mapped GICv3 Distributor/Redistributor frames,
    /// valid for the whole lifetime of the kernel.
    pub const unsafe fn new(dist_base: usize, redist_bases: &'static [usize]) -> Self {
        GicV3Chip { dist_base, redist_bases }
    }

    fn current_redist(&self) -> usize {
        self.redist_bases[cpu::current_cpu().index()]
    }

    fn write(base: usize, offset: usize, value: u32) {
        // SAFETY: `base` is a mapped GIC frame, see `GicV3Chip::new()`.
        unsafe { write_volatile((base + offset) as *mut u32, value) }
    }

    fn read(base: usize, offset: usize) -> u32 {
        // SAFETY: `base` is a mapped GIC frame, see `GicV3Chip::new()`.
        unsafe { read_volatile((base + offset) as *const u32) }
    }

    /// Polls the `rwp` bit of the `CTLR` at `ctlr_base` until it clears.
    /// Returns `false` if it never did.
    pub(crate) fn wait_for_rwp(ctlr_base: usize, rwp: u32) -> bool {
        for _ in 0..RWP_POLL_LIMIT {
            if Self::read(ctlr_base, offset::CTLR) & rwp == 0 {
                return true;
            }
            spin_loop();
        }
        log::error!("GICv3: register write still pending at {:#x}", ctlr_base);
        false
    }

    /// Writes the enable bit of `irq` into `reg` (`ISENABLER` or `ICENABLER`).
    fn poke(&self, irq: InterruptNumber, reg: usize) {
        let bit = 1 << (irq % 32);
        if irq < 32 {
            let rd = self.current_redist();
            Self::write(rd + offset::SGI_FRAME, reg, bit);
            if reg == offset::ICENABLER {
                Self::wait_for_rwp(rd, GICR_CTLR_RWP);
            }
        } else {
            Self::write(self.dist_base, reg + (irq as usize / 32) * 4, bit);
            if reg == offset::ICENABLER {
                Self::wait_for_rwp(self.dist_base, GICD_CTLR_RWP);
            }
        }
    }
}

impl IrqChip for GicV3Chip {
    fn name(&self) -> &'static str {
        "GICv3"
    }

    fn mask(&self, irq: InterruptNumber) {
        self.poke(irq, offset::ICENABLER);
    }

    fn unmask(&self, irq: InterruptNumber) {
        self.poke(irq, offset::ISENABLER);
    }
}
