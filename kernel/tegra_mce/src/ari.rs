//! The ARI register aperture of a Tegra CPU core.
//!
//! A request is issued by writing its data words and then the request ID
//! with [`REQUEST_VALID`] set; the firmware reports progress in `status`.
//! Each core has its own aperture and may only use that one.

use core::hint::spin_loop;
use errno::{Errno, Result};
use log::error;
use spin::Mutex;
use volatile::{ReadOnly, WriteOnly};

use super::MceFirmware;

/// The layout of one core's ARI registers.
#[repr(C)]
pub struct AriRegisters {
    pub request:          WriteOnly<u32>,    // 0x00
    _reserved0:           u32,
    pub event_mask:       WriteOnly<u32>,    // 0x08
    _reserved1:           u32,
    pub status:           ReadOnly<u32>,     // 0x10
    _reserved2:           u32,
    pub request_data_lo:  WriteOnly<u32>,    // 0x18
    _reserved3:           u32,
    pub request_data_hi:  WriteOnly<u32>,    // 0x20
    _reserved4:           u32,
    pub response_data_lo: ReadOnly<u32>,     // 0x28
    _reserved5:           u32,
    pub response_data_hi: ReadOnly<u32>,     // 0x30
    _reserved6:           u32,
}
const _: () = assert!(core::mem::size_of::<AriRegisters>() == 0x38);

/// Marks the value written to `request` as a new request.
pub const REQUEST_VALID: u32 = 1 << 8;
/// `status` bit: the request was accepted but not yet started.
pub const STATUS_PENDING: u32 = 1 << 0;
/// `status` bit: the request is being processed.
pub const STATUS_ONGOING: u32 = 1 << 1;

/// ARI request IDs.
pub mod request_id {
    pub const VERSION: u32 = 0;
    pub const ECHO: u32    = 1;
}

/// How many polls of `status` before a request is considered lost.
pub const POLL_LIMIT: usize = 1_000_000;

/// MCE firmware reached through per-core ARI apertures.
pub struct Ari {
    /// Each core's aperture, indexed by logical CPU ID.
    apertures: &'static [Mutex<&'static mut AriRegisters>],
}

impl Ari {
    /// # Safety
    /// Every aperture must be the mapped ARI register block of the core
    /// whose logical ID is its index, and nothing else may access it.
    pub const unsafe fn new(apertures: &'static [Mutex<&'static mut AriRegisters>]) -> Self {
        Ari { apertures }
    }

    /// Issues request `id` with data `(lo, hi)` and waits for it to finish.
    ///
    /// Returns the `(lo, hi)` response words.
    pub fn request(&self, id: u32, lo: u32, hi: u32) -> Result<(u32, u32)> {
        let cpu = cpu::current_cpu();
        let aperture = self.apertures.get(cpu.index()).ok_or(Errno::NoSuchDevice)?;
        let mut regs = aperture.lock();

        regs.request_data_lo.write(lo);
        regs.request_data_hi.write(hi);
        regs.event_mask.write(0);
        regs.request.write(id | REQUEST_VALID);

        let mut polls = 0;
        while regs.status.read() & (STATUS_PENDING | STATUS_ONGOING) != 0 {
            polls += 1;
            if polls == POLL_LIMIT {
                error!("CPU {}: ARI request {} timed out", cpu, id);
                return Err(Errno::TimedOut);
            }
            spin_loop();
        }
        Ok((regs.response_data_lo.read(), regs.response_data_hi.read()))
    }
}

impl MceFirmware for Ari {
    fn read_versions(&self) -> Result<(u32, u32)> {
        self.request(request_id::VERSION, 0, 0)
    }
}
