use core::arch::asm;

use super::PsciCall;

/// The instruction used to trap into PSCI firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conduit {
    /// Secure Monitor Call, for firmware at EL3.
    Smc,
    /// Hypervisor Call, for firmware at EL2.
    Hvc,
}

impl Conduit {
    /// Parses the device tree `method` property of the `/psci` node.
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "smc" => Some(Conduit::Smc),
            "hvc" => Some(Conduit::Hvc),
            _ => None,
        }
    }
}

impl PsciCall for Conduit {
    fn call(&self, function_id: u32, arg0: u64, arg1: u64, arg2: u64) -> u64 {
        let ret;
        // SAFETY: the SMC Calling Convention preserves every register but x0-x17,
        // which are marked as clobbered here.
        unsafe {
            match self {
                Conduit::Smc => asm!(
                    "smc #0",
                    inlateout("x0") function_id as u64 => ret,
                    inlateout("x1") arg0 => _,
                    inlateout("x2") arg1 => _,
                    inlateout("x3") arg2 => _,
                    out("x4") _, out("x5") _, out("x6") _, out("x7") _,
                    out("x8") _, out("x9") _, out("x10") _, out("x11") _,
                    out("x12") _, out("x13") _, out("x14") _, out("x15") _,
                    out("x16") _, out("x17") _,
                    options(nostack),
                ),
                Conduit::Hvc => asm!(
                    "hvc #0",
                    inlateout("x0") function_id as u64 => ret,
                    inlateout("x1") arg0 => _,
                    inlateout("x2") arg1 => _,
                    inlateout("x3") arg2 => _,
                    out("x4") _, out("x5") _, out("x6") _, out("x7") _,
                    out("x8") _, out("x9") _, out("x10") _, out("x11") _,
                    out("x12") _, out("x13") _, out("x14") _, out("x15") _,
                    out("x16") _, out("x17") _,
                    options(nostack),
                ),
            }
        }
        ret
    }
}
