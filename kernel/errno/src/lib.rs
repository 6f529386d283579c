//! Error numbers shared by the kernel driver surfaces.
//!
//! Driver entry points (attach, debugfs reads and writes) report failures
//! the way Linux does: as a negative error number handed back to the caller.
//! [`Errno`] names the numbers this workspace uses and carries any other
//! number through unchanged, so a firmware result can travel from the
//! firmware call all the way to the writer of a debugfs file.
//!
//! ```
//! use errno::{Errno, Result};
//!
//! fn check(kind: u32) -> Result<()> {
//!     match kind {
//!         7 | 8 => Ok(()),
//!         _ => Err(Errno::InvalidArgs),
//!     }
//! }
//!
//! assert_eq!(check(3).unwrap_err().to_raw(), -22);
//! ```

#![no_std]

use derive_more::Display;

#[cfg(test)]
mod test;

/// Raw error numbers, as positive values.
pub mod code {
    pub const EPERM: i32 = 1;
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EAGAIN: i32 = 11;
    pub const ENOMEM: i32 = 12;
    pub const EACCES: i32 = 13;
    pub const EBUSY: i32 = 16;
    pub const EEXIST: i32 = 17;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
    pub const ERANGE: i32 = 34;
    pub const ETIME: i32 = 62;
    pub const EOPNOTSUPP: i32 = 95;
    pub const ETIMEDOUT: i32 = 110;
}

/// A kernel error number.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Errno {
    /// `EPERM`: the operation is not permitted.
    #[display(fmt = "operation not permitted")]
    NotPermitted,
    /// `ENOENT`: no such file or directory.
    #[display(fmt = "no such file or directory")]
    NotFound,
    /// `EIO`: input/output error.
    #[display(fmt = "input/output error")]
    Io,
    /// `EAGAIN`: try again.
    #[display(fmt = "resource temporarily unavailable")]
    Again,
    /// `ENOMEM`: out of memory.
    #[display(fmt = "out of memory")]
    NoMemory,
    /// `EACCES`: the file mode does not allow the access.
    #[display(fmt = "permission denied")]
    PermissionDenied,
    /// `EBUSY`: device or resource busy.
    #[display(fmt = "device or resource busy")]
    Busy,
    /// `EEXIST`: the name is already taken.
    #[display(fmt = "file exists")]
    Exists,
    /// `ENODEV`: no such device.
    #[display(fmt = "no such device")]
    NoSuchDevice,
    /// `EINVAL`: invalid argument.
    #[display(fmt = "invalid argument")]
    InvalidArgs,
    /// `ERANGE`: the value doesn't fit the result type.
    #[display(fmt = "numerical result out of range")]
    OutOfRange,
    /// `ETIME`: a deadline has already passed.
    #[display(fmt = "timer expired")]
    TimeExpired,
    /// `EOPNOTSUPP`: operation not supported.
    #[display(fmt = "operation not supported")]
    NotSupported,
    /// `ETIMEDOUT`: the operation timed out.
    #[display(fmt = "timed out")]
    TimedOut,
    /// Any other negative error number, carried verbatim.
    #[display(fmt = "error {}", _0)]
    Other(i32),
}

impl Errno {
    /// Returns the negative error number for this error.
    pub const fn to_raw(self) -> i32 {
        -match self {
            Errno::NotPermitted => code::EPERM,
            Errno::NotFound => code::ENOENT,
            Errno::Io => code::EIO,
            Errno::Again => code::EAGAIN,
            Errno::NoMemory => code::ENOMEM,
            Errno::PermissionDenied => code::EACCES,
            Errno::Busy => code::EBUSY,
            Errno::Exists => code::EEXIST,
            Errno::NoSuchDevice => code::ENODEV,
            Errno::InvalidArgs => code::EINVAL,
            Errno::OutOfRange => code::ERANGE,
            Errno::TimeExpired => code::ETIME,
            Errno::NotSupported => code::EOPNOTSUPP,
            Errno::TimedOut => code::ETIMEDOUT,
            Errno::Other(raw) => return raw,
        }
    }

    /// Converts a negative error number into an `Errno`.
    ///
    /// Numbers without a named variant become [`Errno::Other`], so
    /// `Errno::from_raw(n).to_raw() == n` holds for every negative `n`.
    pub const fn from_raw(raw: i32) -> Self {
        match raw.wrapping_neg() {
            code::EPERM => Errno::NotPermitted,
            code::ENOENT => Errno::NotFound,
            code::EIO => Errno::Io,
            code::EAGAIN => Errno::Again,
            code::ENOMEM => Errno::NoMemory,
            code::EACCES => Errno::PermissionDenied,
            code::EBUSY => Errno::Busy,
            code::EEXIST => Errno::Exists,
            code::ENODEV => Errno::NoSuchDevice,
            code::EINVAL => Errno::InvalidArgs,
            code::ERANGE => Errno::OutOfRange,
            code::ETIME => Errno::TimeExpired,
            code::EOPNOTSUPP => Errno::NotSupported,
            code::ETIMEDOUT => Errno::TimedOut,
            _ => Errno::Other(raw),
        }
    }
}

/// Turns a C-style return value (`0` or a negative error number) into a `Result`.
pub const fn from_ret(ret: i32) -> Result<()> {
    if ret < 0 {
        Err(Errno::from_raw(ret))
    } else {
        Ok(())
    }
}

/// Turns a `Result` back into a C-style return value.
pub const fn to_ret(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.to_raw(),
    }
}

/// A [`Result`](core::result::Result) whose error type is [`Errno`].
pub type Result<T> = core::result::Result<T, Errno>;
