//! Simple numeric attributes: files whose whole content is one `u64`.

use core::sync::atomic::{AtomicU64, Ordering};
use errno::{Errno, Result};

/// The operations behind a simple attribute file.
///
/// A read formats [`get()`](Self::get) as `"<decimal>\n"`.
/// A write parses the written text with [`parse_u64()`] and hands it to
/// [`set()`](Self::set). Either half may be left unimplemented.
pub trait SimpleAttribute: Send + Sync {
    fn get(&self) -> Result<u64> {
        Err(Errno::PermissionDenied)
    }

    fn set(&self, _val: u64) -> Result<()> {
        Err(Errno::PermissionDenied)
    }
}

/// A `u64` attribute backed directly by an atomic value.
pub struct U64Attribute(pub &'static AtomicU64);

impl SimpleAttribute for U64Attribute {
    fn get(&self) -> Result<u64> {
        Ok(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, val: u64) -> Result<()> {
        self.0.store(val, Ordering::Relaxed);
        Ok(())
    }
}

/// A write-only attribute that runs a function on every write.
pub struct WriteOnlyAttribute<F>(pub F);

impl<F> SimpleAttribute for WriteOnlyAttribute<F>
where
    F: Fn(u64) -> Result<()> + Send + Sync,
{
    fn set(&self, val: u64) -> Result<()> {
        (self.0)(val)
    }
}

/// Parses an unsigned integer the way the kernel's `kstrtoull(s, 0)` does.
///
/// The radix comes from the prefix: `0x`/`0X` is hexadecimal, a leading
/// `0` is octal, anything else decimal. A leading `+` is allowed.
/// Surrounding whitespace, such as the newline `echo` appends, is ignored.
pub fn parse_u64(text: &str) -> Result<u64> {
    let s = text.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    if digits.is_empty() {
        return Err(Errno::InvalidArgs);
    }

    let mut val: u64 = 0;
    for c in digits.chars() {
        let digit = c.to_digit(radix).ok_or(Errno::InvalidArgs)?;
        val = val
            .checked_mul(radix as u64)
            .and_then(|v| v.checked_add(digit as u64))
            .ok_or(Errno::OutOfRange)?;
    }
    Ok(val)
}
