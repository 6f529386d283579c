/// Nanoseconds in one second.
pub const NSEC_PER_SEC: u64 = 1_000_000_000;

/// The minimum delta a one-shot clock event can be programmed with, in nanoseconds.
///
/// Shorter requests are rounded up to it.
pub const CLOCK_EVENT_MIN_DELTA_NS: u64 = 1_000;
