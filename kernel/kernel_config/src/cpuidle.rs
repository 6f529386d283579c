/// The name of the debugfs directory holding the forced-idle attributes.
pub const DEBUGFS_DIR_NAME: &str = "tegra_cpuidle";

/// The shortest forced C7 residency accepted, in microseconds.
///
/// A zero duration would program a wake event in the past.
pub const FORCED_IDLE_MIN_DURATION_US: u64 = 1;

/// The longest forced C7 residency accepted, in microseconds (10 seconds).
///
/// The writing task is blocked for the whole residency with every
/// device interrupt masked, so this stays well below the watchdog timeouts.
pub const FORCED_IDLE_MAX_DURATION_US: u64 = 10_000_000;
