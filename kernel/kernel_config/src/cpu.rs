/// The maximum number of CPU cores the per-CPU tables are sized for.
pub const MAX_CPU_CORES: usize = 16;

/// The number of cores in each CPU cluster.
///
/// Tegra234 has three clusters of four Cortex-A78AE cores each.
pub const CORES_PER_CLUSTER: usize = 4;
