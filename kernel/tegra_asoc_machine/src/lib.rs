//! Crossbar (XBAR) tables for the Tegra124 and Tegra210 audio machine drivers.
//!
//! Each SoC generation routes audio through a crossbar whose endpoints are
//! fixed: a DAI link per crossbar client port and a codec configuration per
//! crossbar module. The index enums in [`xbar`] name those endpoints in
//! hardware order, and [`DaiLinkTable`] / [`CodecConfTable`] hold the
//! per-endpoint configuration a machine driver fills in before registering
//! its sound card. Board-specific links are appended after the crossbar ones.

#![no_std]

extern crate alloc;

mod dai;
mod table;
pub mod xbar;

pub use dai::{
    ClockGating, ClockInversion, ClockProvider, CodecConf, DaiFormat, DaiInit, DaiLink, PcmStream, SerialFormat, SocOps,
};
pub use table::{CodecConfTable, DaiLinkTable};
pub use xbar::{Tegra124XbarCodecConf, Tegra124XbarDaiLink, Tegra210XbarCodecConf, Tegra210XbarDaiLink};

#[cfg(test)]
mod test;

/// An enum naming the fixed crossbar endpoints of one SoC generation.
pub trait XbarIndex: Copy + Eq + core::fmt::Debug + 'static {
    /// Every endpoint, in hardware order.
    const ALL: &'static [Self];
    /// The number of endpoints; the first table entries are reserved for them.
    const COUNT: usize;
    /// The SoC generation the endpoints belong to, e.g. `"tegra210"`.
    const SOC: &'static str;

    fn index(self) -> usize;
    fn from_index(index: usize) -> Option<Self>;
    fn name(self) -> &'static str;
}

/// Crossbar client ports, one DAI link each.
pub trait XbarDaiLink: XbarIndex {}

/// Crossbar modules, one codec configuration each.
pub trait XbarCodecConf: XbarIndex {}
