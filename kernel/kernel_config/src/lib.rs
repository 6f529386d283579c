//! Compile-time configuration constants, grouped by the subsystem that reads them.

#![no_std]

pub mod cpu;
pub mod cpuidle;
pub mod time;
