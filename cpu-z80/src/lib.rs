// Clippy rules to disable.
#![allow(clippy::new_without_default)]

pub mod bus;
pub mod cpu_z80;
