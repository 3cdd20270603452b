//! Command implementations

pub mod info;
pub mod sample;
pub mod simulate;
