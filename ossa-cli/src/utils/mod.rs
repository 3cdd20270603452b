//! Shared utilities for the ossa CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
