//! Shared utilities for the compiler.

mod names;
pub use names::*;
