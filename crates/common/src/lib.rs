//! Process-level helpers shared by the library crates and the binary.

pub mod utils;
pub mod env;
