//! Command handlers behind the `tangentcam` binary.
//!
//! Handlers take plain request structs so they can be exercised in tests
//! without going through argument parsing.

pub mod process;
