//! Line-sequence source and sink for G-code program files.
//!
//! The transform itself never touches the filesystem; this module hands it a
//! `Vec<String>` and writes back whatever it returns.

pub mod storage;

pub use storage::{load, save};

use std::path::PathBuf;

/// A program read from disk.
#[derive(Debug, Clone)]
pub struct LoadedProgram {
    /// Path the program was read from.
    pub path: PathBuf,
    /// SHA-256 hex digest of the file contents at load time.
    pub checksum: String,
    /// The program text split into lines, without line terminators.
    pub lines: Vec<String>,
}
