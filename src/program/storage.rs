//! Validated load and atomic save of program files.
//!
//! # Save
//! 1. Join the lines with `\n` and terminate the last one.
//! 2. Write the text to `<target>.tmp` (same directory → same filesystem as
//!    the final path).
//! 3. Atomically rename the temp file over the target.
//! On any failure the temp file is deleted and the original is left intact.

use std::io::Write;
use std::path::Path;

use sha2::Digest as _;

use super::LoadedProgram;
use crate::error::AppError;

/// Load the program at `path`.
///
/// Returns [`AppError::FileNotFound`] if the path does not exist and
/// [`AppError::ProgramLoad`] if it cannot be read as UTF-8 text.
pub fn load(path: &Path) -> Result<LoadedProgram, AppError> {
    if !path.exists() {
        return Err(AppError::FileNotFound);
    }

    let bytes = std::fs::read(path)
        .map_err(|e| AppError::ProgramLoad(format!("cannot read {}: {e}", path.display())))?;
    let checksum = format!("{:x}", sha2::Sha256::digest(&bytes));

    let text = String::from_utf8(bytes)
        .map_err(|e| AppError::ProgramLoad(format!("{} is not UTF-8 text: {e}", path.display())))?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    tracing::info!(path = %path.display(), lines = lines.len(), %checksum, "program loaded");

    Ok(LoadedProgram {
        path: path.to_path_buf(),
        checksum,
        lines,
    })
}

/// Save `lines` to `path` using an atomic write.
///
/// The text is written to `<path>.tmp` in the same directory, then renamed
/// over `path`. On any error the temp file is removed and `path` is left
/// unchanged.
pub fn save<S: AsRef<str>>(lines: &[S], path: &Path) -> Result<(), AppError> {
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    if let Err(e) = write_text(lines, &tmp_path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        AppError::ProgramSave(format!("rename to final path failed: {e}"))
    })?;

    tracing::info!(path = %path.display(), lines = lines.len(), "program saved");
    Ok(())
}

fn write_text<S: AsRef<str>>(lines: &[S], path: &Path) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::ProgramSave(format!("cannot create temp file: {e}")))?;
    let mut writer = std::io::BufWriter::new(file);

    for line in lines {
        writer
            .write_all(line.as_ref().as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| AppError::ProgramSave(format!("write failed: {e}")))?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| AppError::ProgramSave(format!("flush failed: {e}")))?;
    file.sync_all()
        .map_err(|e| AppError::ProgramSave(format!("sync failed: {e}")))
}
