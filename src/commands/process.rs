//! The `tangentcam <INPUT>` command: load → transform → save.
//!
//! # Error contract
//! Every fallible path returns `Result<_, AppError>`. No `unwrap()` or
//! `expect()` calls are present outside of `#[cfg(test)]`.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::postprocessor::{config, Pipeline, ProcessStats, TangentialConfig};

/// Everything one run needs to know, as parsed from the command line.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub input: PathBuf,
    /// Defaults to [`default_output_path`] of `input`.
    pub output: Option<PathBuf>,
    /// Defaults to the built-in profile.
    pub config: Option<PathBuf>,
    /// Forces `tangential.enabled = false` when `true`.
    pub no_tangential: bool,
    /// Leaves arc commands unexpanded when `true`.
    pub no_arcs: bool,
}

/// What a successful run produced.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    pub input: String,
    pub output: String,
    /// SHA-256 of the input file.
    pub checksum: String,
    /// `"builtin"` or the profile path.
    pub profile: String,
    pub stats: ProcessStats,
}

/// `part.nc` → `part.tan.nc`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("tan.nc")
}

/// Loads the profile at `path`, or the built-in one.
pub fn load_profile(path: Option<&Path>) -> Result<TangentialConfig, AppError> {
    let cfg = match path {
        Some(p) => config::load(p)?,
        None => TangentialConfig::builtin()?,
    };
    Ok(cfg)
}

/// Runs one program file through the pipeline and writes the result.
pub fn process_file(request: &ProcessRequest) -> Result<ProcessReport, AppError> {
    let mut cfg = load_profile(request.config.as_deref())?;
    if request.no_tangential {
        cfg.tangential.enabled = false;
    }

    let program = crate::program::load(&request.input)?;
    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&request.input));

    let mut pipeline = Pipeline::new(&cfg)?;
    if request.no_arcs {
        pipeline = pipeline.skip_arc_expansion();
    }
    let result = pipeline.run(&program.lines);

    crate::program::save(&result.lines, &output)?;

    Ok(ProcessReport {
        input: program.path.display().to_string(),
        output: output.display().to_string(),
        checksum: program.checksum,
        profile: request
            .config
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "builtin".to_string()),
        stats: result.stats,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
