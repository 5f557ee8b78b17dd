use std::path::Path;

use super::block::CommandToken;
use super::PostProcessorError;

/// The profile shipped with the binary (`config/default.toml`).
const BUILTIN_PROFILE: &str = include_str!("../../config/default.toml");

/// Largest accepted `*_decimal_places` value.
const MAX_DECIMAL_PLACES: u32 = 10;

/// Fully describes one tangential-cutter machine. Loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TangentialConfig {
    pub machine: MachineConfig,
    pub format: FormatConfig,
    pub motion: MotionConfig,
    pub arcs: ArcsConfig,
    pub tangential: TangentialControlConfig,
}

/// `[machine]` — axis scaling and the position the program starts from.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MachineConfig {
    /// Motor steps per unit on X. Weights the X component of headings.
    pub steps_x: f64,
    /// Motor steps per unit on Y. Weights the Y component of headings.
    pub steps_y: f64,
    pub initial_x: f64,
    pub initial_y: f64,
}

/// `[format]` — output precision and the heading axis letter.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FormatConfig {
    pub coord_decimal_places: u32,
    pub heading_decimal_places: u32,
    /// Feed words are written with trailing zeros stripped.
    pub feed_decimal_places: u32,
    pub heading_axis: String,
}

/// `[motion]` — command tokens recognized in the input program.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MotionConfig {
    pub linear: String,
    pub arc_cw: String,
    pub arc_ccw: String,
    /// Lines carrying any of these tokens receive a heading in stage 2.
    pub supported: Vec<String>,
}

/// `[arcs]` — arc subdivision.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ArcsConfig {
    pub segments: u32,
    pub default_i: f64,
    pub default_j: f64,
    /// When true, an arc whose start and end coincide sweeps a full turn
    /// instead of collapsing to a zero-length sweep.
    pub full_circle: bool,
}

/// `[tangential]` — heading synthesis and continuity control.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TangentialControlConfig {
    pub enabled: bool,
    pub clockwise_command: String,
    pub invert_direction: bool,
    pub normalize: bool,
    /// Largest heading jump (in turns) accepted without a whole-turn correction.
    pub adjust_threshold: f64,
    pub min_movement: f64,
    pub default_feedrate: f64,
    /// Drop moves below `min_movement` instead of passing them through.
    pub drop_filtered_moves: bool,
}

impl TangentialConfig {
    /// The built-in profile.
    pub fn builtin() -> Result<Self, PostProcessorError> {
        parse(BUILTIN_PROFILE)
    }

    /// The heading axis as a single upper-case letter.
    pub fn heading_letter(&self) -> char {
        self.format
            .heading_axis
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('A')
    }
}

/// Parse a TOML string into a [`TangentialConfig`], running validation.
pub fn parse(toml_str: &str) -> Result<TangentialConfig, PostProcessorError> {
    let cfg: TangentialConfig =
        toml::from_str(toml_str).map_err(|e| PostProcessorError::Config(e.to_string()))?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Read and parse a profile from disk.
pub fn load(path: &Path) -> Result<TangentialConfig, PostProcessorError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PostProcessorError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    parse(&text)
}

fn validate(cfg: &TangentialConfig) -> Result<(), PostProcessorError> {
    let m = &cfg.machine;
    for (name, value) in [("machine.steps_x", m.steps_x), ("machine.steps_y", m.steps_y)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(PostProcessorError::Config(format!(
                "{name} must be a positive number"
            )));
        }
    }

    for (name, value) in [
        ("machine.initial_x", m.initial_x),
        ("machine.initial_y", m.initial_y),
        ("arcs.default_i", cfg.arcs.default_i),
        ("arcs.default_j", cfg.arcs.default_j),
    ] {
        if !value.is_finite() {
            return Err(PostProcessorError::Config(format!("{name} must be finite")));
        }
    }

    for (name, places) in [
        ("format.coord_decimal_places", cfg.format.coord_decimal_places),
        ("format.heading_decimal_places", cfg.format.heading_decimal_places),
        ("format.feed_decimal_places", cfg.format.feed_decimal_places),
    ] {
        if places > MAX_DECIMAL_PLACES {
            return Err(PostProcessorError::Config(format!(
                "{name} must be at most {MAX_DECIMAL_PLACES}"
            )));
        }
    }

    // The heading axis must not collide with a word the transform reads.
    let axis = cfg.format.heading_axis.as_str();
    let axis_ok = axis.len() == 1
        && axis.chars().all(|c| c.is_ascii_alphabetic())
        && !matches!(
            axis.to_ascii_uppercase().as_str(),
            "X" | "Y" | "I" | "J" | "F" | "G"
        );
    if !axis_ok {
        return Err(PostProcessorError::Config(format!(
            "format.heading_axis must be a single letter other than X, Y, I, J, F, G (got {axis:?})"
        )));
    }

    let motion = &cfg.motion;
    let named_tokens = [
        ("motion.linear", &motion.linear),
        ("motion.arc_cw", &motion.arc_cw),
        ("motion.arc_ccw", &motion.arc_ccw),
        ("tangential.clockwise_command", &cfg.tangential.clockwise_command),
    ];
    for (name, token) in named_tokens {
        check_token(name, token)?;
    }
    if motion.supported.is_empty() {
        return Err(PostProcessorError::Config(
            "motion.supported must list at least one command".to_string(),
        ));
    }
    for token in &motion.supported {
        check_token("motion.supported", token)?;
    }

    if cfg.arcs.segments == 0 {
        return Err(PostProcessorError::Config(
            "arcs.segments must be at least 1".to_string(),
        ));
    }

    let t = &cfg.tangential;
    if !(t.adjust_threshold > 0.0 && t.adjust_threshold <= 1.0) {
        return Err(PostProcessorError::Config(
            "tangential.adjust_threshold must be in (0, 1]".to_string(),
        ));
    }
    if !t.min_movement.is_finite() || t.min_movement < 0.0 {
        return Err(PostProcessorError::Config(
            "tangential.min_movement must be zero or positive".to_string(),
        ));
    }
    if !t.default_feedrate.is_finite() || t.default_feedrate <= 0.0 {
        return Err(PostProcessorError::Config(
            "tangential.default_feedrate must be a positive number".to_string(),
        ));
    }

    Ok(())
}

fn check_token(name: &str, token: &str) -> Result<(), PostProcessorError> {
    if CommandToken::parse(token).is_none() {
        return Err(PostProcessorError::Config(format!(
            "{name} must be a letter followed by a number (got {token:?})"
        )));
    }
    Ok(())
}
