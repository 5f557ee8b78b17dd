//! Two-pass program transform.
//!
//! ```text
//! raw lines ──expand──▶ expanded lines ──annotate──▶ annotated lines
//!            (arcs → G1 chords)          (feed + heading before each move)
//! ```
//!
//! Each pass is a single forward reduction over its input: a line's output
//! depends only on the line itself and on the [`Position`] / [`HeadingState`]
//! accumulated from the lines before it.

use super::arcs::{subdivide, Arc};
use super::block::{Block, Command, MotionTokens};
use super::config::TangentialConfig;
use super::formatter::{feed_command, heading_command, linear_move};
use super::modal::{HeadingState, Position};
use super::tangential::{correct_heading, heading_turns};
use super::PostProcessorError;

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStats {
    pub input_lines: usize,
    pub expanded_lines: usize,
    pub output_lines: usize,
    pub arcs_expanded: usize,
    pub segments_emitted: usize,
    pub headings_emitted: usize,
    pub feeds_injected: usize,
    pub moves_filtered: usize,
    pub continuity_corrections: usize,
}

/// The transformed program and what it took to produce it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub lines: Vec<String>,
    pub stats: ProcessStats,
}

/// Runs arc expansion followed by tangential annotation.
pub fn process<S: AsRef<str>>(
    lines: &[S],
    cfg: &TangentialConfig,
) -> Result<ProcessOutput, PostProcessorError> {
    Ok(Pipeline::new(cfg)?.run(lines))
}

/// Stage 1 on its own: replaces every arc with linear chords.
pub fn expand_arcs<S: AsRef<str>>(
    lines: &[S],
    cfg: &TangentialConfig,
) -> Result<Vec<String>, PostProcessorError> {
    let pipeline = Pipeline::new(cfg)?;
    Ok(pipeline.expand(lines, &mut ProcessStats::default()))
}

/// Stage 2 on its own: adds feed and heading commands before each move.
pub fn annotate_tangential<S: AsRef<str>>(
    lines: &[S],
    cfg: &TangentialConfig,
) -> Result<Vec<String>, PostProcessorError> {
    let pipeline = Pipeline::new(cfg)?;
    Ok(pipeline.annotate(lines, &mut ProcessStats::default()))
}

/// A configured transform, reusable across programs.
pub struct Pipeline<'a> {
    cfg: &'a TangentialConfig,
    tokens: MotionTokens,
    expand_arcs: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(cfg: &'a TangentialConfig) -> Result<Self, PostProcessorError> {
        Ok(Pipeline {
            cfg,
            tokens: MotionTokens::from_config(cfg)?,
            expand_arcs: true,
        })
    }

    /// Leaves arc commands in place; stage 2 then sees them as single moves.
    pub fn skip_arc_expansion(mut self) -> Self {
        self.expand_arcs = false;
        self
    }

    pub fn run<S: AsRef<str>>(&self, lines: &[S]) -> ProcessOutput {
        let mut stats = ProcessStats {
            input_lines: lines.len(),
            ..ProcessStats::default()
        };

        let expanded = if self.expand_arcs {
            self.expand(lines, &mut stats)
        } else {
            lines.iter().map(|l| l.as_ref().to_string()).collect()
        };
        stats.expanded_lines = expanded.len();

        let annotated = self.annotate(&expanded, &mut stats);
        stats.output_lines = annotated.len();

        tracing::info!(
            input = stats.input_lines,
            output = stats.output_lines,
            arcs = stats.arcs_expanded,
            headings = stats.headings_emitted,
            filtered = stats.moves_filtered,
            corrections = stats.continuity_corrections,
            "program transformed"
        );

        ProcessOutput {
            lines: annotated,
            stats,
        }
    }

    fn expand<S: AsRef<str>>(&self, lines: &[S], stats: &mut ProcessStats) -> Vec<String> {
        let cfg = self.cfg;
        let mut position = Position::new(cfg.machine.initial_x, cfg.machine.initial_y);
        let mut out = Vec::with_capacity(lines.len());

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let cmd = Command::parse(line, &self.tokens);

            let Some(arc) =
                Arc::from_command(&cmd, position, cfg.arcs.default_i, cfg.arcs.default_j)
            else {
                position.update(cmd.x, cmd.y);
                out.push(line.to_string());
                continue;
            };

            warn_malformed(&cmd.block, index, &['X', 'Y', 'I', 'J', 'F']);
            let points = subdivide(&arc, cfg.arcs.segments, cfg.arcs.full_circle);
            tracing::debug!(
                line = index + 1,
                radius = arc.radius,
                clockwise = arc.clockwise,
                points = points.len(),
                "expanding arc"
            );

            stats.arcs_expanded += 1;
            stats.segments_emitted += points.len();
            for point in points {
                out.push(linear_move(cfg, point.x, point.y, cmd.feed));
                position = point;
            }
        }

        out
    }

    fn annotate<S: AsRef<str>>(&self, lines: &[S], stats: &mut ProcessStats) -> Vec<String> {
        let cfg = self.cfg;
        let tangential = &cfg.tangential;
        if !tangential.enabled {
            return lines.iter().map(|l| l.as_ref().to_string()).collect();
        }

        let mut position = Position::new(cfg.machine.initial_x, cfg.machine.initial_y);
        let mut heading = HeadingState::new();
        let mut out = Vec::with_capacity(lines.len() * 3);

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let block = Block::parse(line);

            if !block.has_any_command(&self.tokens.supported) {
                // Rapids and other positioned lines still move the machine.
                position.update(block.value('X'), block.value('Y'));
                out.push(line.to_string());
                continue;
            }

            warn_malformed(&block, index, &['X', 'Y', 'F']);
            let target = position.target(block.value('X'), block.value('Y'));
            let dx = target.x - position.x;
            let dy = target.y - position.y;

            if dx.abs() < tangential.min_movement && dy.abs() < tangential.min_movement {
                stats.moves_filtered += 1;
                tracing::trace!(line = index + 1, dx, dy, "move below minimum; no heading");
                if !tangential.drop_filtered_moves {
                    out.push(line.to_string());
                }
                continue;
            }

            let clockwise = block.has_command(&self.tokens.clockwise);
            let mut turns = heading_turns(dx, dy, clockwise, cfg);
            if let Some(previous) = heading.previous() {
                let (corrected, applied) =
                    correct_heading(turns, previous, tangential.adjust_threshold);
                if applied != 0 {
                    stats.continuity_corrections += 1;
                    tracing::trace!(line = index + 1, applied, "heading corrected by whole turns");
                }
                turns = corrected;
            }

            if block.value('F').is_none() {
                out.push(feed_command(cfg, tangential.default_feedrate));
                stats.feeds_injected += 1;
            }
            out.push(heading_command(cfg, turns));
            out.push(line.to_string());
            stats.headings_emitted += 1;

            heading.replace(turns);
            position = target;
        }

        out
    }
}

fn warn_malformed(block: &Block, index: usize, letters: &[char]) {
    for &letter in letters {
        if block.is_malformed(letter) {
            tracing::warn!(
                line = index + 1,
                %letter,
                text = block.raw(),
                "parameter without a number treated as absent"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> TangentialConfig {
        TangentialConfig::builtin().expect("builtin profile")
    }

    fn cfg_segments(n: u32) -> TangentialConfig {
        let mut c = cfg();
        c.arcs.segments = n;
        c
    }

    /// Reads the heading value back out of a `G1 A…` line.
    fn heading_of(line: &str) -> f64 {
        Block::parse(line).value('A').expect("heading line")
    }

    fn headings(lines: &[String]) -> Vec<f64> {
        lines
            .iter()
            .filter(|l| Block::parse(l).value('A').is_some())
            .map(|l| heading_of(l))
            .collect()
    }

    // ── stage 1: arc expansion ──────────────────────────────────────────────

    #[test]
    fn clockwise_semicircle_expands_to_five_points() {
        let out = expand_arcs(&["G2 X10 Y0 I5 J0"], &cfg_segments(4)).expect("expand");
        assert_eq!(
            out,
            vec![
                "G1 X0.0000 Y0.0000",
                "G1 X1.4645 Y3.5355",
                "G1 X5.0000 Y5.0000",
                "G1 X8.5355 Y3.5355",
                "G1 X10.0000 Y0.0000",
            ]
        );
    }

    #[test]
    fn arc_free_program_is_unchanged() {
        let program = vec![
            "%".to_string(),
            "G21 G90 G17".to_string(),
            "G0 X5 Y5".to_string(),
            "  G1 X10 Y5 F300  ".to_string(),
            "(comment with G2 inside)".to_string(),
            "G1 Y10".to_string(),
            "M30".to_string(),
        ];
        let out = expand_arcs(&program, &cfg()).expect("expand");
        assert_eq!(out, program);
    }

    #[test]
    fn arc_starts_from_previous_target() {
        let lines = ["G1 X10 Y0", "G3 X0 Y10 I-10 J0"];
        let out = expand_arcs(&lines, &cfg_segments(2)).expect("expand");
        assert_eq!(out[0], "G1 X10 Y0");
        assert_eq!(out[1], "G1 X10.0000 Y0.0000");
        assert_eq!(out[2], "G1 X7.0711 Y7.0711");
        assert_eq!(out[3], "G1 X0.0000 Y10.0000");
    }

    #[test]
    fn explicit_zero_target_is_honoured() {
        // X0 must not fall back to the current X of 10.
        let lines = ["G1 X10 Y0", "G2 X0 Y0 I-5 J0"];
        let out = expand_arcs(&lines, &cfg_segments(2)).expect("expand");
        assert_eq!(out.last().map(String::as_str), Some("G1 X0.0000 Y0.0000"));
    }

    #[test]
    fn missing_target_falls_back_to_position() {
        // No X/Y: the arc closes on itself, legacy interpretation collapses it.
        let lines = ["G1 X10 Y0", "G2 I-5 J0"];
        let out = expand_arcs(&lines, &cfg_segments(3)).expect("expand");
        assert_eq!(out.len(), 5);
        for line in &out[1..] {
            assert_eq!(line, "G1 X10.0000 Y0.0000");
        }
    }

    #[test]
    fn missing_offsets_use_configured_defaults() {
        let mut c = cfg_segments(2);
        c.arcs.default_i = 5.0;
        let out = expand_arcs(&["G2 X10 Y0"], &c).expect("expand");
        assert_eq!(out[1], "G1 X5.0000 Y5.0000");
    }

    #[test]
    fn zero_radius_arc_emits_coincident_points() {
        let out = expand_arcs(&["G1 X2 Y3", "G2 X4 Y3"], &cfg_segments(3)).expect("expand");
        assert_eq!(out.len(), 5);
        for line in &out[1..] {
            assert_eq!(line, "G1 X2.0000 Y3.0000");
        }
    }

    #[test]
    fn full_circle_flag_draws_the_whole_circle() {
        let mut c = cfg_segments(4);
        c.arcs.full_circle = true;
        let out = expand_arcs(&["G1 X10 Y0", "G3 X10 Y0 I-10 J0"], &c).expect("expand");
        assert_eq!(
            &out[1..],
            &[
                "G1 X10.0000 Y0.0000",
                "G1 X0.0000 Y10.0000",
                "G1 X-10.0000 Y0.0000",
                "G1 X0.0000 Y-10.0000",
                "G1 X10.0000 Y0.0000",
            ]
        );
    }

    #[test]
    fn arc_feed_is_carried_onto_segments() {
        let out = expand_arcs(&["G2 X10 Y0 I5 J0 F300"], &cfg_segments(2)).expect("expand");
        assert!(out.iter().all(|l| l.ends_with(" F300")), "{out:?}");
    }

    #[test]
    fn leading_zero_arc_token_is_expanded() {
        let out = expand_arcs(&["G02 X10 Y0 I5 J0"], &cfg_segments(4)).expect("expand");
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn unit_selection_is_not_mistaken_for_an_arc() {
        let out = expand_arcs(&["G20", "G21"], &cfg()).expect("expand");
        assert_eq!(out, vec!["G20", "G21"]);
    }

    // ── stage 2: tangential annotation ──────────────────────────────────────

    #[test]
    fn straight_moves_get_feed_and_heading() {
        let out = annotate_tangential(&["G1 X1 Y0", "G1 X1 Y1"], &cfg()).expect("annotate");
        assert_eq!(
            out,
            vec![
                "G1 F1000",
                "G1 A0.0000",
                "G1 X1 Y0",
                "G1 F1000",
                "G1 A0.2500",
                "G1 X1 Y1",
            ]
        );
    }

    #[test]
    fn explicit_feed_suppresses_default_feed() {
        let out = annotate_tangential(&["G1 X1 Y0 F250"], &cfg()).expect("annotate");
        assert_eq!(out, vec!["G1 A0.0000", "G1 X1 Y0 F250"]);
    }

    #[test]
    fn large_jump_takes_the_short_way_round() {
        // Along +X (0.0), then along 0.9 turns: corrected to -0.1.
        let a = 0.9_f64 * std::f64::consts::TAU;
        let lines = vec![
            "G1 X1 Y0".to_string(),
            format!("G1 X{} Y{}", 1.0 + a.cos(), a.sin()),
        ];
        let out = annotate_tangential(&lines, &cfg()).expect("annotate");
        let h = headings(&out);
        assert_eq!(h.len(), 2);
        assert!((h[0] - 0.0).abs() < 1e-4);
        assert!((h[1] - (-0.1)).abs() < 1e-4, "got {}", h[1]);
    }

    #[test]
    fn consecutive_headings_stay_within_threshold() {
        // A closed square traversed twice: headings keep winding.
        let square = ["G1 X10 Y0", "G1 X10 Y10", "G1 X0 Y10", "G1 X0 Y0"];
        let lines: Vec<&str> = square.iter().chain(square.iter()).copied().collect();
        let out = annotate_tangential(&lines, &cfg()).expect("annotate");
        let h = headings(&out);
        assert_eq!(h.len(), 8);
        for pair in h.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 0.5 + 1e-9, "{pair:?}");
        }
        assert!((h[7] - 1.75).abs() < 1e-9, "winding heading {}", h[7]);
    }

    #[test]
    fn tiny_move_passes_through_without_heading() {
        let c = cfg();
        let out = annotate_tangential(&["G1 X1 Y0", "G1 X1.0005 Y0.0002", "G1 X1 Y1"], &c)
            .expect("annotate");
        assert_eq!(
            out,
            vec![
                "G1 F1000",
                "G1 A0.0000",
                "G1 X1 Y0",
                "G1 X1.0005 Y0.0002",
                "G1 F1000",
                "G1 A0.2500",
                "G1 X1 Y1",
            ]
        );
    }

    #[test]
    fn filtered_move_leaves_state_untouched() {
        // Position stays at (1,0): the third move is measured from there.
        let out = annotate_tangential(&["G1 X1 Y0", "G1 X1.0009 Y0", "G1 X1.0009 Y1"], &cfg())
            .expect("annotate");
        let h = headings(&out);
        assert_eq!(h.len(), 2);
        let expected = (1.0_f64).atan2(0.0009).to_degrees() / 360.0;
        assert!((h[1] - expected).abs() < 1e-4);
    }

    #[test]
    fn plunge_without_xy_is_kept() {
        let out = annotate_tangential(&["G1 Z-1 F100"], &cfg()).expect("annotate");
        assert_eq!(out, vec!["G1 Z-1 F100"]);
    }

    #[test]
    fn drop_filtered_moves_removes_the_line() {
        let mut c = cfg();
        c.tangential.drop_filtered_moves = true;
        let out = annotate_tangential(&["G1 Z-1 F100", "G1 X1"], &c).expect("annotate");
        assert_eq!(out, vec!["G1 F1000", "G1 A0.0000", "G1 X1"]);
    }

    #[test]
    fn disabled_tangential_control_returns_input() {
        let mut c = cfg();
        c.tangential.enabled = false;
        let lines = ["G1 X1 Y0", "G1 X1 Y1"];
        let out = annotate_tangential(&lines, &c).expect("annotate");
        assert_eq!(out, lines);
    }

    #[test]
    fn rapid_moves_update_position_without_heading() {
        let out = annotate_tangential(&["G0 X10 Y10", "G1 X10 Y20"], &cfg()).expect("annotate");
        assert_eq!(
            out,
            vec!["G0 X10 Y10", "G1 F1000", "G1 A0.2500", "G1 X10 Y20"]
        );
    }

    #[test]
    fn initial_position_comes_from_config() {
        let mut c = cfg();
        c.machine.initial_x = 5.0;
        c.machine.initial_y = 5.0;
        let out = annotate_tangential(&["G1 X5 Y0"], &c).expect("annotate");
        assert_eq!(out[1], "G1 A0.7500");
    }

    #[test]
    fn clockwise_command_mirrors_heading() {
        let mut c = cfg();
        c.tangential.min_movement = 0.0;
        let out = annotate_tangential(&["G2 X0 Y1 I0 J0.5"], &c).expect("annotate");
        assert_eq!(out[1], "G1 A0.7500");
    }

    #[test]
    fn heading_axis_letter_is_configurable() {
        let mut c = cfg();
        c.format.heading_axis = "C".to_string();
        let out = annotate_tangential(&["G1 X0 Y1"], &c).expect("annotate");
        assert_eq!(out[1], "G1 C0.2500");
    }

    // ── full pipeline ───────────────────────────────────────────────────────

    #[test]
    fn process_counts_every_stage() {
        let out = process(&["G21", "G2 X10 Y0 I5 J0", "M30"], &cfg_segments(4)).expect("process");
        let s = &out.stats;
        assert_eq!(s.input_lines, 3);
        assert_eq!(s.arcs_expanded, 1);
        assert_eq!(s.segments_emitted, 5);
        assert_eq!(s.expanded_lines, 7);
        // First point coincides with the start and is filtered.
        assert_eq!(s.moves_filtered, 1);
        assert_eq!(s.headings_emitted, 4);
        assert_eq!(s.feeds_injected, 4);
        assert_eq!(s.output_lines, out.lines.len());
        assert_eq!(out.lines.first().map(String::as_str), Some("G21"));
        assert_eq!(out.lines.last().map(String::as_str), Some("M30"));
    }

    #[test]
    fn semicircle_headings_turn_clockwise_monotonically() {
        let out = process(&["G2 X10 Y0 I5 J0"], &cfg_segments(8)).expect("process");
        let h = headings(&out.lines);
        assert_eq!(h.len(), 8);
        // Path starts heading up (+Y, 0.25) and ends heading down (-Y).
        assert!(h[0] < 0.25 && h[0] > 0.15, "first heading {}", h[0]);
        for pair in h.windows(2) {
            assert!(pair[1] < pair[0], "{pair:?}");
            assert!((pair[1] - pair[0]).abs() <= 0.5);
        }
        assert!(h[7] < -0.15 && h[7] > -0.25, "last heading {}", h[7]);
    }

    #[test]
    fn skipping_arc_expansion_leaves_arcs_in_place() {
        let c = cfg();
        let pipeline = Pipeline::new(&c).expect("pipeline").skip_arc_expansion();
        let out = pipeline.run(&["G2 X10 Y0 I5 J0"]);
        assert_eq!(out.stats.arcs_expanded, 0);
        assert_eq!(out.lines.last().map(String::as_str), Some("G2 X10 Y0 I5 J0"));
    }

    #[test]
    fn invalid_token_is_reported() {
        let mut c = cfg();
        c.motion.linear = "linear".to_string();
        assert!(matches!(
            process(&["G1 X1"], &c),
            Err(PostProcessorError::Config(_))
        ));
    }

    #[test]
    fn stats_serialize_as_camel_case() {
        let value = serde_json::to_value(ProcessStats::default()).expect("serialize");
        assert_eq!(value["headingsEmitted"], 0);
        assert_eq!(value["continuityCorrections"], 0);
    }
}
