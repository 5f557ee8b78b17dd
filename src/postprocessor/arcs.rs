use std::f64::consts::TAU;

use super::block::{Command, CommandKind};
use super::modal::Position;

/// Start and end within this distance make an arc a full circle candidate.
const COINCIDENT_EPSILON: f64 = 1e-9;

/// A circular move in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub start: Position,
    pub end: Position,
    pub center: Position,
    /// `|I, J|`; always `>= 0`. A zero radius is a degenerate arc.
    pub radius: f64,
    pub clockwise: bool,
}

impl Arc {
    /// Builds the arc an arc command describes when issued from `start`.
    ///
    /// Missing X/Y fall back to `start`; missing I/J fall back to the
    /// configured defaults. Returns `None` for non-arc commands.
    pub fn from_command(
        cmd: &Command,
        start: Position,
        default_i: f64,
        default_j: f64,
    ) -> Option<Arc> {
        let clockwise = match cmd.kind {
            CommandKind::ArcCw => true,
            CommandKind::ArcCcw => false,
            _ => return None,
        };
        let i = cmd.i.unwrap_or(default_i);
        let j = cmd.j.unwrap_or(default_j);

        Some(Arc {
            start,
            end: start.target(cmd.x, cmd.y),
            center: Position::new(start.x + i, start.y + j),
            radius: i.hypot(j),
            clockwise,
        })
    }

    /// `true` when the arc starts and ends at the same point.
    pub fn is_closed(&self) -> bool {
        (self.end.x - self.start.x).abs() < COINCIDENT_EPSILON
            && (self.end.y - self.start.y).abs() < COINCIDENT_EPSILON
    }
}

/// Returns the start and end angles (radians) of an arc around `center`.
///
/// The end angle is shifted by one turn when needed so that the sweep
/// `end − start` is negative for clockwise arcs and positive for
/// counter-clockwise arcs, never exceeding one turn. Equal angles yield a
/// zero sweep.
pub fn arc_angles(start: Position, end: Position, center: Position, clockwise: bool) -> (f64, f64) {
    let start_angle = (start.y - center.y).atan2(start.x - center.x);
    let mut end_angle = (end.y - center.y).atan2(end.x - center.x);

    if clockwise {
        if end_angle > start_angle {
            end_angle -= TAU;
        }
    } else if end_angle < start_angle {
        end_angle += TAU;
    }

    (start_angle, end_angle)
}

/// Divides `arc` into `segments` chords and returns the `segments + 1`
/// waypoints, first at the arc start and last at the arc end.
///
/// With `full_circle` set, a closed arc with a non-zero radius sweeps a whole
/// turn in its direction; otherwise it collapses to coincident points.
pub fn subdivide(arc: &Arc, segments: u32, full_circle: bool) -> Vec<Position> {
    let (start_angle, mut end_angle) = arc_angles(arc.start, arc.end, arc.center, arc.clockwise);

    if full_circle && arc.radius > 0.0 && arc.is_closed() {
        end_angle = if arc.clockwise {
            start_angle - TAU
        } else {
            start_angle + TAU
        };
    }

    let angle_step = (end_angle - start_angle) / segments as f64;

    (0..=segments)
        .map(|i| {
            let angle = start_angle + i as f64 * angle_step;
            Position::new(
                arc.center.x + arc.radius * angle.cos(),
                arc.center.y + arc.radius * angle.sin(),
            )
        })
        .collect()
}
