//! Tool heading for a tangential (rotary) axis.
//!
//! Headings are expressed in turns: `0.0` points along +X, `0.25` along +Y
//! (with the built-in direction settings), one full revolution is `1.0`.

use super::config::TangentialConfig;

/// Heading (in turns) for a move of `(dx, dy)`.
///
/// The vector is weighted by the per-axis step densities before the angle is
/// taken, so the heading follows the physical tool path on machines whose
/// axes have different step counts. The angle is negated for moves that are
/// not clockwise and negated again when `invert_direction` is set. With
/// `normalize` the result lies in `[0, 1)`.
pub fn heading_turns(dx: f64, dy: f64, clockwise: bool, cfg: &TangentialConfig) -> f64 {
    let angle_rad = (dy * cfg.machine.steps_y).atan2(dx * cfg.machine.steps_x);
    let mut angle_deg = angle_rad.to_degrees();

    if !clockwise {
        angle_deg = -angle_deg;
    }
    if cfg.tangential.invert_direction {
        angle_deg = -angle_deg;
    }
    if cfg.tangential.normalize {
        angle_deg = angle_deg.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs.
        if angle_deg >= 360.0 {
            angle_deg -= 360.0;
        }
    }

    angle_deg / 360.0
}

/// Shifts `heading` by whole turns so it stays within `threshold` of
/// `previous`, and reports how many turns were added (negative when
/// subtracted).
pub fn correct_heading(heading: f64, previous: f64, threshold: f64) -> (f64, i64) {
    let delta = heading - previous;
    let turns = if delta > threshold {
        -(delta - threshold).ceil()
    } else if delta < -threshold {
        -(delta + threshold).floor()
    } else {
        0.0
    };
    (heading + turns, turns as i64)
}
