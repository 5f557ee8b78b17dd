use super::config::TangentialConfig;

/// Formats a numeric word value for G-code output.
///
/// * `decimal_places` — number of digits after the decimal point (rounded,
///   never in scientific notation).
/// * `strip_trailing_zeros` — remove trailing zeros in the fractional part
///   (and the decimal point itself if no fractional digits remain).
///
/// A value that rounds to zero is always written without a sign.
pub fn format_coord(value: f64, decimal_places: u32, strip_trailing_zeros: bool) -> String {
    let mut s = format!("{:.prec$}", value, prec = decimal_places as usize);

    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s.remove(0);
    }

    if strip_trailing_zeros && s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }

    s
}

/// `G1 X<x> Y<y>` for one arc waypoint, with an optional `F` word.
pub fn linear_move(cfg: &TangentialConfig, x: f64, y: f64, feed: Option<f64>) -> String {
    let places = cfg.format.coord_decimal_places;
    let mut line = format!(
        "{} X{} Y{}",
        cfg.motion.linear,
        format_coord(x, places, false),
        format_coord(y, places, false)
    );
    if let Some(f) = feed {
        line.push_str(" F");
        line.push_str(&format_coord(f, cfg.format.feed_decimal_places, true));
    }
    line
}

/// `G1 A<turns>` positioning the tangential axis.
pub fn heading_command(cfg: &TangentialConfig, turns: f64) -> String {
    format!(
        "{} {}{}",
        cfg.motion.linear,
        cfg.heading_letter(),
        format_coord(turns, cfg.format.heading_decimal_places, false)
    )
}

/// `G1 F<feed>` selecting the default feed rate.
pub fn feed_command(cfg: &TangentialConfig, feed: f64) -> String {
    format!(
        "{} F{}",
        cfg.motion.linear,
        format_coord(feed, cfg.format.feed_decimal_places, true)
    )
}
