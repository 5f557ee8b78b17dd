/// Current (x, y) tool location, threaded through each pass.
///
/// Both coordinates are always replaced together: a move that names only one
/// axis inherits the other from the previous position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// The point a move with optional X/Y targets ends at.
    pub fn target(&self, x: Option<f64>, y: Option<f64>) -> Position {
        Position {
            x: x.unwrap_or(self.x),
            y: y.unwrap_or(self.y),
        }
    }

    /// Moves to `target(x, y)`.
    pub fn update(&mut self, x: Option<f64>, y: Option<f64>) {
        *self = self.target(x, y);
    }
}

/// The last heading (in turns) written to the tangential axis.
///
/// Absent until the first qualifying move; afterwards only ever replaced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingState {
    previous: Option<f64>,
}

impl HeadingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    pub fn replace(&mut self, turns: f64) {
        self.previous = Some(turns);
    }
}
