use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A position in global screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rounded to whole pixels, which is what the input backends address.
    pub fn to_pixels(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClickPoint {
    id: Uuid,
    pub name: String,
    pub location: Point,
}

impl ClickPoint {
    pub fn new(name: impl Into<String>, location: Point) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), location }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Everything a run needs, captured when it starts.
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    pub points: Vec<ClickPoint>,
    pub starting_point: Option<ClickPoint>,
    /// Seconds between clicks.
    pub delay_secs: f64,
    /// Number of passes over `points`; 0 repeats until stopped.
    pub loops: u32,
    pub warp_cursor: bool,
}

impl RunConfig {
    /// Negative or non-finite delays collapse to zero; delays too large for
    /// a `Duration` saturate.
    pub fn delay(&self) -> std::time::Duration {
        if self.delay_secs.is_finite() && self.delay_secs > 0.0 {
            std::time::Duration::try_from_secs_f64(self.delay_secs)
                .unwrap_or(std::time::Duration::MAX)
        } else {
            std::time::Duration::ZERO
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.loops == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl RunState {
    pub fn is_active(self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }

    pub fn label(self) -> &'static str {
        match self {
            RunState::Idle => "Idle",
            RunState::Running => "Running",
            RunState::Paused => "Paused",
            RunState::Completed => "Completed",
            RunState::Stopped => "Stopped",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_delay_clamps_bad_values() {
        let mut cfg = RunConfig { delay_secs: -1.0, ..Default::default() };
        assert_eq!(cfg.delay(), Duration::ZERO);
        cfg.delay_secs = f64::NAN;
        assert_eq!(cfg.delay(), Duration::ZERO);
        cfg.delay_secs = 0.25;
        assert_eq!(cfg.delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_delay_saturates_when_too_large() {
        let cfg = RunConfig { delay_secs: 1e20, ..Default::default() };
        assert_eq!(cfg.delay(), Duration::MAX);
    }

    #[test]
    fn test_click_point_ids_are_unique() {
        let a = ClickPoint::new("A", Point::new(1.0, 1.0));
        let b = ClickPoint::new("A", Point::new(1.0, 1.0));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_point_rounds_to_pixels() {
        assert_eq!(Point::new(10.4, 19.6).to_pixels(), (10, 20));
        assert_eq!(Point::new(-0.6, 0.5).to_pixels(), (-1, 1));
    }
}
