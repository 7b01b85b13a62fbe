//! Test doubles for the platform seams.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::display::{Display, DisplaySource};
use crate::error::{ClickerError, Result};
use crate::input::InputSynthesizer;
use crate::model::Point;
use crate::permission::PermissionService;
use crate::picker::{OverlayBackend, OverlaySurface};

#[derive(Default)]
pub struct RecordingInput {
    clicks: Mutex<Vec<(Point, Instant)>>,
}

impl RecordingInput {
    pub fn points(&self) -> Vec<Point> {
        self.clicks.lock().iter().map(|(p, _)| *p).collect()
    }

    pub fn count(&self) -> usize {
        self.clicks.lock().len()
    }

    pub fn gaps(&self) -> Vec<Duration> {
        let clicks = self.clicks.lock();
        clicks.windows(2).map(|w| w[1].1 - w[0].1).collect()
    }
}

impl InputSynthesizer for RecordingInput {
    fn click(&self, at: Point, _warp_cursor: bool) {
        self.clicks.lock().push((at, Instant::now()));
    }
}

pub struct FixedPermission(pub bool);

impl PermissionService for FixedPermission {
    fn is_granted(&self) -> bool {
        self.0
    }

    fn request_if_needed(&self, _prompt: bool) -> bool {
        self.0
    }
}

pub struct StaticDisplays(pub Vec<Display>);

impl StaticDisplays {
    /// A 1920x1080 primary with a 1280x1024 display to its right.
    pub fn dual() -> Self {
        Self(vec![
            Display {
                id: 1,
                x: 0.0,
                y: 0.0,
                width: 1920.0,
                height: 1080.0,
                scale_factor: 1.0,
                is_primary: true,
            },
            Display {
                id: 2,
                x: 1920.0,
                y: 0.0,
                width: 1280.0,
                height: 1024.0,
                scale_factor: 1.0,
                is_primary: false,
            },
        ])
    }
}

impl DisplaySource for StaticDisplays {
    fn displays(&self) -> Result<Vec<Display>> {
        if self.0.is_empty() {
            return Err(ClickerError::Display("no displays".into()));
        }
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct RecordingBackend {
    pub presented: Mutex<Vec<usize>>,
    pub dismissed: Mutex<Vec<usize>>,
}

impl RecordingBackend {
    /// Surfaces presented and not yet dismissed.
    pub fn visible(&self) -> usize {
        self.presented.lock().len() - self.dismissed.lock().len()
    }
}

impl OverlayBackend for RecordingBackend {
    fn present(&self, surfaces: &[OverlaySurface]) {
        self.presented.lock().extend(surfaces.iter().map(|s| s.index));
    }

    fn dismiss(&self, surfaces: &[OverlaySurface]) {
        self.dismissed.lock().extend(surfaces.iter().map(|s| s.index));
    }
}

/// Polls `cond` every few milliseconds until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
