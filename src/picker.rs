//! Interactive point picking.
//!
//! A pick session covers every attached display with an overlay surface and
//! waits for one click or a cancel. The UI that draws the overlays reports
//! input back through [`PointPicker::resolve_click`] and [`PointPicker::cancel`];
//! the session converts the click to global coordinates, tears every surface
//! down, and only then hands the result to whoever is waiting.

use parking_lot::{Condvar, Mutex};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::display::{Display, DisplaySource};
use crate::model::Point;

pub const INSTRUCTIONS: &str = "Click to pick a point • ESC to cancel";

/// One overlay, covering one display.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlaySurface {
    pub index: usize,
    pub display: Display,
}

/// Shows and hides overlay surfaces. Called with the session lock held, so
/// implementations must not call back into the picker.
pub trait OverlayBackend: Send + Sync {
    fn present(&self, surfaces: &[OverlaySurface]);
    fn dismiss(&self, surfaces: &[OverlaySurface]);
}

struct Session {
    id: u64,
    surfaces: Vec<OverlaySurface>,
    /// `Some` once resolved; the inner `None` is a cancel.
    result: Option<Option<Point>>,
}

struct PickerShared {
    session: Mutex<Option<Session>>,
    resolved: Condvar,
    backend: Arc<dyn OverlayBackend>,
}

impl PickerShared {
    fn finish(&self, slot: &mut Option<Session>, point: Option<Point>) -> bool {
        let Some(session) = slot.as_mut() else { return false };
        if session.result.is_some() {
            return false;
        }
        let surfaces = std::mem::take(&mut session.surfaces);
        self.backend.dismiss(&surfaces);
        session.result = Some(point);
        self.resolved.notify_all();
        true
    }
}

pub struct PointPicker {
    shared: Arc<PickerShared>,
    displays: Arc<dyn DisplaySource>,
    next_id: AtomicU64,
}

impl PointPicker {
    pub fn new(displays: Arc<dyn DisplaySource>, backend: Arc<dyn OverlayBackend>) -> Self {
        Self {
            shared: Arc::new(PickerShared {
                session: Mutex::new(None),
                resolved: Condvar::new(),
                backend,
            }),
            displays,
            next_id: AtomicU64::new(1),
        }
    }

    /// Blocks until the user clicks an overlay (the global position) or
    /// cancels (`None`). Also `None` straight away if a pick is already open.
    pub fn pick(&self) -> Option<Point> {
        self.begin()?.wait()
    }

    /// Opens a session without blocking. `None` if one is already open or no
    /// display could be found.
    pub fn begin(&self) -> Option<PendingPick> {
        let mut slot = self.shared.session.lock();
        if slot.is_some() {
            tracing::debug!("pick already in progress");
            return None;
        }

        let displays = match self.displays.displays() {
            Ok(d) if !d.is_empty() => d,
            Ok(_) => {
                tracing::warn!("pick aborted: no displays");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "pick aborted");
                return None;
            }
        };

        let surfaces: Vec<OverlaySurface> = displays
            .into_iter()
            .enumerate()
            .map(|(index, display)| OverlaySurface { index, display })
            .collect();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::info!(surfaces = surfaces.len(), "pick session opened");
        self.shared.backend.present(&surfaces);
        *slot = Some(Session { id, surfaces, result: None });

        Some(PendingPick { shared: Arc::clone(&self.shared), id })
    }

    pub fn is_active(&self) -> bool {
        self.shared.session.lock().is_some()
    }

    /// Surfaces that should currently be on screen.
    pub fn surfaces(&self) -> Vec<OverlaySurface> {
        self.shared
            .session
            .lock()
            .as_ref()
            .map(|s| s.surfaces.clone())
            .unwrap_or_default()
    }

    /// A click at `local` (relative to the surface's top-left) on surface
    /// `index`. Returns `false` if that surface is no longer live.
    pub fn resolve_click(&self, index: usize, local: Point) -> bool {
        let mut slot = self.shared.session.lock();
        let Some(global) = slot
            .as_ref()
            .and_then(|s| s.surfaces.iter().find(|o| o.index == index))
            .map(|o| o.display.to_global(local))
        else {
            return false;
        };
        tracing::info!(x = global.x, y = global.y, "point picked");
        self.shared.finish(&mut slot, Some(global))
    }

    /// The cancel key. Returns `false` if nothing was waiting.
    pub fn cancel(&self) -> bool {
        let mut slot = self.shared.session.lock();
        let done = self.shared.finish(&mut slot, None);
        if done {
            tracing::info!("pick cancelled");
        }
        done
    }
}

/// Handle to an open session. Dropping it unresolved cancels the session.
pub struct PendingPick {
    shared: Arc<PickerShared>,
    id: u64,
}

impl PendingPick {
    /// Blocks until the session resolves.
    pub fn wait(self) -> Option<Point> {
        let mut slot = self.shared.session.lock();
        loop {
            match slot.as_mut() {
                Some(s) if s.id == self.id => {
                    if let Some(result) = s.result.take() {
                        *slot = None;
                        return result;
                    }
                }
                _ => return None,
            }
            self.shared.resolved.wait(&mut slot);
        }
    }

    /// `Some(result)` once resolved, after which the session is closed.
    pub fn try_take(&self) -> Option<Option<Point>> {
        let mut slot = self.shared.session.lock();
        match slot.as_mut() {
            Some(s) if s.id == self.id => {
                let result = s.result.take()?;
                *slot = None;
                Some(result)
            }
            // Session gone without us seeing it: treat as cancelled.
            _ => Some(None),
        }
    }
}

impl Drop for PendingPick {
    fn drop(&mut self) {
        let mut slot = self.shared.session.lock();
        if slot.as_ref().is_some_and(|s| s.id == self.id) {
            self.shared.finish(&mut slot, None);
            *slot = None;
        }
    }
}
