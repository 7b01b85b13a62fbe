use enigo::MouseControllable;

use crate::error::{ClickerError, Result};
use crate::model::Point;

/// One attached display and its extent in global screen coordinates, in the
/// units the input synthesizer clicks in.
#[derive(Clone, Debug, PartialEq)]
pub struct Display {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Global units per overlay point. 1.0 where the platform already reports
    /// display bounds in points.
    pub scale_factor: f32,
    pub is_primary: bool,
}

impl Display {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    fn scale(&self) -> f64 {
        let s = self.scale_factor as f64;
        if s.is_finite() && s > 0.0 { s } else { 1.0 }
    }

    /// Maps a position local to this display's overlay (origin top-left, in
    /// points) into global coordinates. Positions past the edge are pulled
    /// back inside.
    pub fn to_global(&self, local: Point) -> Point {
        let s = self.scale();
        let lx = clamp_axis(local.x * s, self.width);
        let ly = clamp_axis(local.y * s, self.height);
        Point::new(self.x + lx, self.y + ly)
    }

    /// Origin and size of an overlay covering this display, in points.
    pub fn overlay_geometry(&self) -> ([f32; 2], [f32; 2]) {
        let s = self.scale();
        (
            [(self.x / s) as f32, (self.y / s) as f32],
            [(self.width / s) as f32, (self.height / s) as f32],
        )
    }
}

fn clamp_axis(v: f64, extent: f64) -> f64 {
    let max = (extent - 1.0).max(0.0);
    if v.is_finite() { v.clamp(0.0, max) } else { 0.0 }
}

pub trait DisplaySource: Send + Sync {
    fn displays(&self) -> Result<Vec<Display>>;
}

/// Displays as reported by `display-info`, falling back to the main display
/// size from `enigo` when enumeration comes back empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemDisplays;

impl DisplaySource for SystemDisplays {
    fn displays(&self) -> Result<Vec<Display>> {
        match display_info::DisplayInfo::all() {
            Ok(infos) if !infos.is_empty() => Ok(infos
                .into_iter()
                .map(|d| Display {
                    id: d.id,
                    x: d.x as f64,
                    y: d.y as f64,
                    width: d.width as f64,
                    height: d.height as f64,
                    scale_factor: pixels_per_point(d.scale_factor),
                    is_primary: d.is_primary,
                })
                .collect()),
            Ok(_) => {
                tracing::warn!("no displays reported, using main display size");
                main_display()
            }
            Err(e) => {
                tracing::warn!(error = %e, "display enumeration failed, using main display size");
                main_display()
            }
        }
    }
}

/// `display-info` reports bounds in points on macOS and in physical pixels
/// elsewhere, where clicks are also physical.
fn pixels_per_point(reported: f32) -> f32 {
    if cfg!(target_os = "macos") { 1.0 } else { reported }
}

fn main_display() -> Result<Vec<Display>> {
    let (w, h) = enigo::Enigo::new().main_display_size();
    if w <= 0 || h <= 0 {
        return Err(ClickerError::Display(format!("main display reports {w}x{h}")));
    }
    Ok(vec![Display {
        id: 0,
        x: 0.0,
        y: 0.0,
        width: w as f64,
        height: h as f64,
        scale_factor: 1.0,
        is_primary: true,
    }])
}
