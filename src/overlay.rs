use eframe::egui::{self, Color32, Pos2, Sense, ViewportBuilder, ViewportId};

use crate::model::Point;
use crate::picker::{OverlayBackend, OverlaySurface, PointPicker, INSTRUCTIONS};

/// Draws pick overlays as extra egui viewports. The session state lives in
/// the picker; this only makes sure a frame runs when it changes.
pub struct EguiOverlay {
    ctx: egui::Context,
}

impl EguiOverlay {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl OverlayBackend for EguiOverlay {
    fn present(&self, surfaces: &[OverlaySurface]) {
        tracing::debug!(count = surfaces.len(), "presenting overlays");
        self.ctx.request_repaint();
    }

    fn dismiss(&self, surfaces: &[OverlaySurface]) {
        tracing::debug!(count = surfaces.len(), "dismissing overlays");
        self.ctx.request_repaint();
    }
}

/// One borderless, always-on-top viewport per live surface. Viewports not
/// shown in a frame are closed by egui, so a resolved session disappears on
/// the next repaint.
pub fn show(ctx: &egui::Context, picker: &PointPicker) {
    let surfaces = picker.surfaces();
    if surfaces.is_empty() {
        return;
    }

    for surface in surfaces {
        let (position, size) = surface.display.overlay_geometry();
        // The first overlay takes keyboard focus so Escape reaches it.
        let builder = ViewportBuilder::default()
            .with_title("Pick a point")
            .with_position(position)
            .with_inner_size(size)
            .with_decorations(false)
            .with_always_on_top()
            .with_transparent(true)
            .with_taskbar(false)
            .with_active(surface.index == 0);

        ctx.show_viewport_immediate(
            ViewportId::from_hash_of(("pick_overlay", surface.index)),
            builder,
            |ctx, _class| surface_ui(ctx, picker, surface.index),
        );
    }

    ctx.request_repaint();
}

fn surface_ui(ctx: &egui::Context, picker: &PointPicker, index: usize) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let rect = ui.max_rect();
            let _ = ui.allocate_rect(rect, Sense::click());
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, Color32::from_black_alpha(51));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                INSTRUCTIONS,
                egui::FontId::monospace(16.0),
                Color32::from_white_alpha(230),
            );
        });

    let (escape, click) = ctx.input(|i| {
        let click = if i.pointer.primary_clicked() { i.pointer.interact_pos() } else { None };
        (i.key_pressed(egui::Key::Escape), click)
    });

    if escape {
        picker.cancel();
    } else if let Some(Pos2 { x, y }) = click {
        // Viewport-local points; the display scales them to global units.
        picker.resolve_click(index, Point::new(x as f64, y as f64));
    }
}
