use eframe::egui::{self, Color32};
use std::{
    path::PathBuf,
    sync::{mpsc, Arc},
    time::Duration,
};
use uuid::Uuid;

use crate::display::SystemDisplays;
use crate::hotkeys::{display_name, HotkeyAction};
use crate::input::EnigoSynthesizer;
use crate::model::{ClickPoint, RunState};
use crate::overlay::{self, EguiOverlay};
use crate::permission::SystemPermission;
use crate::picker::{PendingPick, PointPicker};
use crate::sequencer::{Sequencer, SequencerEvent};
use crate::settings::Settings;

#[derive(Clone, Copy, Debug)]
enum Action {
    Repick(usize),
    MoveUp(usize),
    MoveDown(usize),
    Remove(usize),
}

/// What a finished pick is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PickTarget {
    NewPoint,
    StartingPoint,
    Replace(Uuid),
}

pub struct ClickerApp {
    settings: Settings,
    settings_path: PathBuf,
    sequencer: Sequencer,
    picker: PointPicker,
    pending_pick: Option<(PickTarget, PendingPick)>,
    events: mpsc::Receiver<SequencerEvent>,
    clicks_this_run: u64,
}

impl ClickerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, settings_path: PathBuf) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let backend = Arc::new(EguiOverlay::new(cc.egui_ctx.clone()));
        let picker = PointPicker::new(Arc::new(SystemDisplays), backend);
        let sequencer = Sequencer::new(Arc::new(EnigoSynthesizer), Arc::new(SystemPermission));
        let events = sequencer.subscribe();

        Self {
            settings,
            settings_path,
            sequencer,
            picker,
            pending_pick: None,
            events,
            clicks_this_run: 0,
        }
    }

    fn begin_pick(&mut self, target: PickTarget) {
        if self.pending_pick.is_some() {
            return;
        }
        if let Some(pending) = self.picker.begin() {
            self.pending_pick = Some((target, pending));
        }
    }

    fn poll_pick(&mut self) {
        let Some((target, pending)) = &self.pending_pick else { return };
        let Some(result) = pending.try_take() else { return };
        let target = *target;
        self.pending_pick = None;

        let Some(location) = result else { return };
        match target {
            PickTarget::NewPoint => {
                let name = format!("Point {}", self.settings.points.len() + 1);
                self.settings.points.push(ClickPoint::new(name, location));
            }
            PickTarget::StartingPoint => {
                self.settings.starting_point = Some(ClickPoint::new("Starting Point", location));
            }
            PickTarget::Replace(id) => {
                if let Some(point) = self.settings.points.iter_mut().find(|p| p.id() == id) {
                    point.location = location;
                }
            }
        }
    }

    fn drain_events(&mut self) {
        for event in self.events.try_iter() {
            match event {
                SequencerEvent::Clicked { .. } | SequencerEvent::StartingPointClicked(_) => {
                    self.clicks_this_run += 1;
                }
                SequencerEvent::StateChanged(_) => {}
            }
        }
    }

    fn start(&mut self) {
        self.clicks_this_run = 0;
        if let Err(e) = self.sequencer.start(self.settings.run_config()) {
            tracing::warn!(error = %e, "run not started");
        }
    }

    fn start_or_toggle(&mut self) {
        if self.sequencer.is_running() {
            if let Err(e) = self.sequencer.toggle_pause_resume() {
                tracing::warn!(error = %e, "toggle failed");
            }
        } else {
            self.start();
        }
    }

    fn clear_points(&mut self) {
        if !self.sequencer.is_running() {
            self.settings.points.clear();
        }
    }

    fn apply(&mut self, action: Action) {
        let points = &mut self.settings.points;
        match action {
            Action::Repick(idx) => {
                if let Some(id) = points.get(idx).map(|p| p.id()) {
                    self.begin_pick(PickTarget::Replace(id));
                }
            }
            Action::MoveUp(idx) => {
                if idx > 0 && idx < points.len() {
                    points.swap(idx, idx - 1);
                }
            }
            Action::MoveDown(idx) => {
                if idx + 1 < points.len() {
                    points.swap(idx, idx + 1);
                }
            }
            Action::Remove(idx) => {
                if idx < points.len() {
                    points.remove(idx);
                }
            }
        }
    }

    fn handle_hotkeys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.picker.is_active() {
            return;
        }
        let keys: Vec<egui::Key> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key { key, pressed: true, repeat: false, .. } => Some(*key),
                    _ => None,
                })
                .collect()
        });
        for key in keys {
            match self.settings.hotkeys.action_for(key) {
                Some(HotkeyAction::StartPause) => self.start_or_toggle(),
                Some(HotkeyAction::Stop) => self.sequencer.stop(),
                Some(HotkeyAction::AddPoint) => self.begin_pick(PickTarget::NewPoint),
                Some(HotkeyAction::ClearPoints) => self.clear_points(),
                None => {}
            }
        }
    }

    fn permission_pill(&mut self, ui: &mut egui::Ui) {
        let (text, color) = if self.sequencer.permission_granted() {
            ("Accessibility: Allowed", Color32::GREEN)
        } else {
            ("Accessibility: Missing", Color32::from_rgb(255, 165, 0))
        };
        let pill = egui::Label::new(egui::RichText::new(format!("● {text}")).color(color))
            .sense(egui::Sense::click());
        if ui.add(pill).on_hover_text("Click to check again").clicked() {
            self.sequencer.recheck_permission(true);
        }
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui, running: bool) {
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!running, |ui| {
                ui.label("Delay (s):");
                ui.add(
                    egui::DragValue::new(&mut self.settings.delay_secs)
                        .speed(0.1)
                        .clamp_range(0.0..=10_000.0),
                );
                ui.label("Loops (0 = ∞):");
                ui.add(egui::DragValue::new(&mut self.settings.loops).clamp_range(0..=10_000));
                ui.checkbox(&mut self.settings.warp_cursor, "Warp cursor to target");
            });
        });

        ui.horizontal(|ui| {
            if ui.button("Add Point").clicked() {
                self.begin_pick(PickTarget::NewPoint);
            }
            let label = match self.sequencer.state() {
                RunState::Running => "Pause",
                RunState::Paused => "Resume",
                _ => "Start",
            };
            if ui.button(label).clicked() {
                self.start_or_toggle();
            }
            if ui.add_enabled(running, egui::Button::new("Stop")).clicked() {
                self.sequencer.stop();
            }
            let can_clear = !running && !self.settings.points.is_empty();
            if ui.add_enabled(can_clear, egui::Button::new("Clear Points")).clicked() {
                self.clear_points();
            }
        });

        let hk = &self.settings.hotkeys;
        ui.small(format!(
            "Keys: {} start/pause · {} stop · {} add point · {} clear",
            display_name(&hk.start_pause),
            display_name(&hk.stop),
            display_name(&hk.add_point),
            display_name(&hk.clear_points),
        ));
    }

    fn starting_point_ui(&mut self, ui: &mut egui::Ui, running: bool) {
        ui.label("Starting Point");
        let has_start = self.settings.starting_point.is_some();
        ui.horizontal(|ui| {
            match &self.settings.starting_point {
                Some(sp) => ui.monospace(format!("X: {:.1}  Y: {:.1}", sp.location.x, sp.location.y)),
                None => ui.weak("None"),
            };
            ui.weak("Clicked once before the first loop");
            let set_label = if has_start { "Replace" } else { "Set" };
            if ui.add_enabled(!running, egui::Button::new(set_label)).clicked() {
                self.begin_pick(PickTarget::StartingPoint);
            }
            if ui.add_enabled(!running && has_start, egui::Button::new("Clear")).clicked() {
                self.settings.starting_point = None;
            }
        });
    }

    fn points_ui(&mut self, ui: &mut egui::Ui, running: bool) {
        ui.label(format!("Points ({})", self.settings.points.len()));
        if self.settings.points.is_empty() {
            ui.weak("No points yet. Use Add Point, then click the target.");
            return;
        }

        let mut action = None;
        let len = self.settings.points.len();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (idx, point) in self.settings.points.iter_mut().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(format!("#{}", idx + 1));
                    ui.add_enabled_ui(!running, |ui| {
                        ui.add(egui::TextEdit::singleline(&mut point.name).desired_width(140.0));
                        ui.label("X:");
                        ui.add(egui::DragValue::new(&mut point.location.x).speed(1.0));
                        ui.label("Y:");
                        ui.add(egui::DragValue::new(&mut point.location.y).speed(1.0));
                        if ui.small_button("Pick").clicked() {
                            action = Some(Action::Repick(idx));
                        }
                        if ui.add_enabled(idx > 0, egui::Button::new("Up").small()).clicked() {
                            action = Some(Action::MoveUp(idx));
                        }
                        if ui.add_enabled(idx + 1 < len, egui::Button::new("Down").small()).clicked() {
                            action = Some(Action::MoveDown(idx));
                        }
                        if ui.small_button("Remove").clicked() {
                            action = Some(Action::Remove(idx));
                        }
                    });
                });
            }
        });

        if let Some(action) = action {
            self.apply(action);
        }
    }
}

impl eframe::App for ClickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.poll_pick();
        overlay::show(ctx, &self.picker);
        self.handle_hotkeys(ctx);

        let running = self.sequencer.is_running();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Point Clicker");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.permission_pill(ui);
                });
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Status: {}", self.sequencer.status()));
                if running || self.clicks_this_run > 0 {
                    ui.separator();
                    ui.label(format!("Clicks: {}", self.clicks_this_run));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.controls_ui(ui, running);
            ui.separator();
            self.starting_point_ui(ui, running);
            ui.separator();
            self.points_ui(ui, running);
        });

        if running || self.pending_pick.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.sequencer.stop();
        if let Err(e) = self.settings.save(&self.settings_path) {
            tracing::error!(error = %e, "failed to save settings");
        }
    }
}
