use eframe::egui::Key;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotkeyAction {
    StartPause,
    Stop,
    AddPoint,
    ClearPoints,
}

/// In-app key bindings, stored as key names ("return", "delete", "=", "x").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyBindings {
    pub start_pause: String,
    pub stop: String,
    pub add_point: String,
    pub clear_points: String,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            start_pause: "return".into(),
            stop: "delete".into(),
            add_point: "=".into(),
            clear_points: "x".into(),
        }
    }
}

impl HotkeyBindings {
    /// The action bound to `key`, if any. Bindings are checked in a fixed
    /// order, so a key bound twice resolves to the first match.
    pub fn action_for(&self, key: Key) -> Option<HotkeyAction> {
        [
            (&self.start_pause, HotkeyAction::StartPause),
            (&self.stop, HotkeyAction::Stop),
            (&self.add_point, HotkeyAction::AddPoint),
            (&self.clear_points, HotkeyAction::ClearPoints),
        ]
        .into_iter()
        .find(|(name, _)| matches_key(name, key))
        .map(|(_, action)| action)
    }
}

/// Parses a binding name into the key it primarily stands for.
pub fn parse_key(name: &str) -> Option<Key> {
    let lower = name.trim().to_lowercase();
    match lower.as_str() {
        "return" | "enter" => Some(Key::Enter),
        "delete" | "backspace" => Some(Key::Backspace),
        "escape" | "esc" => Some(Key::Escape),
        "space" => Some(Key::Space),
        "tab" => Some(Key::Tab),
        "=" => Some(Key::Equals),
        "+" => Some(Key::Plus),
        "-" => Some(Key::Minus),
        s if s.chars().count() == 1 && s.chars().all(|c| c.is_ascii_alphanumeric()) => {
            Key::from_name(&s.to_uppercase())
        }
        _ => None,
    }
}

/// Like [`parse_key`], plus the aliases a binding also answers to: forward
/// delete for "delete", and "+" (shifted "=") for "=".
fn matches_key(name: &str, key: Key) -> bool {
    if parse_key(name) == Some(key) {
        return true;
    }
    matches!(
        (name.trim().to_lowercase().as_str(), key),
        ("delete" | "backspace", Key::Delete) | ("=", Key::Plus)
    )
}

/// Label for a binding in the UI.
pub fn display_name(name: &str) -> String {
    match name.trim().to_lowercase().as_str() {
        "return" | "enter" => "Enter/Return".into(),
        "delete" | "backspace" => "Delete".into(),
        "escape" | "esc" => "Escape".into(),
        "=" => "+ / =".into(),
        other => other.to_uppercase(),
    }
}
