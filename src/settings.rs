use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::hotkeys::HotkeyBindings;
use crate::model::{ClickPoint, RunConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds between clicks.
    pub delay_secs: f64,
    /// Passes over the point list; 0 repeats until stopped.
    pub loops: u32,
    pub warp_cursor: bool,
    /// Initialise the logger at debug level.
    pub debug_logging: bool,
    pub hotkeys: HotkeyBindings,
    pub points: Vec<ClickPoint>,
    pub starting_point: Option<ClickPoint>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay_secs: 1.0,
            loops: 0,
            warp_cursor: false,
            debug_logging: false,
            hotkeys: HotkeyBindings::default(),
            points: Vec::new(),
            starting_point: None,
        }
    }
}

impl Settings {
    /// `<config dir>/point_clicker/settings.json`, or the working directory
    /// when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("point_clicker")
            .join("settings.json")
    }

    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            points: self.points.clone(),
            starting_point: self.starting_point.clone(),
            delay_secs: self.delay_secs,
            loops: self.loops,
            warp_cursor: self.warp_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let s = Settings::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.delay_secs, 1.0);
        assert_eq!(s.loops, 0);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "loops": 3, "hotkeys": { "stop": "x" } }"#).unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.loops, 3);
        assert_eq!(s.delay_secs, 1.0);
        assert_eq!(s.hotkeys.stop, "x");
        assert_eq!(s.hotkeys.start_pause, "return");
    }

    #[test]
    fn test_save_then_load_keeps_points() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut s = Settings::default();
        s.points.push(ClickPoint::new("Point 1", Point::new(12.5, 40.0)));
        s.starting_point = Some(ClickPoint::new("Starting Point", Point::new(1.0, 2.0)));
        s.warp_cursor = true;
        s.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, s);
        assert_eq!(loaded.points[0].id(), s.points[0].id());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing"));
    }

    #[test]
    fn test_run_config_copies_fields() {
        let mut s = Settings { delay_secs: 0.5, loops: 2, ..Default::default() };
        s.points.push(ClickPoint::new("A", Point::new(10.0, 10.0)));
        let cfg = s.run_config();
        assert_eq!(cfg.points, s.points);
        assert_eq!(cfg.loops, 2);
        assert_eq!(cfg.delay_secs, 0.5);
        assert!(cfg.starting_point.is_none());
    }
}
