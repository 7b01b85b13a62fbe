use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

use point_clicker::{app::ClickerApp, logging, settings::Settings};

#[derive(Parser, Debug)]
#[command(name = "point_clicker", version, about = "Clicks a list of screen points in order")]
struct Args {
    /// Settings file (defaults to the user config dir).
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Debug-level logging; RUST_LOG may narrow it.
    #[arg(long)]
    debug: bool,
    /// Seconds between clicks.
    #[arg(long)]
    delay: Option<f64>,
    /// Passes over the point list, 0 for no limit.
    #[arg(long)]
    loops: Option<u32>,
    /// Leave the visible cursor on each target.
    #[arg(long)]
    warp: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(delay) = self.delay {
            settings.delay_secs = delay.max(0.0);
        }
        if let Some(loops) = self.loops {
            settings.loops = loops;
        }
        if self.warp {
            settings.warp_cursor = true;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let path = args.settings.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&path)?;
    args.apply(&mut settings);

    logging::init(settings.debug_logging || args.debug);
    tracing::info!(path = %path.display(), points = settings.points.len(), "settings loaded");

    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 480.0])
            .with_min_inner_size([520.0, 380.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Point Clicker",
        opts,
        Box::new(move |cc| Box::new(ClickerApp::new(cc, settings, path))),
    )
    .map_err(|e| anyhow::anyhow!("ui exited with error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_settings() {
        let args = Args::try_parse_from(["point_clicker", "--delay", "0.5", "--loops", "3", "--warp"]).unwrap();
        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.delay_secs, 0.5);
        assert_eq!(settings.loops, 3);
        assert!(settings.warp_cursor);
    }

    #[test]
    fn test_cli_defaults_leave_settings_alone() {
        let args = Args::try_parse_from(["point_clicker"]).unwrap();
        let mut settings = Settings { delay_secs: 2.0, loops: 5, warp_cursor: true, ..Default::default() };
        args.apply(&mut settings);
        assert_eq!(settings.delay_secs, 2.0);
        assert_eq!(settings.loops, 5);
        assert!(settings.warp_cursor);
    }
}
