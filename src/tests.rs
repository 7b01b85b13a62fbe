use std::{sync::Arc, thread, time::Duration};

use crate::model::{ClickPoint, Point, RunState};
use crate::picker::PointPicker;
use crate::sequencer::Sequencer;
use crate::settings::Settings;
use crate::testutil::{wait_until, FixedPermission, RecordingBackend, RecordingInput, StaticDisplays};

fn pick_on(picker: &Arc<PointPicker>, surface: usize, local: Point) -> Option<Point> {
    let p = Arc::clone(picker);
    let handle = thread::spawn(move || p.pick());
    assert!(wait_until(Duration::from_secs(1), || picker.is_active()));
    assert!(picker.resolve_click(surface, local));
    handle.join().unwrap()
}

#[test]
fn test_picked_points_are_clicked_in_order() {
    let picker = Arc::new(PointPicker::new(
        Arc::new(StaticDisplays::dual()),
        Arc::new(RecordingBackend::default()),
    ));
    let mut settings = Settings { delay_secs: 0.01, loops: 2, ..Default::default() };
    for (surface, local) in [(0, Point::new(10.0, 10.0)), (1, Point::new(20.0, 20.0))] {
        let location = pick_on(&picker, surface, local).unwrap();
        let name = format!("Point {}", settings.points.len() + 1);
        settings.points.push(ClickPoint::new(name, location));
    }

    let input = Arc::new(RecordingInput::default());
    let seq = Sequencer::new(input.clone(), Arc::new(FixedPermission(true)));
    seq.start(settings.run_config()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || seq.state() == RunState::Completed));

    let a = Point::new(10.0, 10.0);
    let b = Point::new(1940.0, 20.0);
    assert_eq!(input.points(), vec![a, b, a, b]);
}

#[test]
fn test_edits_after_start_do_not_affect_run() {
    let mut settings = Settings { delay_secs: 0.03, loops: 1, ..Default::default() };
    settings.points.push(ClickPoint::new("A", Point::new(1.0, 1.0)));
    settings.points.push(ClickPoint::new("B", Point::new(2.0, 2.0)));

    let input = Arc::new(RecordingInput::default());
    let seq = Sequencer::new(input.clone(), Arc::new(FixedPermission(true)));
    seq.start(settings.run_config()).unwrap();

    settings.points[1].location = Point::new(99.0, 99.0);
    settings.points.clear();

    assert!(wait_until(Duration::from_secs(2), || seq.state() == RunState::Completed));
    assert_eq!(input.points(), vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
}

#[test]
fn test_saved_starting_point_runs_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut settings = Settings { delay_secs: 0.0, loops: 1, ..Default::default() };
    settings.starting_point = Some(ClickPoint::new("Starting Point", Point::new(0.0, 0.0)));
    settings.points.push(ClickPoint::new("Point 1", Point::new(5.0, 5.0)));
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    let input = Arc::new(RecordingInput::default());
    let seq = Sequencer::new(input.clone(), Arc::new(FixedPermission(true)));
    seq.start(loaded.run_config()).unwrap();
    assert!(wait_until(Duration::from_secs(1), || seq.state() == RunState::Completed));
    assert_eq!(input.points(), vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
}
