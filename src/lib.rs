//! Clicks a list of screen points in order, pass after pass.
//!
//! [`sequencer::Sequencer`] runs the clicks; [`picker::PointPicker`] turns
//! one user click on a full-screen overlay into a point to add.

pub mod app;
pub mod display;
pub mod error;
pub mod hotkeys;
pub mod input;
pub mod logging;
pub mod model;
pub mod overlay;
pub mod permission;
pub mod picker;
pub mod sequencer;
pub mod settings;

#[cfg(test)]
mod testutil;
#[cfg(test)]
mod tests;

pub use error::{ClickerError, Result};
pub use model::{ClickPoint, Point, RunConfig, RunState};
pub use picker::PointPicker;
pub use sequencer::{Sequencer, SequencerEvent};
