//! The click-sequencing engine.
//!
//! A [`Sequencer`] owns the run state machine and at most one worker thread.
//! The worker walks a snapshot of the [`RunConfig`], checking for pause and
//! cancellation between clicks, and hands its terminal transition back to
//! the shared state under the same lock the control methods use.

use parking_lot::{Condvar, Mutex};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::error::{ClickerError, Result};
use crate::input::InputSynthesizer;
use crate::model::{Point, RunConfig, RunState};
use crate::permission::PermissionService;

/// How often a paused run re-checks for resume or stop.
pub const PAUSE_POLL: Duration = Duration::from_millis(50);

pub const MSG_NO_POINTS: &str = "Add at least one point.";
pub const MSG_NO_PERMISSION: &str = "Accessibility permission is required.";

#[derive(Clone, Debug, PartialEq)]
pub enum SequencerEvent {
    StateChanged(RunState),
    StartingPointClicked(Point),
    Clicked { pass: u32, index: usize, at: Point },
}

/// Cancellation token and pause flag for a single run.
struct RunControl {
    cancelled: AtomicBool,
    paused: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl RunControl {
    fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            lock: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify();
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
        self.notify();
    }

    fn notify(&self) {
        // Taking the lock orders the flag store before any waiter's re-check.
        let _guard = self.lock.lock();
        self.wake.notify_all();
    }

    /// Sleeps for `dur` unless cancelled first. Returns `false` on cancel.
    fn sleep(&self, dur: Duration) -> bool {
        let mut guard = self.lock.lock();
        let Some(deadline) = Instant::now().checked_add(dur) else {
            // Past the end of the clock: only a cancel ends this wait.
            while !self.is_cancelled() {
                self.wake.wait(&mut guard);
            }
            return false;
        };
        while !self.is_cancelled() {
            if self.wake.wait_until(&mut guard, deadline).timed_out() {
                return !self.is_cancelled();
            }
        }
        false
    }

    /// Blocks while paused, polling every [`PAUSE_POLL`]. Returns `false` on cancel.
    fn wait_while_paused(&self) -> bool {
        while self.paused.load(Ordering::SeqCst) {
            if self.is_cancelled() {
                return false;
            }
            let mut guard = self.lock.lock();
            if self.paused.load(Ordering::SeqCst) && !self.is_cancelled() {
                let _ = self.wake.wait_for(&mut guard, PAUSE_POLL);
            }
        }
        !self.is_cancelled()
    }
}

struct Inner {
    state: RunState,
    status: String,
    permission_granted: bool,
    run_id: u64,
    control: Option<Arc<RunControl>>,
    subscribers: Vec<mpsc::Sender<SequencerEvent>>,
}

impl Inner {
    fn emit(&mut self, event: SequencerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn transition(&mut self, state: RunState) {
        self.state = state;
        self.status = state.label().to_string();
        tracing::info!(%state, "run state changed");
        self.emit(SequencerEvent::StateChanged(state));
    }
}

struct Shared {
    inner: Mutex<Inner>,
}

impl Shared {
    fn emit(&self, event: SequencerEvent) {
        self.inner.lock().emit(event);
    }

    /// Terminal transition from the worker. Ignored if the run was already
    /// stopped or superseded.
    fn finish(&self, run_id: u64, completed: bool) {
        let mut inner = self.inner.lock();
        if inner.run_id != run_id || !inner.state.is_active() {
            return;
        }
        let cancelled = inner.control.as_ref().map_or(true, |c| c.is_cancelled());
        inner.control = None;
        let next = if completed && !cancelled { RunState::Completed } else { RunState::Stopped };
        inner.transition(next);
    }
}

pub struct Sequencer {
    shared: Arc<Shared>,
    input: Arc<dyn InputSynthesizer>,
    permission: Arc<dyn PermissionService>,
    worker: Mutex<Option<JoinHandle<()>>>,
    last_config: Mutex<Option<RunConfig>>,
}

impl Sequencer {
    pub fn new(input: Arc<dyn InputSynthesizer>, permission: Arc<dyn PermissionService>) -> Self {
        let granted = permission.is_granted();
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: RunState::Idle,
                    status: RunState::Idle.label().to_string(),
                    permission_granted: granted,
                    run_id: 0,
                    control: None,
                    subscribers: Vec::new(),
                }),
            }),
            input,
            permission,
            worker: Mutex::new(None),
            last_config: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RunState {
        self.shared.inner.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state().is_active()
    }

    /// User-facing status line: the state label, or why the last start was refused.
    pub fn status(&self) -> String {
        self.shared.inner.lock().status.clone()
    }

    pub fn permission_granted(&self) -> bool {
        self.shared.inner.lock().permission_granted
    }

    /// Events from now on. Receivers that are dropped are pruned on the next send.
    pub fn subscribe(&self) -> mpsc::Receiver<SequencerEvent> {
        let (tx, rx) = mpsc::channel();
        self.shared.inner.lock().subscribers.push(tx);
        rx
    }

    /// Refreshes the cached permission flag, prompting if asked to.
    pub fn recheck_permission(&self, prompt: bool) -> bool {
        self.permission.request_if_needed(prompt);
        let granted = self.permission.is_granted();
        self.shared.inner.lock().permission_granted = granted;
        granted
    }

    /// Starts a run on a snapshot of `config`. Returns once the worker is spawned.
    pub fn start(&self, config: RunConfig) -> Result<()> {
        {
            let mut inner = self.shared.inner.lock();
            if inner.state.is_active() {
                return Err(ClickerError::AlreadyRunning);
            }
            *self.last_config.lock() = Some(config.clone());
            if config.points.is_empty() {
                tracing::warn!("start rejected: no points");
                inner.status = MSG_NO_POINTS.to_string();
                return Err(ClickerError::NoPoints);
            }
        }

        // Start is an explicit user action, so prompting is allowed here.
        let trusted = self.permission.request_if_needed(true);
        let granted = self.permission.is_granted();
        {
            let mut inner = self.shared.inner.lock();
            inner.permission_granted = granted;
            if !trusted {
                tracing::warn!("start rejected: input synthesis not permitted");
                inner.status = MSG_NO_PERMISSION.to_string();
                return Err(ClickerError::PermissionDenied);
            }
        }

        // A previous worker has already made its terminal transition.
        let previous = self.worker.lock().take();
        if let Some(handle) = previous {
            join_worker(handle);
        }

        let mut inner = self.shared.inner.lock();
        if inner.state.is_active() {
            return Err(ClickerError::AlreadyRunning);
        }
        let control = Arc::new(RunControl::new());
        inner.run_id += 1;
        let run_id = inner.run_id;
        inner.control = Some(Arc::clone(&control));
        inner.transition(RunState::Running);

        tracing::info!(
            points = config.points.len(),
            starting_point = config.starting_point.is_some(),
            delay_secs = config.delay_secs,
            loops = config.loops,
            warp = config.warp_cursor,
            "starting run"
        );

        let shared = Arc::clone(&self.shared);
        let input = Arc::clone(&self.input);
        let handle = thread::spawn(move || {
            let completed = run_sequence(&config, &control, input.as_ref(), &shared);
            shared.finish(run_id, completed);
        });
        // Stored before the state lock is released so a racing stop() joins it.
        *self.worker.lock() = Some(handle);
        drop(inner);
        Ok(())
    }

    pub fn pause(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state != RunState::Running {
            return;
        }
        if let Some(ctl) = &inner.control {
            ctl.set_paused(true);
        }
        inner.transition(RunState::Paused);
    }

    pub fn resume(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state != RunState::Paused {
            return;
        }
        if let Some(ctl) = &inner.control {
            ctl.set_paused(false);
        }
        inner.transition(RunState::Running);
    }

    /// Flips pause while a run is active; otherwise starts again with the
    /// config of the last `start` call.
    pub fn toggle_pause_resume(&self) -> Result<()> {
        match self.state() {
            RunState::Running => {
                self.pause();
                Ok(())
            }
            RunState::Paused => {
                self.resume();
                Ok(())
            }
            _ => {
                let config = self.last_config.lock().clone().unwrap_or_default();
                self.start(config)
            }
        }
    }

    /// Cancels the active run. No click is posted after this returns; a
    /// press already sent still gets its release.
    pub fn stop(&self) {
        {
            let mut inner = self.shared.inner.lock();
            if let Some(ctl) = inner.control.take() {
                ctl.cancel();
            }
            if inner.state.is_active() {
                inner.transition(RunState::Stopped);
            }
        }
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            join_worker(handle);
        }
    }
}

fn join_worker(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        tracing::error!("click worker panicked");
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The worker loop. Returns `true` when every pass ran to the end.
fn run_sequence(
    config: &RunConfig,
    ctl: &RunControl,
    input: &dyn InputSynthesizer,
    shared: &Shared,
) -> bool {
    let delay = config.delay();

    if let Some(start) = &config.starting_point {
        if !ctl.wait_while_paused() {
            return false;
        }
        input.click(start.location, config.warp_cursor);
        tracing::debug!(x = start.location.x, y = start.location.y, "starting point clicked");
        shared.emit(SequencerEvent::StartingPointClicked(start.location));
        if !ctl.sleep(delay) {
            return false;
        }
    }

    let mut pass: u32 = 0;
    while config.is_unbounded() || pass < config.loops {
        for (index, point) in config.points.iter().enumerate() {
            if ctl.is_cancelled() || !ctl.wait_while_paused() {
                return false;
            }
            input.click(point.location, config.warp_cursor);
            tracing::debug!(pass, index, name = %point.name, "clicked");
            shared.emit(SequencerEvent::Clicked { pass, index, at: point.location });
            if !ctl.sleep(delay) {
                return false;
            }
        }
        pass = pass.saturating_add(1);
    }
    true
}
