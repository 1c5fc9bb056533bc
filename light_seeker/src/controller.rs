// THEORY:
// The `Controller` turns fire-and-forget control signals (the robot's start,
// stop/resume and log buttons) into state transitions of the `NavigationLoop`.
// Signals arrive as `ControlEvent`s on a tokio channel from any thread or task;
// the controller itself runs on one blocking thread and is the only code that
// touches the loop, so sensing, deciding and acting never overlap.
//
// Key architectural principles:
// 1.  **Single shared flag**: `RunFlag` is the only mutable state shared across
//     threads. A stop request clears it immediately so that an interruptible
//     obstacle countdown notices, then the controller handles the queued event
//     once the in-flight iteration has posted its move.
// 2.  **Exactly one safety stop**: the zero-velocity command is issued by the
//     controller when it leaves Running, never by the loop's own moves.
// 3.  **Request/reply**: report requests carry a oneshot sender. Reports are
//     rendered between iterations, so two requests with no iteration in between
//     see the same statistics.
// 4.  **Explicit lifecycle**: Paused (initial) <-> Running, and Stopped once a
//     shutdown is requested or every handle has been dropped.

use crate::core_modules::run_statistics::RunReport;
use crate::error::{Result, SeekerError};
use crate::navigation::NavigationLoop;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Shared "keep going" flag polled by the loop at least once per iteration.
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, running: bool) {
        self.0.store(running, Ordering::SeqCst);
    }

    pub fn halt(&self) {
        self.set(false);
    }
}

/// External control signals.
#[derive(Debug)]
pub enum ControlEvent {
    /// Begin a fresh run.
    Start,
    /// Stop when running, resume when paused.
    Toggle,
    /// Render, persist and return the execution log.
    Report(oneshot::Sender<RunReport>),
    /// Leave the control loop for good.
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Paused,
    Running,
    Stopped,
}

/// Cloneable sender side used by buttons, stdin readers or tests.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: mpsc::UnboundedSender<ControlEvent>,
    running: RunFlag,
}

impl ControlHandle {
    pub fn start(&self) -> Result<()> {
        self.send(ControlEvent::Start)
    }

    /// Clears the running flag right away if it is set, then queues the toggle.
    pub fn toggle(&self) -> Result<()> {
        self.running.halt();
        self.send(ControlEvent::Toggle)
    }

    pub fn request_report(&self) -> Result<oneshot::Receiver<RunReport>> {
        let (reply, receiver) = oneshot::channel();
        self.send(ControlEvent::Report(reply))?;
        Ok(receiver)
    }

    pub async fn report(&self) -> Result<RunReport> {
        self.request_report()?
            .await
            .map_err(|_| SeekerError::ChannelClosed)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.running.halt();
        self.send(ControlEvent::Shutdown)
    }

    fn send(&self, event: ControlEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| SeekerError::ChannelClosed)
    }
}

pub struct Controller {
    navigation: NavigationLoop,
    events: mpsc::UnboundedReceiver<ControlEvent>,
    state: LoopState,
    iterations: u64,
}

impl Controller {
    pub fn new(navigation: NavigationLoop) -> (Self, ControlHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let handle = ControlHandle {
            tx,
            running: navigation.run_flag().clone(),
        };
        let controller = Self {
            navigation,
            events,
            state: LoopState::Paused,
            iterations: 0,
        };
        (controller, handle)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Drives the loop until shutdown. Blocking: call from a dedicated thread or
    /// `tokio::task::spawn_blocking`, never from inside an async task.
    ///
    /// A capture failure ends the run and is returned to the caller.
    pub fn run(mut self) -> Result<NavigationLoop> {
        info!("press start to begin the light search");
        while self.state != LoopState::Stopped {
            if let Some(event) = self.next_event() {
                self.handle(event);
                continue;
            }
            self.navigation.step()?;
            self.iterations += 1;
        }
        info!(iterations = self.iterations, "controller stopped");
        Ok(self.navigation)
    }

    /// Waits for an event while paused, or while a stop is on its way. While
    /// running, only takes an event that is already queued.
    fn next_event(&mut self) -> Option<ControlEvent> {
        let must_wait =
            self.state == LoopState::Paused || !self.navigation.run_flag().is_running();
        if must_wait {
            return Some(self.events.blocking_recv().unwrap_or(ControlEvent::Shutdown));
        }
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(ControlEvent::Shutdown),
        }
    }

    fn handle(&mut self, event: ControlEvent) {
        match (event, self.state) {
            (ControlEvent::Start, LoopState::Running) => {
                warn!("start ignored, the light search is already running");
            }
            (ControlEvent::Start, _) => {
                info!("starting light search");
                self.navigation.begin_run();
                self.state = LoopState::Running;
            }
            (ControlEvent::Toggle, LoopState::Running) => {
                info!("stopping");
                self.navigation.run_flag().halt();
                self.navigation.safety_stop();
                self.state = LoopState::Paused;
            }
            (ControlEvent::Toggle, _) => {
                info!("resuming light search");
                self.navigation.resume();
                self.state = LoopState::Running;
            }
            (ControlEvent::Report(reply), _) => {
                info!("displaying execution log");
                let report = self.navigation.write_report();
                if reply.send(report).is_err() {
                    warn!("report requester went away");
                }
            }
            (ControlEvent::Shutdown, state) => {
                if state == LoopState::Running {
                    self.navigation.run_flag().halt();
                    self.navigation.safety_stop();
                }
                self.state = LoopState::Stopped;
            }
        }
    }
}
