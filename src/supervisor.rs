//! Animation supervisor - the main orchestrator
//!
//! Owns the one "current animation" slot. Every command cancels the running
//! animation, waits for its thread to hand the device writer back and only
//! then starts the next engine, so at most one animation writes to the device
//! at any instant.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::animation::{Animation, AnimationOutcome, AnimationTask, CancelToken};
use crate::command::Command;
use crate::config::EngineConfig;
use crate::error::{DeviceFault, Error};
use crate::rainbow::Rainbow;
use crate::state::{EngineState, Mode, SharedState, StateReceiver, StateSnapshot};
use crate::transition::Transition;
use crate::DeviceWriter;

const ANIMATION_THREAD_NAME: &str = "backlight-animation";

/// Handle of the running animation thread
struct AnimationHandle<W> {
    mode: Mode,
    cancel: CancelToken,
    thread: JoinHandle<(W, AnimationOutcome)>,
}

impl<W> AnimationHandle<W> {
    /// Request a stop at the next frame boundary
    fn cancel(&self) {
        self.cancel.cancel();
        self.thread.thread().unpark();
    }
}

/// Runs at most one lighting animation at a time.
///
/// The device writer is moved into the animation thread and returned when the
/// thread is joined; while no animation runs the supervisor holds it.
pub struct AnimationSupervisor<W: DeviceWriter + Send + 'static> {
    config: EngineConfig,
    writer: Option<W>,
    active: Option<AnimationHandle<W>>,
    shared: Arc<SharedState>,
}

impl<W: DeviceWriter + Send + 'static> AnimationSupervisor<W> {
    /// Create an idle supervisor for a device currently showing black
    pub fn new(writer: W, config: EngineConfig) -> Result<Self, Error> {
        Self::with_snapshot(writer, config, StateSnapshot::default())
    }

    /// Create an idle supervisor from a persisted snapshot.
    ///
    /// Nothing is written to the device until a command arrives, see
    /// [`AnimationSupervisor::resume`].
    pub fn with_snapshot(
        writer: W,
        config: EngineConfig,
        snapshot: StateSnapshot,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            writer: Some(writer),
            active: None,
            shared: Arc::new(SharedState::new(snapshot)),
        })
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only view of what the engine is doing
    pub fn current_state(&self) -> EngineState {
        self.shared.engine()
    }

    /// Mode and colors for display and persistence
    pub fn snapshot(&self) -> StateSnapshot {
        self.shared.snapshot()
    }

    /// Receive state notifications instead of polling.
    ///
    /// Each call gets its own bounded queue that sees every event; when it
    /// is full the oldest event is dropped. Dropping the receiver ends the
    /// subscription.
    pub fn subscribe(&self) -> StateReceiver {
        self.shared.subscribe()
    }

    /// Most recent device fault of an aborted animation, if not taken yet
    pub fn take_fault(&self) -> Option<DeviceFault> {
        self.shared.take_fault()
    }

    /// Whether an animation thread is still emitting frames
    pub fn is_animating(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|handle| !handle.thread.is_finished())
    }

    /// Replace whatever runs with `command`.
    ///
    /// Blocks only until the previous animation reaches its next frame
    /// boundary.
    pub fn submit(&mut self, command: Command) -> Result<(), Error> {
        self.stop_active();
        log::debug!("command: {command}");

        let animation = match command {
            Command::Stop => {
                self.shared.idle();
                return Ok(());
            }
            Command::SetStatic(color) => Animation::Transition(Transition::new(
                self.shared.last_color(),
                color,
                &self.config.transition,
            )),
            Command::SetRainbow => Animation::Rainbow(Rainbow::new(&self.config.rainbow)),
        };

        let static_color = match command {
            Command::SetStatic(color) => Some(color),
            _ => None,
        };
        self.shared
            .begin(animation.mode(), static_color, animation.initial_state());
        self.spawn(animation)
    }

    /// Re-apply the mode of the current snapshot, e.g. after startup
    pub fn resume(&mut self) -> Result<(), Error> {
        let snapshot = self.snapshot();
        match snapshot.mode {
            Mode::Static => self.submit(Command::SetStatic(snapshot.static_color)),
            Mode::Rainbow => self.submit(Command::SetRainbow),
        }
    }

    /// Wait for a running transition to finish.
    ///
    /// A rainbow never finishes, so it is not waited on. A device fault of
    /// the finished animation is returned as [`Error::Device`].
    pub fn wait_idle(&mut self) -> Result<EngineState, Error> {
        let running_rainbow = self.active.as_ref().is_some_and(|handle| {
            handle.mode == Mode::Rainbow && !handle.thread.is_finished()
        });
        if !running_rainbow {
            if let Some(handle) = self.active.take() {
                self.join(handle)?;
            }
            if let Some(fault) = self.shared.take_fault() {
                return Err(Error::Device(fault));
            }
        }

        Ok(self.current_state())
    }

    /// Stop the running animation and get the writer back
    pub fn shutdown(&mut self) {
        self.stop_active();
    }

    /// Stop the running animation and hand the writer to the caller
    pub fn into_writer(mut self) -> Option<W> {
        self.stop_active();
        self.writer.take()
    }

    fn spawn(&mut self, animation: Animation) -> Result<(), Error> {
        let Some(writer) = self.writer.take() else {
            self.shared.settle();
            return Err(Error::WriterUnavailable);
        };

        let cancel = CancelToken::default();
        let task = AnimationTask {
            animation,
            interval: animation.interval(&self.config),
            zone: self.config.zone,
            writer,
            cancel: cancel.clone(),
            shared: Arc::clone(&self.shared),
        };

        let thread = thread::Builder::new()
            .name(ANIMATION_THREAD_NAME.into())
            .spawn(move || task.run())
            .map_err(|err| {
                // The writer went down with the closure
                self.shared.settle();
                Error::Spawn(err)
            })?;

        log::debug!("{} animation started", animation.mode().as_str());
        self.active = Some(AnimationHandle {
            mode: animation.mode(),
            cancel,
            thread,
        });
        Ok(())
    }

    /// Cancel and join the running animation, if any
    fn stop_active(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
            if let Err(err) = self.join(handle) {
                log::error!("{err}");
            }
        }
    }

    fn join(&mut self, handle: AnimationHandle<W>) -> Result<AnimationOutcome, Error> {
        match handle.thread.join() {
            Ok((writer, outcome)) => {
                self.writer = Some(writer);
                Ok(outcome)
            }
            Err(_) => {
                self.shared.settle();
                Err(Error::WriterUnavailable)
            }
        }
    }
}

impl<W: DeviceWriter + Send + 'static> Drop for AnimationSupervisor<W> {
    fn drop(&mut self) {
        self.stop_active();
    }
}
