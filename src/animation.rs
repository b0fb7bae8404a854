//! Animation slot and the task that plays it
//!
//! An [`Animation`] is one of the engines. [`AnimationTask`] owns an
//! animation together with the device writer and emits its frames on a
//! background thread until the frames run out, the token is cancelled or a
//! write fails.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use embassy_time::{Duration, Instant};

use crate::DeviceWriter;
use crate::config::EngineConfig;
use crate::device::ZoneId;
use crate::error::DeviceFault;
use crate::frame::Frame;
use crate::frame_scheduler::FrameScheduler;
use crate::rainbow::{Rainbow, RainbowFrames};
use crate::state::{EngineState, Mode, SharedState};
use crate::transition::{Transition, TransitionFrames};

/// Animation slot - enum containing all engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    /// Finite change between two static colors
    Transition(Transition),
    /// Endless hue cycle
    Rainbow(Rainbow),
}

impl Animation {
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Transition(_) => Mode::Static,
            Self::Rainbow(_) => Mode::Rainbow,
        }
    }

    /// Time between two frames under `config`
    pub const fn interval(&self, config: &EngineConfig) -> Duration {
        match self {
            Self::Transition(_) => config.transition.interval,
            Self::Rainbow(_) => config.rainbow.interval,
        }
    }

    /// Lazily computed frames, restarting from the beginning
    pub const fn frames(&self) -> AnimationFrames {
        match self {
            Self::Transition(transition) => AnimationFrames::Transition(transition.frames()),
            Self::Rainbow(rainbow) => AnimationFrames::Rainbow(rainbow.frames()),
        }
    }

    /// Engine state once `frame` has been written
    #[allow(clippy::cast_possible_truncation)]
    pub const fn state_at(&self, frame: &Frame) -> EngineState {
        match self {
            Self::Transition(transition) => EngineState::Transitioning {
                from: transition.from(),
                to: transition.to(),
                progress: transition.progress_at(frame.index as u32),
            },
            Self::Rainbow(rainbow) => EngineState::Rainbow {
                phase: rainbow.phase_at(frame.index),
            },
        }
    }

    /// Engine state before the first frame is written
    pub const fn initial_state(&self) -> EngineState {
        match self {
            Self::Transition(transition) => EngineState::Transitioning {
                from: transition.from(),
                to: transition.to(),
                progress: 0,
            },
            Self::Rainbow(rainbow) => EngineState::Rainbow {
                phase: rainbow.phase_at(0),
            },
        }
    }
}

/// Frames of an [`Animation`]
#[derive(Debug, Clone)]
pub enum AnimationFrames {
    Transition(TransitionFrames),
    Rainbow(RainbowFrames),
}

impl Iterator for AnimationFrames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        match self {
            Self::Transition(frames) => frames.next(),
            Self::Rainbow(frames) => frames.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Transition(frames) => frames.size_hint(),
            Self::Rainbow(frames) => frames.size_hint(),
        }
    }
}

/// Cooperative cancellation flag, checked at frame boundaries
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// How an animation task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AnimationOutcome {
    /// All frames were written
    Completed,
    /// Stopped at a frame boundary on request
    Cancelled,
    /// A write failed, nothing after it was emitted
    Faulted(DeviceFault),
}

/// Sleep until `deadline` unless cancelled first.
///
/// Returns `false` once the token is cancelled. The thread is unparked on
/// cancellation, so the wait ends early.
fn wait_until(deadline: Instant, cancel: &CancelToken) -> bool {
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        let remaining = deadline.saturating_duration_since(now);
        thread::park_timeout(std::time::Duration::from_micros(remaining.as_micros()));
    }
}

/// One animation bound to the writer it plays on
pub(crate) struct AnimationTask<W: DeviceWriter> {
    pub(crate) animation: Animation,
    pub(crate) interval: Duration,
    pub(crate) zone: ZoneId,
    pub(crate) writer: W,
    pub(crate) cancel: CancelToken,
    pub(crate) shared: Arc<SharedState>,
}

impl<W: DeviceWriter> AnimationTask<W> {
    /// Play the animation, then hand the writer back
    pub(crate) fn run(mut self) -> (W, AnimationOutcome) {
        let outcome = self.emit_frames();
        match &outcome {
            AnimationOutcome::Completed => {
                log::debug!("{} animation completed", self.animation.mode().as_str());
                self.shared.idle();
            }
            AnimationOutcome::Cancelled => {
                log::debug!("{} animation cancelled", self.animation.mode().as_str());
                self.shared.settle();
            }
            AnimationOutcome::Faulted(fault) => {
                log::warn!("{} animation aborted: {fault}", self.animation.mode().as_str());
                self.shared.fault(fault.clone());
            }
        }

        (self.writer, outcome)
    }

    fn emit_frames(&mut self) -> AnimationOutcome {
        let mut scheduler = FrameScheduler::new(Instant::now(), self.interval);
        let mut deadline = scheduler.next_deadline();

        for frame in self.animation.frames() {
            if !wait_until(deadline, &self.cancel) {
                return AnimationOutcome::Cancelled;
            }

            if let Err(err) = self.writer.write(self.zone, frame.color) {
                return AnimationOutcome::Faulted(DeviceFault {
                    zone: self.zone,
                    attempted: frame.color,
                    last_color: self.shared.last_color(),
                    kind: err.io_kind(),
                    message: err.to_string(),
                });
            }
            self.shared
                .record_frame(self.animation.state_at(&frame), frame.color);
            log::trace!("frame {} -> {:?}", frame.index, frame.color);

            deadline = scheduler.tick(Instant::now());
        }

        AnimationOutcome::Completed
    }
}
