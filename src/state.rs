//! Engine state shared between the supervisor and the running animation.

use core::cell::RefCell;
use std::sync::Arc;

use critical_section::Mutex;

use crate::channel::{Channel, Receiver, Sender};
use crate::color::Color;
use crate::error::DeviceFault;

const MODE_NAME_STATIC: &str = "static";
const MODE_NAME_RAINBOW: &str = "rainbow";

/// Capacity of each subscriber's notification queue
pub const EVENT_CHANNEL_SIZE: usize = 16;

/// What the engine is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing is animating, the device holds `color`
    Idle { color: Color },
    /// Moving between two static colors, `progress` on a 0-255 scale
    Transitioning { from: Color, to: Color, progress: u8 },
    /// Cycling hues, `phase` in degrees
    Rainbow { phase: u16 },
}

impl EngineState {
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle { .. })
    }
}

/// Persisted lighting mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Static,
    Rainbow,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => MODE_NAME_STATIC,
            Self::Rainbow => MODE_NAME_RAINBOW,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            MODE_NAME_STATIC => Some(Self::Static),
            MODE_NAME_RAINBOW => Some(Self::Rainbow),
            _ => None,
        }
    }
}

/// State handed to the UI and persistence collaborators.
///
/// The rainbow hue is not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Mode of the most recent lighting command
    pub mode: Mode,
    /// Last color successfully written to the device
    pub last_color: Color,
    /// Target of the most recent static color command
    pub static_color: Color,
}

impl StateSnapshot {
    /// Snapshot of a device showing `color` in static mode
    pub const fn new(color: Color) -> Self {
        Self {
            mode: Mode::Static,
            last_color: color,
            static_color: color,
        }
    }
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self::new(Color::default())
    }
}

/// Notification pushed to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// Mode or settled color changed
    Changed(StateSnapshot),
    /// An animation was aborted by a failed device write
    DeviceFault(DeviceFault),
}

/// Receiving end of one subscription
pub type StateReceiver = Receiver<StateEvent, EVENT_CHANNEL_SIZE>;

type StateSender = Sender<StateEvent, EVENT_CHANNEL_SIZE>;

#[derive(Debug)]
struct Inner {
    engine: EngineState,
    snapshot: StateSnapshot,
    fault: Option<DeviceFault>,
}

/// State slot and subscriber queues.
///
/// While an animation runs only its task reports frame progress; the
/// supervisor writes here only while no task is running. Every subscriber
/// owns a queue and sees every event.
pub(crate) struct SharedState {
    inner: Mutex<RefCell<Inner>>,
    subscribers: Mutex<RefCell<Vec<StateSender>>>,
}

impl SharedState {
    pub(crate) fn new(snapshot: StateSnapshot) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                engine: EngineState::Idle {
                    color: snapshot.last_color,
                },
                snapshot,
                fault: None,
            })),
            subscribers: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow(cs).borrow_mut()))
    }

    pub(crate) fn engine(&self) -> EngineState {
        self.with(|inner| inner.engine)
    }

    pub(crate) fn snapshot(&self) -> StateSnapshot {
        self.with(|inner| inner.snapshot)
    }

    pub(crate) fn last_color(&self) -> Color {
        self.with(|inner| inner.snapshot.last_color)
    }

    pub(crate) fn subscribe(&self) -> StateReceiver {
        let channel = Arc::new(Channel::new());
        critical_section::with(|cs| {
            self.subscribers.borrow(cs).borrow_mut().push(channel.sender());
        });
        channel.receiver()
    }

    fn publish(&self, event: StateEvent) {
        let senders = critical_section::with(|cs| {
            let mut subscribers = self.subscribers.borrow(cs).borrow_mut();
            subscribers.retain(|sender| !sender.is_closed());
            subscribers.clone()
        });

        for sender in senders {
            if let Some(dropped) = sender.send_overwrite(event.clone()) {
                log::trace!("subscriber queue full, dropped {dropped:?}");
            }
        }
    }

    /// Enter a new mode before its animation starts
    pub(crate) fn begin(&self, mode: Mode, static_color: Option<Color>, engine: EngineState) {
        let snapshot = self.with(|inner| {
            inner.snapshot.mode = mode;
            if let Some(color) = static_color {
                inner.snapshot.static_color = color;
            }
            inner.engine = engine;
            inner.snapshot
        });
        self.publish(StateEvent::Changed(snapshot));
    }

    /// A frame reached the device
    pub(crate) fn record_frame(&self, engine: EngineState, color: Color) {
        self.with(|inner| {
            inner.engine = engine;
            inner.snapshot.last_color = color;
        });
    }

    /// Fall back to idle, keeping the last written color
    pub(crate) fn settle(&self) -> StateSnapshot {
        self.with(|inner| {
            inner.engine = EngineState::Idle {
                color: inner.snapshot.last_color,
            };
            inner.snapshot
        })
    }

    /// Settle and tell subscribers, after natural completion or a stop
    pub(crate) fn idle(&self) {
        let snapshot = self.settle();
        self.publish(StateEvent::Changed(snapshot));
    }

    /// Settle after a failed device write
    pub(crate) fn fault(&self, fault: DeviceFault) {
        self.settle();
        self.with(|inner| inner.fault = Some(fault.clone()));
        self.publish(StateEvent::DeviceFault(fault));
    }

    pub(crate) fn take_fault(&self) -> Option<DeviceFault> {
        self.with(|inner| inner.fault.take())
    }
}
