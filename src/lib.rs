pub mod animation;
pub mod channel;
pub mod color;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod frame_scheduler;
pub mod math8;
pub mod rainbow;
pub mod state;
pub mod supervisor;
pub mod transition;

pub use animation::Animation;
pub use color::Color;
pub use command::Command;
pub use config::{EngineConfig, RainbowTimings, TransitionTimings};
pub use device::{RecordingWriter, ZoneFileWriter, ZoneId};
pub use error::{DeviceFault, Error};
pub use frame::Frame;
pub use frame_scheduler::FrameScheduler;
pub use rainbow::Rainbow;
pub use state::{EngineState, Mode, StateEvent, StateReceiver, StateSnapshot};
pub use supervisor::AnimationSupervisor;
pub use transition::Transition;

pub use embassy_time::{Duration, Instant};

/// Abstract zone device trait
///
/// Implement this trait to support different control surfaces.
/// The animation supervisor is generic over this trait.
pub trait DeviceWriter {
    /// Write one color to a zone
    fn write(&mut self, zone: ZoneId, color: Color) -> Result<(), Error>;
}

impl<D: DeviceWriter + ?Sized> DeviceWriter for Box<D> {
    fn write(&mut self, zone: ZoneId, color: Color) -> Result<(), Error> {
        (**self).write(zone, color)
    }
}
