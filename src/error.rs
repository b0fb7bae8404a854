//! Error types for the backlight engine

use core::fmt;
use std::io;
use std::path::PathBuf;

use crate::color::Color;
use crate::device::ZoneId;

/// Device fault reported by an animation that was aborted by a failed write.
///
/// Unlike [`Error::Io`] this is cheap to clone, so it can be handed to
/// several observers (event channel, `take_fault`, `wait_idle`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFault {
    /// Zone the failed write targeted
    pub zone: ZoneId,
    /// Color that could not be written
    pub attempted: Color,
    /// Last color the device is known to hold
    pub last_color: Color,
    /// Kind of the underlying I/O error, if any
    pub kind: Option<io::ErrorKind>,
    /// Rendered cause
    pub message: String,
}

impl fmt::Display for DeviceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "writing #{:02x}{:02x}{:02x} to zone {} failed: {}",
            self.attempted.r, self.attempted.g, self.attempted.b, self.zone, self.message
        )
    }
}

/// Error type for backlight engine operations
#[derive(Debug)]
pub enum Error {
    /// Device write failed (permission denied, device absent, path gone)
    Io { path: PathBuf, source: io::Error },
    /// An animation was aborted by a device write failure
    Device(DeviceFault),
    /// Color component out of range or malformed color literal
    InvalidColor(String),
    /// Command literal could not be parsed
    InvalidCommand(String),
    /// Engine configuration rejected
    InvalidConfig(&'static str),
    /// Animation thread could not be started
    Spawn(io::Error),
    /// The device writer was lost together with a panicked animation thread
    WriterUnavailable,
}

impl Error {
    /// Kind of the underlying I/O error, if this error came from the device
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Io { source, .. } => Some(source.kind()),
            Error::Device(fault) => fault.kind,
            Error::Spawn(source) => Some(source.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "Device write to {} failed: {}", path.display(), source)
            }
            Error::Device(fault) => write!(f, "Animation aborted: {fault}"),
            Error::InvalidColor(msg) => write!(f, "Invalid color: {msg}"),
            Error::InvalidCommand(msg) => write!(f, "Invalid command: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            Error::Spawn(source) => write!(f, "Failed to start animation thread: {source}"),
            Error::WriterUnavailable => write!(f, "Device writer is no longer available"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } | Error::Spawn(source) => Some(source),
            _ => None,
        }
    }
}
