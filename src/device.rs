//! Device control surfaces
//!
//! [`ZoneFileWriter`] writes colors to per-zone control files such as
//! `/sys/devices/platform/hp-wmi/rgb_zones/zone00`. [`RecordingWriter`] keeps
//! frames in memory, for previews and for driving the engine without
//! hardware.

use core::cell::RefCell;
use core::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use critical_section::Mutex;

use crate::color::{Color, EncodedColor, encode_hex};
use crate::{DeviceWriter, Error};

/// Encodes a color into the byte string a control surface expects
pub type ColorEncoder = fn(Color) -> EncodedColor;

/// Index of an independently addressable lighting zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u8);

impl ZoneId {
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Control file name used by `hp-wmi` (`zone00`, `zone01`, ...)
    pub fn file_name(self) -> String {
        format!("zone{:02}", self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[derive(Debug, Clone)]
enum Surface {
    /// One control file, every zone maps to it
    File(PathBuf),
    /// Directory with one `zoneNN` file per zone
    Directory(PathBuf),
}

/// Writes colors to zone control files.
///
/// Every write opens the control file, writes the encoded color once and
/// closes it again. Nothing is retried.
#[derive(Debug, Clone)]
pub struct ZoneFileWriter {
    surface: Surface,
    encoder: ColorEncoder,
}

impl ZoneFileWriter {
    /// Writer for a single zone control file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            surface: Surface::File(path.into()),
            encoder: encode_hex,
        }
    }

    /// Writer for a directory of `zoneNN` control files
    pub fn for_zone_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            surface: Surface::Directory(dir.into()),
            encoder: encode_hex,
        }
    }

    /// Replace the color encoding
    #[must_use]
    pub fn with_encoder(mut self, encoder: ColorEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Path of the control file backing `zone`
    pub fn zone_path(&self, zone: ZoneId) -> PathBuf {
        match &self.surface {
            Surface::File(path) => path.clone(),
            Surface::Directory(dir) => dir.join(zone.file_name()),
        }
    }

    fn write_encoded(path: &Path, encoded: &[u8]) -> io::Result<()> {
        // Control files must already exist, a missing one means no device
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)?;
        file.write_all(encoded)
    }
}

impl DeviceWriter for ZoneFileWriter {
    fn write(&mut self, zone: ZoneId, color: Color) -> Result<(), Error> {
        let path = self.zone_path(zone);
        let encoded = (self.encoder)(color);
        log::trace!("zone {zone} <- {}", encoded.as_str());

        Self::write_encoded(&path, encoded.as_bytes()).map_err(|source| Error::Io { path, source })
    }
}

#[derive(Debug, Default)]
struct Recording {
    writes: Vec<(ZoneId, Color)>,
    fail_after: Option<usize>,
}

/// In-memory device that records every write.
///
/// Clones share the same recording, so one clone can be handed to the engine
/// while another inspects what was written.
#[derive(Clone)]
pub struct RecordingWriter {
    inner: Arc<Mutex<RefCell<Recording>>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RefCell::new(Recording::default()))),
        }
    }

    /// Make every write after the first `count` successful ones fail
    #[must_use]
    pub fn failing_after(self, count: usize) -> Self {
        critical_section::with(|cs| {
            self.inner.borrow(cs).borrow_mut().fail_after = Some(count);
        });
        self
    }

    /// Number of successful writes
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().writes.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Colors written so far, in order
    pub fn colors(&self) -> Vec<Color> {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .borrow()
                .writes
                .iter()
                .map(|(_, color)| *color)
                .collect()
        })
    }

    /// Zone and color of every successful write
    pub fn writes(&self) -> Vec<(ZoneId, Color)> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().writes.clone())
    }

    /// Color the device currently holds
    pub fn last(&self) -> Option<Color> {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .borrow()
                .writes
                .last()
                .map(|(_, color)| *color)
        })
    }

    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().writes.clear());
    }
}

impl Default for RecordingWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordingWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingWriter")
            .field("writes", &self.len())
            .finish()
    }
}

impl DeviceWriter for RecordingWriter {
    fn write(&mut self, zone: ZoneId, color: Color) -> Result<(), Error> {
        critical_section::with(|cs| {
            let mut recording = self.inner.borrow(cs).borrow_mut();
            if recording
                .fail_after
                .is_some_and(|limit| recording.writes.len() >= limit)
            {
                return Err(Error::Io {
                    path: PathBuf::from(format!("memory://{}", zone.file_name())),
                    source: io::Error::new(io::ErrorKind::NotFound, "device removed"),
                });
            }
            recording.writes.push((zone, color));
            Ok(())
        })
    }
}
