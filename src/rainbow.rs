//! Rainbow cycling
//!
//! Walks the hue circle at a fixed angular step per tick, forever.

use core::iter::FusedIterator;

use crate::color::{Color, HUE_DEGREES, hue_to_rgb};
use crate::config::RainbowTimings;
use crate::frame::Frame;

/// Endless hue cycle at full saturation and value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rainbow {
    /// Hue of the first frame, in degrees
    start_phase: u16,
    /// Hue advance per tick, in degrees
    step: u16,
}

impl Default for Rainbow {
    fn default() -> Self {
        Self::new(&RainbowTimings::DEFAULT)
    }
}

impl Rainbow {
    pub fn new(timings: &RainbowTimings) -> Self {
        Self {
            start_phase: timings.start_phase % HUE_DEGREES,
            step: timings.step_degrees % HUE_DEGREES,
        }
    }

    pub const fn step(&self) -> u16 {
        self.step
    }

    /// Number of ticks until the phase repeats
    pub const fn cycle_len(&self) -> u16 {
        if self.step == 0 {
            return 1;
        }
        HUE_DEGREES / gcd(HUE_DEGREES, self.step)
    }

    /// Hue of frame `index`, in degrees
    #[allow(clippy::cast_possible_truncation)]
    pub const fn phase_at(&self, index: u64) -> u16 {
        let advance = (index % HUE_DEGREES as u64) * self.step as u64;
        ((self.start_phase as u64 + advance) % HUE_DEGREES as u64) as u16
    }

    pub const fn color_at(&self, index: u64) -> Color {
        hue_to_rgb(self.phase_at(index))
    }

    /// Lazily computed frames, from the start phase
    pub const fn frames(&self) -> RainbowFrames {
        RainbowFrames {
            phase: self.start_phase,
            step: self.step,
            index: 0,
        }
    }
}

const fn gcd(mut a: u16, mut b: u16) -> u16 {
    while b != 0 {
        let rem = a % b;
        a = b;
        b = rem;
    }
    a
}

/// Endless iterator over rainbow frames
#[derive(Debug, Clone)]
pub struct RainbowFrames {
    phase: u16,
    step: u16,
    index: u64,
}

impl RainbowFrames {
    /// Hue of the next frame, in degrees
    pub const fn phase(&self) -> u16 {
        self.phase
    }
}

impl Iterator for RainbowFrames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = Frame {
            index: self.index,
            color: hue_to_rgb(self.phase),
        };
        self.phase = (self.phase + self.step) % HUE_DEGREES;
        self.index = self.index.wrapping_add(1);

        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl FusedIterator for RainbowFrames {}
