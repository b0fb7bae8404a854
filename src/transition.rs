//! Static color changes
//!
//! A [`Transition`] describes a linear path between two colors. Its frames
//! are computed lazily, and [`Transition::frames`] can be called again to
//! replay the path from the start.

use core::iter::FusedIterator;

use crate::color::Color;
use crate::config::TransitionTimings;
use crate::frame::Frame;
use crate::math8::{lerp8, progress8};

/// Linear path from one color to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    from: Color,
    to: Color,
    /// Zero when there is nothing to interpolate
    steps: u32,
}

impl Transition {
    /// Plan a transition using the step count derived from `timings`.
    ///
    /// Equal endpoints produce a single frame so the device is re-asserted.
    pub fn new(from: Color, to: Color, timings: &TransitionTimings) -> Self {
        let steps = if from == to { 0 } else { timings.steps() };
        Self { from, to, steps }
    }

    pub const fn from(&self) -> Color {
        self.from
    }

    pub const fn to(&self) -> Color {
        self.to
    }

    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Number of frames, endpoints included
    pub const fn len(&self) -> usize {
        self.steps as usize + 1
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Color at `step`; steps past the end hold the target
    pub const fn color_at(&self, step: u32) -> Color {
        Color {
            r: lerp8(self.from.r, self.to.r, step, self.steps),
            g: lerp8(self.from.g, self.to.g, step, self.steps),
            b: lerp8(self.from.b, self.to.b, step, self.steps),
        }
    }

    /// Progress of `step` on a 0-255 scale
    pub const fn progress_at(&self, step: u32) -> u8 {
        progress8(step, self.steps)
    }

    /// Lazily computed frames, from the first one
    pub const fn frames(&self) -> TransitionFrames {
        TransitionFrames {
            transition: *self,
            next: 0,
        }
    }
}

/// Iterator over the frames of a [`Transition`]
#[derive(Debug, Clone)]
pub struct TransitionFrames {
    transition: Transition,
    next: u32,
}

impl Iterator for TransitionFrames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.next > self.transition.steps {
            return None;
        }
        let step = self.next;
        self.next += 1;

        Some(Frame {
            index: u64::from(step),
            color: self.transition.color_at(step),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.transition.steps as usize + 1).saturating_sub(self.next as usize);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TransitionFrames {}

impl FusedIterator for TransitionFrames {}
