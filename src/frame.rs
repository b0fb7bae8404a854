use crate::color::Color;

/// One emitted color at one point of an animation timeline.
///
/// Frame `index` is due `index * interval` after the animation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub index: u64,
    pub color: Color,
}
