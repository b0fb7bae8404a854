use embassy_time::Duration;

use crate::Error;
use crate::color::HUE_DEGREES;
use crate::device::ZoneId;

/// Default length of a static color change
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(150);

/// Default frame interval of a static color change (100 FPS)
pub const DEFAULT_TRANSITION_INTERVAL: Duration = Duration::from_millis(10);

/// Default rainbow tick interval
pub const DEFAULT_RAINBOW_INTERVAL: Duration = Duration::from_millis(10);

/// Default hue advance per rainbow tick, in degrees
pub const DEFAULT_RAINBOW_STEP: u16 = 1;

/// Timings of a static color change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTimings {
    /// Total length of the change
    pub duration: Duration,
    /// Time between two frames
    pub interval: Duration,
}

impl TransitionTimings {
    pub const DEFAULT: Self = Self {
        duration: DEFAULT_TRANSITION_DURATION,
        interval: DEFAULT_TRANSITION_INTERVAL,
    };

    /// Number of interpolation steps, never less than one
    #[allow(clippy::cast_possible_truncation)]
    pub fn steps(&self) -> u32 {
        let interval = self.interval.as_ticks().max(1);
        let steps = self.duration.as_ticks() / interval;
        steps.clamp(1, u64::from(u32::MAX - 1)) as u32
    }
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Rainbow cycle settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainbowTimings {
    /// Time between two ticks
    pub interval: Duration,
    /// Hue advance per tick, in degrees (`1..360`)
    pub step_degrees: u16,
    /// Hue of the first frame, in degrees
    pub start_phase: u16,
}

impl RainbowTimings {
    pub const DEFAULT: Self = Self {
        interval: DEFAULT_RAINBOW_INTERVAL,
        step_degrees: DEFAULT_RAINBOW_STEP,
        start_phase: 0,
    };
}

impl Default for RainbowTimings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration for the animation supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub transition: TransitionTimings,
    pub rainbow: RainbowTimings,
    /// Zone every frame is written to
    pub zone: ZoneId,
}

impl EngineConfig {
    #[must_use]
    pub fn with_transition(mut self, duration: Duration, interval: Duration) -> Self {
        self.transition = TransitionTimings { duration, interval };
        self
    }

    #[must_use]
    pub fn with_rainbow(mut self, interval: Duration, step_degrees: u16) -> Self {
        self.rainbow.interval = interval;
        self.rainbow.step_degrees = step_degrees;
        self
    }

    #[must_use]
    pub fn with_rainbow_start(mut self, start_phase: u16) -> Self {
        self.rainbow.start_phase = start_phase;
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: ZoneId) -> Self {
        self.zone = zone;
        self
    }

    /// Check the tunables before any animation uses them
    pub fn validate(&self) -> Result<(), Error> {
        if self.transition.interval.as_ticks() == 0 {
            return Err(Error::InvalidConfig("transition interval must be positive"));
        }
        if self.rainbow.interval.as_ticks() == 0 {
            return Err(Error::InvalidConfig("rainbow interval must be positive"));
        }
        if self.rainbow.step_degrees == 0 || self.rainbow.step_degrees >= HUE_DEGREES {
            return Err(Error::InvalidConfig("rainbow step must be within 1..360 degrees"));
        }
        if self.rainbow.start_phase >= HUE_DEGREES {
            return Err(Error::InvalidConfig("rainbow start phase must be below 360 degrees"));
        }
        Ok(())
    }
}
