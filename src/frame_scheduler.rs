//! Frame pacing
//!
//! Frames are scheduled against absolute deadlines (`start + n * interval`)
//! rather than by summing sleeps, so timing errors do not accumulate. The
//! caller is responsible for sleeping/waiting until the returned deadline.

use embassy_time::{Duration, Instant};

/// Absolute-deadline frame scheduler.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(Instant::now(), interval);
/// let mut deadline = scheduler.next_deadline();
///
/// for frame in frames {
///     wait_until(deadline);
///     write(frame);
///     deadline = scheduler.tick(Instant::now());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    next_frame: Instant,
    frame_duration: Duration,
}

impl FrameScheduler {
    /// Create a scheduler whose first frame is due at `start`.
    pub fn new(start: Instant, frame_duration: Duration) -> Self {
        Self {
            next_frame: start,
            frame_duration,
        }
    }

    /// Deadline of the frame that has not been emitted yet
    pub const fn next_deadline(&self) -> Instant {
        self.next_frame
    }

    /// Record that the due frame was emitted at `now` and return the
    /// deadline of the next one.
    ///
    /// If emission fell behind by more than two frames the schedule restarts
    /// from `now` instead of bursting through the backlog. Frames are never
    /// pulled earlier than their original deadline.
    pub fn tick(&mut self, now: Instant) -> Instant {
        let max_drift = self.frame_duration + self.frame_duration;
        if now > self.next_frame + max_drift {
            self.next_frame = now;
        }

        self.next_frame += self.frame_duration;
        self.next_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadlines_advance_by_interval() {
        let mut scheduler = FrameScheduler::new(Instant::from_millis(100), Duration::from_millis(10));
        assert_eq!(scheduler.next_deadline(), Instant::from_millis(100));

        // Emitted late, the next deadline stays on the grid
        assert_eq!(scheduler.tick(Instant::from_millis(103)), Instant::from_millis(110));
        assert_eq!(scheduler.tick(Instant::from_millis(110)), Instant::from_millis(120));
        assert_eq!(scheduler.next_deadline(), Instant::from_millis(120));
    }

    #[test]
    fn long_stall_restarts_schedule() {
        let mut scheduler = FrameScheduler::new(Instant::from_millis(0), Duration::from_millis(10));
        assert_eq!(scheduler.tick(Instant::from_millis(55)), Instant::from_millis(65));
    }

    #[test]
    fn short_lag_keeps_backlog_deadline() {
        let mut scheduler = FrameScheduler::new(Instant::from_millis(0), Duration::from_millis(10));
        // Already due, the caller does not sleep
        assert_eq!(scheduler.tick(Instant::from_millis(15)), Instant::from_millis(10));
    }
}
