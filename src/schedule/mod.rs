//! Cooperative timers for the presentation loop.
//!
//! The original viewer rescheduled itself with recursive "schedule next
//! call" callbacks; here that pattern is modelled explicitly as
//! [`RepeatingTimer`] — a cancellable repeating timer with an owned handle,
//! always cancelled before it is re-armed.  Timers hold no threads: the
//! egui update loop polls them with the current [`Instant`] and asks the
//! context for a repaint at the next deadline.
//!
//! [`AnimationScheduler`] advances frames within the item on display;
//! [`SlideshowScheduler`] advances across items.  Each owns exactly one
//! timer, so at most one deadline of either kind is ever pending.

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// RepeatingTimer
// ---------------------------------------------------------------------------

/// A cancellable repeating timer polled from a single-threaded loop.
///
/// While armed, [`fire_if_due`](Self::fire_if_due) returns `true` once per
/// elapsed period and re-arms itself relative to the fire time (not the
/// original deadline), so a stalled loop does not produce a burst of
/// catch-up fires.
#[derive(Debug)]
pub struct RepeatingTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTimer {
    /// Create a timer with the given period, initially cancelled.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Arm (or re-arm) the timer: the first fire is one full period after
    /// `now`.  Any previously pending deadline is replaced.
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    /// Cancel the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// `true` while a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// The pending deadline, for scheduling the loop's next wake-up.
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Fire when armed and due; re-arms for one period after `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// AnimationScheduler
// ---------------------------------------------------------------------------

/// Per-item frame-advance timer.
///
/// `start` cancels any pending timer for the previous item and resets the
/// frame index, so at most one frame-advance deadline exists system-wide
/// for any `start`/`stop` sequence.
#[derive(Debug)]
pub struct AnimationScheduler {
    timer: RepeatingTimer,
    frame_count: usize,
    frame_index: usize,
}

impl AnimationScheduler {
    /// Create a scheduler that advances frames every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            timer: RepeatingTimer::new(period),
            frame_count: 0,
            frame_index: 0,
        }
    }

    /// Begin animating an item with `frame_count` frames.
    ///
    /// The previous item's pending deadline is cancelled and the frame index
    /// resets to 0.  The timer is armed only when the item actually has more
    /// than one frame.
    pub fn start(&mut self, frame_count: usize, now: Instant) {
        self.timer.cancel();
        self.frame_count = frame_count;
        self.frame_index = 0;
        if frame_count > 1 {
            self.timer.arm(now);
        }
    }

    /// Cancel the pending deadline and clear frame state.
    pub fn stop(&mut self) {
        self.timer.cancel();
        self.frame_count = 0;
        self.frame_index = 0;
    }

    /// Current frame index for the display session.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// `true` while a frame-advance deadline is pending.
    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    /// Pending deadline, for the loop's wake-up scheduling.
    pub fn next_due(&self) -> Option<Instant> {
        self.timer.next_due()
    }

    /// Advance to the next frame when the timer is due.
    ///
    /// Returns the new frame index to display, wrapping modulo the frame
    /// count, or `None` when nothing is due.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        if self.frame_count > 1 && self.timer.fire_if_due(now) {
            self.frame_index = (self.frame_index + 1) % self.frame_count;
            Some(self.frame_index)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// SlideshowScheduler
// ---------------------------------------------------------------------------

/// Cross-item advance timer for slideshow mode.
///
/// `stop` clears the active flag and cancels the timer; `tick` checks the
/// flag again before yielding, so a stop requested mid-interval produces no
/// further advances.
#[derive(Debug)]
pub struct SlideshowScheduler {
    timer: RepeatingTimer,
    active: bool,
}

impl SlideshowScheduler {
    /// Create a scheduler that advances every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            timer: RepeatingTimer::new(period),
            active: false,
        }
    }

    /// Activate slideshow mode and arm the timer.  Re-arming replaces any
    /// pending deadline, so only one slideshow deadline is ever pending.
    pub fn start(&mut self, now: Instant) {
        self.active = true;
        self.timer.cancel();
        self.timer.arm(now);
    }

    /// Deactivate slideshow mode and cancel the pending deadline.
    pub fn stop(&mut self) {
        self.active = false;
        self.timer.cancel();
    }

    /// `true` while slideshow mode is on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pending deadline, for the loop's wake-up scheduling.
    pub fn next_due(&self) -> Option<Instant> {
        self.timer.next_due()
    }

    /// Returns `true` when the loop should advance to the next item.
    /// Re-arms only while still active.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.active && self.timer.fire_if_due(now)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(100);

    #[test]
    fn timer_fires_once_per_period() {
        let t0 = Instant::now();
        let mut timer = RepeatingTimer::new(PERIOD);
        timer.arm(t0);

        assert!(!timer.fire_if_due(t0));
        assert!(!timer.fire_if_due(t0 + Duration::from_millis(99)));
        assert!(timer.fire_if_due(t0 + PERIOD));
        // Re-armed relative to the fire time; not due again immediately.
        assert!(!timer.fire_if_due(t0 + PERIOD));
        assert!(timer.fire_if_due(t0 + PERIOD * 2));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let t0 = Instant::now();
        let mut timer = RepeatingTimer::new(PERIOD);
        timer.arm(t0);
        timer.cancel();

        assert!(!timer.is_armed());
        assert!(!timer.fire_if_due(t0 + PERIOD * 10));
    }

    #[test]
    fn animation_single_frame_never_arms() {
        let t0 = Instant::now();
        let mut anim = AnimationScheduler::new(PERIOD);
        anim.start(1, t0);

        assert!(!anim.is_running());
        assert_eq!(anim.tick(t0 + PERIOD * 5), None);
        assert_eq!(anim.frame_index(), 0);
    }

    #[test]
    fn animation_wraps_frames() {
        let t0 = Instant::now();
        let mut anim = AnimationScheduler::new(PERIOD);
        anim.start(3, t0);

        assert_eq!(anim.tick(t0 + PERIOD), Some(1));
        assert_eq!(anim.tick(t0 + PERIOD * 2), Some(2));
        assert_eq!(anim.tick(t0 + PERIOD * 3), Some(0));
    }

    /// Any sequence of start/stop calls leaves at most one pending deadline.
    #[test]
    fn animation_restart_keeps_single_deadline() {
        let t0 = Instant::now();
        let mut anim = AnimationScheduler::new(PERIOD);

        anim.start(4, t0);
        let first_due = anim.next_due();
        anim.start(2, t0 + Duration::from_millis(50));
        // Restart replaced the old deadline rather than adding a second one.
        assert_ne!(anim.next_due(), first_due);
        assert_eq!(anim.frame_index(), 0);

        // The old deadline must not fire.
        assert_eq!(anim.tick(t0 + PERIOD), None);
        assert_eq!(anim.tick(t0 + Duration::from_millis(150)), Some(1));

        anim.stop();
        assert!(!anim.is_running());
        assert_eq!(anim.tick(t0 + PERIOD * 10), None);
    }

    #[test]
    fn slideshow_advances_while_active() {
        let t0 = Instant::now();
        let mut show = SlideshowScheduler::new(PERIOD);
        show.start(t0);

        assert!(show.is_active());
        assert!(!show.tick(t0));
        assert!(show.tick(t0 + PERIOD));
        assert!(show.tick(t0 + PERIOD * 2));
    }

    /// Bounded-latency stop: once stop() is called, no further advances.
    #[test]
    fn slideshow_stop_ceases_advancing() {
        let t0 = Instant::now();
        let mut show = SlideshowScheduler::new(PERIOD);
        show.start(t0);
        assert!(show.tick(t0 + PERIOD));

        show.stop();
        assert!(!show.is_active());
        for i in 2u32..10 {
            assert!(!show.tick(t0 + PERIOD * i));
        }
    }

    #[test]
    fn slideshow_restart_replaces_deadline() {
        let t0 = Instant::now();
        let mut show = SlideshowScheduler::new(PERIOD);
        show.start(t0);
        show.start(t0 + Duration::from_millis(60));

        // Only the newer deadline counts.
        assert!(!show.tick(t0 + PERIOD));
        assert!(show.tick(t0 + Duration::from_millis(160)));
    }
}
