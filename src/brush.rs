// Brush size control: a bounded radius plus a size indicator that closes
// itself 1.5 s after the last change.
// Time is passed in, so the main loop drives the timer once per frame.

use std::time::{Duration, Instant};

pub const MIN_BRUSH: u32 = 5;
pub const MAX_BRUSH: u32 = 250;

/// Default radius when editing an existing image.
pub const EDIT_DEFAULT: u32 = 50;
/// Default radius when scribbling on a blank canvas.
pub const SCRIBBLE_DEFAULT: u32 = 10;

pub const AUTO_CLOSE: Duration = Duration::from_millis(1500);

/// A cancellable delayed callback. `restart` pushes the deadline out,
/// `fire_if_due` reports (once) when it has passed.
#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BrushSize {
    value: u32,
    open: bool,
    close_timer: Debounce,
}

impl BrushSize {
    pub fn new(initial: u32) -> Self {
        Self {
            value: initial.clamp(MIN_BRUSH, MAX_BRUSH),
            open: false,
            close_timer: Debounce::new(AUTO_CLOSE),
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Set the radius (clamped). Any change shows the indicator and restarts
    /// the close timer. Returns true if the value changed.
    pub fn set(&mut self, value: u32, now: Instant) -> bool {
        let value = value.clamp(MIN_BRUSH, MAX_BRUSH);
        if value == self.value {
            return false;
        }
        self.value = value;
        self.open = true;
        self.close_timer.restart(now);
        true
    }

    /// Nudge the radius by `delta` (scroll wheel, bracket keys).
    pub fn step(&mut self, delta: i32, now: Instant) -> bool {
        let next = (self.value as i64 + delta as i64).clamp(MIN_BRUSH as i64, MAX_BRUSH as i64);
        self.set(next as u32, now)
    }

    /// Open or close the indicator by hand. An open indicator still closes
    /// on its own after the next change settles.
    pub fn toggle(&mut self) {
        self.open = !self.open;
        if !self.open {
            self.close_timer.cancel();
        }
    }

    /// Call once per frame. Closes the indicator when the timer fires.
    pub fn tick(&mut self, now: Instant) {
        if self.close_timer.fire_if_due(now) {
            self.open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_to_range() {
        let now = Instant::now();
        let mut b = BrushSize::new(1);
        assert_eq!(b.value(), MIN_BRUSH);
        b.set(1000, now);
        assert_eq!(b.value(), MAX_BRUSH);
        assert!(!b.step(10, now));
        b.step(-500, now);
        assert_eq!(b.value(), MIN_BRUSH);
    }

    #[test]
    fn test_auto_close_after_inactivity() {
        let t0 = Instant::now();
        let mut b = BrushSize::new(EDIT_DEFAULT);
        assert!(!b.is_open());

        assert!(b.set(60, t0));
        assert!(b.is_open());

        // A change at 1s restarts the timer.
        b.set(70, t0 + Duration::from_secs(1));
        b.tick(t0 + Duration::from_millis(1600));
        assert!(b.is_open());

        b.tick(t0 + Duration::from_millis(2500));
        assert!(!b.is_open());
        assert_eq!(b.value(), 70);
    }

    #[test]
    fn test_unchanged_value_does_not_open() {
        let mut b = BrushSize::new(SCRIBBLE_DEFAULT);
        assert!(!b.set(SCRIBBLE_DEFAULT, Instant::now()));
        assert!(!b.is_open());
    }

    #[test]
    fn test_toggle_cancels_timer() {
        let t0 = Instant::now();
        let mut b = BrushSize::new(20);
        b.toggle();
        assert!(b.is_open());
        // No pending timer: stays open until toggled again.
        b.tick(t0 + Duration::from_secs(10));
        assert!(b.is_open());

        b.set(30, t0);
        b.toggle();
        assert!(!b.is_open());
        assert!(!b.close_timer.is_pending());
    }

    #[test]
    fn test_debounce_fires_once() {
        let t0 = Instant::now();
        let mut d = Debounce::new(Duration::from_millis(10));
        assert!(!d.fire_if_due(t0));
        d.restart(t0);
        assert!(!d.fire_if_due(t0 + Duration::from_millis(5)));
        assert!(d.fire_if_due(t0 + Duration::from_millis(10)));
        assert!(!d.fire_if_due(t0 + Duration::from_millis(20)));
    }
}
