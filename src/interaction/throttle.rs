use std::time::{Duration, Instant};

/// Leading-edge rate limiter with a single trailing call.
///
/// The first call runs immediately and opens a suppression window. Calls
/// inside the window only replace the pending arguments; once the window
/// elapses [`Throttle::poll`] releases the last pending arguments, which
/// opens a new window. Time is injected so hosts can drive it from any
/// clock or event loop.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    window: Duration,
    window_end: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            window_end: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Offers a call. Returns the arguments to execute now, if any.
    pub fn call(&mut self, args: T, now: Instant) -> Option<T> {
        if let Some(released) = self.poll(now) {
            // A due trailing call runs first; the new call is suppressed by
            // the window that release just opened.
            self.pending = Some(args);
            return Some(released);
        }

        if self.is_suppressing(now) {
            self.pending = Some(args);
            return None;
        }

        self.window_end = Some(now + self.window);
        Some(args)
    }

    /// Releases the pending call when the suppression window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.is_suppressing(now) {
            return None;
        }
        let released = self.pending.take()?;
        self.window_end = Some(now + self.window);
        Some(released)
    }

    /// Instant at which a pending call becomes due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and(self.window_end)
    }

    fn is_suppressing(&self, now: Instant) -> bool {
        self.window_end.is_some_and(|end| now < end)
    }
}
