#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Wall-clock timer driving animation playback.
///
/// Starts paused at zero. While running, [`elapsed_sec`](Self::elapsed_sec)
/// reports the time since [`start`](Self::start) minus any paused spans, unless a
/// fixed time has been pinned with [`set_fixed_time`](Self::set_fixed_time).
#[derive(Debug, Clone)]
pub struct AnimationTimer {
    start_time: Instant,
    paused: bool,
    fixed_time: Option<f32>,
    paused_elapsed: Duration,
}

impl Default for AnimationTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            paused: true,
            fixed_time: None,
            paused_elapsed: Duration::ZERO,
        }
    }

    /// Seconds of animation time to feed into `advance`.
    #[must_use]
    pub fn elapsed_sec(&self) -> f32 {
        if self.paused {
            return self.paused_elapsed.as_secs_f32();
        }
        self.fixed_time
            .unwrap_or_else(|| self.start_time.elapsed().as_secs_f32())
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn start(&mut self) {
        self.start_time = Instant::now();
        self.paused = false;
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused_elapsed = self.start_time.elapsed();
            self.paused = true;
        }
    }

    /// Resumes playback from the paused position.
    pub fn unpause(&mut self) {
        if self.paused {
            self.start_time = Instant::now()
                .checked_sub(self.paused_elapsed)
                .unwrap_or_else(Instant::now);
            self.paused = false;
        }
    }

    pub fn toggle(&mut self) {
        if self.paused {
            self.unpause();
        } else {
            self.pause();
        }
    }

    /// Rewinds to zero, keeping the running/paused state.
    pub fn reset(&mut self) {
        self.start_time = Instant::now();
        self.paused_elapsed = Duration::ZERO;
    }

    /// Pins the reported time, e.g. for deterministic captures.
    pub fn set_fixed_time(&mut self, seconds: f32) {
        self.paused = false;
        self.fixed_time = Some(seconds);
    }

    pub fn clear_fixed_time(&mut self) {
        self.fixed_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_paused_at_zero() {
        let timer = AnimationTimer::new();
        assert!(timer.is_paused());
        assert_eq!(timer.elapsed_sec(), 0.0);
    }

    #[test]
    fn fixed_time_overrides_clock() {
        let mut timer = AnimationTimer::new();
        timer.set_fixed_time(2.5);
        assert!(!timer.is_paused());
        assert_eq!(timer.elapsed_sec(), 2.5);

        timer.clear_fixed_time();
        assert!(timer.elapsed_sec() < 2.5);
    }

    #[test]
    fn toggle_flips_pause_state() {
        let mut timer = AnimationTimer::new();
        timer.toggle();
        assert!(!timer.is_paused());
        timer.toggle();
        assert!(timer.is_paused());
    }

    #[test]
    fn reset_while_paused_returns_to_zero() {
        let mut timer = AnimationTimer::new();
        timer.start();
        timer.pause();
        timer.reset();
        assert_eq!(timer.elapsed_sec(), 0.0);
    }
}
