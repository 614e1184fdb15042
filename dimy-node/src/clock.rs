//! Scalable monotonic clock (spec.md §5/§6), standing in for the
//! out-of-scope "timekeeper" shim (`examples/original_source/timekeeper.py`)
//! behind the same three-operation interface: `now`, `sleep`,
//! `time_until_next_multiple`.

use std::time::Instant;

/// A clock whose scheduled intervals all run `time_scale`× faster (or
/// slower) than real time, while `now()` still reports scaled seconds since
/// the clock was created.
#[derive(Debug, Clone)]
pub struct ScaledClock {
    origin: Instant,
    time_scale: f64,
}

impl ScaledClock {
    /// Creates a clock anchored to the current instant.
    pub fn new(time_scale: f64) -> Self {
        Self {
            origin: Instant::now(),
            time_scale,
        }
    }

    /// Scaled seconds elapsed since this clock was created.
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * self.time_scale
    }

    /// Real-sleeps for `scaled_duration / time_scale`, i.e. the wall-clock
    /// time that advances the scaled clock by `scaled_duration`.
    pub async fn sleep(&self, scaled_duration: f64) {
        if scaled_duration <= 0.0 {
            return;
        }
        let real_seconds = scaled_duration / self.time_scale;
        tokio::time::sleep(std::time::Duration::from_secs_f64(real_seconds.max(0.0))).await;
    }

    /// Scaled seconds until the next multiple of `interval`, measured from
    /// this clock's origin: `interval - (now() mod interval)`.
    pub fn time_until_next_multiple(&self, interval: f64) -> f64 {
        interval - (self.now() % interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_until_next_multiple_is_within_interval() {
        let clock = ScaledClock::new(1.0);
        let interval = 15.0;
        let remaining = clock.time_until_next_multiple(interval);
        assert!(remaining > 0.0 && remaining <= interval);
    }
}
