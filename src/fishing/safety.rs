//! Anti-detection pacing: cast delays, reel delays and breaks

use crate::config::{FishingConfig, MAX_WAIT, seconds};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Duration, Instant};

pub struct SafetyScheduler {
    rng: StdRng,
    randomize: bool,
    cast_delay: (f64, f64),
    reel_delay: (f64, f64),
    break_duration: (f64, f64),
    /// `None` when breaks are off
    break_interval: Option<Duration>,
}

impl SafetyScheduler {
    pub fn new(config: &FishingConfig, seed: u64) -> Self {
        let t = &config.timing;
        let s = &config.safety;
        let break_interval = (s.anti_detection_enabled && s.break_interval_minutes > 0.0)
            .then(|| seconds(s.break_interval_minutes * 60.0));
        Self {
            rng: StdRng::seed_from_u64(seed),
            randomize: s.randomize_timings,
            cast_delay: (t.cast_delay_min, t.cast_delay_max),
            reel_delay: (t.reel_delay_min, t.reel_delay_max),
            break_duration: (s.break_duration_min, s.break_duration_max),
            break_interval,
        }
    }

    /// Uniform in the cast delay range, or its midpoint when randomization is off
    pub fn next_cast_delay(&mut self) -> Duration {
        let (min, max) = self.cast_delay;
        self.draw(min, max, self.randomize)
    }

    /// Pause between spotting the timing window and clicking reel
    pub fn reel_delay(&mut self) -> Duration {
        let (min, max) = self.reel_delay;
        self.draw(min, max, self.randomize)
    }

    pub fn should_take_break(&self, last_break: Instant) -> bool {
        match self.break_interval {
            Some(interval) => last_break.elapsed() >= interval,
            None => false,
        }
    }

    pub fn break_duration(&mut self) -> Duration {
        let (min, max) = self.break_duration;
        self.draw(min, max, true)
    }

    fn draw(&mut self, a: f64, b: f64, randomize: bool) -> Duration {
        let limit = MAX_WAIT.as_secs_f64();
        let (lo, hi) = (a.min(b).clamp(0.0, limit), a.max(b).clamp(0.0, limit));
        let value = if randomize && hi > lo {
            self.rng.random_range(lo..=hi)
        } else {
            (lo + hi) / 2.0
        };
        seconds(value)
    }
}
