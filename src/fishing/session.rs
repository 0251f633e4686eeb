// Per-run counters owned by the worker
use super::stats::SessionStats;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FishingSession {
    fish_caught: u32,
    casts_made: u32,
    started_at: Instant,
    last_break_at: Instant,
}

impl FishingSession {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            fish_caught: 0,
            casts_made: 0,
            started_at: now,
            last_break_at: now,
        }
    }

    /// Returns the new cast count
    pub fn record_cast(&mut self) -> u32 {
        self.casts_made += 1;
        self.casts_made
    }

    /// Returns the new catch count
    pub fn record_fish(&mut self) -> u32 {
        self.fish_caught += 1;
        self.fish_caught
    }

    pub fn record_break(&mut self) {
        self.last_break_at = Instant::now();
    }

    pub fn fish_caught(&self) -> u32 {
        self.fish_caught
    }

    pub fn casts_made(&self) -> u32 {
        self.casts_made
    }

    pub fn last_break_at(&self) -> Instant {
        self.last_break_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn target_reached(&self, max_fishing: Option<u32>) -> bool {
        max_fishing.is_some_and(|target| self.fish_caught >= target)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            fish_caught: self.fish_caught,
            casts_made: self.casts_made,
            elapsed: self.elapsed(),
        }
    }
}

impl Default for FishingSession {
    fn default() -> Self {
        Self::start()
    }
}
