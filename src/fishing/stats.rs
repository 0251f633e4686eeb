//! Session and cumulative statistics
//!
//! Totals live in the `Statistics` section of the settings store; the
//! aggregator only moves them in and out, it never touches the file itself.

use super::types::FishingEvent;
use crate::config::ConfigStore;
use serde::Serialize;
use std::time::Duration;

const STATISTICS: &str = "Statistics";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub fish_caught: u32,
    pub casts_made: u32,
    pub elapsed: Duration,
}

impl SessionStats {
    pub fn success_rate(&self) -> f64 {
        if self.casts_made == 0 {
            0.0
        } else {
            f64::from(self.fish_caught) / f64::from(self.casts_made)
        }
    }

    pub fn elapsed_hours(&self) -> f64 {
        self.elapsed.as_secs_f64() / 3600.0
    }

    pub fn fish_per_hour(&self) -> f64 {
        let hours = self.elapsed_hours();
        if hours > 0.0 {
            f64::from(self.fish_caught) / hours
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CumulativeStats {
    pub total_fish_caught: u64,
    pub total_casts_made: u64,
    pub total_runtime_hours: f64,
    pub best_session_fish: u32,
    pub sessions_completed: u32,
}

#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    totals: CumulativeStats,
    current: SessionStats,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from(store: &ConfigStore) -> Self {
        let count = |key| store.get_int(STATISTICS, key, 0).max(0);
        let totals = CumulativeStats {
            total_fish_caught: count("total_fish_caught") as u64,
            total_casts_made: count("total_casts_made") as u64,
            total_runtime_hours: store.get_float(STATISTICS, "total_runtime_hours", 0.0).max(0.0),
            best_session_fish: count("best_session_fish").min(u32::MAX as i64) as u32,
            sessions_completed: count("sessions_completed").min(u32::MAX as i64) as u32,
        };
        Self {
            totals,
            current: SessionStats::default(),
        }
    }

    pub fn store_into(&self, store: &mut ConfigStore) {
        let t = &self.totals;
        store.set(STATISTICS, "total_fish_caught", t.total_fish_caught);
        store.set(STATISTICS, "total_casts_made", t.total_casts_made);
        store.set(STATISTICS, "total_runtime_hours", t.total_runtime_hours);
        store.set(STATISTICS, "best_session_fish", t.best_session_fish);
        store.set(STATISTICS, "sessions_completed", t.sessions_completed);
    }

    /// Fold a finished session into the totals
    pub fn record_session(&mut self, session: &SessionStats) {
        let t = &mut self.totals;
        t.total_fish_caught += u64::from(session.fish_caught);
        t.total_casts_made += u64::from(session.casts_made);
        t.total_runtime_hours += session.elapsed_hours();
        t.best_session_fish = t.best_session_fish.max(session.fish_caught);
        t.sessions_completed += 1;
        self.current = SessionStats::default();
    }

    /// Follow a live run through its events
    pub fn observe(&mut self, event: &FishingEvent) {
        match event {
            FishingEvent::CastMade { casts_made } => self.current.casts_made = *casts_made,
            FishingEvent::FishCaught { fish_caught } => self.current.fish_caught = *fish_caught,
            FishingEvent::SessionFinished { stats } => self.record_session(stats),
            _ => {}
        }
    }

    pub fn totals(&self) -> &CumulativeStats {
        &self.totals
    }

    /// Counters of the run being observed, if any
    pub fn current(&self) -> &SessionStats {
        &self.current
    }

    pub fn success_rate(&self) -> f64 {
        if self.totals.total_casts_made == 0 {
            0.0
        } else {
            self.totals.total_fish_caught as f64 / self.totals.total_casts_made as f64
        }
    }

    pub fn fish_per_hour(&self) -> f64 {
        if self.totals.total_runtime_hours > 0.0 {
            self.totals.total_fish_caught as f64 / self.totals.total_runtime_hours
        } else {
            0.0
        }
    }

    pub fn average_fish_per_session(&self) -> f64 {
        if self.totals.sessions_completed == 0 {
            0.0
        } else {
            self.totals.total_fish_caught as f64 / f64::from(self.totals.sessions_completed)
        }
    }
}
