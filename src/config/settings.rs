//! Typed per-run snapshot of the settings store

use super::store::ConfigStore;
use crate::platform::ScreenPoint;
use crate::vision::{BiteSettings, CaptureRegion, GreenThreshold, TimingWindowDetector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const COORDINATES: &str = "Coordinates";
const TIMING: &str = "Timing";
const DETECTION: &str = "Detection";
const SAFETY: &str = "Safety";
const SESSION: &str = "Session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub cast_button: ScreenPoint,
    pub fishing_area: ScreenPoint,
    pub reel_button: ScreenPoint,
    pub timing_area: ScreenPoint,
    pub fishing_region_width: u32,
    pub fishing_region_height: u32,
}

/// Durations in seconds, as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSettings {
    pub cast_delay_min: f64,
    pub cast_delay_max: f64,
    pub bite_timeout: f64,
    pub reaction_time_min: f64,
    pub reaction_time_max: f64,
    /// Wait between spotting the open timing window and the reel click
    pub reel_delay_min: f64,
    pub reel_delay_max: f64,
    pub reel_timeout: f64,
    pub reel_max_attempts: u32,
    pub detection_error_backoff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    pub hook_sensitivity: f64,
    /// Raw slider value, see [`GreenThreshold::from_slider`]
    pub green_threshold: u32,
    pub detection_radius: u32,
    pub motion_sensitivity: u8,
    pub color_change_threshold: f64,
    pub use_motion_detection: bool,
    pub use_color_detection: bool,
    pub use_template_matching: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySettings {
    pub randomize_timings: bool,
    pub anti_detection_enabled: bool,
    pub break_interval_minutes: f64,
    pub break_duration_min: f64,
    pub break_duration_max: f64,
    pub max_session_hours: f64,
    pub mouse_movement_variation: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Catch target; `None` runs until stopped
    pub max_fishing: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishingConfig {
    pub coordinates: Coordinates,
    pub timing: TimingSettings,
    pub detection: DetectionSettings,
    pub safety: SafetySettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("Cast button coordinates {0} must be positive")]
    CastButtonPosition(ScreenPoint),

    #[error("Cast delay minimum {min}s must be less than maximum {max}s")]
    CastDelayRange { min: f64, max: f64 },

    #[error("Hook sensitivity {0} must be between 0.1 and 1.0")]
    HookSensitivity(f64),

    #[error("Reaction time minimum {min}s exceeds maximum {max}s")]
    ReactionTimeRange { min: f64, max: f64 },

    #[error("Reel delay minimum {min}s exceeds maximum {max}s")]
    ReelDelayRange { min: f64, max: f64 },

    #[error("Break duration minimum {min}s exceeds maximum {max}s")]
    BreakDurationRange { min: f64, max: f64 },

    #[error("Detection radius must be greater than zero")]
    DetectionRadius,
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Upper bound for any configured wait; larger values are clamped to it
pub const MAX_WAIT: Duration = Duration::from_secs(7 * 24 * 3600);

/// Seconds from a settings value, clamped to `0..=MAX_WAIT`
pub fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value)
        .unwrap_or(MAX_WAIT)
        .min(MAX_WAIT)
}

fn point(store: &ConfigStore, prefix: &str, x: i64, y: i64) -> ScreenPoint {
    ScreenPoint::new(
        clamp_i32(store.get_int(COORDINATES, &format!("{prefix}_x"), x)),
        clamp_i32(store.get_int(COORDINATES, &format!("{prefix}_y"), y)),
    )
}

impl FishingConfig {
    pub fn from_store(store: &ConfigStore) -> Self {
        let coordinates = Coordinates {
            cast_button: point(store, "cast_button", 400, 500),
            fishing_area: point(store, "fishing_area", 400, 300),
            reel_button: point(store, "reel_button", 400, 600),
            timing_area: point(store, "timing_area", 400, 400),
            fishing_region_width: clamp_u32(store.get_int(COORDINATES, "fishing_region_width", 200)),
            fishing_region_height: clamp_u32(store.get_int(COORDINATES, "fishing_region_height", 200)),
        };

        let timing = TimingSettings {
            cast_delay_min: store.get_float(TIMING, "cast_delay_min", 2.0),
            cast_delay_max: store.get_float(TIMING, "cast_delay_max", 4.0),
            bite_timeout: store.get_float(TIMING, "bite_timeout", 30.0),
            reaction_time_min: store.get_float(TIMING, "reaction_time_min", 0.3),
            reaction_time_max: store.get_float(TIMING, "reaction_time_max", 0.8),
            reel_delay_min: store.get_float(TIMING, "reel_delay_min", 0.05),
            reel_delay_max: store.get_float(TIMING, "reel_delay_max", 0.5),
            reel_timeout: store.get_float(TIMING, "reel_timeout", 10.0),
            reel_max_attempts: clamp_u32(store.get_int(TIMING, "reel_max_attempts", 50)),
            detection_error_backoff: store.get_float(TIMING, "detection_error_backoff", 2.0),
        };

        let detection = DetectionSettings {
            hook_sensitivity: store.get_float(DETECTION, "hook_sensitivity", 0.8),
            green_threshold: clamp_u32(store.get_int(DETECTION, "green_threshold", 30)),
            detection_radius: clamp_u32(store.get_int(DETECTION, "detection_radius", 100)),
            motion_sensitivity: store.get_int(DETECTION, "motion_sensitivity", 20).clamp(0, 255)
                as u8,
            color_change_threshold: store.get_float(DETECTION, "color_change_threshold", 0.05),
            use_motion_detection: store.get_bool(DETECTION, "use_motion_detection", true),
            use_color_detection: store.get_bool(DETECTION, "use_color_detection", true),
            use_template_matching: store.get_bool(DETECTION, "use_template_matching", true),
        };

        let safety = SafetySettings {
            randomize_timings: store.get_bool(SAFETY, "randomize_timings", true),
            anti_detection_enabled: store.get_bool(SAFETY, "anti_detection_enabled", true),
            break_interval_minutes: store.get_float(SAFETY, "break_interval_minutes", 30.0),
            break_duration_min: store.get_float(SAFETY, "break_duration_min", 30.0),
            break_duration_max: store.get_float(SAFETY, "break_duration_max", 120.0),
            max_session_hours: store.get_float(SAFETY, "max_session_hours", 4.0),
            mouse_movement_variation: clamp_u32(
                store.get_int(SAFETY, "mouse_movement_variation", 20),
            ),
        };

        let max_fishing = clamp_u32(store.get_int(SESSION, "max_fishing", 0));
        let session = SessionSettings {
            max_fishing: (max_fishing > 0).then_some(max_fishing),
        };

        Self {
            coordinates,
            timing,
            detection,
            safety,
            session,
        }
    }

    /// Write every field back under its section/key
    pub fn store_into(&self, store: &mut ConfigStore) {
        let c = &self.coordinates;
        for (prefix, p) in [
            ("cast_button", c.cast_button),
            ("fishing_area", c.fishing_area),
            ("reel_button", c.reel_button),
            ("timing_area", c.timing_area),
        ] {
            store.set(COORDINATES, &format!("{prefix}_x"), p.x);
            store.set(COORDINATES, &format!("{prefix}_y"), p.y);
        }
        store.set(COORDINATES, "fishing_region_width", c.fishing_region_width);
        store.set(COORDINATES, "fishing_region_height", c.fishing_region_height);

        let t = &self.timing;
        store.set(TIMING, "cast_delay_min", t.cast_delay_min);
        store.set(TIMING, "cast_delay_max", t.cast_delay_max);
        store.set(TIMING, "bite_timeout", t.bite_timeout);
        store.set(TIMING, "reaction_time_min", t.reaction_time_min);
        store.set(TIMING, "reaction_time_max", t.reaction_time_max);
        store.set(TIMING, "reel_delay_min", t.reel_delay_min);
        store.set(TIMING, "reel_delay_max", t.reel_delay_max);
        store.set(TIMING, "reel_timeout", t.reel_timeout);
        store.set(TIMING, "reel_max_attempts", t.reel_max_attempts);
        store.set(TIMING, "detection_error_backoff", t.detection_error_backoff);

        let d = &self.detection;
        store.set(DETECTION, "hook_sensitivity", d.hook_sensitivity);
        store.set(DETECTION, "green_threshold", d.green_threshold);
        store.set(DETECTION, "detection_radius", d.detection_radius);
        store.set(DETECTION, "motion_sensitivity", d.motion_sensitivity);
        store.set(DETECTION, "color_change_threshold", d.color_change_threshold);
        store.set(DETECTION, "use_motion_detection", d.use_motion_detection);
        store.set(DETECTION, "use_color_detection", d.use_color_detection);
        store.set(DETECTION, "use_template_matching", d.use_template_matching);

        let s = &self.safety;
        store.set(SAFETY, "randomize_timings", s.randomize_timings);
        store.set(SAFETY, "anti_detection_enabled", s.anti_detection_enabled);
        store.set(SAFETY, "break_interval_minutes", s.break_interval_minutes);
        store.set(SAFETY, "break_duration_min", s.break_duration_min);
        store.set(SAFETY, "break_duration_max", s.break_duration_max);
        store.set(SAFETY, "max_session_hours", s.max_session_hours);
        store.set(SAFETY, "mouse_movement_variation", s.mouse_movement_variation);

        store.set(SESSION, "max_fishing", self.session.max_fishing.unwrap_or(0));
    }

    /// Problems worth warning about. None of them stop a run.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let cast = self.coordinates.cast_button;
        if cast.x <= 0 || cast.y <= 0 {
            issues.push(ConfigIssue::CastButtonPosition(cast));
        }
        let t = &self.timing;
        if t.cast_delay_min >= t.cast_delay_max {
            issues.push(ConfigIssue::CastDelayRange {
                min: t.cast_delay_min,
                max: t.cast_delay_max,
            });
        }
        let hook = self.detection.hook_sensitivity;
        if !(0.1..=1.0).contains(&hook) {
            issues.push(ConfigIssue::HookSensitivity(hook));
        }
        if t.reaction_time_min > t.reaction_time_max {
            issues.push(ConfigIssue::ReactionTimeRange {
                min: t.reaction_time_min,
                max: t.reaction_time_max,
            });
        }
        if t.reel_delay_min > t.reel_delay_max {
            issues.push(ConfigIssue::ReelDelayRange {
                min: t.reel_delay_min,
                max: t.reel_delay_max,
            });
        }
        let s = &self.safety;
        if s.break_duration_min > s.break_duration_max {
            issues.push(ConfigIssue::BreakDurationRange {
                min: s.break_duration_min,
                max: s.break_duration_max,
            });
        }
        if self.detection.detection_radius == 0 {
            issues.push(ConfigIssue::DetectionRadius);
        }
        issues
    }

    pub fn timing_detector(&self) -> TimingWindowDetector {
        TimingWindowDetector::new(
            self.coordinates.timing_area,
            self.detection.detection_radius,
            GreenThreshold::from_slider(self.detection.green_threshold),
        )
    }

    pub fn fishing_region(&self) -> CaptureRegion {
        CaptureRegion::centered_on(
            self.coordinates.fishing_area,
            self.coordinates.fishing_region_width,
            self.coordinates.fishing_region_height,
        )
    }

    pub fn bite_settings(&self) -> BiteSettings {
        let d = &self.detection;
        BiteSettings {
            motion_sensitivity: d.use_motion_detection.then_some(d.motion_sensitivity),
            splash_threshold: d.use_color_detection.then_some(d.color_change_threshold),
            template_confidence: d.use_template_matching.then_some(d.hook_sensitivity as f32),
        }
    }

    /// Click jitter radius in pixels; zero when anti-detection is off
    pub fn click_variation(&self) -> u32 {
        if self.safety.anti_detection_enabled {
            self.safety.mouse_movement_variation
        } else {
            0
        }
    }

    pub fn bite_timeout(&self) -> Duration {
        seconds(self.timing.bite_timeout)
    }

    pub fn reel_timeout(&self) -> Duration {
        seconds(self.timing.reel_timeout)
    }

    pub fn detection_backoff(&self) -> Duration {
        seconds(self.timing.detection_error_backoff)
    }

    pub fn max_session(&self) -> Option<Duration> {
        let hours = self.safety.max_session_hours;
        (hours > 0.0).then(|| seconds(hours * 3600.0))
    }
}

impl Default for FishingConfig {
    fn default() -> Self {
        Self::from_store(&ConfigStore::new())
    }
}
