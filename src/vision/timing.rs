//! Reel minigame detection on the timing-circle region.
//!
//! Both questions are answered from a single capture: the minigame is up when
//! the blue target circle and the white shrinking circle are visible at the
//! same time, and the instant to react is when enough of the region has
//! turned green.

use super::color::{HsvFrame, HsvRange};
use super::error::{DetectionError, VisionError};
use super::sample::{CaptureRegion, PixelSample, ScreenSampler};
use crate::platform::{ScreenPoint, ScreenSource};
use serde::{Deserialize, Serialize};

/// Blue and white must each cover strictly more than this share of the region
pub const MINIGAME_COLOR_BAR: f64 = 0.02;

/// Slider units per unit fraction: a slider value of 30 means 3% green
pub const GREEN_SLIDER_SCALE: f64 = 1000.0;

/// Green-coverage bar for the perfect-timing check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenThreshold(f64);

impl GreenThreshold {
    /// Convert the user-facing slider value (10..=100, default 30)
    pub fn from_slider(value: u32) -> Self {
        Self(value as f64 / GREEN_SLIDER_SCALE)
    }

    pub fn from_fraction(fraction: f64) -> Self {
        Self(fraction)
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }
}

impl Default for GreenThreshold {
    fn default() -> Self {
        Self::from_slider(30)
    }
}

/// Color coverage of one timing-region sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingReading {
    pub blue: f64,
    pub white: f64,
    pub green: f64,
}

#[derive(Debug, Clone)]
pub struct TimingWindowDetector {
    center: ScreenPoint,
    radius: u32,
    green_threshold: GreenThreshold,
}

impl TimingWindowDetector {
    pub fn new(center: ScreenPoint, radius: u32, green_threshold: GreenThreshold) -> Self {
        Self {
            center,
            radius,
            green_threshold,
        }
    }

    /// Square box around the timing circle
    pub fn region(&self) -> CaptureRegion {
        CaptureRegion::square_around(self.center, self.radius)
    }

    pub fn green_threshold(&self) -> GreenThreshold {
        self.green_threshold
    }

    /// Classify a sample against blue, white and green with one HSV conversion
    pub fn read(&self, sample: &PixelSample) -> Result<TimingReading, DetectionError> {
        let frame = HsvFrame::from_sample(sample);
        Ok(TimingReading {
            blue: frame.fraction(&HsvRange::BLUE)?,
            white: frame.fraction(&HsvRange::WHITE)?,
            green: frame.fraction(&HsvRange::GREEN)?,
        })
    }

    /// Capture the timing region and classify it
    pub fn sample<S: ScreenSource>(
        &self,
        sampler: &mut ScreenSampler<S>,
    ) -> Result<TimingReading, VisionError> {
        let sample = sampler.capture(Some(self.region()))?;
        Ok(self.read(&sample)?)
    }

    pub fn is_minigame_active(reading: &TimingReading) -> bool {
        reading.blue > MINIGAME_COLOR_BAR && reading.white > MINIGAME_COLOR_BAR
    }

    pub fn is_perfect_timing(&self, reading: &TimingReading) -> bool {
        reading.green > self.green_threshold.fraction()
    }
}
