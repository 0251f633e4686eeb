//! Vision module for the fishing loop
//!
//! Everything here is synchronous and works on one owned `PixelSample` per
//! detection cycle: capture a region, convert it once, answer questions.

pub mod bite;
pub mod color;
pub mod error;
pub mod motion;
pub mod sample;
pub mod template;
pub mod timing;

#[cfg(test)]
mod tests;

// Re-export main types and functions
pub use bite::{BiteCue, BiteDetector, BiteSettings, SplashColor};
pub use color::{HsvFrame, HsvRange, classify, rgb_to_hsv};
pub use error::{CaptureError, DetectionError, TemplateError, VisionError};
pub use motion::{MOTION_FRACTION_BAR, MotionDetector};
pub use sample::{CaptureRegion, PixelSample, ScreenSampler};
pub use template::{BITE_TEMPLATE_FILES, DetectionResult, Template, TemplateLibrary, TemplateMatcher};
pub use timing::{GreenThreshold, MINIGAME_COLOR_BAR, TimingReading, TimingWindowDetector};
