use super::sample::CaptureRegion;
use crate::platform::PlatformError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain pixels for a cycle. Callers treat it as "no data this cycle".
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture region {region} has a zero dimension")]
    InvalidRegion { region: CaptureRegion },

    #[error("Capture region {region} lies outside the {width}x{height} display")]
    OutOfBounds {
        region: CaptureRegion,
        width: u32,
        height: u32,
    },

    #[error("Backend returned {actual_width}x{actual_height} pixels for region {region}")]
    DimensionMismatch {
        region: CaptureRegion,
        actual_width: u32,
        actual_height: u32,
    },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Unexpected failure inside a classify or match step. Aborts the cycle.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Sample has no pixels to classify")]
    EmptySample,

    #[error("Template '{name}' has no pixels")]
    EmptyTemplate { name: String },

    #[error("Template '{name}' produced no usable correlation score")]
    InvalidScore { name: String },
}

/// Configuration/asset problem with a template file. Reported once at load time.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template {path:?} is missing or unreadable: {reason}")]
    Missing { path: PathBuf, reason: String },
}

/// Either half of a sample-then-classify step
#[derive(Debug, Error)]
pub enum VisionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Detection(#[from] DetectionError),
}
