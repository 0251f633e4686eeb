//! Capture regions, owned pixel samples and the screen sampler

use super::error::CaptureError;
use crate::platform::{DisplayInfo, ScreenPoint, ScreenSource};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangle of the display in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a full-screen region
    pub fn full_screen(display: &DisplayInfo) -> Self {
        Self::new(0, 0, display.width, display.height)
    }

    /// Rectangle of `width x height` centered on `center`
    pub fn centered_on(center: ScreenPoint, width: u32, height: u32) -> Self {
        Self::new(
            center.x.saturating_sub((width / 2) as i32),
            center.y.saturating_sub((height / 2) as i32),
            width,
            height,
        )
    }

    /// Square box reaching `radius` pixels out from `center` on every side
    pub fn square_around(center: ScreenPoint, radius: u32) -> Self {
        let side = radius.saturating_mul(2);
        Self::new(
            center.x.saturating_sub(radius as i32),
            center.y.saturating_sub(radius as i32),
            side,
            side,
        )
    }

    /// Check if this region is valid (non-zero dimensions)
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// True when the whole region lies on a display of the given size
    pub fn fits_within(&self, display_width: u32, display_height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x as u64 + self.width as u64 <= display_width as u64
            && self.y as u64 + self.height as u64 <= display_height as u64
    }

    /// Check if this region contains a point
    pub fn contains(&self, point: ScreenPoint) -> bool {
        let (px, py) = (point.x as i64, point.y as i64);
        px >= self.x as i64
            && px < self.x as i64 + self.width as i64
            && py >= self.y as i64
            && py < self.y as i64 + self.height as i64
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.x, self.y, self.width, self.height)
    }
}

/// Owned RGB pixels of one capture, tagged with where they came from.
/// Lives for one detection cycle; clone it rather than sharing it.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSample {
    region: CaptureRegion,
    pixels: RgbImage,
}

impl PixelSample {
    /// Wrap a captured buffer. The buffer must match the region's size.
    pub fn new(region: CaptureRegion, pixels: RgbImage) -> Result<Self, CaptureError> {
        if pixels.width() != region.width || pixels.height() != region.height {
            return Err(CaptureError::DimensionMismatch {
                region,
                actual_width: pixels.width(),
                actual_height: pixels.height(),
            });
        }
        Ok(Self { region, pixels })
    }

    /// Sample anchored at the display origin
    pub fn from_image(pixels: RgbImage) -> Self {
        let region = CaptureRegion::new(0, 0, pixels.width(), pixels.height());
        Self { region, pixels }
    }

    pub fn region(&self) -> CaptureRegion {
        self.region
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.width() as usize * self.pixels.height() as usize
    }

    pub fn to_gray(&self) -> GrayImage {
        image::imageops::grayscale(&self.pixels)
    }

    pub fn into_image(self) -> RgbImage {
        self.pixels
    }
}

/// Captures rectangular regions of the display through a `ScreenSource`
pub struct ScreenSampler<S> {
    source: S,
    display: DisplayInfo,
}

impl<S: ScreenSource> ScreenSampler<S> {
    pub fn new(source: S) -> Self {
        let display = source.display();
        Self { source, display }
    }

    pub fn display(&self) -> &DisplayInfo {
        &self.display
    }

    /// Capture `region`, or the full display when `None`.
    /// Out-of-bounds regions fail with `CaptureError` instead of reaching the backend.
    pub fn capture(&mut self, region: Option<CaptureRegion>) -> Result<PixelSample, CaptureError> {
        let region = region.unwrap_or_else(|| CaptureRegion::full_screen(&self.display));

        if !region.is_valid() {
            return Err(CaptureError::InvalidRegion { region });
        }
        if !region.fits_within(self.display.width, self.display.height) {
            return Err(CaptureError::OutOfBounds {
                region,
                width: self.display.width,
                height: self.display.height,
            });
        }

        let pixels = self.source.grab(&region)?;
        PixelSample::new(region, pixels)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
