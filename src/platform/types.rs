// Core platform types and traits
use super::error::PlatformResult;
use crate::vision::CaptureRegion;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute screen coordinate in display pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

// Trait for anything that can hand out pixels of the display.
// Implementations return exactly `region.width x region.height` pixels; the
// sampler checks bounds before calling `grab`.
pub trait ScreenSource {
    fn display(&self) -> DisplayInfo;
    fn grab(&mut self, region: &CaptureRegion) -> PlatformResult<RgbImage>;
}

// Trait for synthetic pointer input
pub trait InputDriver {
    fn move_to(&mut self, point: ScreenPoint) -> PlatformResult<()>;
    fn click(&mut self) -> PlatformResult<()>;
}

impl<S: ScreenSource + ?Sized> ScreenSource for Box<S> {
    fn display(&self) -> DisplayInfo {
        (**self).display()
    }

    fn grab(&mut self, region: &CaptureRegion) -> PlatformResult<RgbImage> {
        (**self).grab(region)
    }
}

impl<I: InputDriver + ?Sized> InputDriver for Box<I> {
    fn move_to(&mut self, point: ScreenPoint) -> PlatformResult<()> {
        (**self).move_to(point)
    }

    fn click(&mut self) -> PlatformResult<()> {
        (**self).click()
    }
}
