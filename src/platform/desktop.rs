//! Desktop backends: `xcap` for display capture, `enigo` for mouse input.
//!
//! Both handles are created on the worker thread that uses them; neither is
//! required to be `Send`.

use super::error::{PlatformError, PlatformResult};
use super::types::{DisplayInfo, InputDriver, ScreenPoint, ScreenSource};
use crate::vision::CaptureRegion;
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use image::{DynamicImage, RgbImage};
use xcap::Monitor;

/// Captures the primary monitor
pub struct DesktopScreen {
    monitor: Monitor,
    info: DisplayInfo,
    capture_count: u64,
}

impl DesktopScreen {
    pub fn primary() -> PlatformResult<Self> {
        let monitors = Monitor::all().map_err(|e| PlatformError::DisplayEnumerationFailed {
            description: e.to_string(),
        })?;

        let monitor = match monitors.iter().position(|m| m.is_primary()) {
            Some(idx) => monitors.into_iter().nth(idx),
            None => monitors.into_iter().next(),
        }
        .ok_or(PlatformError::NoDisplay)?;

        let info = DisplayInfo {
            name: monitor.name().to_string(),
            width: monitor.width(),
            height: monitor.height(),
        };
        log::info!(
            "🖥️ Capturing display '{}' ({}x{})",
            info.name,
            info.width,
            info.height
        );

        Ok(Self {
            monitor,
            info,
            capture_count: 0,
        })
    }

    pub fn capture_count(&self) -> u64 {
        self.capture_count
    }
}

impl ScreenSource for DesktopScreen {
    fn display(&self) -> DisplayInfo {
        self.info.clone()
    }

    fn grab(&mut self, region: &CaptureRegion) -> PlatformResult<RgbImage> {
        let start = std::time::Instant::now();
        let frame = self
            .monitor
            .capture_image()
            .map_err(|e| PlatformError::CaptureFailed {
                description: e.to_string(),
            })?;
        self.capture_count += 1;

        let (x, y) = (region.x.max(0) as u32, region.y.max(0) as u32);
        if x + region.width > frame.width() || y + region.height > frame.height() {
            return Err(PlatformError::CaptureFailed {
                description: format!(
                    "frame {}x{} is smaller than requested region {}",
                    frame.width(),
                    frame.height(),
                    region
                ),
            });
        }

        let cropped = image::imageops::crop_imm(&frame, x, y, region.width, region.height).to_image();
        log::trace!(
            "📸 Capture #{} of {} took {}ms",
            self.capture_count,
            region,
            start.elapsed().as_millis()
        );
        Ok(DynamicImage::ImageRgba8(cropped).to_rgb8())
    }
}

/// Moves the real pointer and clicks the left button
pub struct DesktopInput {
    enigo: Enigo,
}

impl DesktopInput {
    pub fn new() -> PlatformResult<Self> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| PlatformError::InputInitFailed {
                description: e.to_string(),
            })?;
        Ok(Self { enigo })
    }
}

impl InputDriver for DesktopInput {
    fn move_to(&mut self, point: ScreenPoint) -> PlatformResult<()> {
        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| PlatformError::PointerMoveFailed {
                x: point.x,
                y: point.y,
                description: e.to_string(),
            })
    }

    fn click(&mut self) -> PlatformResult<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| PlatformError::ClickFailed {
                description: e.to_string(),
            })
    }
}
