//! Frame-to-frame motion estimate

use super::sample::PixelSample;

/// Share of changed pixels above which a frame counts as moving
pub const MOTION_FRACTION_BAR: f64 = 0.05;

/// Compares each sample against the one seen on the previous call.
/// One instance per watched region; never shared between threads.
#[derive(Debug, Default)]
pub struct MotionDetector {
    previous: Option<PixelSample>,
}

impl MotionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true iff more than 5% of pixels changed by more than `sensitivity`
    /// gray levels since the previous call. The first call (or a call after a
    /// size change) only primes the detector and returns false. The stored frame
    /// is always replaced by `sample`.
    pub fn detect(&mut self, sample: &PixelSample, sensitivity: u8) -> bool {
        let moved = match self.previous.as_ref() {
            Some(previous)
                if previous.width() == sample.width() && previous.height() == sample.height() =>
            {
                changed_fraction(previous, sample, sensitivity) > MOTION_FRACTION_BAR
            }
            Some(_) => {
                log::debug!("🔄 Motion reference size changed, re-priming");
                false
            }
            None => false,
        };

        self.previous = Some(sample.clone());
        moved
    }

    pub fn previous(&self) -> Option<&PixelSample> {
        self.previous.as_ref()
    }

    /// Forget the reference frame (new session)
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

fn changed_fraction(previous: &PixelSample, current: &PixelSample, sensitivity: u8) -> f64 {
    let before = previous.to_gray();
    let after = current.to_gray();

    let total = after.width() as usize * after.height() as usize;
    if total == 0 {
        return 0.0;
    }

    let changed = before
        .pixels()
        .zip(after.pixels())
        .filter(|(a, b)| a.0[0].abs_diff(b.0[0]) > sensitivity)
        .count();

    changed as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn flat(width: u32, height: u32, value: u8) -> PixelSample {
        PixelSample::from_image(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    #[test]
    fn test_first_call_primes_only() {
        let mut detector = MotionDetector::new();
        assert!(!detector.detect(&flat(10, 10, 0), 20));
        assert!(detector.previous().is_some());
    }

    #[test]
    fn test_detects_large_change() {
        let mut detector = MotionDetector::new();
        detector.detect(&flat(10, 10, 0), 20);
        assert!(detector.detect(&flat(10, 10, 200), 20));
    }

    #[test]
    fn test_change_below_sensitivity_is_ignored() {
        let mut detector = MotionDetector::new();
        detector.detect(&flat(10, 10, 100), 20);
        assert!(!detector.detect(&flat(10, 10, 115), 20));
    }

    #[test]
    fn test_exactly_five_percent_is_not_motion() {
        let mut detector = MotionDetector::new();
        detector.detect(&flat(10, 10, 0), 20);

        // 5 of 100 pixels change: not strictly above the bar
        let mut image = RgbImage::from_pixel(10, 10, Rgb([0; 3]));
        for x in 0..5 {
            image.put_pixel(x, 0, Rgb([255; 3]));
        }
        assert!(!detector.detect(&PixelSample::from_image(image), 20));
    }

    #[test]
    fn test_size_change_reprimes() {
        let mut detector = MotionDetector::new();
        detector.detect(&flat(10, 10, 0), 20);
        assert!(!detector.detect(&flat(20, 20, 255), 20));
        assert_eq!(detector.previous().map(|p| p.width()), Some(20));
    }

    #[test]
    fn test_reset_clears_reference() {
        let mut detector = MotionDetector::new();
        detector.detect(&flat(10, 10, 0), 20);
        detector.reset();
        assert!(detector.previous().is_none());
        assert!(!detector.detect(&flat(10, 10, 255), 20));
    }
}
