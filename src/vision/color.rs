//! Hue-saturation-value classification of pixel samples.
//!
//! Uses the 8-bit convention common to game-automation tooling: hue in
//! `0..=179` (degrees halved), saturation and value in `0..=255`.

use super::error::DetectionError;
use super::sample::PixelSample;
use serde::{Deserialize, Serialize};

/// Inclusive HSV box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    /// Dotted blue target circle (also open water)
    pub const BLUE: HsvRange = HsvRange::new([100, 50, 50], [130, 255, 255]);
    /// Shrinking white circle / splash foam, any hue
    pub const WHITE: HsvRange = HsvRange::new([0, 0, 200], [180, 30, 255]);
    /// Timing indicator turning green
    pub const GREEN: HsvRange = HsvRange::new([35, 50, 50], [85, 255, 255]);

    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

/// Convert one RGB pixel to 8-bit HSV
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 {
        (delta * 255.0 / max).round()
    } else {
        0.0
    };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }
    let mut h = (h / 2.0).round();
    if h >= 180.0 {
        h -= 180.0;
    }

    [h as u8, s as u8, max as u8]
}

/// A sample converted to HSV once, so several ranges can be tested against it
#[derive(Debug, Clone)]
pub struct HsvFrame {
    pixels: Vec<[u8; 3]>,
}

impl HsvFrame {
    pub fn from_sample(sample: &PixelSample) -> Self {
        let pixels = sample.pixels().pixels().map(|p| rgb_to_hsv(p.0)).collect();
        Self { pixels }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Fraction of pixels inside `range`, in `[0, 1]`
    pub fn fraction(&self, range: &HsvRange) -> Result<f64, DetectionError> {
        if self.pixels.is_empty() {
            return Err(DetectionError::EmptySample);
        }
        let inside = self.pixels.iter().filter(|hsv| range.contains(**hsv)).count();
        Ok(inside as f64 / self.pixels.len() as f64)
    }
}

/// Masked pixel count over total pixel count for a single range
pub fn classify(sample: &PixelSample, range: &HsvRange) -> Result<f64, DetectionError> {
    HsvFrame::from_sample(sample).fraction(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
    }

    #[test]
    fn test_achromatic_pixels() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn test_hue_wraps_below_180() {
        // Magenta-red just below 360 degrees must not produce hue 180
        let [h, _, _] = rgb_to_hsv([255, 0, 1]);
        assert!(h < 180);
    }

    #[test]
    fn test_named_ranges_do_not_overlap_on_pure_colors() {
        let blue = rgb_to_hsv([0, 0, 255]);
        let white = rgb_to_hsv([255, 255, 255]);
        let green = rgb_to_hsv([0, 255, 0]);

        assert!(HsvRange::BLUE.contains(blue));
        assert!(!HsvRange::WHITE.contains(blue));
        assert!(!HsvRange::GREEN.contains(blue));

        assert!(HsvRange::WHITE.contains(white));
        assert!(!HsvRange::BLUE.contains(white));

        assert!(HsvRange::GREEN.contains(green));
        assert!(!HsvRange::BLUE.contains(green));
    }
}
