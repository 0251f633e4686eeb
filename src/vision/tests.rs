//! Tests for sampling, classification and matching

use crate::platform::{DisplayInfo, PlatformError, PlatformResult, ScreenPoint, ScreenSource};
use crate::vision::{
    BiteCue, BiteDetector, BiteSettings, CaptureError, CaptureRegion, DetectionError,
    DetectionResult, GreenThreshold, HsvRange, PixelSample, ScreenSampler, SplashColor, Template,
    TemplateLibrary, TemplateMatcher, TimingWindowDetector, classify,
};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const GRAY: Rgb<u8> = Rgb([90, 90, 90]);

/// Build a 10-row image where each listed color fills the given number of rows
fn striped(rows: &[(Rgb<u8>, u32)]) -> PixelSample {
    let height: u32 = rows.iter().map(|(_, n)| n).sum();
    let mut image = RgbImage::new(20, height);
    let mut y = 0;
    for (color, count) in rows {
        for _ in 0..*count {
            for x in 0..20 {
                image.put_pixel(x, y, *color);
            }
            y += 1;
        }
    }
    PixelSample::from_image(image)
}

fn noise(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()])
    })
}

struct FlatScreen {
    width: u32,
    height: u32,
    fail: bool,
}

impl ScreenSource for FlatScreen {
    fn display(&self) -> DisplayInfo {
        DisplayInfo {
            name: "flat".to_string(),
            width: self.width,
            height: self.height,
        }
    }

    fn grab(&mut self, region: &CaptureRegion) -> PlatformResult<RgbImage> {
        if self.fail {
            return Err(PlatformError::CaptureFailed {
                description: "denied".to_string(),
            });
        }
        Ok(RgbImage::from_pixel(region.width, region.height, GRAY))
    }
}

// ============================================================
// COLOR CLASSIFIER
// ============================================================

#[test]
fn test_classify_all_in_range_is_one() {
    let sample = striped(&[(GREEN, 10)]);
    assert_eq!(classify(&sample, &HsvRange::GREEN).unwrap(), 1.0);
}

#[test]
fn test_classify_all_out_of_range_is_zero() {
    let sample = striped(&[(GRAY, 10)]);
    assert_eq!(classify(&sample, &HsvRange::GREEN).unwrap(), 0.0);
    assert_eq!(classify(&sample, &HsvRange::BLUE).unwrap(), 0.0);
    assert_eq!(classify(&sample, &HsvRange::WHITE).unwrap(), 0.0);
}

#[test]
fn test_classify_stays_within_unit_interval() {
    let sample = PixelSample::from_image(noise(32, 32, 7));
    for range in [HsvRange::BLUE, HsvRange::WHITE, HsvRange::GREEN] {
        let fraction = classify(&sample, &range).unwrap();
        assert!((0.0..=1.0).contains(&fraction), "fraction {fraction} out of range");
    }
}

#[test]
fn test_classify_is_deterministic() {
    let sample = PixelSample::from_image(noise(16, 16, 3));
    let first = classify(&sample, &HsvRange::BLUE).unwrap();
    let second = classify(&sample.clone(), &HsvRange::BLUE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_classify_empty_sample_is_detection_error() {
    let sample = PixelSample::from_image(RgbImage::new(0, 0));
    assert!(matches!(
        classify(&sample, &HsvRange::GREEN),
        Err(DetectionError::EmptySample)
    ));
}

// ============================================================
// TIMING WINDOW DETECTOR
// ============================================================

fn timing_detector() -> TimingWindowDetector {
    TimingWindowDetector::new(ScreenPoint::new(400, 400), 100, GreenThreshold::default())
}

#[test]
fn test_all_green_is_perfect_timing_without_minigame() {
    let detector = timing_detector();
    let reading = detector.read(&striped(&[(GREEN, 10)])).unwrap();

    assert!(!TimingWindowDetector::is_minigame_active(&reading));
    assert!(detector.is_perfect_timing(&reading));
}

#[test]
fn test_blue_and_white_without_green_is_active_but_not_perfect() {
    let detector = timing_detector();
    let sample = striped(&[(BLUE, 1), (WHITE, 1), (GRAY, 8)]);
    let reading = detector.read(&sample).unwrap();

    assert!((reading.blue - 0.1).abs() < 1e-9);
    assert!((reading.white - 0.1).abs() < 1e-9);
    assert_eq!(reading.green, 0.0);
    assert!(TimingWindowDetector::is_minigame_active(&reading));
    assert!(!detector.is_perfect_timing(&reading));
}

#[test]
fn test_exactly_two_percent_blue_is_not_active() {
    // 2 of 100 rows blue, plenty of white
    let sample = striped(&[(BLUE, 2), (WHITE, 50), (GRAY, 48)]);
    let reading = timing_detector().read(&sample).unwrap();
    assert!((reading.blue - 0.02).abs() < 1e-12);
    assert!(!TimingWindowDetector::is_minigame_active(&reading));
}

#[test]
fn test_timing_region_is_centered_square() {
    assert_eq!(
        timing_detector().region(),
        CaptureRegion::new(300, 300, 200, 200)
    );
}

#[test]
fn test_timing_sample_reports_capture_failure() {
    let mut sampler = ScreenSampler::new(FlatScreen {
        width: 1920,
        height: 1080,
        fail: true,
    });
    assert!(timing_detector().sample(&mut sampler).is_err());
}

// ============================================================
// SCREEN SAMPLER
// ============================================================

#[test]
fn test_sampler_full_display_when_no_region() {
    let mut sampler = ScreenSampler::new(FlatScreen {
        width: 64,
        height: 48,
        fail: false,
    });
    let sample = sampler.capture(None).unwrap();
    assert_eq!((sample.width(), sample.height()), (64, 48));
    assert_eq!(sample.region(), CaptureRegion::new(0, 0, 64, 48));
}

#[test]
fn test_sampler_rejects_out_of_bounds_region() {
    let mut sampler = ScreenSampler::new(FlatScreen {
        width: 640,
        height: 480,
        fail: false,
    });
    let result = sampler.capture(Some(CaptureRegion::square_around(ScreenPoint::new(10, 10), 100)));
    assert!(matches!(result, Err(CaptureError::OutOfBounds { .. })));
}

#[test]
fn test_sampler_rejects_zero_sized_region() {
    let mut sampler = ScreenSampler::new(FlatScreen {
        width: 640,
        height: 480,
        fail: false,
    });
    let result = sampler.capture(Some(CaptureRegion::new(10, 10, 0, 5)));
    assert!(matches!(result, Err(CaptureError::InvalidRegion { .. })));
}

#[test]
fn test_sampler_wraps_platform_failure() {
    let mut sampler = ScreenSampler::new(FlatScreen {
        width: 640,
        height: 480,
        fail: true,
    });
    let result = sampler.capture(Some(CaptureRegion::new(0, 0, 10, 10)));
    match result {
        Err(CaptureError::Platform(e)) => assert!(e.is_capture_failure()),
        other => panic!("expected platform capture failure, got {other:?}"),
    }
}

// ============================================================
// TEMPLATE MATCHER
// ============================================================

#[test]
fn test_template_found_at_screen_coordinates() {
    let image = noise(40, 40, 11);
    let patch = image::imageops::crop_imm(&image, 12, 7, 8, 8).to_image();
    let template = Template::from_image("patch", &patch);

    let region = CaptureRegion::new(100, 50, 40, 40);
    let sample = PixelSample::new(region, image).unwrap();

    match TemplateMatcher::find(&sample, &template, 0.95).unwrap() {
        DetectionResult::Found {
            confidence,
            center,
            bounds,
        } => {
            assert!(confidence > 0.99, "confidence {confidence}");
            assert_eq!(bounds, CaptureRegion::new(112, 57, 8, 8));
            assert_eq!(center, ScreenPoint::new(116, 61));
        }
        other => panic!("expected a match, got {other:?}"),
    }
}

#[test]
fn test_template_not_found_reports_best_score() {
    let sample = PixelSample::from_image(noise(40, 40, 1));
    let checkerboard = RgbImage::from_fn(8, 8, |x, y| if (x + y) % 2 == 0 { WHITE } else { Rgb([0, 0, 0]) });
    let template = Template::from_image("other", &checkerboard);

    let result = TemplateMatcher::find(&sample, &template, 0.99).unwrap();
    assert!(!result.is_found());
    assert!(result.score() < 0.99);
    assert!(result.score() >= 0.0);
}

#[test]
fn test_oversized_template_is_not_found() {
    let sample = PixelSample::from_image(noise(10, 10, 1));
    let template = Template::from_image("big", &noise(20, 20, 2));
    assert_eq!(
        TemplateMatcher::find(&sample, &template, 0.5).unwrap(),
        DetectionResult::NotFound { best_score: 0.0 }
    );
}

#[test]
fn test_empty_template_is_detection_error() {
    let sample = PixelSample::from_image(noise(10, 10, 1));
    let template = Template::from_image("empty", &RgbImage::new(0, 0));
    assert!(matches!(
        TemplateMatcher::find(&sample, &template, 0.5),
        Err(DetectionError::EmptyTemplate { .. })
    ));
}

#[test]
fn test_missing_template_files_are_reported_once_at_load() {
    let library = TemplateLibrary::load_bite_templates("definitely/not/a/template/dir");
    assert!(library.is_empty());
    assert_eq!(library.missing().len(), 4);
}

// ============================================================
// BITE DETECTOR
// ============================================================

#[test]
fn test_bite_motion_cue_after_priming() {
    let settings = BiteSettings {
        motion_sensitivity: Some(20),
        ..BiteSettings::disabled()
    };
    let mut detector = BiteDetector::new(settings, TemplateLibrary::new());

    assert_eq!(detector.check(&striped(&[(GRAY, 10)])).unwrap(), None);
    assert_eq!(
        detector.check(&striped(&[(WHITE, 10)])).unwrap(),
        Some(BiteCue::Motion)
    );
}

#[test]
fn test_bite_splash_cue_on_water() {
    let settings = BiteSettings {
        splash_threshold: Some(0.05),
        ..BiteSettings::disabled()
    };
    let mut detector = BiteDetector::new(settings, TemplateLibrary::new());

    match detector.check(&striped(&[(BLUE, 1), (GRAY, 9)])).unwrap() {
        Some(BiteCue::Splash { color, fraction }) => {
            assert_eq!(color, SplashColor::Water);
            assert!((fraction - 0.1).abs() < 1e-9);
        }
        other => panic!("expected splash cue, got {other:?}"),
    }
}

#[test]
fn test_bite_template_cue() {
    let image = noise(30, 30, 5);
    let patch = image::imageops::crop_imm(&image, 4, 4, 6, 6).to_image();
    let mut library = TemplateLibrary::new();
    library.push(Template::from_image("hook_icon", &patch));

    let settings = BiteSettings {
        template_confidence: Some(0.9),
        ..BiteSettings::disabled()
    };
    let mut detector = BiteDetector::new(settings, library);
    assert!(detector.is_enabled());

    match detector.check(&PixelSample::from_image(image)).unwrap() {
        Some(BiteCue::Template { name, .. }) => assert_eq!(name, "hook_icon"),
        other => panic!("expected template cue, got {other:?}"),
    }
}

#[test]
fn test_bite_detector_disabled() {
    let mut detector = BiteDetector::new(BiteSettings::disabled(), TemplateLibrary::new());
    assert!(!detector.is_enabled());
    assert_eq!(detector.check(&striped(&[(BLUE, 10)])).unwrap(), None);
    assert!(detector.motion().previous().is_none());
}

#[test]
fn test_motion_reference_tracks_latest_sample() {
    let settings = BiteSettings {
        motion_sensitivity: Some(20),
        ..BiteSettings::disabled()
    };
    let mut detector = BiteDetector::new(settings, TemplateLibrary::new());

    let first = striped(&[(GRAY, 10)]);
    let second = striped(&[(GREEN, 10)]);
    detector.check(&first).unwrap();
    assert_eq!(detector.motion().previous(), Some(&first));
    detector.check(&second).unwrap();
    assert_eq!(detector.motion().previous(), Some(&second));

    detector.reset();
    assert!(detector.motion().previous().is_none());
}
