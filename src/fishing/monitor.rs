//! Live readout of the timing window for tuning coordinates and thresholds

use super::control::Pacer;
use crate::platform::ScreenSource;
use crate::vision::{ScreenSampler, TimingWindowDetector, VisionError};
use log::{debug, info, warn};
use tokio::time::{Duration, Instant};

/// Interval between readings
pub const MONITOR_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReport {
    pub samples: u32,
    pub minigame_active: u32,
    pub perfect_timing: u32,
    pub failures: u32,
}

/// Sample the timing window every [`MONITOR_POLL`] and log the color fractions
/// until stopped or `limit` elapses. Pausing suspends sampling.
pub async fn monitor_timing<S: ScreenSource>(
    detector: &TimingWindowDetector,
    sampler: &mut ScreenSampler<S>,
    pacer: &Pacer,
    limit: Option<Duration>,
) -> MonitorReport {
    let until = limit.and_then(|limit| Instant::now().checked_add(limit));
    let mut report = MonitorReport::default();

    loop {
        match detector.sample(sampler) {
            Ok(reading) => {
                let active = TimingWindowDetector::is_minigame_active(&reading);
                let perfect = detector.is_perfect_timing(&reading);
                report.samples += 1;
                report.minigame_active += u32::from(active);
                report.perfect_timing += u32::from(perfect);
                info!(
                    "🎯 blue {:5.1}% white {:5.1}% green {:5.1}% | minigame {active} | perfect {perfect}",
                    reading.blue * 100.0,
                    reading.white * 100.0,
                    reading.green * 100.0
                );
            }
            Err(e) => {
                report.failures += 1;
                match e {
                    VisionError::Capture(_) if report.failures > 1 => debug!("📸 {e}"),
                    _ => warn!("📸 {e}"),
                }
            }
        }

        if until.is_some_and(|until| Instant::now() >= until) {
            info!("⏱️ Monitor timeout reached");
            break;
        }
        if let Err(interrupt) = pacer.sleep(MONITOR_POLL).await {
            info!("⏹️ Monitor ended: {interrupt:?}");
            break;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fishing::ControlToken;
    use crate::platform::{DisplayInfo, PlatformResult, ScreenPoint};
    use crate::vision::{CaptureRegion, GreenThreshold};
    use image::{Rgb, RgbImage};
    use tokio::time::sleep;

    /// Vertical blue/white/green stripes, or plain gray
    struct Stripes {
        minigame: bool,
    }

    impl ScreenSource for Stripes {
        fn display(&self) -> DisplayInfo {
            DisplayInfo {
                name: "stripes".to_string(),
                width: 400,
                height: 300,
            }
        }

        fn grab(&mut self, region: &CaptureRegion) -> PlatformResult<RgbImage> {
            let minigame = self.minigame;
            Ok(RgbImage::from_fn(region.width, region.height, |x, _| {
                match (minigame, x % 3) {
                    (false, _) => Rgb([90, 90, 90]),
                    (true, 0) => Rgb([0, 0, 255]),
                    (true, 1) => Rgb([255, 255, 255]),
                    (true, _) => Rgb([0, 255, 0]),
                }
            }))
        }
    }

    fn detector(center: ScreenPoint) -> TimingWindowDetector {
        TimingWindowDetector::new(center, 20, GreenThreshold::from_slider(30))
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_runs_until_timeout() {
        let control = ControlToken::new();
        control.start();
        let pacer = Pacer::new(control);
        let mut sampler = ScreenSampler::new(Stripes { minigame: true });

        let began = Instant::now();
        let report = monitor_timing(
            &detector(ScreenPoint::new(200, 150)),
            &mut sampler,
            &pacer,
            Some(Duration::from_secs(1)),
        )
        .await;

        assert!(began.elapsed() >= Duration::from_secs(1));
        assert!((20..=22).contains(&report.samples), "{report:?}");
        assert_eq!(report.minigame_active, report.samples);
        assert_eq!(report.perfect_timing, report.samples);
        assert_eq!(report.failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_stops_on_stop_request() {
        let control = ControlToken::new();
        control.start();
        let pacer = Pacer::new(control.clone());
        let mut sampler = ScreenSampler::new(Stripes { minigame: false });
        let detector = detector(ScreenPoint::new(200, 150));

        let stopper = async {
            sleep(Duration::from_millis(520)).await;
            control.stop();
        };
        let (report, _) = tokio::join!(monitor_timing(&detector, &mut sampler, &pacer, None), stopper);

        assert!((10..=12).contains(&report.samples), "{report:?}");
        assert_eq!(report.minigame_active, 0);
        assert_eq!(report.perfect_timing, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_counts_capture_failures() {
        let control = ControlToken::new();
        control.start();
        let pacer = Pacer::new(control);
        let mut sampler = ScreenSampler::new(Stripes { minigame: true });

        let report = monitor_timing(
            &detector(ScreenPoint::new(395, 295)),
            &mut sampler,
            &pacer,
            Some(Duration::from_millis(200)),
        )
        .await;

        assert_eq!(report.samples, 0);
        assert!(report.failures >= 4);
    }
}
