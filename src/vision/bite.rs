//! Advisory bite cues on the fishing region: bobber motion, splash colors and
//! bite indicator templates. The reel minigame detector stays authoritative;
//! these only tell the observer that something happened at the bobber.

use super::color::{HsvFrame, HsvRange};
use super::error::DetectionError;
use super::motion::MotionDetector;
use super::sample::PixelSample;
use super::template::{DetectionResult, TemplateLibrary, TemplateMatcher};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SplashColor {
    Water,
    Foam,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BiteCue {
    Motion,
    Splash { color: SplashColor, fraction: f64 },
    Template { name: String, confidence: f32 },
}

/// Which cue sources run, and their thresholds. `None` disables a source.
#[derive(Debug, Clone, PartialEq)]
pub struct BiteSettings {
    pub motion_sensitivity: Option<u8>,
    pub splash_threshold: Option<f64>,
    pub template_confidence: Option<f32>,
}

impl BiteSettings {
    pub fn disabled() -> Self {
        Self {
            motion_sensitivity: None,
            splash_threshold: None,
            template_confidence: None,
        }
    }
}

pub struct BiteDetector {
    settings: BiteSettings,
    motion: MotionDetector,
    templates: TemplateLibrary,
}

impl BiteDetector {
    pub fn new(settings: BiteSettings, templates: TemplateLibrary) -> Self {
        Self {
            settings,
            motion: MotionDetector::new(),
            templates,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.motion_sensitivity.is_some()
            || self.settings.splash_threshold.is_some()
            || (self.settings.template_confidence.is_some() && !self.templates.is_empty())
    }

    /// Check one fishing-region sample. Motion is always evaluated first so the
    /// stored reference frame never goes stale.
    pub fn check(&mut self, sample: &PixelSample) -> Result<Option<BiteCue>, DetectionError> {
        let moved = match self.settings.motion_sensitivity {
            Some(sensitivity) => self.motion.detect(sample, sensitivity),
            None => false,
        };
        if moved {
            return Ok(Some(BiteCue::Motion));
        }

        if let Some(threshold) = self.settings.splash_threshold {
            let frame = HsvFrame::from_sample(sample);
            for (color, range) in [
                (SplashColor::Water, HsvRange::BLUE),
                (SplashColor::Foam, HsvRange::WHITE),
            ] {
                let fraction = frame.fraction(&range)?;
                if fraction >= threshold {
                    return Ok(Some(BiteCue::Splash { color, fraction }));
                }
            }
        }

        if let Some(min_confidence) = self.settings.template_confidence {
            for template in self.templates.templates() {
                if let DetectionResult::Found { confidence, .. } =
                    TemplateMatcher::find(sample, template, min_confidence)?
                {
                    return Ok(Some(BiteCue::Template {
                        name: template.name().to_string(),
                        confidence,
                    }));
                }
            }
        }

        Ok(None)
    }

    pub fn motion(&self) -> &MotionDetector {
        &self.motion
    }

    /// Drop per-session state (motion reference frame)
    pub fn reset(&mut self) {
        self.motion.reset();
    }
}
