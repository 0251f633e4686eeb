//! Template loading and normalized cross-correlation matching

use super::error::{DetectionError, TemplateError};
use super::sample::{CaptureRegion, PixelSample};
use crate::platform::ScreenPoint;
use image::{GrayImage, RgbImage};
use imageproc::template_matching::{MatchTemplateMethod, match_template};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Bite indicator images looked up in the template directory
pub const BITE_TEMPLATE_FILES: [&str; 4] = [
    "bite_indicator.png",
    "bobber_splash.png",
    "hook_icon.png",
    "exclamation.png",
];

#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    path: Option<PathBuf>,
    gray: GrayImage,
}

impl Template {
    /// Load a template image from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| TemplateError::Missing {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            gray: image.to_luma8(),
        })
    }

    pub fn from_image(name: impl Into<String>, image: &RgbImage) -> Self {
        Self {
            name: name.into(),
            path: None,
            gray: image::imageops::grayscale(image),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }
}

/// Outcome of one template search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DetectionResult {
    NotFound {
        best_score: f32,
    },
    Found {
        confidence: f32,
        center: ScreenPoint,
        bounds: CaptureRegion,
    },
}

impl DetectionResult {
    pub fn is_found(&self) -> bool {
        matches!(self, DetectionResult::Found { .. })
    }

    /// Best score observed, whether or not it cleared the bar
    pub fn score(&self) -> f32 {
        match self {
            DetectionResult::NotFound { best_score } => *best_score,
            DetectionResult::Found { confidence, .. } => *confidence,
        }
    }
}

/// Normalized cross-correlation search over grayscale pixels
pub struct TemplateMatcher;

impl TemplateMatcher {
    /// Find `template` inside `sample`. Coordinates in the result are screen
    /// coordinates (the sample's region origin is added back).
    pub fn find(
        sample: &PixelSample,
        template: &Template,
        min_confidence: f32,
    ) -> Result<DetectionResult, DetectionError> {
        if template.width() == 0 || template.height() == 0 {
            return Err(DetectionError::EmptyTemplate {
                name: template.name.clone(),
            });
        }
        if sample.pixel_count() == 0 {
            return Err(DetectionError::EmptySample);
        }

        // Template larger than the searched area cannot match anywhere
        if template.width() > sample.width() || template.height() > sample.height() {
            log::debug!(
                "⚠️ Skipping template '{}' - too large for region: {}x{} > {}x{}",
                template.name,
                template.width(),
                template.height(),
                sample.width(),
                sample.height()
            );
            return Ok(DetectionResult::NotFound { best_score: 0.0 });
        }

        let gray = sample.to_gray();
        let scores = match_template(
            &gray,
            &template.gray,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );

        // Flat black windows give 0/0; skip them and fail only if nothing is usable
        let mut best: Option<(u32, u32, f32)> = None;
        for (x, y, pixel) in scores.enumerate_pixels() {
            let score = pixel[0];
            if score.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, _, top)| score > top) {
                best = Some((x, y, score));
            }
        }

        let (best_x, best_y, best_score) = best.ok_or_else(|| DetectionError::InvalidScore {
            name: template.name.clone(),
        })?;
        let best_score = best_score.clamp(0.0, 1.0);

        if best_score < min_confidence {
            return Ok(DetectionResult::NotFound { best_score });
        }

        let origin = sample.region();
        let bounds = CaptureRegion::new(
            origin.x + best_x as i32,
            origin.y + best_y as i32,
            template.width(),
            template.height(),
        );
        let center = ScreenPoint::new(
            bounds.x + (template.width() / 2) as i32,
            bounds.y + (template.height() / 2) as i32,
        );

        Ok(DetectionResult::Found {
            confidence: best_score,
            center,
            bounds,
        })
    }
}

/// Set of templates loaded once per session. Files that fail to load are
/// reported once here and simply absent from matching afterwards.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
    missing: Vec<PathBuf>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the known bite indicator files from `directory`
    pub fn load_bite_templates(directory: impl AsRef<Path>) -> Self {
        let directory = directory.as_ref();
        let mut library = Self::new();

        for file_name in BITE_TEMPLATE_FILES {
            let path = directory.join(file_name);
            match Template::load(&path) {
                Ok(template) => {
                    log::debug!(
                        "✅ Loaded template '{}' ({}x{})",
                        template.name(),
                        template.width(),
                        template.height()
                    );
                    library.push(template);
                }
                Err(e) => {
                    log::warn!("⚠️ {e}");
                    library.missing.push(path);
                }
            }
        }

        log::info!(
            "🧩 {} bite template(s) loaded from {}",
            library.len(),
            directory.display()
        );
        library
    }

    pub fn push(&mut self, template: Template) {
        self.templates.push(template);
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn missing(&self) -> &[PathBuf] {
        &self.missing
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
