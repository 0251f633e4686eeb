// Pointer actions with optional position jitter
use crate::platform::{InputDriver, PlatformError, ScreenPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Failed to move pointer to {target}: {source}")]
    Move {
        target: ScreenPoint,
        source: PlatformError,
    },

    #[error("Failed to click at {target}: {source}")]
    Click {
        target: ScreenPoint,
        source: PlatformError,
    },
}

pub struct ActionExecutor<I> {
    input: I,
    rng: StdRng,
    variation: u32,
}

impl<I: InputDriver> ActionExecutor<I> {
    /// `variation` is the jitter radius in pixels on each axis
    pub fn new(input: I, variation: u32, seed: u64) -> Self {
        Self {
            input,
            rng: StdRng::seed_from_u64(seed),
            variation,
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn jittered(&mut self, target: ScreenPoint) -> ScreenPoint {
        if self.variation == 0 {
            return target;
        }
        let spread = self.variation.min(i32::MAX as u32) as i32;
        target.offset(
            self.rng.random_range(-spread..=spread),
            self.rng.random_range(-spread..=spread),
        )
    }

    pub fn click(&mut self, target: ScreenPoint, jitter: bool) -> Result<(), ActionError> {
        let point = if jitter { self.jittered(target) } else { target };
        log::debug!("🖱️ Click at {point} (target {target})");
        self.input
            .move_to(point)
            .map_err(|source| ActionError::Move { target: point, source })?;
        self.input
            .click()
            .map_err(|source| ActionError::Click { target: point, source })
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }
}
