//! Settings for the fishing loop
//!
//! `ConfigStore` is the sectioned key/value table shared with whatever owns
//! the settings file; `FishingConfig` is the typed, immutable snapshot the
//! state machine consumes for one run.

pub mod error;
pub mod settings;
pub mod store;

pub use error::ConfigError;
pub use settings::{
    ConfigIssue, Coordinates, DetectionSettings, FishingConfig, MAX_WAIT, SafetySettings,
    SessionSettings, TimingSettings, seconds,
};
pub use store::ConfigStore;
