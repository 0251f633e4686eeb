pub mod config;
pub mod fishing;
pub mod hotkeys;
pub mod platform;
pub mod vision;

pub use config::{ConfigStore, FishingConfig};
pub use fishing::{ControlToken, FishingEvent, FishingState, FishingStateMachine, StatsAggregator};
