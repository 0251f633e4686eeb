//! Fishing automation module
//!
//! One worker owns the state machine, the screen sampler and the input
//! executor. The controlling side only ever touches a `ControlToken` and the
//! receiving end of the event channel.

pub mod channels;
pub mod control;
pub mod executor;
pub mod fsm;
pub mod monitor;
pub mod safety;
pub mod session;
pub mod stats;
pub mod types;


// Re-export main types
pub use channels::{EventSink, create_event_channel};
pub use control::{ControlToken, PACER_SLICE, Pacer};
pub use executor::{ActionError, ActionExecutor};
pub use fsm::{BITE_POLL, CAST_SETTLE, FishingStateMachine, REEL_POLL, REEL_SETTLE};
pub use monitor::{MONITOR_POLL, MonitorReport, monitor_timing};
pub use safety::SafetyScheduler;
pub use session::FishingSession;
pub use stats::{CumulativeStats, SessionStats, StatsAggregator};
pub use types::{FishingEvent, FishingState, Interrupt};
