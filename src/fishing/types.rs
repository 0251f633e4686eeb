// States, events and interrupts of the fishing loop
use super::stats::SessionStats;
use crate::vision::BiteCue;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FishingState {
    Idle,
    Casting,
    AwaitingReelMinigame,
    SolvingReelTiming,
    Cooldown,
    Stopped,
    EmergencyStopped,
}

impl FishingState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FishingState::Stopped | FishingState::EmergencyStopped)
    }
}

impl fmt::Display for FishingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FishingState::Idle => "Idle",
            FishingState::Casting => "Casting",
            FishingState::AwaitingReelMinigame => "Awaiting reel minigame",
            FishingState::SolvingReelTiming => "Solving reel timing",
            FishingState::Cooldown => "Cooldown",
            FishingState::Stopped => "Stopped",
            FishingState::EmergencyStopped => "Emergency stopped",
        };
        f.write_str(name)
    }
}

/// Why a phase ended early. Not an error: it maps onto a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Stop,
    Emergency,
}

impl Interrupt {
    pub fn terminal_state(self) -> FishingState {
        match self {
            Interrupt::Stop => FishingState::Stopped,
            Interrupt::Emergency => FishingState::EmergencyStopped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FishingEvent {
    StateChanged { from: FishingState, to: FishingState },
    CastMade { casts_made: u32 },
    MinigameDetected,
    BiteCue { cue: BiteCue },
    NoBite { waited: Duration },
    ReelClicked { attempt: u32 },
    FishCaught { fish_caught: u32 },
    ReelFailed { attempts: u32 },
    BreakStarted { duration: Duration },
    BreakFinished,
    Paused { state: FishingState },
    Resumed { paused_for: Duration },
    Warning { message: String },
    SessionFinished { stats: SessionStats },
}
