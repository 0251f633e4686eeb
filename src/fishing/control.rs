//! Shared run/pause/stop flags and the cancellable timer built on them

use super::types::Interrupt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::{Duration, Instant, sleep};

/// Longest uninterrupted sleep; bounds stop and emergency-stop latency
pub const PACER_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
struct ControlFlags {
    running: AtomicBool,
    paused: AtomicBool,
    emergency_stop: AtomicBool,
    start_requested: AtomicBool,
    quit: AtomicBool,
}

/// Cloneable handle on the flags the controlling side flips and the worker reads
#[derive(Debug, Clone, Default)]
pub struct ControlToken {
    flags: Arc<ControlFlags>,
}

impl ControlToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the token for a fresh run, clearing any earlier stop
    pub fn start(&self) {
        self.flags.start_requested.store(false, Ordering::SeqCst);
        self.flags.emergency_stop.store(false, Ordering::SeqCst);
        self.flags.paused.store(false, Ordering::SeqCst);
        self.flags.running.store(true, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.flags.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.flags.paused.store(false, Ordering::SeqCst);
    }

    /// Returns the new paused value
    pub fn toggle_pause(&self) -> bool {
        !self.flags.paused.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.flags.running.store(false, Ordering::SeqCst);
    }

    pub fn emergency_stop(&self) {
        self.flags.emergency_stop.store(true, Ordering::SeqCst);
        self.flags.running.store(false, Ordering::SeqCst);
    }

    /// Ask an idle worker to begin another run
    pub fn request_start(&self) {
        self.flags.start_requested.store(true, Ordering::SeqCst);
    }

    /// Consumes a pending start request
    pub fn take_start_request(&self) -> bool {
        self.flags.start_requested.swap(false, Ordering::SeqCst)
    }

    /// Stop the current run and tell the worker not to wait for another
    pub fn quit(&self) {
        self.flags.quit.store(true, Ordering::SeqCst);
        self.stop();
    }

    pub fn is_quitting(&self) -> bool {
        self.flags.quit.load(Ordering::SeqCst)
    }

    /// Park an idle worker until a start request arrives. Returns `false`
    /// on quit or emergency stop.
    pub async fn wait_for_start(&self) -> bool {
        loop {
            if self.is_quitting() || self.flags.emergency_stop.load(Ordering::SeqCst) {
                return false;
            }
            if self.take_start_request() {
                return true;
            }
            sleep(PACER_SLICE).await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.flags.running.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }

    /// Emergency wins over a plain stop
    pub fn interrupt(&self) -> Option<Interrupt> {
        if self.flags.emergency_stop.load(Ordering::SeqCst) {
            Some(Interrupt::Emergency)
        } else if !self.is_running() {
            Some(Interrupt::Stop)
        } else {
            None
        }
    }
}

/// Sleeps in short slices and re-checks the control token after every wake
#[derive(Debug, Clone)]
pub struct Pacer {
    control: ControlToken,
}

impl Pacer {
    pub fn new(control: ControlToken) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &ControlToken {
        &self.control
    }

    /// Sleep for `duration` of unpaused time.
    ///
    /// Time spent paused does not count against `duration` and is returned so
    /// callers can push their wall-clock deadlines back by the same amount.
    pub async fn sleep(&self, duration: Duration) -> Result<Duration, Interrupt> {
        self.sleep_with(duration, || {}).await
    }

    /// Like [`Pacer::sleep`], calling `on_pause` once when the pause flag is first seen
    pub async fn sleep_with(
        &self,
        duration: Duration,
        on_pause: impl FnOnce(),
    ) -> Result<Duration, Interrupt> {
        let mut remaining = duration;
        let mut paused_for = Duration::ZERO;
        let mut on_pause = Some(on_pause);
        loop {
            if let Some(interrupt) = self.control.interrupt() {
                return Err(interrupt);
            }
            if self.control.is_paused() {
                if let Some(notify) = on_pause.take() {
                    notify();
                }
                let began = Instant::now();
                sleep(PACER_SLICE).await;
                paused_for += began.elapsed();
                continue;
            }
            if remaining.is_zero() {
                return Ok(paused_for);
            }
            let step = remaining.min(PACER_SLICE);
            sleep(step).await;
            remaining = remaining.saturating_sub(step);
        }
    }
}
