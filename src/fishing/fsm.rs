// Finite state machine driving the cast / wait / reel loop
use super::channels::EventSink;
use super::control::{ControlToken, Pacer};
use super::executor::ActionExecutor;
use super::safety::SafetyScheduler;
use super::session::FishingSession;
use super::stats::SessionStats;
use super::types::{FishingEvent, FishingState, Interrupt};
use crate::config::{FishingConfig, MAX_WAIT};
use crate::platform::{InputDriver, ScreenPoint, ScreenSource};
use crate::vision::{
    BiteCue, BiteDetector, CaptureError, CaptureRegion, DetectionError, ScreenSampler,
    TemplateLibrary, TimingReading, TimingWindowDetector, VisionError,
};
use log::{debug, info, warn};
use tokio::time::{Duration, Instant};

/// Settle time between the cast click and the drop-point click
pub const CAST_SETTLE: Duration = Duration::from_millis(500);
/// Poll interval while waiting for the reel minigame
pub const BITE_POLL: Duration = Duration::from_millis(100);
/// Poll interval while watching the timing window
pub const REEL_POLL: Duration = Duration::from_millis(50);
/// Wait after a reel click before checking whether the minigame ended
pub const REEL_SETTLE: Duration = Duration::from_secs(1);

type Phase = Result<FishingState, Interrupt>;

/// `now + timeout`, capped so the sum cannot overflow the clock
fn deadline_in(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout.min(MAX_WAIT)).unwrap_or(now)
}

/// Push a deadline back by time spent paused
fn extend(deadline: &mut Instant, by: Duration) {
    if let Some(later) = deadline.checked_add(by) {
        *deadline = later;
    }
}

/// Consecutive capture failures for one region. Only the first failure of a
/// streak is reported; recovery logs a single summary line.
#[derive(Debug)]
struct FailureStreak {
    label: &'static str,
    count: u32,
}

impl FailureStreak {
    fn new(label: &'static str) -> Self {
        Self { label, count: 0 }
    }

    /// Returns the message to report when this failure starts a streak
    fn fail(&mut self, err: &CaptureError) -> Option<String> {
        self.count += 1;
        if self.count == 1 {
            let message = format!("Capture of the {} failed, skipping cycles: {err}", self.label);
            warn!("📸 {message}");
            Some(message)
        } else {
            debug!("📸 {} capture still failing ({} cycles)", self.label, self.count);
            None
        }
    }

    fn recover(&mut self) {
        if self.count > 0 {
            info!("📸 {} capture recovered after {} failed cycles", self.label, self.count);
            self.count = 0;
        }
    }
}

pub struct FishingStateMachine<S, I, E> {
    config: FishingConfig,
    sampler: ScreenSampler<S>,
    executor: ActionExecutor<I>,
    events: E,
    control: ControlToken,
    pacer: Pacer,
    safety: SafetyScheduler,
    timing: TimingWindowDetector,
    bite: BiteDetector,
    fishing_region: CaptureRegion,
    session: FishingSession,
    state: FishingState,
    timing_failures: FailureStreak,
    bite_failures: FailureStreak,
}

impl<S: ScreenSource, I: InputDriver, E: EventSink> FishingStateMachine<S, I, E> {
    pub fn new(
        config: FishingConfig,
        source: S,
        input: I,
        events: E,
        control: ControlToken,
        templates: TemplateLibrary,
    ) -> Self {
        let seed: u64 = rand::random();
        let sampler = ScreenSampler::new(source);
        let executor = ActionExecutor::new(input, config.click_variation(), seed);
        let safety = SafetyScheduler::new(&config, seed.wrapping_add(1));
        let bite = BiteDetector::new(config.bite_settings(), templates);
        let display = sampler.display();
        info!(
            "🖥️ Fishing on display '{}' ({}x{})",
            display.name, display.width, display.height
        );

        Self {
            timing: config.timing_detector(),
            fishing_region: config.fishing_region(),
            pacer: Pacer::new(control.clone()),
            config,
            sampler,
            executor,
            events,
            control,
            safety,
            bite,
            session: FishingSession::start(),
            state: FishingState::Idle,
            timing_failures: FailureStreak::new("timing window"),
            bite_failures: FailureStreak::new("fishing region"),
        }
    }

    /// Replace the random sources with seeded ones
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.executor.reseed(seed);
        self.safety = SafetyScheduler::new(&self.config, seed.wrapping_add(1));
        self
    }

    pub fn state(&self) -> FishingState {
        self.state
    }

    pub fn session(&self) -> &FishingSession {
        &self.session
    }

    pub fn config(&self) -> &FishingConfig {
        &self.config
    }

    pub fn control(&self) -> &ControlToken {
        &self.control
    }

    pub fn bite_detector(&self) -> &BiteDetector {
        &self.bite
    }

    pub fn sampler(&self) -> &ScreenSampler<S> {
        &self.sampler
    }

    pub fn executor(&self) -> &ActionExecutor<I> {
        &self.executor
    }

    /// Back to `Idle` with a fresh session and no motion history
    pub fn reset(&mut self) {
        self.session = FishingSession::start();
        self.bite.reset();
        self.timing_failures = FailureStreak::new("timing window");
        self.bite_failures = FailureStreak::new("fishing region");
        self.state = FishingState::Idle;
    }

    /// Run one session until stopped, emergency stopped or a limit is reached
    pub async fn run(&mut self) -> SessionStats {
        self.reset();
        self.control.start();
        info!("🎣 Fishing session started");
        self.transition(FishingState::Casting);

        while !self.state.is_terminal() {
            let phase = match self.state {
                FishingState::Idle => Ok(FishingState::Casting),
                FishingState::Casting => self.cast().await,
                FishingState::AwaitingReelMinigame => self.await_minigame().await,
                FishingState::SolvingReelTiming => self.solve_reel().await,
                FishingState::Cooldown => self.cooldown().await,
                FishingState::Stopped | FishingState::EmergencyStopped => break,
            };
            let next = phase.unwrap_or_else(Interrupt::terminal_state);
            self.transition(next);
        }

        let stats = self.session.stats();
        info!(
            "🏁 Session ended ({}): {} fish from {} casts in {:.1} min",
            self.state,
            stats.fish_caught,
            stats.casts_made,
            stats.elapsed.as_secs_f64() / 60.0
        );
        self.events.emit(FishingEvent::SessionFinished { stats });
        stats
    }

    /// Run sessions back to back. After a plain stop the worker idles until a
    /// start request; a natural end, an emergency stop or a quit ends the loop.
    pub async fn run_until_quit(&mut self) -> Vec<SessionStats> {
        let mut sessions = Vec::new();
        loop {
            sessions.push(self.run().await);
            let stopped_by_operator = self.state == FishingState::Stopped && !self.control.is_running();
            if !stopped_by_operator || self.control.is_quitting() {
                break;
            }
            info!("⏹️ Stopped, press F1 to fish again");
            if !self.control.wait_for_start().await {
                break;
            }
        }
        sessions
    }

    fn transition(&mut self, to: FishingState) {
        if self.state != to {
            let from = self.state;
            info!("🎮 Fishing state: {from} -> {to}");
            self.state = to;
            self.events.emit(FishingEvent::StateChanged { from, to });
        }
    }

    fn warning(&self, message: String) {
        self.events.emit(FishingEvent::Warning { message });
    }

    /// Interruptible wait; reports the pause and the resume when part of it was spent paused
    async fn wait(&mut self, duration: Duration) -> Result<Duration, Interrupt> {
        let state = self.state;
        let events = &self.events;
        let paused_for = self
            .pacer
            .sleep_with(duration, || {
                info!("⏸️ Paused while {state}");
                events.emit(FishingEvent::Paused { state });
            })
            .await?;
        if !paused_for.is_zero() {
            info!("▶️ Resumed after {:.1}s paused", paused_for.as_secs_f64());
            self.events.emit(FishingEvent::Resumed { paused_for });
        }
        Ok(paused_for)
    }

    fn click(&mut self, target: ScreenPoint, jitter: bool) {
        if let Err(e) = self.executor.click(target, jitter) {
            warn!("🖱️ {e}");
            self.warning(e.to_string());
        }
    }

    /// `Ok(None)` when the capture failed; the cycle is simply skipped
    fn read_timing(&mut self) -> Result<Option<TimingReading>, DetectionError> {
        match self.timing.sample(&mut self.sampler) {
            Ok(reading) => {
                self.timing_failures.recover();
                debug!(
                    "🎯 blue {:.3} white {:.3} green {:.3}",
                    reading.blue, reading.white, reading.green
                );
                Ok(Some(reading))
            }
            Err(VisionError::Capture(e)) => {
                if let Some(message) = self.timing_failures.fail(&e) {
                    self.warning(message);
                }
                Ok(None)
            }
            Err(VisionError::Detection(e)) => Err(e),
        }
    }

    /// Log a detection failure and wait out the backoff
    pub(super) async fn detection_backoff(&mut self, err: DetectionError) -> Result<Duration, Interrupt> {
        let backoff = self.config.detection_backoff();
        warn!("🔍 Detection failed, retrying in {:.1}s: {err}", backoff.as_secs_f64());
        self.warning(err.to_string());
        self.wait(backoff).await
    }

    fn check_bite(&mut self) -> Option<BiteCue> {
        let sample = match self.sampler.capture(Some(self.fishing_region)) {
            Ok(sample) => {
                self.bite_failures.recover();
                sample
            }
            Err(e) => {
                if let Some(message) = self.bite_failures.fail(&e) {
                    self.warning(message);
                }
                return None;
            }
        };
        match self.bite.check(&sample) {
            Ok(cue) => cue,
            Err(e) => {
                debug!("🐟 Bite check skipped: {e}");
                None
            }
        }
    }

    async fn cast(&mut self) -> Phase {
        self.wait(Duration::ZERO).await?;
        self.click(self.config.coordinates.cast_button, false);
        let casts_made = self.session.record_cast();
        info!("🎣 Cast #{casts_made}");
        self.events.emit(FishingEvent::CastMade { casts_made });

        self.wait(CAST_SETTLE).await?;
        self.click(self.config.coordinates.fishing_area, true);
        Ok(FishingState::AwaitingReelMinigame)
    }

    async fn await_minigame(&mut self) -> Phase {
        let timeout = self.config.bite_timeout();
        let started = Instant::now();
        let mut deadline = deadline_in(timeout);
        let mut paused_total = Duration::ZERO;
        let mut cue_reported = false;
        self.bite.reset();

        loop {
            match self.read_timing() {
                Ok(Some(reading)) if TimingWindowDetector::is_minigame_active(&reading) => {
                    info!("🎯 Reel minigame detected");
                    self.events.emit(FishingEvent::MinigameDetected);
                    return Ok(FishingState::SolvingReelTiming);
                }
                Ok(_) => {}
                Err(e) => {
                    let paused_for = self.detection_backoff(e).await?;
                    extend(&mut deadline, paused_for);
                    paused_total += paused_for;
                    continue;
                }
            }

            if !cue_reported && self.bite.is_enabled() {
                if let Some(cue) = self.check_bite() {
                    info!("🐟 Bite cue: {cue:?}");
                    self.events.emit(FishingEvent::BiteCue { cue });
                    cue_reported = true;
                }
            }

            if Instant::now() >= deadline {
                let waited = started.elapsed().saturating_sub(paused_total);
                info!("🌊 No bite after {:.1}s, recasting", waited.as_secs_f64());
                self.events.emit(FishingEvent::NoBite { waited });
                return Ok(FishingState::Casting);
            }

            let paused_for = self.wait(BITE_POLL).await?;
            extend(&mut deadline, paused_for);
            paused_total += paused_for;
        }
    }

    async fn solve_reel(&mut self) -> Phase {
        let reel_button = self.config.coordinates.reel_button;
        let max_attempts = self.config.timing.reel_max_attempts;
        let mut deadline = deadline_in(self.config.reel_timeout());
        let mut attempts = 0u32;

        while attempts < max_attempts && Instant::now() < deadline {
            attempts += 1;
            match self.read_timing() {
                Ok(Some(reading)) if self.timing.is_perfect_timing(&reading) => {
                    let delay = self.safety.reel_delay();
                    debug!("🎯 Timing window open, reeling in {:.2}s", delay.as_secs_f64());
                    extend(&mut deadline, self.wait(delay).await?);
                    self.click(reel_button, false);
                    self.events.emit(FishingEvent::ReelClicked { attempt: attempts });

                    extend(&mut deadline, self.wait(REEL_SETTLE).await?);
                    match self.read_timing() {
                        Ok(Some(after)) if !TimingWindowDetector::is_minigame_active(&after) => {
                            let fish_caught = self.session.record_fish();
                            info!("🐟 Fish caught! ({fish_caught} this session)");
                            self.events.emit(FishingEvent::FishCaught { fish_caught });
                            return Ok(FishingState::Cooldown);
                        }
                        Ok(Some(_)) => debug!("🎯 Minigame still running, retrying"),
                        Ok(None) => {}
                        Err(e) => {
                            extend(&mut deadline, self.detection_backoff(e).await?);
                            continue;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    extend(&mut deadline, self.detection_backoff(e).await?);
                    continue;
                }
            }
            extend(&mut deadline, self.wait(REEL_POLL).await?);
        }

        warn!("🎯 Reel failed after {attempts} attempts");
        self.events.emit(FishingEvent::ReelFailed { attempts });
        Ok(FishingState::Cooldown)
    }

    async fn cooldown(&mut self) -> Phase {
        if self.session.target_reached(self.config.session.max_fishing) {
            info!("🏁 Catch target of {} reached", self.session.fish_caught());
            return Ok(FishingState::Stopped);
        }
        if let Some(limit) = self.config.max_session() {
            if self.session.elapsed() >= limit {
                info!("🏁 Session time limit of {:.1}h reached", limit.as_secs_f64() / 3600.0);
                return Ok(FishingState::Stopped);
            }
        }

        if self.safety.should_take_break(self.session.last_break_at()) {
            let duration = self.safety.break_duration();
            info!("☕ Taking a {:.0}s break", duration.as_secs_f64());
            self.events.emit(FishingEvent::BreakStarted { duration });
            self.wait(duration).await?;
            self.session.record_break();
            info!("☕ Break finished");
            self.events.emit(FishingEvent::BreakFinished);
        }

        let delay = self.safety.next_cast_delay();
        debug!("⏱️ Next cast in {:.2}s", delay.as_secs_f64());
        self.wait(delay).await?;
        Ok(FishingState::Casting)
    }
}
