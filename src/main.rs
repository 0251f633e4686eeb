mod args;

use args::{Args, DEFAULT_SCREENSHOT_PATH, Mode};
use auto_fish_run::config::{ConfigStore, FishingConfig};
use auto_fish_run::fishing::{
    ControlToken, FishingEvent, FishingStateMachine, Pacer, SessionStats, StatsAggregator,
    create_event_channel, monitor_timing,
};
use auto_fish_run::hotkeys;
use auto_fish_run::platform::{DesktopInput, DesktopScreen};
use auto_fish_run::vision::{ScreenSampler, TemplateLibrary};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

const OBSERVER_POLL: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(exit) => return exit.into(),
    };

    let default_level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut store = ConfigStore::with_defaults();
    if args.config_path.exists() {
        if let Err(e) = store.load_file(&args.config_path) {
            log::error!("❌ {e}");
            return ExitCode::FAILURE;
        }
        log::info!("⚙️ Loaded settings from {}", args.config_path.display());
    } else {
        log::info!(
            "⚙️ No settings file at {}, using defaults",
            args.config_path.display()
        );
    }

    let mut config = FishingConfig::from_store(&store);
    if let Some(target) = args.max_fish {
        config.session.max_fishing = (target > 0).then_some(target);
    }
    let issues = config.validate();
    for issue in &issues {
        log::warn!("⚠️ {issue}");
    }

    match args.mode {
        Mode::CheckConfig => {
            println!("{config:#?}");
            if issues.is_empty() {
                println!("✅ Settings look good");
            } else {
                println!("⚠️ {} problem(s) found", issues.len());
            }
            ExitCode::SUCCESS
        }
        Mode::Screenshot => save_screenshot(),
        Mode::Monitor => monitor(&args, &config),
        Mode::Fish => fish(&args, store, config),
    }
}

fn runtime() -> Result<Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))
}

fn monitor(args: &Args, config: &FishingConfig) -> ExitCode {
    let screen = match DesktopScreen::primary() {
        Ok(screen) => screen,
        Err(e) => {
            log::error!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    let control = ControlToken::new();
    control.start();
    if let Err(e) = hotkeys::spawn_listener(control.clone()) {
        log::warn!("⚠️ Hotkeys unavailable: {e}");
    }

    let detector = config.timing_detector();
    let mut sampler = ScreenSampler::new(screen);
    println!(
        "🔍 Monitoring timing window {}. F2 pause/resume, F3 stop.",
        detector.region()
    );
    let report = runtime.block_on(monitor_timing(
        &detector,
        &mut sampler,
        &Pacer::new(control),
        args.timeout(),
    ));
    println!(
        "🔍 {} readings: minigame in {}, perfect timing in {}, {} failed captures",
        report.samples, report.minigame_active, report.perfect_timing, report.failures
    );
    ExitCode::SUCCESS
}

fn save_screenshot() -> ExitCode {
    let screen = match DesktopScreen::primary() {
        Ok(screen) => screen,
        Err(e) => {
            log::error!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut sampler = ScreenSampler::new(screen);
    let sample = match sampler.capture(None) {
        Ok(sample) => sample,
        Err(e) => {
            log::error!("❌ Screenshot failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    let (width, height) = (sample.width(), sample.height());
    match sample.into_image().save(DEFAULT_SCREENSHOT_PATH) {
        Ok(()) => {
            println!("✅ Screenshot {width}x{height} saved to {DEFAULT_SCREENSHOT_PATH}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("❌ Write failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn fish(args: &Args, mut store: ConfigStore, config: FishingConfig) -> ExitCode {
    let control = ControlToken::new();
    let (event_tx, mut event_rx) = create_event_channel();
    let mut stats = StatsAggregator::load_from(&store);

    if let Err(e) = hotkeys::spawn_listener(control.clone()) {
        log::warn!("⚠️ Hotkeys unavailable: {e}");
    }

    let worker_control = control.clone();
    let template_dir = args.template_dir.clone();
    let worker = std::thread::Builder::new()
        .name("fishing-worker".to_string())
        .spawn(move || -> Result<Vec<SessionStats>, String> {
            let runtime = runtime()?;
            let screen = DesktopScreen::primary().map_err(|e| e.to_string())?;
            let input = DesktopInput::new().map_err(|e| e.to_string())?;
            let templates = if config.detection.use_template_matching {
                TemplateLibrary::load_bite_templates(&template_dir)
            } else {
                TemplateLibrary::new()
            };
            let mut machine =
                FishingStateMachine::new(config, screen, input, event_tx, worker_control, templates);
            Ok(runtime.block_on(machine.run_until_quit()))
        });
    let worker = match worker {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("❌ Failed to start fishing worker: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("🎣 Fishing started. F1 start/resume, F2 pause/resume, F3 stop, F4 emergency stop.");
    let deadline = args.deadline(Instant::now());
    loop {
        while let Ok(event) = event_rx.try_recv() {
            report(&event);
            stats.observe(&event);
        }
        if worker.is_finished() {
            while let Ok(event) = event_rx.try_recv() {
                report(&event);
                stats.observe(&event);
            }
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) && !control.is_quitting() {
            log::info!("⏱️ Timeout reached, stopping");
            control.quit();
        }
        std::thread::sleep(OBSERVER_POLL);
    }

    let sessions = match worker.join() {
        Ok(Ok(sessions)) => sessions,
        Ok(Err(e)) => {
            log::error!("❌ {e}");
            return ExitCode::FAILURE;
        }
        Err(_) => {
            log::error!("❌ Fishing worker panicked");
            return ExitCode::FAILURE;
        }
    };

    for (n, session) in sessions.iter().enumerate() {
        println!(
            "🐟 Session {}: {} fish from {} casts ({:.0}% success, {:.1} fish/hour)",
            n + 1,
            session.fish_caught,
            session.casts_made,
            session.success_rate() * 100.0,
            session.fish_per_hour()
        );
    }
    let totals = stats.totals();
    println!(
        "📊 All time: {} fish, {} casts, best session {}, {:.1} fish/session",
        totals.total_fish_caught,
        totals.total_casts_made,
        totals.best_session_fish,
        stats.average_fish_per_session()
    );

    stats.store_into(&mut store);
    if let Err(e) = store.save_file(&args.config_path) {
        log::warn!("⚠️ Statistics not saved: {e}");
    }
    ExitCode::SUCCESS
}

fn report(event: &FishingEvent) {
    match event {
        FishingEvent::CastMade { casts_made } => println!("🎣 Cast #{casts_made}"),
        FishingEvent::FishCaught { fish_caught } => println!("🐟 Fish caught! ({fish_caught})"),
        FishingEvent::ReelFailed { attempts } => println!("💨 Got away after {attempts} attempts"),
        FishingEvent::BreakStarted { duration } => {
            println!("☕ Break for {:.0}s", duration.as_secs_f64())
        }
        FishingEvent::Paused { state } => println!("⏸️ Paused while {state}"),
        FishingEvent::Resumed { paused_for } => {
            println!("▶️ Resumed after {:.1}s", paused_for.as_secs_f64())
        }
        FishingEvent::Warning { message } => println!("⚠️ {message}"),
        other => log::debug!("📨 {other:?}"),
    }
}
