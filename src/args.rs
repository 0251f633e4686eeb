use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

pub const DEFAULT_CONFIG_PATH: &str = "fishing_config.ini";
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub const DEFAULT_SCREENSHOT_PATH: &str = "fishing-screenshot.png";

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Fish,
    Screenshot,
    CheckConfig,
    Monitor,
}

#[derive(Debug, PartialEq)]
pub struct Args {
    pub mode: Mode,
    pub debug_mode: bool,
    pub config_path: PathBuf,
    pub template_dir: PathBuf,
    pub max_fish: Option<u32>,
    pub timeout_secs: Option<u64>,
}

/// How the process ends when arguments say not to run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exit {
    Success,
    Failure,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Failure => ExitCode::FAILURE,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help,
    Version,
}

impl Args {
    /// Parse the process arguments. Help and version print and exit cleanly;
    /// a bad argument prints the error and exits with a failure code.
    pub fn parse() -> Result<Self, Exit> {
        Self::resolve(Self::parse_from(env::args().skip(1)))
    }

    fn resolve(parsed: Result<Parsed, String>) -> Result<Self, Exit> {
        match parsed {
            Ok(Parsed::Run(args)) => Ok(args),
            Ok(Parsed::Help) => {
                print_help();
                Err(Exit::Success)
            }
            Ok(Parsed::Version) => {
                println!(
                    "Auto Fish Run v{} (built {})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                Err(Exit::Success)
            }
            Err(message) => {
                eprintln!("❌ {message}");
                print_help();
                Err(Exit::Failure)
            }
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// When `--timeout` expires, counted from `now`. A timeout too large for
    /// the clock never expires.
    pub fn deadline(&self, now: Instant) -> Option<Instant> {
        self.timeout().and_then(|timeout| now.checked_add(timeout))
    }

    pub fn parse_from<I: IntoIterator<Item = String>>(args: I) -> Result<Parsed, String> {
        let mut mode: Option<Mode> = None;
        let mut debug_mode = false;
        let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        let mut template_dir = PathBuf::from(DEFAULT_TEMPLATE_DIR);
        let mut max_fish: Option<u32> = None;
        let mut timeout_secs: Option<u64> = None;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                return Ok(Parsed::Help);
            } else if arg == "--version" || arg == "-v" {
                return Ok(Parsed::Version);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--screenshot" || arg == "-s" {
                mode = Some(Mode::Screenshot);
            } else if arg == "--check-config" {
                mode = Some(Mode::CheckConfig);
            } else if arg == "--monitor" || arg == "-m" {
                mode = Some(Mode::Monitor);
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config_path = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--templates=") {
                template_dir = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--max-fish=") {
                let count = val
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid fish count: {val}"))?;
                max_fish = Some(count);
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                let secs = val
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid timeout value: {val}"))?;
                timeout_secs = Some(secs);
            } else {
                return Err(format!("Unknown argument: {arg}"));
            }
        }

        Ok(Parsed::Run(Args {
            mode: mode.unwrap_or(Mode::Fish),
            debug_mode,
            config_path,
            template_dir,
            max_fish,
            timeout_secs,
        }))
    }
}

fn print_help() {
    println!("🎣 Auto Fish Run");
    println!();
    println!("USAGE:");
    println!("    auto-fish-run [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    (no flags)          Start fishing with {DEFAULT_CONFIG_PATH}");
    println!("    --config=PATH       Settings file to read and update");
    println!("    --templates=DIR     Directory with bite indicator templates (default: {DEFAULT_TEMPLATE_DIR})");
    println!("    --max-fish=N        Stop after N fish (0 = no target)");
    println!("    --timeout=N         Stop fishing or monitoring after N seconds");
    println!("    --screenshot, -s    Save a full-display capture to {DEFAULT_SCREENSHOT_PATH}");
    println!("    --monitor, -m       Log timing window readings every 50ms until F3");
    println!("    --check-config      Print the effective settings and exit");
    println!("    --debug             Enable debug logging");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("HOTKEYS:");
    println!("    F1 start/resume, F2 pause/resume, F3 stop, F4 emergency stop");
    println!();
    println!("EXAMPLES:");
    println!("    auto-fish-run --screenshot");
    println!("    auto-fish-run --monitor --timeout=30");
    println!("    auto-fish-run --config=pond.ini --max-fish=20");
    println!("    auto-fish-run --debug --timeout=600");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Parsed, String> {
        Args::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let Ok(Parsed::Run(args)) = parse(&[]) else {
            panic!("expected run");
        };
        assert_eq!(args.mode, Mode::Fish);
        assert_eq!(args.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(args.max_fish, None);
        assert!(!args.debug_mode);
    }

    #[test]
    fn test_flags() {
        let Ok(Parsed::Run(args)) = parse(&[
            "--debug",
            "--config=pond.ini",
            "--templates=assets",
            "--max-fish=12",
            "--timeout=60",
            "--check-config",
        ]) else {
            panic!("expected run");
        };
        assert_eq!(args.mode, Mode::CheckConfig);
        assert!(args.debug_mode);
        assert_eq!(args.config_path, PathBuf::from("pond.ini"));
        assert_eq!(args.template_dir, PathBuf::from("assets"));
        assert_eq!(args.max_fish, Some(12));
        assert_eq!(args.timeout_secs, Some(60));
    }

    #[test]
    fn test_help_and_version_short_circuit() {
        assert_eq!(parse(&["--debug", "-h"]), Ok(Parsed::Help));
        assert_eq!(parse(&["--version"]), Ok(Parsed::Version));
    }

    #[test]
    fn test_bad_argument_exits_with_failure() {
        assert_eq!(Args::resolve(parse(&["--gui"])), Err(Exit::Failure));
        assert_eq!(Args::resolve(parse(&["--max-fish=lots"])), Err(Exit::Failure));
        assert_eq!(Args::resolve(parse(&["--help"])), Err(Exit::Success));
        assert_eq!(Args::resolve(parse(&["-v"])), Err(Exit::Success));
        assert!(Args::resolve(parse(&["--monitor"])).is_ok());
    }

    #[test]
    fn test_monitor_mode() {
        let Ok(Parsed::Run(args)) = parse(&["--monitor", "--timeout=30"]) else {
            panic!("expected run");
        };
        assert_eq!(args.mode, Mode::Monitor);
        assert_eq!(args.timeout(), Some(Duration::from_secs(30)));
        assert!(matches!(parse(&["-m"]), Ok(Parsed::Run(Args { mode: Mode::Monitor, .. }))));
    }

    #[test]
    fn test_deadline_from_timeout() {
        let now = Instant::now();
        let Ok(Parsed::Run(args)) = parse(&["--timeout=90"]) else {
            panic!("expected run");
        };
        assert_eq!(args.deadline(now), Some(now + Duration::from_secs(90)));

        let Ok(Parsed::Run(args)) = parse(&[]) else {
            panic!("expected run");
        };
        assert_eq!(args.deadline(now), None);
    }

    #[test]
    fn test_huge_timeout_does_not_overflow() {
        let flag = format!("--timeout={}", u64::MAX);
        let Ok(Parsed::Run(args)) = parse(&[flag.as_str()]) else {
            panic!("expected run");
        };
        assert_eq!(args.timeout_secs, Some(u64::MAX));
        assert_eq!(args.deadline(Instant::now()), None);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse(&["--max-fish=lots"]).is_err());
        assert!(parse(&["--timeout=-1"]).is_err());
        assert!(parse(&["--gui"]).is_err());
    }
}
