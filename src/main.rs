use crossterm::event::{self, DisableFocusChange, EnableFocusChange};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use flappy::build_info;
use flappy::config::{GameConfig, SpawnPolicy};
use flappy::constants::{LOG_ENV_VAR, TARGET_FPS};
use flappy::input::{map_terminal_event, TerminalAction};
use flappy::scheduler::{drive, FrameTimer};
use flappy::ui::render_game;
use flappy::utils::persistence::{self, FileScoreStore, MemoryScoreStore, ScoreStore};
use flappy::{Session, SessionEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io::{self, Stdout};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    seed: Option<u64>,
    no_save: bool,
    reset_best: bool,
    timed_spawn: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Play(Options),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-v" => return Ok(Command::Version),
            "--help" | "-h" => return Ok(Command::Help),
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                options.config = Some(PathBuf::from(path));
            }
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a number")?;
                let seed = value
                    .parse()
                    .map_err(|_| format!("Invalid seed: {}", value))?;
                options.seed = Some(seed);
            }
            "--no-save" => options.no_save = true,
            "--reset-best" => options.reset_best = true,
            "--timed-spawn" => options.timed_spawn = true,
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(Command::Play(options))
}

fn print_help() {
    println!("Flappy - Flappy Bird in the terminal\n");
    println!("Usage: flappy [options]\n");
    println!("Options:");
    println!("  --config PATH  Read settings from PATH instead of the default config.json");
    println!("  --seed N       Seed the pipe generator for a reproducible run");
    println!("  --no-save      Keep the best score in memory only");
    println!("  --reset-best   Clear the stored best score before playing");
    println!("  --timed-spawn  Spawn pipes on a timer instead of by distance");
    println!("  --version      Show version information");
    println!("  --help         Show this help message");
    println!();
    println!("Logs go to the data directory; set {} to change the level.", LOG_ENV_VAR);
}

/// Send tracing output to the log file. The terminal is owned by the game, so
/// nothing is logged at all if the file cannot be opened.
fn init_logging() {
    let Ok(path) = persistence::log_path() else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        return;
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Command::Play(options)) => options,
        Ok(Command::Version) => {
            println!("{}", build_info::version_line());
            return Ok(());
        }
        Ok(Command::Help) => {
            print_help();
            return Ok(());
        }
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Run 'flappy --help' for usage.");
            std::process::exit(1);
        }
    };

    init_logging();

    let config_path = match options.config.clone() {
        Some(path) => Some(path),
        None => persistence::default_config_path().ok(),
    };
    let mut config = config_path
        .as_deref()
        .map(GameConfig::load_or_default)
        .unwrap_or_default();
    if options.timed_spawn {
        config.pipes.spawn_policy = SpawnPolicy::timed();
    }

    let mut store: Box<dyn ScoreStore> = if options.no_save {
        Box::new(MemoryScoreStore::new())
    } else {
        persistence::store_or_memory(FileScoreStore::new())
    };
    if options.reset_best {
        persistence::reset_best_score(store.as_mut());
    }

    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    tracing::info!(seed = ?options.seed, no_save = options.no_save, "starting");

    let mut session = Session::new(config, store, rng);
    tracing::debug!(config = ?session.config(), "session ready");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut session);

    // Cleanup terminal, even if the game loop failed
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableFocusChange)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "game loop failed");
    }
    result?;

    println!("Best score: {}", session.best_score());
    Ok(())
}

fn run<S: ScoreStore>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut Session<S, StdRng>,
) -> io::Result<()> {
    let mut timer = FrameTimer::new(TARGET_FPS);
    let mut new_best = false;
    let mut outcome = Ok(());

    drive(&mut timer, |now_ms| {
        match frame(terminal, session, now_ms, &mut new_best) {
            Ok(flow) => flow,
            Err(e) => {
                outcome = Err(e);
                ControlFlow::Break(())
            }
        }
    });

    outcome
}

/// One frame: drain terminal events into the session, tick, draw.
fn frame<S: ScoreStore>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut Session<S, StdRng>,
    now_ms: f64,
    new_best: &mut bool,
) -> io::Result<ControlFlow<()>> {
    while event::poll(Duration::ZERO)? {
        let ev = event::read()?;
        match map_terminal_event(&ev) {
            Some(TerminalAction::Quit) => return Ok(ControlFlow::Break(())),
            Some(TerminalAction::Game(input)) => session.input_mut().push(input),
            None => {}
        }
    }

    for outcome in session.tick(now_ms) {
        match outcome {
            SessionEvent::Started => *new_best = false,
            SessionEvent::NewBest(_) => *new_best = true,
            _ => {}
        }
    }

    let snapshot = session.snapshot();
    terminal.draw(|f| render_game(f, &snapshot, *new_best))?;
    Ok(ControlFlow::Continue(()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_plays_with_defaults() {
        assert_eq!(parse_args(&[]), Ok(Command::Play(Options::default())));
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse_args(&args(&["--help"])), Ok(Command::Help));
        assert_eq!(parse_args(&args(&["-v"])), Ok(Command::Version));
    }

    #[test]
    fn test_all_options() {
        let parsed = parse_args(&args(&[
            "--config",
            "/tmp/flappy.json",
            "--seed",
            "42",
            "--no-save",
            "--reset-best",
            "--timed-spawn",
        ]));
        assert_eq!(
            parsed,
            Ok(Command::Play(Options {
                config: Some(PathBuf::from("/tmp/flappy.json")),
                seed: Some(42),
                no_save: true,
                reset_best: true,
                timed_spawn: true,
            }))
        );
    }

    #[test]
    fn test_bad_seed() {
        assert!(parse_args(&args(&["--seed", "abc"])).is_err());
        assert!(parse_args(&args(&["--seed"])).is_err());
    }

    #[test]
    fn test_unknown_argument() {
        assert_eq!(
            parse_args(&args(&["--fly"])),
            Err("Unknown argument: --fly".to_string())
        );
    }
}
