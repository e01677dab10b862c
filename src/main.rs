use std::fs::{self, OpenOptions};
use std::io::{self, stdin};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mathdash::{
    app::{App, StartMode},
    app_dirs::AppDirs,
    config::FileConfigStore,
    modes::ModeRegistry,
    operation::OperationRegistry,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    stats::StatsDb,
    update,
};

const TICK_RATE_MS: u64 = 100;
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// timed mental arithmetic drills in the terminal
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Timed mental arithmetic drills with sixteen game modes, an untimed practice mode and a local statistics history."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// quick play with the last used settings, or open a mode's setup screen
    Play {
        /// mode id, such as `addition` or `mixed-powers`
        mode: Option<String>,
    },
    /// untimed practice with immediate feedback
    Practice,
    /// browse your session history
    #[command(alias = "stats")]
    Statistics,
    /// change default difficulty, duration and other preferences
    Settings,
    /// check whether a newer release is available
    Update,
    /// print the version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Err(err) = init_logging() {
        eprintln!("logging disabled: {err}");
    }

    let operations = OperationRegistry::with_builtin();
    let modes = ModeRegistry::with_presets(&operations);

    let start = match cli.command {
        Some(Command::Version) => {
            println!("mathdash {VERSION}");
            return Ok(());
        }
        Some(Command::Update) => {
            let outcome = update::check(VERSION);
            println!("{}", update::report(VERSION, &outcome));
            return Ok(());
        }
        Some(Command::Play { mode: Some(id) }) => {
            if modes.get(&id).is_none() {
                eprintln!("unknown mode '{id}'. Available modes:");
                for id in modes.ids() {
                    eprintln!("  {id}");
                }
                std::process::exit(1);
            }
            StartMode::Launch(id)
        }
        Some(Command::Play { mode: None }) => StartMode::QuickPlay,
        Some(Command::Practice) => StartMode::Practice,
        Some(Command::Statistics) => StartMode::Statistics,
        Some(Command::Settings) => StartMode::Settings,
        None => StartMode::Menu,
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    install_panic_hook();
    match panic::catch_unwind(AssertUnwindSafe(|| run(start, modes, operations))) {
        Ok(result) => result,
        Err(_) => {
            eprintln!("Unexpected error, mathdash has to quit. Details are in the log file.");
            std::process::exit(1);
        }
    }
}

fn run(start: StartMode, modes: ModeRegistry, operations: OperationRegistry) -> anyhow::Result<()> {
    let mut app = App::new(
        start,
        modes,
        operations,
        Box::new(FileConfigStore::new()),
        open_stats(),
    );

    let _guard = TerminalGuard::acquire()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let size = terminal.size()?;
    app.dispatch(AppEvent::Resize(size.width, size.height));

    let events = CrosstermEventSource::new();
    if app.config().auto_update {
        update::spawn_background_check(VERSION.to_string(), events.sender());
    }
    let mut runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    while !app.should_quit() {
        terminal.draw(|f| app.render(f))?;
        let event = runner.step(app.timer_armed());
        app.dispatch(event);
    }

    terminal.show_cursor()?;
    tracing::info!("bye");
    Ok(())
}

/// Statistics are optional; a broken database only disables them
fn open_stats() -> Option<StatsDb> {
    let path = AppDirs::db_path()?;
    match StatsDb::open(&path) {
        Ok(db) => Some(db),
        Err(err) => {
            tracing::warn!(path = %path.display(), "statistics unavailable: {err}");
            None
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    let Some(log_path) = AppDirs::log_path() else {
        return Ok(());
    };
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()?;
    Ok(())
}

/// Raw mode plus alternate screen, undone on drop
struct TerminalGuard;

impl TerminalGuard {
    fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

// the terminal must be usable before the panic message is printed
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        tracing::error!("panic: {info}");
        default_hook(info);
    }));
}
