use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::config::Config;
use crate::modes::{InputMethod, ModeRegistry};
use crate::operation::{Difficulty, OperationRegistry};
use crate::session::{Session, SessionSnapshot};
use crate::stats::StatsDb;
use crate::update::UpdateInfo;

/// Mode, difficulty, duration and answer input of a game to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub mode_id: String,
    pub difficulty: Difficulty,
    pub duration: Duration,
    pub input_method: InputMethod,
}

/// Signals a screen hands back to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    // menu
    OpenModes,
    OpenPractice,
    OpenStatistics,
    OpenSettings,
    QuickPlay,
    OpenReleasePage,
    QuitApp,
    // mode browser and launch
    ModeChosen(String),
    BackToModes,
    StartGame(GameSetup),
    // game
    Submit(i64),
    Skip,
    Pause,
    QuitRequested,
    GameOver(SessionSnapshot),
    // pause and quit confirmation
    Resume,
    QuitToMenu,
    ConfirmQuit { dont_ask_again: bool },
    CancelQuit,
    // results
    PlayAgain,
    // onboarding and settings
    OnboardingComplete(GameSetup),
    SkipOnboarding,
    SaveSettings(Config),
    BackToMenu,
}

/// Read-only view of controller state shared with every screen
#[derive(Debug)]
pub struct AppContext {
    pub modes: ModeRegistry,
    pub operations: OperationRegistry,
    pub config: Config,
    pub session: Option<Session>,
    pub stats: Option<StatsDb>,
    pub update: Option<UpdateInfo>,
    pub viewport: (u16, u16),
}

impl AppContext {
    pub fn update_available(&self) -> Option<&UpdateInfo> {
        self.update.as_ref().filter(|info| info.is_available())
    }
}

/// One interactive view. Screens never touch controller state directly;
/// they return a [`Transition`] instead.
pub trait Screen {
    fn handle_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Transition>;
    fn render(&mut self, f: &mut Frame, ctx: &AppContext);
}
