use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use webbrowser::Browser;

use crate::config::{Config, ConfigStore};
use crate::modes::ModeRegistry;
use crate::operation::OperationRegistry;
use crate::runtime::AppEvent;
use crate::session::{Session, SessionSnapshot, SessionState};
use crate::stats::StatsDb;
use crate::ui::game::GameScreen;
use crate::ui::launch::LaunchScreen;
use crate::ui::menu::MenuScreen;
use crate::ui::modes::ModeBrowser;
use crate::ui::onboarding::OnboardingScreen;
use crate::ui::pause::PauseScreen;
use crate::ui::practice::PracticeScreen;
use crate::ui::quit_confirm::QuitConfirmScreen;
use crate::ui::results::ResultsScreen;
use crate::ui::screen::{AppContext, GameSetup, Screen, Transition};
use crate::ui::settings::SettingsScreen;
use crate::ui::statistics::StatisticsScreen;
use crate::update::RELEASES_PAGE;

/// Which screen the controller opens first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartMode {
    Menu,
    QuickPlay,
    Practice,
    Statistics,
    Settings,
    Onboarding,
    Modes,
    Launch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    Menu,
    Modes,
    Launch,
    Game,
    Pause,
    Results,
    Practice,
    Statistics,
    Settings,
    Onboarding,
    QuitConfirm,
}

#[derive(Debug, Default)]
struct Screens {
    menu: MenuScreen,
    modes: ModeBrowser,
    launch: LaunchScreen,
    game: GameScreen,
    pause: PauseScreen,
    results: ResultsScreen,
    practice: PracticeScreen,
    statistics: StatisticsScreen,
    settings: SettingsScreen,
    onboarding: OnboardingScreen,
    quit_confirm: QuitConfirmScreen,
}

impl Screens {
    fn get(&mut self, id: ScreenId) -> &mut dyn Screen {
        match id {
            ScreenId::Menu => &mut self.menu,
            ScreenId::Modes => &mut self.modes,
            ScreenId::Launch => &mut self.launch,
            ScreenId::Game => &mut self.game,
            ScreenId::Pause => &mut self.pause,
            ScreenId::Results => &mut self.results,
            ScreenId::Practice => &mut self.practice,
            ScreenId::Statistics => &mut self.statistics,
            ScreenId::Settings => &mut self.settings,
            ScreenId::Onboarding => &mut self.onboarding,
            ScreenId::QuitConfirm => &mut self.quit_confirm,
        }
    }
}

/// The screen controller. Owns the session and the active screen; screens
/// only ever talk back through [`Transition`]s.
pub struct App {
    screen: ScreenId,
    screens: Screens,
    ctx: AppContext,
    config_store: Box<dyn ConfigStore>,
    last_setup: Option<GameSetup>,
    should_quit: bool,
}

impl App {
    pub fn new(
        start: StartMode,
        modes: ModeRegistry,
        operations: OperationRegistry,
        config_store: Box<dyn ConfigStore>,
        stats: Option<StatsDb>,
    ) -> Self {
        let config = config_store.load();
        let mut app = Self {
            screen: ScreenId::Menu,
            screens: Screens::default(),
            ctx: AppContext {
                modes,
                operations,
                config,
                session: None,
                stats,
                update: None,
                viewport: (0, 0),
            },
            config_store,
            last_setup: None,
            should_quit: false,
        };
        app.resolve_start(start);
        app
    }

    // runs once, before the first event
    fn resolve_start(&mut self, start: StartMode) {
        tracing::debug!(?start, "resolving start screen");
        match start {
            StartMode::Menu if !self.ctx.config.onboarding_done => self.open_onboarding(),
            StartMode::Menu => self.open(ScreenId::Menu),
            StartMode::QuickPlay => self.quick_play(),
            StartMode::Practice => self.open_practice(),
            StartMode::Statistics => self.open_statistics(),
            StartMode::Settings => self.open_settings(),
            StartMode::Onboarding => self.open_onboarding(),
            StartMode::Modes => self.open_modes(),
            StartMode::Launch(mode_id) => match self.ctx.modes.get(&mode_id) {
                Some(mode) => {
                    self.screens.launch.open(mode, &self.ctx.config);
                    self.open(ScreenId::Launch);
                }
                None => {
                    tracing::warn!(%mode_id, "unknown mode, opening the mode browser");
                    self.open_modes();
                }
            },
        }
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn session(&self) -> Option<&Session> {
        self.ctx.session.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn results(&self) -> Option<&SessionSnapshot> {
        self.screens.results.snapshot()
    }

    /// Whether ticks should carry elapsed time right now
    pub fn timer_armed(&self) -> bool {
        self.screen == ScreenId::Game
            && self
                .ctx
                .session
                .as_ref()
                .is_some_and(|s| s.state() == SessionState::Running)
    }

    pub fn dispatch(&mut self, event: AppEvent) {
        let transition = match event {
            AppEvent::Resize(w, h) => {
                self.ctx.viewport = (w, h);
                None
            }
            AppEvent::UpdateChecked(info) => {
                if let Some(info) = info.as_ref().filter(|i| i.is_available()) {
                    tracing::info!(latest = %info.latest, "update available");
                }
                self.ctx.update = info;
                None
            }
            AppEvent::Tick(dt) => self.on_tick(dt),
            AppEvent::Key(key) if is_ctrl_c(&key) => Some(Transition::QuitApp),
            AppEvent::Key(key) => self.screens.get(self.screen).handle_key(key, &self.ctx),
        };
        if let Some(transition) = transition {
            self.apply(transition);
        }
    }

    fn on_tick(&mut self, dt: std::time::Duration) -> Option<Transition> {
        if self.screen != ScreenId::Game {
            return None;
        }
        self.ctx
            .session
            .as_mut()
            .and_then(|s| s.tick(dt))
            .map(Transition::GameOver)
    }

    pub fn render(&mut self, f: &mut Frame) {
        self.screens.get(self.screen).render(f, &self.ctx);
    }

    fn open(&mut self, screen: ScreenId) {
        tracing::debug!(from = ?self.screen, to = ?screen, "screen change");
        self.screen = screen;
    }

    fn open_modes(&mut self) {
        self.screens.modes.reset();
        self.open(ScreenId::Modes);
    }

    fn open_practice(&mut self) {
        self.screens.practice.open(&self.ctx);
        self.open(ScreenId::Practice);
    }

    fn open_statistics(&mut self) {
        self.screens.statistics.refresh(self.ctx.stats.as_ref());
        self.open(ScreenId::Statistics);
    }

    fn open_settings(&mut self) {
        self.screens.settings.open(&self.ctx.config);
        self.open(ScreenId::Settings);
    }

    fn open_onboarding(&mut self) {
        self.screens.onboarding.open(&self.ctx);
        self.open(ScreenId::Onboarding);
    }

    fn to_menu(&mut self) {
        self.ctx.session = None;
        self.open(ScreenId::Menu);
    }

    fn quick_play(&mut self) {
        let setup = self
            .ctx
            .config
            .last_played()
            .filter(|last| self.ctx.modes.get(&last.mode_id).is_some())
            .map(|last| GameSetup {
                mode_id: last.mode_id,
                difficulty: last.difficulty,
                duration: last.duration,
                input_method: self.ctx.config.input_method,
            });
        match setup {
            Some(setup) => self.start_game(setup),
            None => self.open_onboarding(),
        }
    }

    fn save_config(&self) {
        if let Err(err) = self.config_store.save(&self.ctx.config) {
            tracing::warn!("failed to save config: {err}");
        }
    }

    /// Panics if the mode resolves to no operations.
    fn start_game(&mut self, setup: GameSetup) {
        let operations = self
            .ctx
            .modes
            .get(&setup.mode_id)
            .map(|mode| mode.operations.clone())
            .unwrap_or_default();
        let session = Session::new(operations, setup.difficulty, setup.duration);
        tracing::info!(
            mode = %setup.mode_id,
            difficulty = %setup.difficulty,
            secs = setup.duration.as_secs(),
            input = %setup.input_method,
            "game started"
        );

        self.ctx
            .config
            .set_last_played(&setup.mode_id, setup.difficulty, setup.duration);
        self.ctx.config.input_method = setup.input_method;
        self.save_config();

        self.screens.game.reset(setup.input_method);
        self.ctx.session = Some(session);
        self.last_setup = Some(setup);
        self.open(ScreenId::Game);
    }

    fn finish_game(&mut self, snapshot: SessionSnapshot) {
        let mode_id = self
            .last_setup
            .as_ref()
            .map(|s| s.mode_id.clone())
            .unwrap_or_default();
        if let Some(db) = self.ctx.stats.as_mut() {
            if let Err(err) = db.record_session(&mode_id, &snapshot, Local::now()) {
                tracing::warn!("failed to record session: {err}");
            }
        }
        let mode_name = self
            .ctx
            .modes
            .get(&mode_id)
            .map(|m| m.name.clone())
            .unwrap_or(mode_id);
        tracing::info!(points = snapshot.score.points, "game over");
        self.screens.results.show(&mode_name, snapshot);
        self.open(ScreenId::Results);
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::OpenModes | Transition::BackToModes => self.open_modes(),
            Transition::OpenPractice => self.open_practice(),
            Transition::OpenStatistics => self.open_statistics(),
            Transition::OpenSettings => self.open_settings(),
            Transition::QuickPlay => self.quick_play(),
            Transition::OpenReleasePage => {
                let url = self
                    .ctx
                    .update
                    .as_ref()
                    .map(|info| info.url.clone())
                    .unwrap_or_else(|| RELEASES_PAGE.to_string());
                if Browser::is_available() {
                    if let Err(err) = webbrowser::open(&url) {
                        tracing::warn!("failed to open {url}: {err}");
                    }
                }
            }
            Transition::QuitApp => self.should_quit = true,
            Transition::ModeChosen(mode_id) => {
                if let Some(mode) = self.ctx.modes.get(&mode_id) {
                    self.screens.launch.open(mode, &self.ctx.config);
                    self.open(ScreenId::Launch);
                }
            }
            Transition::StartGame(setup) => self.start_game(setup),
            Transition::Submit(answer) => {
                if let Some(session) = self.ctx.session.as_mut() {
                    session.submit(answer);
                }
            }
            Transition::Skip => {
                if let Some(session) = self.ctx.session.as_mut() {
                    session.skip();
                }
            }
            Transition::Pause => {
                if let Some(session) = self.ctx.session.as_mut() {
                    if session.pause() {
                        self.open(ScreenId::Pause);
                    }
                }
            }
            Transition::QuitRequested if self.ctx.config.skip_quit_confirmation => self.to_menu(),
            Transition::QuitRequested => {
                if let Some(session) = self.ctx.session.as_mut() {
                    session.pause();
                }
                self.screens.quit_confirm.open();
                self.open(ScreenId::QuitConfirm);
            }
            Transition::GameOver(snapshot) => self.finish_game(snapshot),
            Transition::Resume | Transition::CancelQuit => {
                if let Some(session) = self.ctx.session.as_mut() {
                    session.resume();
                }
                self.open(ScreenId::Game);
            }
            Transition::ConfirmQuit { dont_ask_again } => {
                if dont_ask_again {
                    self.ctx.config.skip_quit_confirmation = true;
                    self.save_config();
                }
                self.to_menu();
            }
            Transition::QuitToMenu | Transition::BackToMenu => self.to_menu(),
            Transition::PlayAgain => match self.last_setup.clone() {
                Some(setup) => self.start_game(setup),
                None => self.to_menu(),
            },
            Transition::OnboardingComplete(setup) => {
                let config = &mut self.ctx.config;
                config.onboarding_done = true;
                config.default_difficulty = setup.difficulty;
                config.default_duration_secs = setup.duration.as_secs();
                self.start_game(setup);
            }
            Transition::SkipOnboarding => {
                self.ctx.config.skip_onboarding();
                self.save_config();
                self.to_menu();
            }
            Transition::SaveSettings(config) => {
                self.ctx.config = config;
                self.save_config();
            }
        }
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
pub(crate) fn test_context() -> AppContext {
    let operations = OperationRegistry::with_builtin();
    AppContext {
        modes: ModeRegistry::with_presets(&operations),
        operations,
        config: Config::default(),
        session: None,
        stats: None,
        update: None,
        viewport: (80, 24),
    }
}
