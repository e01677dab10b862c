use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::screen::{AppContext, GameSetup, Screen, Transition};
use super::{
    bold, centered_rows, dim, frame_layout, is_down, is_up, render_hints, render_title, selected,
    selector_line,
};
use crate::config::Config;
use crate::modes::{find_duration_index, InputMethod, Mode, ALLOWED_DURATIONS};
use crate::operation::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Difficulty,
    Duration,
    Input,
    Start,
    Back,
}

const FIELDS: [Field; 5] = [
    Field::Difficulty,
    Field::Duration,
    Field::Input,
    Field::Start,
    Field::Back,
];

/// Pre-game configuration for a chosen mode
#[derive(Debug)]
pub struct LaunchScreen {
    mode_id: Option<String>,
    mode_name: String,
    description: String,
    difficulty: Difficulty,
    duration_index: usize,
    input_method: InputMethod,
    focus: usize,
}

impl Default for LaunchScreen {
    fn default() -> Self {
        Self {
            mode_id: None,
            mode_name: String::new(),
            description: String::new(),
            difficulty: Difficulty::Medium,
            duration_index: find_duration_index(std::time::Duration::from_secs(60)),
            input_method: InputMethod::Typing,
            focus: 0,
        }
    }
}

impl LaunchScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carry a mode forward, seeded with the user's default settings
    pub fn open(&mut self, mode: &Mode, config: &Config) {
        self.mode_id = Some(mode.id.clone());
        self.mode_name = mode.name.clone();
        self.description = mode.description.clone();
        self.difficulty = config.default_difficulty;
        self.duration_index = find_duration_index(config.default_duration());
        self.input_method = config.input_method;
        self.focus = FIELDS.iter().position(|f| *f == Field::Start).unwrap_or(0);
    }

    pub fn mode_id(&self) -> Option<&str> {
        self.mode_id.as_deref()
    }

    fn setup(&self) -> Option<GameSetup> {
        Some(GameSetup {
            mode_id: self.mode_id.clone()?,
            difficulty: self.difficulty,
            duration: ALLOWED_DURATIONS[self.duration_index].value,
            input_method: self.input_method,
        })
    }

    fn adjust(&mut self, forward: bool) {
        match FIELDS[self.focus] {
            Field::Difficulty => {
                self.difficulty = if forward {
                    self.difficulty.next()
                } else {
                    self.difficulty.prev()
                }
            }
            Field::Duration => {
                self.duration_index = if forward {
                    (self.duration_index + 1).min(ALLOWED_DURATIONS.len() - 1)
                } else {
                    self.duration_index.saturating_sub(1)
                }
            }
            Field::Input => self.input_method = self.input_method.toggle(),
            Field::Start | Field::Back => {}
        }
    }
}

impl Screen for LaunchScreen {
    fn handle_key(&mut self, key: KeyEvent, _ctx: &AppContext) -> Option<Transition> {
        if is_up(&key) {
            self.focus = self.focus.saturating_sub(1);
            return None;
        }
        if is_down(&key) {
            self.focus = (self.focus + 1).min(FIELDS.len() - 1);
            return None;
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.adjust(false);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.adjust(true);
                None
            }
            KeyCode::Enter => match FIELDS[self.focus] {
                Field::Start => self.setup().map(Transition::StartGame),
                Field::Back => Some(Transition::BackToModes),
                Field::Difficulty | Field::Duration | Field::Input => {
                    self.focus += 1;
                    None
                }
            },
            KeyCode::Char('s') => self.setup().map(Transition::StartGame),
            KeyCode::Esc | KeyCode::Char('q') => Some(Transition::BackToModes),
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, _ctx: &AppContext) {
        let (header, body, footer) = frame_layout(f.area());
        render_title(f, header, &self.mode_name);

        let button = |label: &str, field: Field| {
            let style = if FIELDS[self.focus] == field {
                selected()
            } else {
                bold()
            };
            Span::styled(format!("[ {label} ]"), style)
        };

        let lines = vec![
            Line::from(Span::styled(self.description.clone(), dim())),
            Line::from(""),
            selector_line(
                "Difficulty",
                &self.difficulty.to_string(),
                FIELDS[self.focus] == Field::Difficulty,
            ),
            selector_line(
                "Duration",
                ALLOWED_DURATIONS[self.duration_index].label,
                FIELDS[self.focus] == Field::Duration,
            ),
            selector_line(
                "Answer",
                &self.input_method.to_string(),
                FIELDS[self.focus] == Field::Input,
            ),
            Line::from(""),
            Line::from(vec![
                button("Start", Field::Start),
                Span::raw("   "),
                button("Back", Field::Back),
            ]),
        ];
        let area = centered_rows(body, lines.len() as u16);
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);

        render_hints(
            f,
            footer,
            &[("↑↓", "field"), ("←→", "adjust"), ("enter", "confirm"), ("esc", "back")],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_context;
    use crate::ui::test_support::render_to_string;
    use crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn opened(mode_id: &str) -> (LaunchScreen, AppContext) {
        let ctx = test_context();
        let mut launch = LaunchScreen::new();
        launch.open(ctx.modes.get(mode_id).unwrap(), &ctx.config);
        (launch, ctx)
    }

    #[test]
    fn start_uses_config_defaults() {
        let (mut launch, ctx) = opened("addition");
        assert_eq!(
            launch.handle_key(key(KeyCode::Enter), &ctx),
            Some(Transition::StartGame(GameSetup {
                mode_id: "addition".into(),
                difficulty: Difficulty::Medium,
                duration: Duration::from_secs(60),
                input_method: InputMethod::Typing,
            }))
        );
    }

    #[test]
    fn selectors_adjust_within_bounds() {
        let (mut launch, ctx) = opened("cubes");
        launch.handle_key(key(KeyCode::Up), &ctx);
        launch.handle_key(key(KeyCode::Right), &ctx);
        launch.handle_key(key(KeyCode::Up), &ctx);
        for _ in 0..10 {
            launch.handle_key(key(KeyCode::Right), &ctx);
        }
        launch.handle_key(key(KeyCode::Up), &ctx);
        for _ in 0..10 {
            launch.handle_key(key(KeyCode::Right), &ctx);
        }

        match launch.handle_key(key(KeyCode::Char('s')), &ctx) {
            Some(Transition::StartGame(setup)) => {
                assert_eq!(setup.difficulty, Difficulty::Expert);
                assert_eq!(setup.duration, Duration::from_secs(120));
                assert_eq!(setup.input_method, InputMethod::MultipleChoice);
            }
            other => panic!("expected StartGame, got {other:?}"),
        }
    }

    #[test]
    fn back_returns_to_browser() {
        let (mut launch, ctx) = opened("addition");
        assert_eq!(
            launch.handle_key(key(KeyCode::Esc), &ctx),
            Some(Transition::BackToModes)
        );
        launch.handle_key(key(KeyCode::Down), &ctx);
        assert_eq!(
            launch.handle_key(key(KeyCode::Enter), &ctx),
            Some(Transition::BackToModes)
        );
    }

    #[test]
    fn renders_mode_and_selectors() {
        let (mut launch, ctx) = opened("square-roots");
        let text = render_to_string(80, 20, |f| launch.render(f, &ctx));
        assert!(text.contains("Square Roots"));
        assert!(text.contains("‹ Medium ›"));
        assert!(text.contains("1 minute"));
        assert!(text.contains("‹ Typing ›"));
    }

    #[test]
    fn input_method_starts_from_config() {
        let ctx = test_context();
        let mut config = ctx.config.clone();
        config.input_method = InputMethod::MultipleChoice;
        let mut launch = LaunchScreen::new();
        launch.open(ctx.modes.get("division").unwrap(), &config);
        match launch.handle_key(key(KeyCode::Enter), &ctx) {
            Some(Transition::StartGame(setup)) => {
                assert_eq!(setup.input_method, InputMethod::MultipleChoice)
            }
            other => panic!("expected StartGame, got {other:?}"),
        }
    }
}
