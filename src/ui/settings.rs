use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::screen::{AppContext, Screen, Transition};
use super::{
    bold, centered_rows, dim, frame_layout, is_down, is_up, pad, render_hints, render_title,
    selected, selector_line,
};
use crate::config::Config;
use crate::modes::{find_duration_index, ALLOWED_DURATIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Difficulty,
    Duration,
    InputMethod,
    AutoUpdate,
    SkipQuitConfirmation,
}

const FIELDS: [Field; 5] = [
    Field::Difficulty,
    Field::Duration,
    Field::InputMethod,
    Field::AutoUpdate,
    Field::SkipQuitConfirmation,
];

/// Preferences editor; every change is saved immediately
#[derive(Debug, Default)]
pub struct SettingsScreen {
    draft: Config,
    focus: usize,
}

impl SettingsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, config: &Config) {
        self.draft = config.clone();
        self.focus = 0;
    }

    /// Apply a left/right change to the focused field
    fn change(&mut self, forward: bool) -> Transition {
        match FIELDS[self.focus] {
            Field::Difficulty => {
                self.draft.default_difficulty = if forward {
                    self.draft.default_difficulty.next()
                } else {
                    self.draft.default_difficulty.prev()
                };
            }
            Field::Duration => {
                let index = find_duration_index(self.draft.default_duration());
                let index = if forward {
                    (index + 1).min(ALLOWED_DURATIONS.len() - 1)
                } else {
                    index.saturating_sub(1)
                };
                self.draft.default_duration_secs = ALLOWED_DURATIONS[index].value.as_secs();
            }
            Field::InputMethod => self.draft.input_method = self.draft.input_method.toggle(),
            Field::AutoUpdate => self.draft.auto_update = !self.draft.auto_update,
            Field::SkipQuitConfirmation => {
                self.draft.skip_quit_confirmation = !self.draft.skip_quit_confirmation
            }
        }
        Transition::SaveSettings(self.draft.clone())
    }
}

fn toggle_line(label: &str, on: bool, focused: bool) -> Line<'static> {
    let style = if focused { selected() } else { bold() };
    Line::from(vec![
        Span::styled(pad(label, 24), dim()),
        Span::styled(if on { "[x]" } else { "[ ]" }, style),
    ])
}

impl Screen for SettingsScreen {
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
            KeyCode::Left | KeyCode::Char('h') => Some(self.change(false)),
            KeyCode::Right | KeyCode::Char('l') => Some(self.change(true)),
            KeyCode::Enter | KeyCode::Char(' ') => match FIELDS[self.focus] {
                Field::InputMethod | Field::AutoUpdate | Field::SkipQuitConfirmation => {
                    Some(self.change(true))
                }
                Field::Difficulty | Field::Duration => None,
            },
            KeyCode::Esc | KeyCode::Char('q') => Some(Transition::BackToMenu),
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, _ctx: &AppContext) {
        let (header, body, footer) = frame_layout(f.area());
        render_title(f, header, "Settings");

        let focused = |field: Field| FIELDS[self.focus] == field;
        let duration = ALLOWED_DURATIONS[find_duration_index(self.draft.default_duration())].label;
        let lines = vec![
            selector_line(
                "Difficulty",
                &self.draft.default_difficulty.to_string(),
                focused(Field::Difficulty),
            ),
            selector_line("Duration", duration, focused(Field::Duration)),
            selector_line(
                "Answer",
                &self.draft.input_method.to_string(),
                focused(Field::InputMethod),
            ),
            Line::from(""),
            toggle_line(
                "Check for updates",
                self.draft.auto_update,
                focused(Field::AutoUpdate),
            ),
            toggle_line(
                "Skip quit confirmation",
                self.draft.skip_quit_confirmation,
                focused(Field::SkipQuitConfirmation),
            ),
        ];
        let area = centered_rows(body, lines.len() as u16);
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);

        render_hints(
            f,
            footer,
            &[("↑↓", "field"), ("←→", "change"), ("space", "toggle"), ("esc", "back")],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_context;
    use crate::modes::InputMethod;
    use crate::operation::Difficulty;
    use crate::ui::test_support::render_to_string;
    use assert_matches::assert_matches;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn every_change_is_saved() {
        let ctx = test_context();
        let mut settings = SettingsScreen::new();
        settings.open(&ctx.config);

        assert_matches!(
            settings.handle_key(key(KeyCode::Right), &ctx),
            Some(Transition::SaveSettings(cfg)) if cfg.default_difficulty == Difficulty::Hard
        );

        settings.handle_key(key(KeyCode::Down), &ctx);
        assert_matches!(
            settings.handle_key(key(KeyCode::Left), &ctx),
            Some(Transition::SaveSettings(cfg)) if cfg.default_duration_secs == 30
        );
        // already at the shortest duration
        assert_matches!(
            settings.handle_key(key(KeyCode::Left), &ctx),
            Some(Transition::SaveSettings(cfg)) if cfg.default_duration_secs == 30
        );

        settings.handle_key(key(KeyCode::Down), &ctx);
        assert_matches!(
            settings.handle_key(key(KeyCode::Right), &ctx),
            Some(Transition::SaveSettings(cfg)) if cfg.input_method == InputMethod::MultipleChoice
        );

        settings.handle_key(key(KeyCode::Down), &ctx);
        settings.handle_key(key(KeyCode::Down), &ctx);
        assert_matches!(
            settings.handle_key(key(KeyCode::Char(' ')), &ctx),
            Some(Transition::SaveSettings(cfg)) if cfg.skip_quit_confirmation
        );
    }

    #[test]
    fn enter_on_selector_does_nothing() {
        let ctx = test_context();
        let mut settings = SettingsScreen::new();
        settings.open(&ctx.config);
        assert_eq!(settings.handle_key(key(KeyCode::Enter), &ctx), None);
        assert_eq!(
            settings.handle_key(key(KeyCode::Esc), &ctx),
            Some(Transition::BackToMenu)
        );
    }

    #[test]
    fn renders_current_values() {
        let ctx = test_context();
        let mut settings = SettingsScreen::new();
        settings.open(&ctx.config);
        let text = render_to_string(80, 20, |f| settings.render(f, &ctx));
        assert!(text.contains("‹ Medium ›"));
        assert!(text.contains("1 minute"));
        assert!(text.contains("Check for updates"));
    }
}
