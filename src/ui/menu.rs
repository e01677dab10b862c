use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};
use webbrowser::Browser;

use super::screen::{AppContext, Screen, Transition};
use super::{accent, dim, frame_layout, is_down, is_up, render_hints, selected, step_index};

const LOGO: [&str; 3] = [
    "┌┬┐┌─┐┌┬┐┬ ┬┌┬┐┌─┐┌─┐┬ ┬",
    "│││├─┤ │ ├─┤ ││├─┤└─┐├─┤",
    "┴ ┴┴ ┴ ┴ ┴ ┴─┴┘┴ ┴└─┘┴ ┴",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    QuickPlay,
    Play,
    Practice,
    Statistics,
    Settings,
    Quit,
}

impl MenuItem {
    fn label(self) -> &'static str {
        match self {
            MenuItem::QuickPlay => "Quick Play",
            MenuItem::Play => "Play",
            MenuItem::Practice => "Practice",
            MenuItem::Statistics => "Statistics",
            MenuItem::Settings => "Settings",
            MenuItem::Quit => "Quit",
        }
    }

    fn transition(self) -> Transition {
        match self {
            MenuItem::QuickPlay => Transition::QuickPlay,
            MenuItem::Play => Transition::OpenModes,
            MenuItem::Practice => Transition::OpenPractice,
            MenuItem::Statistics => Transition::OpenStatistics,
            MenuItem::Settings => Transition::OpenSettings,
            MenuItem::Quit => Transition::QuitApp,
        }
    }
}

fn items(ctx: &AppContext) -> Vec<MenuItem> {
    let mut items = Vec::with_capacity(6);
    if ctx.config.has_last_played() {
        items.push(MenuItem::QuickPlay);
    }
    items.extend([
        MenuItem::Play,
        MenuItem::Practice,
        MenuItem::Statistics,
        MenuItem::Settings,
        MenuItem::Quit,
    ]);
    items
}

#[derive(Debug, Default)]
pub struct MenuScreen {
    selected: usize,
}

impl MenuScreen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Screen for MenuScreen {
    fn handle_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Transition> {
        let items = items(ctx);
        self.selected = self.selected.min(items.len() - 1);

        if is_up(&key) {
            self.selected = step_index(self.selected, items.len(), false);
            return None;
        }
        if is_down(&key) {
            self.selected = step_index(self.selected, items.len(), true);
            return None;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(items[self.selected].transition()),
            KeyCode::Char('q') | KeyCode::Esc => Some(Transition::QuitApp),
            KeyCode::Char('u') if ctx.update_available().is_some() => {
                Some(Transition::OpenReleasePage)
            }
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, ctx: &AppContext) {
        let (_, body, footer) = frame_layout(f.area());
        let items = items(ctx);
        self.selected = self.selected.min(items.len() - 1);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(LOGO.len() as u16 + 2),
                Constraint::Length(items.len() as u16),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(body);

        let logo: Vec<Line> = LOGO
            .iter()
            .map(|row| Line::from(Span::styled(*row, accent())))
            .chain([Line::from(Span::styled("mental arithmetic drills", dim()))])
            .collect();
        f.render_widget(Paragraph::new(logo).alignment(Alignment::Center), chunks[1]);

        let list_items: Vec<ListItem> = items
            .iter()
            .map(|item| {
                let label = match (item, ctx.config.last_played()) {
                    (MenuItem::QuickPlay, Some(last)) => format!(
                        "Quick Play · {} · {} · {}s",
                        last.mode_id,
                        last.difficulty,
                        last.duration.as_secs()
                    ),
                    _ => item.label().to_string(),
                };
                ListItem::new(Line::from(label).alignment(Alignment::Center))
            })
            .collect();
        let mut state = ListState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(
            List::new(list_items).highlight_style(selected()),
            chunks[2],
            &mut state,
        );

        if let Some(info) = ctx.update_available() {
            let mut notice = format!("Update available: {} → {}", info.current, info.latest);
            if Browser::is_available() {
                notice.push_str("  (u) open release page");
            }
            f.render_widget(
                Paragraph::new(Span::styled(notice, Style::default().fg(Color::Yellow)))
                    .alignment(Alignment::Center),
                chunks[3],
            );
        }

        render_hints(
            f,
            footer,
            &[("↑↓", "move"), ("enter", "select"), ("q", "quit")],
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

    #[test]
    fn enter_emits_selected_item() {
        let ctx = test_context();
        let mut menu = MenuScreen::new();
        assert_eq!(menu.handle_key(key(KeyCode::Enter), &ctx), Some(Transition::OpenModes));

        menu.handle_key(key(KeyCode::Down), &ctx);
        assert_eq!(
            menu.handle_key(key(KeyCode::Enter), &ctx),
            Some(Transition::OpenPractice)
        );

        menu.handle_key(key(KeyCode::Up), &ctx);
        menu.handle_key(key(KeyCode::Up), &ctx);
        assert_eq!(menu.handle_key(key(KeyCode::Enter), &ctx), Some(Transition::QuitApp));
    }

    #[test]
    fn quick_play_is_offered_after_a_game() {
        let mut ctx = test_context();
        ctx.config.set_last_played(
            "cubes",
            crate::operation::Difficulty::Hard,
            Duration::from_secs(30),
        );
        let mut menu = MenuScreen::new();
        assert_eq!(menu.handle_key(key(KeyCode::Enter), &ctx), Some(Transition::QuickPlay));

        let text = render_to_string(80, 24, |f| menu.render(f, &ctx));
        assert!(text.contains("Quick Play · cubes · Hard · 30s"));
    }

    #[test]
    fn update_key_requires_an_update() {
        let ctx = test_context();
        let mut menu = MenuScreen::new();
        assert_eq!(menu.handle_key(key(KeyCode::Char('u')), &ctx), None);
    }

    #[test]
    fn renders_items() {
        let ctx = test_context();
        let mut menu = MenuScreen::new();
        let text = render_to_string(80, 24, |f| menu.render(f, &ctx));
        for label in ["Play", "Practice", "Statistics", "Settings", "Quit"] {
            assert!(text.contains(label), "missing {label}");
        }
    }
}
