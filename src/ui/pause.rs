use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Alignment, text::Line, text::Span, widgets::Paragraph, Frame};

use super::screen::{AppContext, Screen, Transition};
use super::{accent, centered_rows, dim, frame_layout, render_hints};
use crate::util::format_clock;

#[derive(Debug, Default)]
pub struct PauseScreen;

impl Screen for PauseScreen {
    fn handle_key(&mut self, key: KeyEvent, _ctx: &AppContext) -> Option<Transition> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('p') | KeyCode::Char(' ') => Some(Transition::Resume),
            KeyCode::Char('q') | KeyCode::Esc => Some(Transition::QuitToMenu),
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, ctx: &AppContext) {
        let (_, body, footer) = frame_layout(f.area());
        let remaining = ctx
            .session
            .as_ref()
            .map(|s| format!("{} left", format_clock(s.remaining())))
            .unwrap_or_default();

        let lines = vec![
            Line::from(Span::styled("PAUSED", accent())),
            Line::from(""),
            Line::from(Span::styled(remaining, dim())),
        ];
        let area = centered_rows(body, lines.len() as u16);
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
        render_hints(f, footer, &[("enter", "resume"), ("q", "quit to menu")]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_context;
    use crossterm::event::KeyModifiers;

    #[test]
    fn resume_and_quit() {
        let ctx = test_context();
        let mut pause = PauseScreen;
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(pause.handle_key(key(KeyCode::Enter), &ctx), Some(Transition::Resume));
        assert_eq!(pause.handle_key(key(KeyCode::Char('q')), &ctx), Some(Transition::QuitToMenu));
        assert_eq!(pause.handle_key(key(KeyCode::Char('x')), &ctx), None);
    }
}
