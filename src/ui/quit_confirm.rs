use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::screen::{AppContext, Screen, Transition};
use super::{bold, centered_rows, dim, frame_layout, render_hints};

/// Asks before abandoning a running game
#[derive(Debug, Default)]
pub struct QuitConfirmScreen {
    dont_ask_again: bool,
}

impl QuitConfirmScreen {
    pub fn open(&mut self) {
        self.dont_ask_again = false;
    }
}

impl Screen for QuitConfirmScreen {
    fn handle_key(&mut self, key: KeyEvent, _ctx: &AppContext) -> Option<Transition> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(Transition::ConfirmQuit {
                dont_ask_again: self.dont_ask_again,
            }),
            KeyCode::Char('n') | KeyCode::Esc => Some(Transition::CancelQuit),
            KeyCode::Char('d') => {
                self.dont_ask_again = !self.dont_ask_again;
                None
            }
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, _ctx: &AppContext) {
        let (_, body, footer) = frame_layout(f.area());
        let checkbox = if self.dont_ask_again { "[x]" } else { "[ ]" };
        let lines = vec![
            Line::from(Span::styled("Quit this game?", bold())),
            Line::from(Span::styled("Progress will not be saved.", dim())),
            Line::from(""),
            Line::from(Span::styled(format!("{checkbox} don't ask again"), dim())),
        ];
        let area = centered_rows(body, lines.len() as u16 + 2);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
        render_hints(f, footer, &[("y", "quit"), ("n", "keep playing"), ("d", "toggle")]);
    }
}
