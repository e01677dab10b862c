pub mod charting;
pub mod game;
pub mod launch;
pub mod menu;
pub mod modes;
pub mod onboarding;
pub mod pause;
pub mod practice;
pub mod quit_confirm;
pub mod results;
pub mod screen;
pub mod settings;
pub mod statistics;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub const HORIZONTAL_MARGIN: u16 = 5;
pub const VERTICAL_MARGIN: u16 = 2;

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn accent() -> Style {
    bold().fg(Color::Cyan)
}

pub fn good() -> Style {
    bold().fg(Color::Green)
}

pub fn bad() -> Style {
    bold().fg(Color::Red)
}

pub fn selected() -> Style {
    Style::default().bg(Color::Cyan).fg(Color::Black)
}

/// Header, body and key-hint footer
pub fn frame_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN.min(area.height / 8))
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

pub fn render_title(f: &mut Frame, area: Rect, title: &str) {
    f.render_widget(
        Paragraph::new(Span::styled(title.to_string(), accent())).alignment(Alignment::Center),
        area,
    );
}

/// Footer such as `enter select · esc back`
pub fn render_hints(f: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ·  ", dim()));
        }
        spans.push(Span::styled(key.to_string(), bold()));
        spans.push(Span::styled(format!(" {action}"), dim()));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

/// A rect of `height` lines centered vertically within `area`
pub fn centered_rows(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        x: area.x,
        y: area.y + (area.height - height) / 2,
        width: area.width,
        height,
    }
}

/// Pad `label` on the right to `width` display columns
pub fn pad(label: &str, width: usize) -> String {
    let fill = width.saturating_sub(label.width());
    format!("{label}{}", " ".repeat(fill))
}

/// A `< value >` selector line
pub fn selector_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused { selected() } else { bold() };
    Line::from(vec![
        Span::styled(pad(label, 12), dim()),
        Span::styled(format!("‹ {value} ›"), style),
    ])
}

pub fn is_up(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Up | KeyCode::Char('k'))
}

pub fn is_down(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Down | KeyCode::Char('j'))
}

/// Wrapping step through `len` items
pub fn step_index(index: usize, len: usize, forward: bool) -> usize {
    match (len, forward) {
        (0, _) => 0,
        (_, true) => (index + 1) % len,
        (_, false) => (index + len - 1) % len,
    }
}

/// Digits and a leading minus sign for numeric answers
pub fn edit_answer(input: &mut String, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() && input.len() < 12 => {
            input.push(c);
            true
        }
        KeyCode::Char('-') if input.is_empty() => {
            input.push('-');
            true
        }
        KeyCode::Backspace => input.pop().is_some(),
        _ => false,
    }
}
