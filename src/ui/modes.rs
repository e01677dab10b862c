use crossterm::event::{KeyCode, KeyEvent};
use itertools::Itertools;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::screen::{AppContext, Screen, Transition};
use super::{accent, bold, dim, frame_layout, is_down, is_up, pad, render_hints, render_title, selected, step_index};
use crate::modes::{Mode, ModeCategory};

/// Modes in browsing order: every Sprint, then every Challenge
fn browse_order(ctx: &AppContext) -> Vec<&Mode> {
    [ModeCategory::Sprint, ModeCategory::Challenge]
        .into_iter()
        .flat_map(|category| ctx.modes.by_category(category))
        .collect()
}

#[derive(Debug, Default)]
pub struct ModeBrowser {
    selected: usize,
}

impl ModeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }
}

impl Screen for ModeBrowser {
    fn handle_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Transition> {
        let modes = browse_order(ctx);
        if is_up(&key) {
            self.selected = step_index(self.selected, modes.len(), false);
            return None;
        }
        if is_down(&key) {
            self.selected = step_index(self.selected, modes.len(), true);
            return None;
        }
        match key.code {
            KeyCode::Enter => modes
                .get(self.selected)
                .map(|mode| Transition::ModeChosen(mode.id.clone())),
            KeyCode::Esc | KeyCode::Char('q') => Some(Transition::BackToMenu),
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, ctx: &AppContext) {
        let (header, body, footer) = frame_layout(f.area());
        render_title(f, header, "Choose a mode");

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(body);

        let modes = browse_order(ctx);
        let mut items = Vec::new();
        let mut list_index = None;
        let mut current_category = None;
        for (i, mode) in modes.iter().enumerate() {
            if current_category != Some(mode.category) {
                current_category = Some(mode.category);
                items.push(ListItem::new(Line::from(Span::styled(
                    mode.category.to_string().to_uppercase(),
                    dim(),
                ))));
            }
            if i == self.selected {
                list_index = Some(items.len());
            }
            items.push(ListItem::new(format!("  {}", mode.name)));
        }

        let mut state = ListState::default().with_selected(list_index);
        f.render_stateful_widget(
            List::new(items)
                .block(Block::default().borders(Borders::RIGHT))
                .highlight_style(selected()),
            chunks[0],
            &mut state,
        );

        if let Some(mode) = modes.get(self.selected) {
            let detail = vec![
                Line::from(Span::styled(mode.name.clone(), accent())),
                Line::from(""),
                Line::from(mode.description.clone()),
                Line::from(""),
                Line::from(vec![
                    Span::styled(pad("Operations", 12), dim()),
                    Span::styled(mode.operation_names().iter().join(", "), bold()),
                ]),
                Line::from(vec![
                    Span::styled(pad("Difficulty", 12), dim()),
                    Span::styled(mode.default_difficulty.to_string(), bold()),
                ]),
                Line::from(vec![
                    Span::styled(pad("Duration", 12), dim()),
                    Span::styled(format!("{}s", mode.default_duration.as_secs()), bold()),
                ]),
            ];
            let area = chunks[1].inner(ratatui::layout::Margin::new(2, 0));
            f.render_widget(Paragraph::new(detail).wrap(Wrap { trim: true }), area);
        }

        render_hints(f, footer, &[("↑↓", "move"), ("enter", "choose"), ("esc", "back")]);
    }
}
