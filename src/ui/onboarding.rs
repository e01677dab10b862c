use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::screen::{AppContext, GameSetup, Screen, Transition};
use super::{
    accent, bold, centered_rows, dim, frame_layout, is_down, is_up, render_hints, render_title,
    selected, step_index,
};
use crate::modes::{find_duration_index, InputMethod, ALLOWED_DURATIONS, DEFAULT_MODE_ID};
use crate::operation::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Welcome,
    Mode,
    Difficulty,
    Duration,
    Input,
}

/// First-run walkthrough ending in the player's first game
#[derive(Debug)]
pub struct OnboardingScreen {
    step: Step,
    mode_index: usize,
    difficulty: Difficulty,
    duration_index: usize,
    input_method: InputMethod,
}

impl Default for OnboardingScreen {
    fn default() -> Self {
        Self {
            step: Step::Welcome,
            mode_index: 0,
            difficulty: Difficulty::Easy,
            duration_index: find_duration_index(std::time::Duration::from_secs(60)),
            input_method: InputMethod::Typing,
        }
    }
}

impl OnboardingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart at the welcome step with the default mode preselected
    pub fn open(&mut self, ctx: &AppContext) {
        *self = Self::default();
        self.mode_index = ctx
            .modes
            .all()
            .iter()
            .position(|m| m.id == DEFAULT_MODE_ID)
            .unwrap_or(0);
    }

    fn choices(&self, ctx: &AppContext) -> Vec<String> {
        match self.step {
            Step::Welcome => Vec::new(),
            Step::Mode => ctx.modes.all().iter().map(|m| m.name.clone()).collect(),
            Step::Difficulty => Difficulty::ALL.iter().map(|d| d.to_string()).collect(),
            Step::Duration => ALLOWED_DURATIONS.iter().map(|d| d.label.to_string()).collect(),
            Step::Input => InputMethod::ALL.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn cursor(&mut self) -> Option<&mut usize> {
        match self.step {
            Step::Welcome | Step::Difficulty | Step::Input => None,
            Step::Mode => Some(&mut self.mode_index),
            Step::Duration => Some(&mut self.duration_index),
        }
    }

    fn selected_index(&self) -> usize {
        match self.step {
            Step::Welcome => 0,
            Step::Mode => self.mode_index,
            Step::Difficulty => self.difficulty.index(),
            Step::Duration => self.duration_index,
            Step::Input => self.input_method.index(),
        }
    }

    fn advance(&mut self, ctx: &AppContext) -> Option<Transition> {
        self.step = match self.step {
            Step::Welcome => Step::Mode,
            Step::Mode => Step::Difficulty,
            Step::Difficulty => Step::Duration,
            Step::Duration => Step::Input,
            Step::Input => {
                let mode = ctx.modes.all().get(self.mode_index).map(|m| m.id.clone())?;
                return Some(Transition::OnboardingComplete(GameSetup {
                    mode_id: mode,
                    difficulty: self.difficulty,
                    duration: ALLOWED_DURATIONS[self.duration_index].value,
                    input_method: self.input_method,
                }));
            }
        };
        None
    }

    fn back(&mut self) -> Option<Transition> {
        self.step = match self.step {
            Step::Welcome => return Some(Transition::SkipOnboarding),
            Step::Mode => Step::Welcome,
            Step::Difficulty => Step::Mode,
            Step::Duration => Step::Difficulty,
            Step::Input => Step::Duration,
        };
        None
    }

    fn step_title(&self) -> &'static str {
        match self.step {
            Step::Welcome => "Welcome to mathdash",
            Step::Mode => "Pick a mode",
            Step::Difficulty => "How hard?",
            Step::Duration => "How long?",
            Step::Input => "Type answers or pick them?",
        }
    }
}

impl Screen for OnboardingScreen {
    fn handle_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Transition> {
        let len = self.choices(ctx).len();
        let moved = if is_up(&key) {
            Some(false)
        } else if is_down(&key) {
            Some(true)
        } else {
            None
        };
        if let Some(forward) = moved {
            if self.step == Step::Difficulty {
                self.difficulty = if forward {
                    self.difficulty.next()
                } else {
                    self.difficulty.prev()
                };
            } else if self.step == Step::Input {
                self.input_method = self.input_method.toggle();
            } else if let Some(cursor) = self.cursor() {
                *cursor = step_index(*cursor, len, forward);
            }
            return None;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.advance(ctx),
            KeyCode::Esc => self.back(),
            KeyCode::Char('s') if self.step == Step::Welcome => Some(Transition::SkipOnboarding),
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, ctx: &AppContext) {
        let (header, body, footer) = frame_layout(f.area());
        render_title(f, header, self.step_title());

        let mut lines = Vec::new();
        if self.step == Step::Welcome {
            lines.extend([
                Line::from(Span::styled("Timed mental arithmetic drills.", bold())),
                Line::from(""),
                Line::from(Span::styled(
                    "Answer as many problems as you can before the clock runs out.",
                    dim(),
                )),
                Line::from(Span::styled(
                    "Fast answers and long streaks earn bonus points.",
                    dim(),
                )),
                Line::from(""),
                Line::from(Span::styled("Press enter to set up your first game", accent())),
            ]);
        } else {
            let current = self.selected_index();
            lines.extend(self.choices(ctx).into_iter().enumerate().map(|(i, choice)| {
                if i == current {
                    Line::from(Span::styled(format!(" {choice} "), selected()))
                } else {
                    Line::from(Span::raw(choice))
                }
            }));
        }
        let area = centered_rows(body, lines.len() as u16);
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);

        let hints: &[(&str, &str)] = if self.step == Step::Welcome {
            &[("enter", "start"), ("s", "skip")]
        } else {
            &[("↑↓", "choose"), ("enter", "next"), ("esc", "back")]
        };
        render_hints(f, footer, hints);
    }
}
