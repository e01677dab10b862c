use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};

use super::screen::{AppContext, Screen, Transition};
use super::{accent, bad, bold, dim, edit_answer, frame_layout, good, render_hints, selected};
use crate::modes::InputMethod;
use crate::util::format_clock;

/// The timed play view: problem, answer input, clock and score
#[derive(Debug, Default)]
pub struct GameScreen {
    input_method: InputMethod,
    input: String,
    // highlighted option in multiple-choice play
    cursor: usize,
}

impl GameScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, input_method: InputMethod) {
        self.input_method = input_method;
        self.input.clear();
        self.cursor = 0;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_method(&self) -> InputMethod {
        self.input_method
    }

    fn handle_typing(&mut self, key: &KeyEvent) -> Option<Transition> {
        if edit_answer(&mut self.input, key) {
            return None;
        }
        if key.code != KeyCode::Enter {
            return None;
        }
        let answer = self.input.parse::<i64>().ok()?;
        self.input.clear();
        Some(Transition::Submit(answer))
    }

    /// 1-4 pick an option directly; arrows move the highlight and enter picks it
    fn handle_choice(&mut self, key: &KeyEvent, ctx: &AppContext) -> Option<Transition> {
        let choices = ctx.session.as_ref()?.choices();
        let count = choices.values.len();
        let picked = match key.code {
            KeyCode::Char(c @ '1'..='4') => Some(c as usize - '1' as usize),
            KeyCode::Enter => Some(self.cursor),
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                self.cursor = (self.cursor + count - 1) % count;
                None
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1) % count;
                None
            }
            _ => None,
        }?;
        self.cursor = 0;
        Some(Transition::Submit(choices.values[picked]))
    }
}

impl Screen for GameScreen {
    fn handle_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Transition> {
        match key.code {
            KeyCode::Char('s') | KeyCode::Char(' ') => {
                self.input.clear();
                self.cursor = 0;
                Some(Transition::Skip)
            }
            KeyCode::Char('p') => Some(Transition::Pause),
            KeyCode::Char('q') | KeyCode::Esc => Some(Transition::QuitRequested),
            _ => match self.input_method {
                InputMethod::Typing => self.handle_typing(&key),
                InputMethod::MultipleChoice => self.handle_choice(&key, ctx),
            },
        }
    }

    fn render(&mut self, f: &mut Frame, ctx: &AppContext) {
        let (header, body, footer) = frame_layout(f.area());
        let Some(session) = ctx.session.as_ref() else {
            unreachable!("the game screen is only opened with an active session");
        };

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(header);
        let score = session.score();
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("{} pts", score.points), bold()),
                Span::styled(format!("   ✓ {}  ✗ {}", score.correct, score.incorrect), dim()),
            ])),
            top[0],
        );
        let streak_style = if score.streak >= 5 {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            dim()
        };
        f.render_widget(
            Paragraph::new(Span::styled(format!("streak {}", score.streak), streak_style))
                .alignment(Alignment::Right),
            top[1],
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(body);

        let total = session.total_duration().as_secs_f64().max(f64::EPSILON);
        let ratio = (session.remaining().as_secs_f64() / total).clamp(0.0, 1.0);
        let gauge_color = if ratio < 0.2 { Color::Red } else { Color::Cyan };
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(gauge_color))
                .ratio(ratio)
                .label(format_clock(session.remaining())),
            chunks[0],
        );

        let problem = session.current_problem();
        f.render_widget(
            Paragraph::new(Span::styled(format!("{} = ?", problem.display), accent()))
                .alignment(Alignment::Center),
            chunks[2],
        );

        let answer_line = match self.input_method {
            InputMethod::Typing => {
                let input = if self.input.is_empty() {
                    Span::styled("_", dim())
                } else {
                    Span::styled(format!("{}_", self.input), bold())
                };
                Line::from(vec![Span::styled("› ", dim()), input])
            }
            InputMethod::MultipleChoice => {
                let mut spans = Vec::new();
                for (i, value) in session.choices().values.iter().enumerate() {
                    if i > 0 {
                        spans.push(Span::raw("    "));
                    }
                    let style = if i == self.cursor { selected() } else { bold() };
                    spans.push(Span::styled(format!(" {}) {value} ", i + 1), style));
                }
                Line::from(spans)
            }
        };
        f.render_widget(
            Paragraph::new(answer_line).alignment(Alignment::Center),
            chunks[4],
        );

        let feedback = match session.last_answer() {
            Some(last) if last.skipped => Span::styled(
                format!("skipped · {} = {}", last.problem.display, last.problem.answer),
                dim(),
            ),
            Some(last) if last.correct => Span::styled(format!("correct +{}", last.points), good()),
            Some(last) => Span::styled(
                format!("{} = {}  ({})", last.problem.display, last.problem.answer, last.points),
                bad(),
            ),
            None => Span::raw(""),
        };
        f.render_widget(
            Paragraph::new(feedback).alignment(Alignment::Center),
            chunks[6],
        );

        if let Some(milestone) = session.milestone() {
            f.render_widget(
                Paragraph::new(Span::styled(
                    format!("streak {} · {milestone}", score.streak),
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center),
                chunks[5],
            );
        }

        let hints: &[(&str, &str)] = match self.input_method {
            InputMethod::Typing => &[("enter", "submit"), ("s", "skip"), ("p", "pause"), ("q", "quit")],
            InputMethod::MultipleChoice => &[
                ("1-4", "answer"),
                ("←→", "choose"),
                ("s", "skip"),
                ("p", "pause"),
                ("q", "quit"),
            ],
        };
        render_hints(f, footer, hints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_context;
    use crate::operation::{Builtin, Difficulty};
    use crate::session::Session;
    use crate::ui::test_support::render_to_string;
    use crossterm::event::KeyModifiers;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Arc;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typed_digits_submit_as_number() {
        let ctx = test_context();
        let mut game = GameScreen::new();
        for c in ['-', '1', '2'] {
            assert_eq!(game.handle_key(key(KeyCode::Char(c)), &ctx), None);
        }
        assert_eq!(game.input(), "-12");
        assert_eq!(
            game.handle_key(key(KeyCode::Enter), &ctx),
            Some(Transition::Submit(-12))
        );
        assert_eq!(game.input(), "");
    }

    #[test]
    fn empty_or_bare_minus_does_not_submit() {
        let ctx = test_context();
        let mut game = GameScreen::new();
        assert_eq!(game.handle_key(key(KeyCode::Enter), &ctx), None);
        game.handle_key(key(KeyCode::Char('-')), &ctx);
        assert_eq!(game.handle_key(key(KeyCode::Enter), &ctx), None);
    }

    #[test]
    fn control_keys() {
        let ctx = test_context();
        let mut game = GameScreen::new();
        assert_eq!(game.handle_key(key(KeyCode::Char('s')), &ctx), Some(Transition::Skip));
        assert_eq!(game.handle_key(key(KeyCode::Char('p')), &ctx), Some(Transition::Pause));
        assert_eq!(
            game.handle_key(key(KeyCode::Esc), &ctx),
            Some(Transition::QuitRequested)
        );
    }

    #[test]
    fn renders_problem_and_clock() {
        let mut ctx = test_context();
        let session = Session::with_rng(
            vec![Arc::new(Builtin::Square)],
            Difficulty::Beginner,
            Duration::from_secs(90),
            StdRng::seed_from_u64(9),
        );
        let display = session.current_problem().display.clone();
        ctx.session = Some(session);

        let mut game = GameScreen::new();
        let text = render_to_string(80, 20, |f| game.render(f, &ctx));
        assert!(text.contains(&format!("{display} = ?")));
        assert!(text.contains("1:30"));
        assert!(text.contains("0 pts"));
    }

    fn choice_context() -> AppContext {
        let mut ctx = test_context();
        ctx.session = Some(Session::with_rng(
            vec![Arc::new(Builtin::Multiplication)],
            Difficulty::Medium,
            Duration::from_secs(60),
            StdRng::seed_from_u64(4),
        ));
        ctx
    }

    #[test]
    fn number_keys_pick_a_choice() {
        let ctx = choice_context();
        let values = ctx.session.as_ref().unwrap().choices().values;
        let mut game = GameScreen::new();
        game.reset(InputMethod::MultipleChoice);

        assert_eq!(
            game.handle_key(key(KeyCode::Char('3')), &ctx),
            Some(Transition::Submit(values[2]))
        );
        assert_eq!(game.handle_key(key(KeyCode::Char('5')), &ctx), None);
        assert_eq!(game.input(), "");
    }

    #[test]
    fn arrows_move_the_highlight_and_enter_submits_it() {
        let ctx = choice_context();
        let values = ctx.session.as_ref().unwrap().choices().values;
        let mut game = GameScreen::new();
        game.reset(InputMethod::MultipleChoice);

        assert_eq!(game.handle_key(key(KeyCode::Left), &ctx), None);
        assert_eq!(
            game.handle_key(key(KeyCode::Enter), &ctx),
            Some(Transition::Submit(values[3]))
        );
        game.handle_key(key(KeyCode::Right), &ctx);
        assert_eq!(
            game.handle_key(key(KeyCode::Enter), &ctx),
            Some(Transition::Submit(values[1]))
        );
        assert_eq!(game.handle_key(key(KeyCode::Char('s')), &ctx), Some(Transition::Skip));
    }

    #[test]
    fn renders_numbered_choices() {
        let ctx = choice_context();
        let values = ctx.session.as_ref().unwrap().choices().values;
        let mut game = GameScreen::new();
        game.reset(InputMethod::MultipleChoice);
        let text = render_to_string(100, 20, |f| game.render(f, &ctx));
        for (i, value) in values.iter().enumerate() {
            assert!(text.contains(&format!("{}) {value}", i + 1)), "{text}");
        }
        assert!(text.contains("1-4"));
    }

    #[test]
    #[should_panic(expected = "active session")]
    fn rendering_without_a_session_is_a_bug() {
        let ctx = test_context();
        let mut game = GameScreen::new();
        render_to_string(80, 20, |f| game.render(f, &ctx));
    }
}
