use crossterm::event::{KeyCode, KeyEvent};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::screen::{AppContext, Screen, Transition};
use super::{
    accent, bad, bold, centered_rows, dim, edit_answer, frame_layout, good, render_hints,
    render_title, selector_line, step_index,
};
use crate::operation::{Difficulty, Problem};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Feedback {
    Correct,
    Wrong { problem: String, answer: i64 },
}

/// Untimed drill on a single operation with immediate feedback
#[derive(Debug)]
pub struct PracticeScreen {
    rng: StdRng,
    operation_index: usize,
    difficulty: Difficulty,
    problem: Option<Problem>,
    input: String,
    feedback: Option<Feedback>,
    solved: u32,
    attempts: u32,
}

impl Default for PracticeScreen {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl PracticeScreen {
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            operation_index: 0,
            difficulty: Difficulty::Easy,
            problem: None,
            input: String::new(),
            feedback: None,
            solved: 0,
            attempts: 0,
        }
    }

    /// Start fresh with the user's default difficulty
    pub fn open(&mut self, ctx: &AppContext) {
        self.difficulty = ctx.config.default_difficulty;
        self.solved = 0;
        self.attempts = 0;
        self.feedback = None;
        self.input.clear();
        self.next_problem(ctx);
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    fn next_problem(&mut self, ctx: &AppContext) {
        let operations = ctx.operations.all();
        self.operation_index = self.operation_index.min(operations.len().saturating_sub(1));
        self.problem = operations
            .get(self.operation_index)
            .map(|op| op.generate(self.difficulty, &mut self.rng));
    }

    fn check(&mut self, ctx: &AppContext) {
        let (Some(problem), Ok(answer)) = (self.problem.as_ref(), self.input.parse::<i64>()) else {
            return;
        };
        let correct = ctx
            .operations
            .get(problem.operation)
            .is_some_and(|op| op.check(problem, answer));

        self.attempts += 1;
        self.input.clear();
        if correct {
            self.solved += 1;
            self.feedback = Some(Feedback::Correct);
            self.next_problem(ctx);
        } else {
            self.feedback = Some(Feedback::Wrong {
                problem: problem.display.clone(),
                answer: problem.answer,
            });
        }
    }
}

impl Screen for PracticeScreen {
    fn handle_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Transition> {
        if self.problem.is_none() {
            self.next_problem(ctx);
        }
        if edit_answer(&mut self.input, &key) {
            return None;
        }
        match key.code {
            KeyCode::Enter => self.check(ctx),
            KeyCode::Tab | KeyCode::BackTab => {
                let len = ctx.operations.all().len();
                let forward = key.code == KeyCode::Tab;
                self.operation_index = step_index(self.operation_index, len, forward);
                self.feedback = None;
                self.next_problem(ctx);
            }
            KeyCode::Left | KeyCode::Right => {
                self.difficulty = if key.code == KeyCode::Right {
                    self.difficulty.next()
                } else {
                    self.difficulty.prev()
                };
                self.feedback = None;
                self.next_problem(ctx);
            }
            // reveal and move on
            KeyCode::Char('n') => {
                self.input.clear();
                self.feedback = None;
                self.next_problem(ctx);
            }
            KeyCode::Esc | KeyCode::Char('q') => return Some(Transition::BackToMenu),
            _ => {}
        }
        None
    }

    fn render(&mut self, f: &mut Frame, ctx: &AppContext) {
        let (header, body, footer) = frame_layout(f.area());
        render_title(f, header, "Practice");

        let operation = ctx
            .operations
            .all()
            .get(self.operation_index)
            .map(|op| op.name())
            .unwrap_or("-");
        let problem = self
            .problem
            .as_ref()
            .map(|p| format!("{} = ?", p.display))
            .unwrap_or_default();
        let feedback = match &self.feedback {
            Some(Feedback::Correct) => Span::styled("correct!", good()),
            Some(Feedback::Wrong { problem, answer }) => {
                Span::styled(format!("not quite · {problem} = {answer}"), bad())
            }
            None => Span::raw(""),
        };

        let lines = vec![
            selector_line("Operation", operation, false),
            selector_line("Difficulty", &self.difficulty.to_string(), false),
            Line::from(""),
            Line::from(Span::styled(problem, accent())),
            Line::from(vec![
                Span::styled("› ", dim()),
                Span::styled(format!("{}_", self.input), bold()),
            ]),
            Line::from(""),
            Line::from(feedback),
            Line::from(Span::styled(
                format!("{} / {} solved", self.solved, self.attempts),
                dim(),
            )),
        ];
        let area = centered_rows(body, lines.len() as u16);
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);

        render_hints(
            f,
            footer,
            &[
                ("tab", "operation"),
                ("←→", "difficulty"),
                ("n", "next"),
                ("esc", "menu"),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_context;
    use crate::ui::test_support::render_to_string;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_answer(practice: &mut PracticeScreen, ctx: &AppContext, answer: i64) {
        for c in answer.to_string().chars() {
            practice.handle_key(key(KeyCode::Char(c)), ctx);
        }
        practice.handle_key(key(KeyCode::Enter), ctx);
    }

    #[test]
    fn correct_answer_moves_on() {
        let ctx = test_context();
        let mut practice = PracticeScreen::with_rng(StdRng::seed_from_u64(11));
        practice.open(&ctx);

        let answer = practice.problem().unwrap().answer;
        type_answer(&mut practice, &ctx, answer);
        assert_eq!(practice.feedback, Some(Feedback::Correct));
        assert_eq!((practice.solved, practice.attempts), (1, 1));
    }

    #[test]
    fn wrong_answer_keeps_problem_and_reveals_answer() {
        let ctx = test_context();
        let mut practice = PracticeScreen::with_rng(StdRng::seed_from_u64(11));
        practice.open(&ctx);

        let problem = practice.problem().unwrap().clone();
        type_answer(&mut practice, &ctx, problem.answer + 1);
        assert_eq!(practice.problem(), Some(&problem));
        assert_eq!(
            practice.feedback,
            Some(Feedback::Wrong {
                problem: problem.display.clone(),
                answer: problem.answer,
            })
        );
    }

    #[test]
    fn tab_cycles_operations() {
        let ctx = test_context();
        let mut practice = PracticeScreen::with_rng(StdRng::seed_from_u64(2));
        practice.open(&ctx);
        assert_eq!(practice.problem().unwrap().operation, "Addition");

        practice.handle_key(key(KeyCode::Tab), &ctx);
        assert_eq!(practice.problem().unwrap().operation, "Subtraction");
        practice.handle_key(key(KeyCode::BackTab), &ctx);
        practice.handle_key(key(KeyCode::BackTab), &ctx);
        assert_eq!(practice.problem().unwrap().operation, "Factorial");
    }

    #[test]
    fn renders_operation_and_tally() {
        let ctx = test_context();
        let mut practice = PracticeScreen::with_rng(StdRng::seed_from_u64(2));
        practice.open(&ctx);
        let text = render_to_string(80, 24, |f| practice.render(f, &ctx));
        assert!(text.contains("‹ Addition ›"));
        assert!(text.contains("0 / 0 solved"));
    }
}
