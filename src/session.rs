use std::sync::Arc;
use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::operation::{generate_choices, Choices, Difficulty, Operation, Problem};
use crate::scoring;
use crate::util::{mean, std_dev};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub points: i64,
}

/// One answered or skipped question
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub problem: Problem,
    pub user_answer: Option<i64>,
    pub correct: bool,
    pub skipped: bool,
    pub response_time: Duration,
    pub points: i64,
}

/// Immutable copy of a session, handed to the results screen
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub difficulty: Difficulty,
    pub total_duration: Duration,
    pub remaining: Duration,
    pub state: SessionState,
    pub score: Score,
    pub history: Vec<AnswerRecord>,
}

impl SessionSnapshot {
    pub fn answered(&self) -> u32 {
        self.score.correct + self.score.incorrect
    }

    /// Percentage of answered (not skipped) questions that were correct
    pub fn accuracy(&self) -> f64 {
        match self.answered() {
            0 => 0.0,
            n => self.score.correct as f64 / n as f64 * 100.0,
        }
    }

    fn response_secs(&self) -> Vec<f64> {
        self.history
            .iter()
            .filter(|r| !r.skipped)
            .map(|r| r.response_time.as_secs_f64())
            .collect()
    }

    pub fn avg_response_time(&self) -> Option<Duration> {
        mean(&self.response_secs()).map(Duration::from_secs_f64)
    }

    pub fn response_std_dev(&self) -> Option<Duration> {
        std_dev(&self.response_secs()).map(Duration::from_secs_f64)
    }

    pub fn fastest_response_time(&self) -> Option<Duration> {
        self.history
            .iter()
            .filter(|r| r.correct)
            .map(|r| r.response_time)
            .min()
    }
}

/// A single timed run. Time only advances through [`Session::tick`], so a
/// paused session never loses time.
#[derive(Debug)]
pub struct Session {
    operations: Vec<Arc<dyn Operation>>,
    difficulty: Difficulty,
    total_duration: Duration,
    remaining: Duration,
    state: SessionState,
    current_op: usize,
    current_problem: Problem,
    // multiple-choice options for the current problem
    choices: Choices,
    // session clock value when the current problem was shown
    shown_at: Duration,
    score: Score,
    history: Vec<AnswerRecord>,
    milestone: Option<&'static str>,
    rng: StdRng,
}

impl Session {
    /// Panics if `operations` is empty.
    pub fn new(
        operations: Vec<Arc<dyn Operation>>,
        difficulty: Difficulty,
        total_duration: Duration,
    ) -> Self {
        Self::with_rng(operations, difficulty, total_duration, StdRng::from_entropy())
    }

    pub fn with_rng(
        operations: Vec<Arc<dyn Operation>>,
        difficulty: Difficulty,
        total_duration: Duration,
        mut rng: StdRng,
    ) -> Self {
        assert!(
            !operations.is_empty(),
            "cannot start a session without operations"
        );
        let current_op = rng.gen_range(0..operations.len());
        let current_problem = operations[current_op].generate(difficulty, &mut rng);
        let choices = generate_choices(current_problem.answer, difficulty, &mut rng);

        Self {
            operations,
            difficulty,
            total_duration,
            remaining: total_duration,
            state: SessionState::Running,
            current_op,
            current_problem,
            choices,
            shown_at: Duration::ZERO,
            score: Score::default(),
            history: Vec::new(),
            milestone: None,
            rng,
        }
    }

    pub fn operations(&self) -> &[Arc<dyn Operation>] {
        &self.operations
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn elapsed(&self) -> Duration {
        self.total_duration - self.remaining
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_problem(&self) -> &Problem {
        &self.current_problem
    }

    pub fn choices(&self) -> &Choices {
        &self.choices
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    pub fn last_answer(&self) -> Option<&AnswerRecord> {
        self.history.last()
    }

    /// Milestone reached by the most recent answer, if any
    pub fn milestone(&self) -> Option<&'static str> {
        self.milestone
    }

    fn accepts_input(&self) -> bool {
        self.state == SessionState::Running && !self.remaining.is_zero()
    }

    /// Advance the clock. Returns the final snapshot on the tick that ends
    /// the session, and `None` otherwise.
    pub fn tick(&mut self, dt: Duration) -> Option<SessionSnapshot> {
        if self.state != SessionState::Running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.state = SessionState::Ended;
            tracing::debug!(points = self.score.points, "session ended");
            return Some(self.snapshot());
        }
        None
    }

    /// Score an answer. Returns whether it was correct, or `None` when the
    /// session is not accepting answers.
    pub fn submit(&mut self, answer: i64) -> Option<bool> {
        if !self.accepts_input() {
            return None;
        }
        let response_time = self.elapsed() - self.shown_at;
        let correct = self.operations[self.current_op].check(&self.current_problem, answer);

        let points = if correct {
            let points =
                scoring::points_for_correct(self.difficulty, response_time, self.score.streak);
            self.score.correct += 1;
            self.score.streak += 1;
            self.score.best_streak = self.score.best_streak.max(self.score.streak);
            self.milestone = scoring::milestone(self.score.streak);
            points
        } else {
            self.score.incorrect += 1;
            self.score.streak = 0;
            self.milestone = None;
            scoring::POINTS_WRONG
        };
        self.score.points += points;

        self.record(Some(answer), correct, false, response_time, points);
        Some(correct)
    }

    /// Give up on the current problem; resets the streak.
    pub fn skip(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let response_time = self.elapsed() - self.shown_at;
        self.score.skipped += 1;
        self.score.streak = 0;
        self.milestone = None;
        self.score.points += scoring::POINTS_SKIP;
        self.record(None, false, true, response_time, scoring::POINTS_SKIP);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.state = SessionState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            return false;
        }
        self.state = SessionState::Running;
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            difficulty: self.difficulty,
            total_duration: self.total_duration,
            remaining: self.remaining,
            state: self.state,
            score: self.score.clone(),
            history: self.history.clone(),
        }
    }

    fn record(
        &mut self,
        user_answer: Option<i64>,
        correct: bool,
        skipped: bool,
        response_time: Duration,
        points: i64,
    ) {
        let next_op = self.rng.gen_range(0..self.operations.len());
        let next = self.operations[next_op].generate(self.difficulty, &mut self.rng);
        self.choices = generate_choices(next.answer, self.difficulty, &mut self.rng);
        let problem = std::mem::replace(&mut self.current_problem, next);
        self.current_op = next_op;
        self.shown_at = self.elapsed();

        self.history.push(AnswerRecord {
            problem,
            user_answer,
            correct,
            skipped,
            response_time,
            points,
        });
    }
}
