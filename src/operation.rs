use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use rand::{seq::SliceRandom, Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Difficulty tier used for problem generation and scoring
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
pub enum Difficulty {
    Beginner,
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(name.trim()))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    pub fn prev(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }
}

/// Coarse grouping of operations, used by the mixed modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum OperationCategory {
    Basic,
    Powers,
    Advanced,
}

/// A generated question with its expected answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub operation: &'static str,
    pub operands: Vec<i64>,
    pub display: String,
    pub answer: i64,
}

/// A problem generator for one kind of calculation
pub trait Operation: Debug + Send + Sync {
    fn name(&self) -> &'static str;
    fn symbol(&self) -> &'static str;
    fn category(&self) -> OperationCategory;
    fn generate(&self, difficulty: Difficulty, rng: &mut dyn RngCore) -> Problem;

    /// Answers are integers; only an exact match counts.
    fn check(&self, problem: &Problem, answer: i64) -> bool {
        problem.answer == answer
    }
}

/// The built-in operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Square,
    Cube,
    SquareRoot,
    CubeRoot,
    Power,
    Modulo,
    Percentage,
    Factorial,
}

impl Builtin {
    pub const ALL: [Builtin; 12] = [
        Builtin::Addition,
        Builtin::Subtraction,
        Builtin::Multiplication,
        Builtin::Division,
        Builtin::Square,
        Builtin::Cube,
        Builtin::SquareRoot,
        Builtin::CubeRoot,
        Builtin::Power,
        Builtin::Modulo,
        Builtin::Percentage,
        Builtin::Factorial,
    ];
}

type Tier = [(i64, i64); 5];

const ADD: Tier = [(1, 9), (10, 50), (20, 200), (100, 500), (200, 999)];
const SUB_MINUEND: Tier = [(2, 9), (20, 99), (50, 300), (100, 999), (500, 9999)];
const SUB_FLOOR: [i64; 5] = [1, 10, 20, 50, 200];
const MUL_LEFT: Tier = [(2, 9), (2, 12), (5, 15), (10, 30), (15, 50)];
const MUL_RIGHT: Tier = [(2, 9), (10, 20), (10, 30), (10, 50), (20, 99)];
const DIV_DIVISOR: Tier = [(2, 9), (2, 12), (3, 15), (5, 20), (10, 30)];
const DIV_QUOTIENT: Tier = [(2, 9), (2, 12), (5, 20), (10, 30), (15, 50)];
const SQUARE: Tier = [(2, 10), (5, 15), (10, 20), (15, 30), (20, 50)];
const CUBE: Tier = [(2, 5), (2, 7), (4, 10), (6, 12), (8, 15)];
const SQRT_RESULT: Tier = [(2, 10), (5, 15), (10, 25), (15, 35), (25, 50)];
const CBRT_RESULT: Tier = [(2, 5), (3, 7), (5, 10), (7, 15), (10, 20)];
const POW_BASE: Tier = [(2, 10), (2, 12), (2, 10), (2, 8), (2, 6)];
const POW_EXP: Tier = [(2, 2), (2, 3), (2, 4), (3, 5), (4, 6)];
const MOD_DIVISOR: Tier = [(2, 9), (2, 12), (3, 15), (5, 25), (10, 50)];
const MOD_DIVIDEND: Tier = [(0, 0), (0, 50), (20, 100), (50, 200), (100, 500)];
const PCT_VALUE: Tier = [(10, 100), (10, 100), (20, 200), (50, 500), (100, 1000)];
const FACTORIAL: Tier = [(1, 4), (3, 5), (4, 6), (5, 8), (7, 10)];

const EASY_PERCENTS: &[i64] = &[10, 20, 25, 50, 75, 100];
const MEDIUM_PERCENTS: &[i64] = &[5, 10, 15, 20, 25, 30, 40, 50, 60, 75, 80];
const HARD_PERCENTS: &[i64] = &[5, 12, 15, 35, 45, 55, 65, 85, 95];

fn pick(rng: &mut dyn RngCore, (lo, hi): (i64, i64)) -> i64 {
    rng.gen_range(lo..=hi.max(lo))
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

fn factorial(n: i64) -> i64 {
    (1..=n).product()
}

impl Operation for Builtin {
    fn name(&self) -> &'static str {
        match self {
            Builtin::Addition => "Addition",
            Builtin::Subtraction => "Subtraction",
            Builtin::Multiplication => "Multiplication",
            Builtin::Division => "Division",
            Builtin::Square => "Square",
            Builtin::Cube => "Cube",
            Builtin::SquareRoot => "Square Root",
            Builtin::CubeRoot => "Cube Root",
            Builtin::Power => "Power",
            Builtin::Modulo => "Modulo",
            Builtin::Percentage => "Percentage",
            Builtin::Factorial => "Factorial",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Builtin::Addition => "+",
            Builtin::Subtraction => "−",
            Builtin::Multiplication => "×",
            Builtin::Division => "÷",
            Builtin::Square => "²",
            Builtin::Cube => "³",
            Builtin::SquareRoot => "√",
            Builtin::CubeRoot => "∛",
            Builtin::Power => "^",
            Builtin::Modulo => "mod",
            Builtin::Percentage => "% of",
            Builtin::Factorial => "!",
        }
    }

    fn category(&self) -> OperationCategory {
        match self {
            Builtin::Addition
            | Builtin::Subtraction
            | Builtin::Multiplication
            | Builtin::Division => OperationCategory::Basic,
            Builtin::Square | Builtin::Cube | Builtin::SquareRoot | Builtin::CubeRoot => {
                OperationCategory::Powers
            }
            Builtin::Power | Builtin::Modulo | Builtin::Percentage | Builtin::Factorial => {
                OperationCategory::Advanced
            }
        }
    }

    fn generate(&self, difficulty: Difficulty, rng: &mut dyn RngCore) -> Problem {
        let tier = difficulty.index();
        let (operands, display, answer) = match self {
            Builtin::Addition => {
                let (a, b) = (pick(rng, ADD[tier]), pick(rng, ADD[tier]));
                (vec![a, b], format!("{a} + {b}"), a + b)
            }
            Builtin::Subtraction => {
                let a = pick(rng, SUB_MINUEND[tier]);
                let b = pick(rng, (SUB_FLOOR[tier].min(a), a));
                (vec![a, b], format!("{a} − {b}"), a - b)
            }
            Builtin::Multiplication => {
                let (a, b) = (pick(rng, MUL_LEFT[tier]), pick(rng, MUL_RIGHT[tier]));
                (vec![a, b], format!("{a} × {b}"), a * b)
            }
            Builtin::Division => {
                let divisor = pick(rng, DIV_DIVISOR[tier]);
                let quotient = pick(rng, DIV_QUOTIENT[tier]);
                let dividend = divisor * quotient;
                (
                    vec![dividend, divisor],
                    format!("{dividend} ÷ {divisor}"),
                    quotient,
                )
            }
            Builtin::Square => {
                let n = pick(rng, SQUARE[tier]);
                (vec![n], format!("{n}²"), n * n)
            }
            Builtin::Cube => {
                let n = pick(rng, CUBE[tier]);
                (vec![n], format!("{n}³"), n * n * n)
            }
            Builtin::SquareRoot => {
                let root = pick(rng, SQRT_RESULT[tier]);
                let n = root * root;
                (vec![n], format!("√{n}"), root)
            }
            Builtin::CubeRoot => {
                let root = pick(rng, CBRT_RESULT[tier]);
                let n = root * root * root;
                (vec![n], format!("∛{n}"), root)
            }
            Builtin::Power => {
                let base = pick(rng, POW_BASE[tier]);
                let exp = pick(rng, POW_EXP[tier]);
                (vec![base, exp], format!("{base}^{exp}"), base.pow(exp as u32))
            }
            Builtin::Modulo => {
                let divisor = pick(rng, MOD_DIVISOR[tier]);
                let dividend = match difficulty {
                    Difficulty::Beginner => pick(rng, (divisor + 1, divisor * 5)),
                    Difficulty::Easy => pick(rng, (divisor + 1, MOD_DIVIDEND[tier].1)),
                    _ => pick(rng, MOD_DIVIDEND[tier]),
                };
                (
                    vec![dividend, divisor],
                    format!("{dividend} mod {divisor}"),
                    dividend % divisor,
                )
            }
            Builtin::Percentage => {
                let percent = match difficulty {
                    Difficulty::Beginner | Difficulty::Easy => *EASY_PERCENTS
                        .choose(rng)
                        .unwrap_or(&EASY_PERCENTS[0]),
                    Difficulty::Medium => *MEDIUM_PERCENTS
                        .choose(rng)
                        .unwrap_or(&MEDIUM_PERCENTS[0]),
                    Difficulty::Hard => *HARD_PERCENTS.choose(rng).unwrap_or(&HARD_PERCENTS[0]),
                    Difficulty::Expert => pick(rng, (1, 99)),
                };
                // value must be a multiple of this step for the answer to be whole
                let step = 100 / gcd(percent, 100);
                let (lo, hi) = PCT_VALUE[tier];
                let k = pick(rng, ((lo / step).max(1), (hi / step).max(1)));
                let value = k * step;
                (
                    vec![percent, value],
                    format!("{percent}% of {value}"),
                    percent * value / 100,
                )
            }
            Builtin::Factorial => {
                let n = pick(rng, FACTORIAL[tier]);
                (vec![n], format!("{n}!"), factorial(n))
            }
        };

        Problem {
            operation: self.name(),
            operands,
            display,
            answer,
        }
    }
}

/// Four answer options for multiple-choice play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choices {
    pub values: [i64; 4],
    pub correct_index: usize,
}

impl Choices {
    pub fn correct(&self) -> i64 {
        self.values[self.correct_index]
    }
}

// answers below this get small fixed offsets, larger ones a percentage
const SMALL_ANSWER: i64 = 20;
const SMALL_MAX_OFFSET: i64 = 5;
const OFFSET_PERCENT: (i64, i64) = (10, 30);
const DISTRACTOR_ATTEMPTS: usize = 100;
const FALLBACK_OFFSETS: [i64; 10] = [1, 2, 3, -1, -2, -3, 4, 5, -4, -5];

fn distractor(answer: i64, difficulty: Difficulty, rng: &mut dyn RngCore) -> i64 {
    let magnitude = answer.abs();
    let offset = if magnitude < SMALL_ANSWER {
        pick(rng, (1, SMALL_MAX_OFFSET))
    } else {
        (magnitude * pick(rng, OFFSET_PERCENT) / 100).max(1)
    };
    // easier tiers get more obvious distractors
    let offset = match difficulty {
        Difficulty::Beginner | Difficulty::Easy => offset * 3 / 2,
        Difficulty::Medium => offset,
        Difficulty::Hard | Difficulty::Expert => (offset * 7 / 10).max(1),
    };
    if rng.gen_bool(0.5) {
        answer + offset
    } else {
        answer - offset
    }
}

/// The correct answer plus three distinct distractors near it, shuffled.
/// Non-negative answers never get negative distractors.
pub fn generate_choices(answer: i64, difficulty: Difficulty, rng: &mut dyn RngCore) -> Choices {
    let allowed = |d: i64, taken: &[i64]| d != answer && !taken.contains(&d) && (answer < 0 || d >= 0);

    let mut distractors = Vec::with_capacity(3);
    for _ in 0..DISTRACTOR_ATTEMPTS {
        if distractors.len() == 3 {
            break;
        }
        let d = distractor(answer, difficulty, rng);
        if allowed(d, &distractors) {
            distractors.push(d);
        }
    }
    for offset in FALLBACK_OFFSETS.into_iter().chain(6..) {
        if distractors.len() == 3 {
            break;
        }
        let d = answer + offset;
        if allowed(d, &distractors) {
            distractors.push(d);
        }
    }

    let mut values = [answer, distractors[0], distractors[1], distractors[2]];
    values.shuffle(rng);
    let correct_index = values.iter().position(|&v| v == answer).unwrap_or(0);
    Choices {
        values,
        correct_index,
    }
}

/// Lookup table of available operations, in registration order
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    by_name: HashMap<&'static str, Arc<dyn Operation>>,
    order: Vec<&'static str>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for op in Builtin::ALL {
            registry.register(Arc::new(op));
        }
        registry
    }

    pub fn register(&mut self, op: Arc<dyn Operation>) {
        let name = op.name();
        if self.by_name.insert(name, op).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.by_name.get(name).cloned()
    }

    pub fn all(&self) -> Vec<Arc<dyn Operation>> {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name).cloned())
            .collect()
    }

    /// Resolve a list of names, skipping unknown ones
    pub fn select(&self, names: &[&str]) -> Vec<Arc<dyn Operation>> {
        names.iter().filter_map(|name| self.get(name)).collect()
    }

    pub fn by_category(&self, category: OperationCategory) -> Vec<Arc<dyn Operation>> {
        self.all()
            .into_iter()
            .filter(|op| op.category() == category)
            .collect()
    }
}
