use std::time::Duration;

use crate::operation::Difficulty;

pub const POINTS_CORRECT: i64 = 100;
pub const POINTS_WRONG: i64 = -25;
pub const POINTS_SKIP: i64 = 0;

const MAX_TIME_BONUS: f64 = 1.5;
const TIME_BONUS_FLOOR: f64 = 1.0;
const INSTANT_THRESHOLD: Duration = Duration::from_secs(2);
const TIME_BONUS_DECAY: Duration = Duration::from_secs(10);

const MAX_STREAK_BONUS: f64 = 2.0;
const STREAK_BONUS_STEP: f64 = 0.25;
const STREAK_MILESTONE: u32 = 5;

pub fn difficulty_multiplier(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Beginner => 0.5,
        Difficulty::Easy => 0.75,
        Difficulty::Medium => 1.0,
        Difficulty::Hard => 1.5,
        Difficulty::Expert => 2.0,
    }
}

/// 1.5x under two seconds, decaying linearly to 1.0x at ten seconds
pub fn time_bonus(response: Duration) -> f64 {
    if response < INSTANT_THRESHOLD {
        return MAX_TIME_BONUS;
    }
    if response >= TIME_BONUS_DECAY {
        return TIME_BONUS_FLOOR;
    }
    let elapsed = (response - INSTANT_THRESHOLD).as_secs_f64();
    let window = (TIME_BONUS_DECAY - INSTANT_THRESHOLD).as_secs_f64();
    MAX_TIME_BONUS - elapsed / window * (MAX_TIME_BONUS - TIME_BONUS_FLOOR)
}

pub fn streak_bonus(streak: u32) -> f64 {
    let bonus = 1.0 + (streak / STREAK_MILESTONE) as f64 * STREAK_BONUS_STEP;
    bonus.min(MAX_STREAK_BONUS)
}

/// Points for a correct answer, using the streak held before answering
pub fn points_for_correct(difficulty: Difficulty, response: Duration, streak_before: u32) -> i64 {
    let points = POINTS_CORRECT as f64
        * difficulty_multiplier(difficulty)
        * time_bonus(response)
        * streak_bonus(streak_before);
    points as i64
}

/// Announcement text when a streak reaches a milestone
pub fn milestone(streak: u32) -> Option<&'static str> {
    match streak {
        5 => Some("×1.25"),
        10 => Some("×1.5"),
        15 => Some("×1.75"),
        20 => Some("×2.0 MAX"),
        25 => Some("LEGENDARY"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_bonus_decays_linearly() {
        assert_eq!(time_bonus(Duration::from_millis(500)), 1.5);
        assert_eq!(time_bonus(Duration::from_secs(6)), 1.25);
        assert_eq!(time_bonus(Duration::from_secs(10)), 1.0);
        assert_eq!(time_bonus(Duration::from_secs(30)), 1.0);
    }

    #[test]
    fn streak_bonus_steps_and_caps() {
        assert_eq!(streak_bonus(0), 1.0);
        assert_eq!(streak_bonus(4), 1.0);
        assert_eq!(streak_bonus(5), 1.25);
        assert_eq!(streak_bonus(19), 1.75);
        assert_eq!(streak_bonus(20), 2.0);
        assert_eq!(streak_bonus(100), 2.0);
    }

    #[test]
    fn points_combine_all_multipliers() {
        assert_eq!(
            points_for_correct(Difficulty::Medium, Duration::from_secs(10), 0),
            100
        );
        assert_eq!(
            points_for_correct(Difficulty::Expert, Duration::from_secs(1), 20),
            600
        );
        assert_eq!(
            points_for_correct(Difficulty::Beginner, Duration::from_secs(12), 5),
            62
        );
    }

    #[test]
    fn milestones() {
        assert_eq!(milestone(5), Some("×1.25"));
        assert_eq!(milestone(6), None);
        assert_eq!(milestone(25), Some("LEGENDARY"));
    }
}
