//! Fixed XP reward table.

use serde::{Deserialize, Serialize};

pub const FLASHCARD_CORRECT: u64 = 10;
pub const FLASHCARD_MASTERED: u64 = 25;
pub const QUIZ_COMPLETE: u64 = 20;
pub const QUIZ_PERFECT: u64 = 50;
pub const POMODORO_WORK: u64 = 15;
pub const PER_MINUTE_STUDIED: u64 = 1;

/// Named reward sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpReward {
    FlashcardCorrect,
    FlashcardMastered,
    QuizComplete,
    QuizPerfect,
    PomodoroWork,
}

impl XpReward {
    pub fn amount(&self) -> u64 {
        match self {
            XpReward::FlashcardCorrect => FLASHCARD_CORRECT,
            XpReward::FlashcardMastered => FLASHCARD_MASTERED,
            XpReward::QuizComplete => QUIZ_COMPLETE,
            XpReward::QuizPerfect => QUIZ_PERFECT,
            XpReward::PomodoroWork => POMODORO_WORK,
        }
    }

    /// Stable identifier used as the ledger reason.
    pub fn reason(&self) -> &'static str {
        match self {
            XpReward::FlashcardCorrect => "flashcard_correct",
            XpReward::FlashcardMastered => "flashcard_mastered",
            XpReward::QuizComplete => "quiz_complete",
            XpReward::QuizPerfect => "quiz_perfect",
            XpReward::PomodoroWork => "pomodoro_work",
        }
    }
}

impl std::str::FromStr for XpReward {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "flashcard_correct" => Ok(XpReward::FlashcardCorrect),
            "flashcard_mastered" => Ok(XpReward::FlashcardMastered),
            "quiz_complete" => Ok(XpReward::QuizComplete),
            "quiz_perfect" => Ok(XpReward::QuizPerfect),
            "pomodoro_work" => Ok(XpReward::PomodoroWork),
            other => Err(format!("unknown reward: {other}")),
        }
    }
}

/// XP earned for `minutes` of study. Non-positive minutes earn nothing.
pub fn minutes_reward(minutes: i64) -> u64 {
    if minutes <= 0 {
        0
    } else {
        (minutes as u64).saturating_mul(PER_MINUTE_STUDIED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_table() {
        assert_eq!(XpReward::FlashcardCorrect.amount(), 10);
        assert_eq!(XpReward::FlashcardMastered.amount(), 25);
        assert_eq!(XpReward::QuizComplete.amount(), 20);
        assert_eq!(XpReward::QuizPerfect.amount(), 50);
        assert_eq!(XpReward::PomodoroWork.amount(), 15);
    }

    #[test]
    fn parses_kebab_and_snake_case() {
        assert_eq!("quiz-perfect".parse::<XpReward>(), Ok(XpReward::QuizPerfect));
        assert_eq!("pomodoro_work".parse::<XpReward>(), Ok(XpReward::PomodoroWork));
        assert!("streak".parse::<XpReward>().is_err());
    }

    #[test]
    fn minutes_reward_ignores_negative() {
        assert_eq!(minutes_reward(-5), 0);
        assert_eq!(minutes_reward(45), 45);
    }
}
