//! Progression engine.
//!
//! Pure functions mapping lifetime XP to level, rank and progress, plus the
//! study intensity buckets used by the activity calendar. [`XpTracker`]
//! layers last-known-value fallback on top of an [`ActivityStore`].
//!
//! [`ActivityStore`]: crate::storage::ActivityStore

mod intensity;
mod level;
mod rewards;
mod tracker;

pub use intensity::{intensity_level, MAX_INTENSITY};
pub use level::{
    add_xp, bound_amount, parse_amount, progress_percent, xp_for_level, ExperienceStats,
    RankTitle, XpUpdate, BASE_LEVEL_XP, LEVEL_XP_STEP, MAX_XP_AWARD,
};
pub(crate) use level::apply_award;
pub use rewards::{
    minutes_reward, XpReward, FLASHCARD_CORRECT, FLASHCARD_MASTERED, PER_MINUTE_STUDIED,
    POMODORO_WORK, QUIZ_COMPLETE, QUIZ_PERFECT,
};
pub use tracker::XpTracker;
