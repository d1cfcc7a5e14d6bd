//! XP ladder, rank titles, and progress arithmetic.
//!
//! Level `L` needs `100 + (L - 1) * 50` XP to advance to `L + 1`. There is
//! no level cap.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// XP needed to clear level 1.
pub const BASE_LEVEL_XP: u64 = 100;
/// Additional XP per level above 1.
pub const LEVEL_XP_STEP: u64 = 50;
/// Upper bound for a single award.
pub const MAX_XP_AWARD: u64 = 1000;

/// XP required to advance from `level` to `level + 1`.
///
/// Levels below 1 are treated as level 1.
pub fn xp_for_level(level: u32) -> u64 {
    let level = u64::from(level.max(1));
    BASE_LEVEL_XP.saturating_add((level - 1).saturating_mul(LEVEL_XP_STEP))
}

/// Derived level information for a lifetime XP total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceStats {
    pub total_xp: u64,
    pub current_level: u32,
    pub xp_in_level: u64,
    pub xp_for_next: u64,
}

impl Default for ExperienceStats {
    fn default() -> Self {
        Self::from_total(0)
    }
}

impl ExperienceStats {
    /// Walk the ladder from level 1, subtracting each threshold until the
    /// remainder no longer covers the next one.
    pub fn from_total(total_xp: u64) -> Self {
        let mut level = 1u32;
        let mut remaining = total_xp;
        let mut needed = xp_for_level(level);
        while remaining >= needed {
            remaining -= needed;
            level = level.saturating_add(1);
            needed = xp_for_level(level);
        }
        Self {
            total_xp,
            current_level: level,
            xp_in_level: remaining,
            xp_for_next: needed,
        }
    }

    pub fn rank(&self) -> RankTitle {
        RankTitle::for_level(self.current_level)
    }

    /// 0.0 ..= 100.0 progress towards the next level.
    pub fn progress_pct(&self) -> f64 {
        progress_percent(self.xp_in_level as f64, self.xp_for_next as f64)
    }
}

/// Named grouping of level ranges, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RankTitle {
    Novice,
    Apprentice,
    Scholar,
    Expert,
    Master,
    Grandmaster,
}

impl RankTitle {
    pub const ALL: [RankTitle; 6] = [
        RankTitle::Novice,
        RankTitle::Apprentice,
        RankTitle::Scholar,
        RankTitle::Expert,
        RankTitle::Master,
        RankTitle::Grandmaster,
    ];

    pub fn for_level(level: u32) -> Self {
        match level {
            0..=4 => RankTitle::Novice,
            5..=9 => RankTitle::Apprentice,
            10..=19 => RankTitle::Scholar,
            20..=34 => RankTitle::Expert,
            35..=49 => RankTitle::Master,
            _ => RankTitle::Grandmaster,
        }
    }

    /// Position in the rank ladder, 0 for Novice.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankTitle::Novice => "Novice",
            RankTitle::Apprentice => "Apprentice",
            RankTitle::Scholar => "Scholar",
            RankTitle::Expert => "Expert",
            RankTitle::Master => "Master",
            RankTitle::Grandmaster => "Grandmaster",
        }
    }
}

impl std::fmt::Display for RankTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage of `xp_for_next` covered by `xp_in_level`, always within
/// `[0, 100]`. Degenerate inputs (non-positive threshold, negative or
/// non-finite values) yield 0.
pub fn progress_percent(xp_in_level: f64, xp_for_next: f64) -> f64 {
    if !xp_in_level.is_finite() || !xp_for_next.is_finite() {
        return 0.0;
    }
    if xp_for_next <= 0.0 || xp_in_level < 0.0 {
        return 0.0;
    }
    (xp_in_level / xp_for_next * 100.0).clamp(0.0, 100.0)
}

/// Floor `amount` and bound it to `1..=MAX_XP_AWARD`.
///
/// Non-finite input, or input that floors to zero or below, is rejected.
pub fn bound_amount(amount: f64) -> Result<u64, ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount {
            input: amount.to_string(),
        });
    }
    let floored = amount.floor();
    if floored < 1.0 {
        return Err(ValidationError::InvalidAmount {
            input: amount.to_string(),
        });
    }
    Ok((floored.min(MAX_XP_AWARD as f64)) as u64)
}

/// Parse a user-supplied amount string. Non-numeric text is rejected
/// rather than coerced.
pub fn parse_amount(input: &str) -> Result<u64, ValidationError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAmount {
            input: input.to_string(),
        })?;
    bound_amount(value)
}

/// Outcome of an XP award.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpUpdate {
    pub stats: ExperienceStats,
    pub awarded: u64,
    pub leveled_up: bool,
}

impl XpUpdate {
    /// Update that leaves `stats` untouched.
    pub fn unchanged(stats: ExperienceStats) -> Self {
        Self {
            stats,
            awarded: 0,
            leveled_up: false,
        }
    }
}

/// Apply a bounded award to `current_total`.
pub fn add_xp(current_total: u64, amount: f64) -> Result<XpUpdate, ValidationError> {
    let bounded = bound_amount(amount)?;
    Ok(apply_award(current_total, bounded))
}

/// Apply an already-bounded award.
pub(crate) fn apply_award(current_total: u64, bounded: u64) -> XpUpdate {
    let before = ExperienceStats::from_total(current_total);
    let stats = ExperienceStats::from_total(current_total.saturating_add(bounded));
    XpUpdate {
        stats,
        awarded: bounded,
        leveled_up: stats.current_level > before.current_level,
    }
}
