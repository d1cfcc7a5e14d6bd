//! Last-known XP stats with non-fatal remote failure handling.

use serde::{Deserialize, Serialize};

use super::level::{bound_amount, ExperienceStats, XpUpdate};
use super::rewards::XpReward;
use crate::error::ValidationError;
use crate::storage::ActivityStore;

/// Caches the most recent [`ExperienceStats`] read from a store.
///
/// Store failures never propagate: the cache (or the level-1 defaults)
/// stays in place and `last_error` is raised for the UI layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XpTracker {
    stats: ExperienceStats,
    #[serde(default)]
    last_error: Option<String>,
}

impl XpTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stats(stats: ExperienceStats) -> Self {
        Self {
            stats,
            last_error: None,
        }
    }

    pub fn stats(&self) -> ExperienceStats {
        self.stats
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Note a failed award made elsewhere against the same store.
    pub fn record_failure(&mut self, error: &impl std::fmt::Display) {
        self.last_error = Some(error.to_string());
    }

    /// Re-read stats from the store, keeping the cached value on failure.
    pub fn refresh(&mut self, store: &dyn ActivityStore) -> ExperienceStats {
        match store.fetch_xp_stats() {
            Ok(stats) => {
                self.stats = stats;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "xp stats fetch failed, keeping last known stats");
                self.last_error = Some(e.to_string());
            }
        }
        self.stats
    }

    /// Validate and award `amount` XP.
    ///
    /// Invalid amounts are rejected before the store is touched. A failing
    /// store yields an unchanged update with `last_error` set.
    pub fn award(
        &mut self,
        store: &dyn ActivityStore,
        amount: f64,
        reason: &str,
    ) -> Result<XpUpdate, ValidationError> {
        let bounded = bound_amount(amount)?;
        Ok(self.award_bounded(store, bounded, reason))
    }

    /// Adopt an update applied elsewhere against the same store.
    pub fn record(&mut self, update: &XpUpdate) {
        self.stats = update.stats;
        self.last_error = None;
    }

    pub fn award_reward(&mut self, store: &dyn ActivityStore, reward: XpReward) -> XpUpdate {
        self.award_bounded(store, reward.amount(), reward.reason())
    }

    fn award_bounded(&mut self, store: &dyn ActivityStore, amount: u64, reason: &str) -> XpUpdate {
        match store.add_xp(amount, reason) {
            Ok(update) => {
                self.stats = update.stats;
                self.last_error = None;
                if update.leveled_up {
                    tracing::info!(
                        level = update.stats.current_level,
                        rank = %update.stats.rank(),
                        "level up"
                    );
                }
                update
            }
            Err(e) => {
                tracing::warn!(error = %e, amount, reason, "xp award failed");
                self.last_error = Some(e.to_string());
                XpUpdate::unchanged(self.stats)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ActivityDay;
    use crate::error::{CoreError, Result};
    use crate::progression::apply_award;
    use crate::timer::SessionLogEntry;
    use std::cell::Cell;

    struct FakeStore {
        total: Cell<u64>,
        fail: bool,
    }

    impl ActivityStore for FakeStore {
        fn fetch_xp_stats(&self) -> Result<ExperienceStats> {
            if self.fail {
                return Err(CoreError::remote_fetch("fetch_xp_stats", "offline"));
            }
            Ok(ExperienceStats::from_total(self.total.get()))
        }

        fn add_xp(&self, amount: u64, _reason: &str) -> Result<XpUpdate> {
            if self.fail {
                return Err(CoreError::remote_log("add_xp", "offline"));
            }
            let update = apply_award(self.total.get(), amount);
            self.total.set(update.stats.total_xp);
            Ok(update)
        }

        fn log_session(&self, _entry: &SessionLogEntry) -> Result<()> {
            Ok(())
        }

        fn fetch_activity(&self) -> Result<Vec<ActivityDay>> {
            Ok(Vec::new())
        }

        fn record_study_minutes(&self, _date: chrono::NaiveDate, _minutes: i64) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn refresh_falls_back_to_defaults() {
        let store = FakeStore {
            total: Cell::new(0),
            fail: true,
        };
        let mut tracker = XpTracker::new();
        let stats = tracker.refresh(&store);
        assert_eq!(stats, ExperienceStats::from_total(0));
        assert_eq!(stats.xp_for_next, 100);
        assert!(tracker.last_error().is_some());
    }

    #[test]
    fn refresh_keeps_last_known_stats() {
        let mut tracker = XpTracker::with_stats(ExperienceStats::from_total(420));
        let store = FakeStore {
            total: Cell::new(0),
            fail: true,
        };
        assert_eq!(tracker.refresh(&store).total_xp, 420);
    }

    #[test]
    fn award_rejects_invalid_without_touching_store() {
        let store = FakeStore {
            total: Cell::new(90),
            fail: false,
        };
        let mut tracker = XpTracker::new();
        tracker.refresh(&store);
        assert!(tracker.award(&store, f64::NAN, "manual").is_err());
        assert_eq!(store.total.get(), 90);
        assert_eq!(tracker.stats().total_xp, 90);
    }

    #[test]
    fn award_reports_level_up() {
        let store = FakeStore {
            total: Cell::new(90),
            fail: false,
        };
        let mut tracker = XpTracker::new();
        let update = tracker.award(&store, 50.0, "manual").unwrap();
        assert!(update.leveled_up);
        assert_eq!(tracker.stats().current_level, 2);
    }

    #[test]
    fn award_failure_leaves_stats() {
        let store = FakeStore {
            total: Cell::new(0),
            fail: true,
        };
        let mut tracker = XpTracker::with_stats(ExperienceStats::from_total(30));
        let update = tracker.award_reward(&store, XpReward::QuizPerfect);
        assert!(!update.leveled_up);
        assert_eq!(update.awarded, 0);
        assert_eq!(tracker.stats().total_xp, 30);
        assert!(tracker.last_error().is_some());
    }
}
