mod config;
pub mod database;

pub use config::{BackendConfig, BackendMode, Config, RemindersConfig};
pub use database::Database;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::calendar::ActivityDay;
use crate::error::{ConfigError, Result};
use crate::progression::{ExperienceStats, XpUpdate};
use crate::remote::RestStore;
use crate::timer::SessionLogEntry;

/// Persistence for XP and study activity.
///
/// Reads are idempotent. `add_xp` is the only way XP changes; callers pass
/// an amount already bounded by the progression engine.
pub trait ActivityStore {
    fn fetch_xp_stats(&self) -> Result<ExperienceStats>;

    fn add_xp(&self, amount: u64, reason: &str) -> Result<XpUpdate>;

    fn log_session(&self, entry: &SessionLogEntry) -> Result<()>;

    fn fetch_activity(&self) -> Result<Vec<ActivityDay>>;

    /// Record study minutes that did not come from a pomodoro work phase
    /// (flashcard review, quizzes).
    fn record_study_minutes(&self, date: NaiveDate, minutes: i64) -> Result<()>;
}

/// Open the store selected by `config.backend`.
pub fn open_store(config: &Config) -> Result<Box<dyn ActivityStore>> {
    match config.backend.mode {
        BackendMode::Local => Ok(Box::new(Database::open()?)),
        BackendMode::Remote => Ok(Box::new(RestStore::from_config(&config.backend)?)),
    }
}

/// Returns the data directory.
///
/// `STUDYKIT_HOME` wins when set; otherwise `~/.config/studykit[-dev]/`
/// based on `STUDYKIT_ENV`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("STUDYKIT_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYKIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studykit-dev")
            } else {
                base_dir.join("studykit")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
