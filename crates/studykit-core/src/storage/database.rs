//! SQLite-backed activity store.
//!
//! Provides persistent storage for:
//! - The XP ledger (append-only awards; the lifetime total is their sum)
//! - Completed pomodoro phases, keyed by local study date
//! - Extra study minutes from flashcards and quizzes
//! - Key-value store for application state

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::{data_dir, ActivityStore};
use crate::calendar::ActivityDay;
use crate::error::{DatabaseError, Result};
use crate::format::{date_key, parse_date_key};
use crate::progression::{apply_award, ExperienceStats, XpUpdate, MAX_XP_AWARD};
use crate::timer::{Phase, SessionLogEntry};

/// SQLite database for XP and activity.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/studykit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("studykit.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS xp_ledger (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                amount      INTEGER NOT NULL,
                reason      TEXT NOT NULL DEFAULT '',
                awarded_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS study_sessions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                phase        TEXT NOT NULL,
                duration_min INTEGER NOT NULL,
                started_at   TEXT NOT NULL,
                completed_at TEXT NOT NULL,
                study_date   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS study_minutes (
                study_date TEXT PRIMARY KEY,
                minutes    INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_study_date ON study_sessions(study_date);
            CREATE INDEX IF NOT EXISTS idx_sessions_phase ON study_sessions(phase);",
        )?;
        Ok(())
    }

    fn total_xp(&self) -> Result<u64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM xp_ledger",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|total| total.max(0) as u64)
    }

    /// Sessions logged for one study date.
    pub fn sessions_on(&self, date: NaiveDate) -> Result<Vec<SessionLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT phase, duration_min, started_at, completed_at
             FROM study_sessions
             WHERE study_date = ?1
             ORDER BY started_at",
        )?;
        let rows = stmt.query_map(params![date_key(date)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (phase, duration_minutes, started_at, completed_at) = row?;
            let (Ok(phase), Some(started_at), Some(completed_at)) = (
                phase.parse::<Phase>(),
                parse_timestamp(&started_at),
                parse_timestamp(&completed_at),
            ) else {
                tracing::warn!(%phase, "skipping unreadable session row");
                continue;
            };
            entries.push(SessionLogEntry {
                phase,
                duration_minutes,
                started_at,
                completed_at,
            });
        }
        Ok(entries)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl ActivityStore for Database {
    fn fetch_xp_stats(&self) -> Result<ExperienceStats> {
        Ok(ExperienceStats::from_total(self.total_xp()?))
    }

    fn add_xp(&self, amount: u64, reason: &str) -> Result<XpUpdate> {
        let before = self.total_xp()?;
        let update = apply_award(before, amount.min(MAX_XP_AWARD));
        self.conn.execute(
            "INSERT INTO xp_ledger (amount, reason, awarded_at) VALUES (?1, ?2, ?3)",
            params![update.awarded as i64, reason, Utc::now().to_rfc3339()],
        )?;
        Ok(update)
    }

    fn log_session(&self, entry: &SessionLogEntry) -> Result<()> {
        let study_date = entry.started_at.with_timezone(&Local).date_naive();
        self.conn.execute(
            "INSERT INTO study_sessions (phase, duration_min, started_at, completed_at, study_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.phase.as_str(),
                entry.duration_minutes,
                entry.started_at.to_rfc3339(),
                entry.completed_at.to_rfc3339(),
                date_key(study_date),
            ],
        )?;
        Ok(())
    }

    fn fetch_activity(&self) -> Result<Vec<ActivityDay>> {
        let mut stmt = self.conn.prepare(
            "SELECT study_date, SUM(minutes) FROM (
                SELECT study_date, duration_min AS minutes
                FROM study_sessions WHERE phase = 'work'
                UNION ALL
                SELECT study_date, minutes FROM study_minutes
             )
             GROUP BY study_date
             ORDER BY study_date",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut days = Vec::new();
        for row in rows {
            let (key, minutes) = row?;
            match parse_date_key(&key) {
                Some(date) => days.push(ActivityDay::new(date, minutes)),
                None => tracing::warn!(%key, "skipping activity row with bad date"),
            }
        }
        Ok(days)
    }

    fn record_study_minutes(&self, date: NaiveDate, minutes: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO study_minutes (study_date, minutes) VALUES (?1, ?2)
             ON CONFLICT(study_date) DO UPDATE SET minutes = minutes + excluded.minutes",
            params![date_key(date), minutes],
        )?;
        Ok(())
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn xp_ledger_sums() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.fetch_xp_stats().unwrap().total_xp, 0);
        db.add_xp(90, "manual").unwrap();
        let update = db.add_xp(50, "manual").unwrap();
        assert!(update.leveled_up);
        assert_eq!(update.stats.total_xp, 140);
        assert_eq!(db.fetch_xp_stats().unwrap().current_level, 2);
    }

    #[test]
    fn add_xp_caps_single_award() {
        let db = Database::open_memory().unwrap();
        let update = db.add_xp(5000, "manual").unwrap();
        assert_eq!(update.awarded, 1000);
        assert_eq!(db.fetch_xp_stats().unwrap().total_xp, 1000);
    }

    #[test]
    fn activity_aggregates_work_sessions_and_minutes() {
        let db = Database::open_memory().unwrap();
        let started = Local::now().with_timezone(&Utc);
        let today = started.with_timezone(&Local).date_naive();
        for phase in [Phase::Work, Phase::Work, Phase::ShortBreak] {
            db.log_session(&SessionLogEntry {
                phase,
                duration_minutes: 25,
                started_at: started,
                completed_at: started + Duration::minutes(25),
            })
            .unwrap();
        }
        db.record_study_minutes(today, 10).unwrap();
        db.record_study_minutes(today, 5).unwrap();

        let days = db.fetch_activity().unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, today);
        assert_eq!(days[0].minutes_studied, 65);
        assert_eq!(days[0].level, Some(3));
        assert_eq!(db.sessions_on(today).unwrap().len(), 3);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }
}
