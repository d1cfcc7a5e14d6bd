pub mod calendar;
pub mod config;
pub mod task;
pub mod timer;
pub mod xp;

use serde::Serialize;
use studykit_core::storage::{open_store, ActivityStore, Config, Database};
use studykit_core::timer::{CompletionReporter, PomodoroSession, TracingObserver};
use studykit_core::{Event, XpTracker};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

const SESSION_KEY: &str = "pomodoro_session";
const TRACKER_KEY: &str = "xp_tracker";

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Local state shared by commands: the saved session, the cached XP
/// stats, and the configured activity store.
pub struct Workspace {
    pub config: Config,
    pub db: Database,
    store: Option<Box<dyn ActivityStore>>,
}

impl Workspace {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Database::open()?;
        let store = match open_store(&config) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!(error = %e, "activity store unavailable");
                None
            }
        };
        Ok(Self { config, db, store })
    }

    /// The configured store, falling back to the local database.
    pub fn store(&self) -> &dyn ActivityStore {
        match &self.store {
            Some(store) => store.as_ref(),
            None => &self.db as &dyn ActivityStore,
        }
    }

    pub fn load_session(&self) -> PomodoroSession {
        let mut session = self
            .db
            .kv_get(SESSION_KEY)
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str::<PomodoroSession>(&json).ok())
            .unwrap_or_else(|| PomodoroSession::new(self.config.pomodoro));
        if session.settings() != &self.config.pomodoro {
            if let Err(e) = session.update_settings(self.config.pomodoro) {
                tracing::warn!(error = %e, "ignoring invalid pomodoro settings");
            }
        }
        session
    }

    pub fn save_session(&self, session: &PomodoroSession) -> CliResult {
        self.db.kv_set(SESSION_KEY, &serde_json::to_string(session)?)?;
        Ok(())
    }

    pub fn load_tracker(&self) -> XpTracker {
        self.db
            .kv_get(TRACKER_KEY)
            .ok()
            .flatten()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save_tracker(&self, tracker: &XpTracker) -> CliResult {
        self.db.kv_set(TRACKER_KEY, &serde_json::to_string(tracker)?)?;
        Ok(())
    }

    /// Report completed phases to the store. Failures are logged and never
    /// undo the session state already saved.
    pub fn report(&self, events: &[Event]) -> CliResult {
        if !events
            .iter()
            .any(|e| matches!(e, Event::PhaseCompleted { .. }))
        {
            return Ok(());
        }
        let mut tracker = self.load_tracker();
        let reporter = CompletionReporter::new(self.store(), &TracingObserver);
        for event in events {
            if let Some(update) = reporter.handle(event, &mut tracker) {
                if update.leveled_up {
                    eprintln!(
                        "level up! level {} ({})",
                        update.stats.current_level,
                        update.stats.rank()
                    );
                }
            }
        }
        self.save_tracker(&tracker)
    }
}
