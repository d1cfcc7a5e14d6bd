//! Best-effort delivery of completed phases to the activity store.
//!
//! Runs after the session has already applied its local state, so a
//! failing store can only be observed, never roll anything back.

use crate::error::CoreError;
use crate::events::Event;
use crate::progression::{XpTracker, XpUpdate};
use crate::storage::ActivityStore;

/// Receives failures that were swallowed to keep the session going.
pub trait ErrorObserver {
    fn observe(&self, error: &CoreError);
}

impl<F: Fn(&CoreError)> ErrorObserver for F {
    fn observe(&self, error: &CoreError) {
        self(error)
    }
}

/// Logs observed errors with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ErrorObserver for TracingObserver {
    fn observe(&self, error: &CoreError) {
        tracing::warn!(error = %error, "activity report failed");
    }
}

/// Forwards `PhaseCompleted` events to an [`ActivityStore`].
pub struct CompletionReporter<'a> {
    store: &'a dyn ActivityStore,
    observer: &'a dyn ErrorObserver,
}

impl<'a> CompletionReporter<'a> {
    pub fn new(store: &'a dyn ActivityStore, observer: &'a dyn ErrorObserver) -> Self {
        Self { store, observer }
    }

    /// Log the finished session and award its XP.
    ///
    /// Returns the XP update when an award was applied. Other events are
    /// ignored.
    pub fn handle(&self, event: &Event, tracker: &mut XpTracker) -> Option<XpUpdate> {
        let Event::PhaseCompleted { xp_award, .. } = event else {
            return None;
        };

        if let Some(entry) = event.session_log_entry() {
            if let Err(e) = self.store.log_session(&entry) {
                self.observer.observe(&as_log_failure("log_session", e));
            }
        }

        if *xp_award == 0 {
            return None;
        }
        match self.store.add_xp(*xp_award, "pomodoro_work") {
            Ok(update) => {
                tracker.record(&update);
                Some(update)
            }
            Err(e) => {
                let error = as_log_failure("add_xp", e);
                tracker.record_failure(&error);
                self.observer.observe(&error);
                None
            }
        }
    }
}

fn as_log_failure(operation: &str, err: CoreError) -> CoreError {
    if err.is_remote() {
        err
    } else {
        CoreError::remote_log(operation, err)
    }
}
