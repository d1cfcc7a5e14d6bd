//! To-do items attached to a pomodoro session, with optional reminders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub enabled: bool,
    pub time: DateTime<Utc>,
    pub notified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    /// Empty and whitespace-only text is accepted.
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub reminder: Option<Reminder>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        self.reminder
            .is_some_and(|r| r.enabled && !r.notified && r.time <= now)
    }
}

/// Delivered when a task's reminder time has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderNotice {
    pub task_id: Uuid,
    pub task_text: String,
    pub due_at: DateTime<Utc>,
}

/// Receives reminder notices. Purely informational.
pub trait NotificationSink {
    fn notify(&mut self, notice: &ReminderNotice);
}

impl NotificationSink for Vec<ReminderNotice> {
    fn notify(&mut self, notice: &ReminderNotice) {
        self.push(notice.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Task, ValidationError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ValidationError::UnknownTask(id.to_string()))
    }

    /// Resolve a full id or an unambiguous prefix of one.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<Uuid, ValidationError> {
        let needle = id_or_prefix.trim().to_ascii_lowercase();
        if let Ok(id) = Uuid::parse_str(&needle) {
            return self
                .get(id)
                .map(|t| t.id)
                .ok_or(ValidationError::UnknownTask(needle));
        }
        let mut matches = self
            .tasks
            .iter()
            .filter(|t| !needle.is_empty() && t.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id),
            (Some(_), Some(_)) => Err(ValidationError::InvalidValue {
                field: "task id".into(),
                message: format!("'{needle}' matches more than one task"),
            }),
            _ => Err(ValidationError::UnknownTask(needle)),
        }
    }

    pub fn add(&mut self, text: impl Into<String>, now: DateTime<Utc>) -> &Task {
        let idx = self.tasks.len();
        self.tasks.push(Task {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            reminder: None,
            created_at: now,
        });
        &self.tasks[idx]
    }

    /// Flip completion. Returns the new state.
    pub fn toggle(&mut self, id: Uuid) -> Result<bool, ValidationError> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Task, ValidationError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ValidationError::UnknownTask(id.to_string()))?;
        Ok(self.tasks.remove(idx))
    }

    /// Set (or replace) an enabled, unnotified reminder.
    pub fn set_reminder(&mut self, id: Uuid, time: DateTime<Utc>) -> Result<(), ValidationError> {
        self.get_mut(id)?.reminder = Some(Reminder {
            enabled: true,
            time,
            notified: false,
        });
        Ok(())
    }

    pub fn clear_reminder(&mut self, id: Uuid) -> Result<(), ValidationError> {
        self.get_mut(id)?.reminder = None;
        Ok(())
    }

    /// Mark a reminder delivered. Returns true only on the first call for
    /// a pending reminder; unknown ids and repeat calls are no-ops.
    pub fn mark_notified(&mut self, id: Uuid) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(Task {
                reminder: Some(reminder),
                ..
            }) if !reminder.notified => {
                reminder.notified = true;
                true
            }
            _ => false,
        }
    }

    pub fn due_reminders(&self, now: DateTime<Utc>) -> Vec<ReminderNotice> {
        self.tasks
            .iter()
            .filter(|t| t.reminder_due(now))
            .filter_map(|t| {
                t.reminder.map(|r| ReminderNotice {
                    task_id: t.id,
                    task_text: t.text.clone(),
                    due_at: r.time,
                })
            })
            .collect()
    }

    /// Deliver every due reminder to `sink` and mark it notified.
    pub fn poll_reminders(
        &mut self,
        now: DateTime<Utc>,
        sink: &mut dyn NotificationSink,
    ) -> Vec<ReminderNotice> {
        let due = self.due_reminders(now);
        for notice in &due {
            if self.mark_notified(notice.task_id) {
                sink.notify(notice);
            }
        }
        due
    }
}
