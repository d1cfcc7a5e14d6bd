mod clock;
mod phase;
mod report;
mod session;
mod tasks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use phase::{Phase, PomodoroSettings, SessionLogEntry};
pub use report::{CompletionReporter, ErrorObserver, TracingObserver};
pub use session::PomodoroSession;
pub use tasks::{NotificationSink, Reminder, ReminderNotice, Task, TaskList};
