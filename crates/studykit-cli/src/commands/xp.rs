use chrono::{Local, NaiveDate};
use clap::Subcommand;
use serde::Serialize;
use studykit_core::progression::{minutes_reward, parse_amount};
use studykit_core::{ExperienceStats, RankTitle, XpReward, XpTracker, XpUpdate};

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum XpAction {
    /// Show level, rank and progress
    Show,
    /// Add an arbitrary amount of XP (1-1000)
    Add {
        amount: String,
    },
    /// Grant a fixed reward (flashcard-correct, flashcard-mastered,
    /// quiz-complete, quiz-perfect, pomodoro-work)
    Award {
        reward: XpReward,
    },
    /// Record study minutes outside the timer and earn XP for them
    Study {
        minutes: i64,
        /// Local date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct XpView {
    #[serde(flatten)]
    stats: ExperienceStats,
    rank: RankTitle,
    progress_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    awarded: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    leveled_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl XpView {
    fn new(tracker: &XpTracker, update: Option<XpUpdate>) -> Self {
        let stats = tracker.stats();
        Self {
            stats,
            rank: stats.rank(),
            progress_pct: stats.progress_pct(),
            awarded: update.map(|u| u.awarded),
            leveled_up: update.map(|u| u.leveled_up),
            error: tracker.last_error().map(str::to_string),
        }
    }
}

pub fn run(action: XpAction) -> CliResult {
    let ws = Workspace::open()?;
    let mut tracker = ws.load_tracker();
    let store = ws.store();

    let update = match action {
        XpAction::Show => {
            tracker.refresh(store);
            None
        }
        XpAction::Add { amount } => {
            let bounded = parse_amount(&amount)?;
            Some(tracker.award(store, bounded as f64, "manual")?)
        }
        XpAction::Award { reward } => Some(tracker.award_reward(store, reward)),
        XpAction::Study { minutes, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            if let Err(e) = store.record_study_minutes(date, minutes) {
                tracing::warn!(error = %e, "study minutes not recorded");
            }
            match minutes_reward(minutes) {
                0 => None,
                xp => Some(tracker.award(store, xp as f64, "study_minutes")?),
            }
        }
    };

    ws.save_tracker(&tracker)?;
    print_json(&XpView::new(&tracker, update))
}
