use chrono::{Datelike, Local};
use clap::Args;
use serde::Serialize;
use studykit_core::calendar::{build_month_grid_on, study_streak, MonthGrid, MonthSummary};
use studykit_core::format::{month_label, short_weekday};
use studykit_core::ValidationError;

use super::{print_json, CliResult, Workspace};

#[derive(Args)]
pub struct CalendarArgs {
    /// Year, defaults to the current year
    #[arg(long)]
    year: Option<i32>,
    /// Month 1-12, defaults to the current month
    #[arg(long)]
    month: Option<u32>,
    /// Print the grid as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CalendarView<'a> {
    label: String,
    grid: &'a MonthGrid,
    summary: MonthSummary,
    streak: u32,
}

const SHADES: [char; 5] = ['.', '-', '+', '*', '#'];

pub fn run(args: CalendarArgs) -> CliResult {
    let today = Local::now().date_naive();
    let year = args.year.unwrap_or_else(|| today.year());
    let month = args.month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidValue {
            field: "month".into(),
            message: format!("{month} is not in 1-12"),
        }
        .into());
    }

    let ws = Workspace::open()?;
    let records = ws.store().fetch_activity().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "activity unavailable, showing empty calendar");
        Vec::new()
    });
    let grid = build_month_grid_on(year, month - 1, &records, today)?;
    let view = CalendarView {
        label: month_label(grid.year, grid.month0),
        grid: &grid,
        summary: grid.summary(),
        streak: study_streak(&records, today),
    };

    if args.json {
        return print_json(&view);
    }

    println!("{}", view.label);
    let header: Vec<String> = grid.weeks[0]
        .iter()
        .map(|day| format!("{:>4}", &short_weekday(day.date)[..2]))
        .collect();
    println!("{}", header.join(""));
    for week in &grid.weeks {
        let line: Vec<String> = week
            .iter()
            .map(|day| {
                if !day.is_current_month {
                    "    ".to_string()
                } else {
                    let marker = if day.is_today { '>' } else { ' ' };
                    format!("{marker}{:>2}{}", day.day_of_month, SHADES[usize::from(day.level)])
                }
            })
            .collect();
        println!("{}", line.join("").trim_end());
    }
    println!();
    println!(
        "{} min over {} day(s), streak {} day(s)",
        view.summary.total_minutes, view.summary.active_days, view.streak
    );
    Ok(())
}
