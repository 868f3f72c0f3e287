//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a tracker from `HABIT_TRACKER_*` environment settings.
//! - Print a deterministic state summary for quick local sanity checks.

use habit_core::{core_version, mood_catalog, HabitTracker, TrackerConfig};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("habit_cli: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let tracker = match HabitTracker::open(&config) {
        Ok(tracker) => tracker,
        Err(err) => {
            error!("event=cli_open module=cli status=error error={err}");
            eprintln!("habit_cli: failed to open tracker: {err}");
            return ExitCode::FAILURE;
        }
    };

    let summary = tracker.summary();
    println!("habit_core version={}", core_version());
    println!(
        "storage={}",
        config
            .db_path
            .as_deref()
            .map_or_else(|| "memory".to_string(), |path| path.display().to_string())
    );
    println!("user={}", summary.user_name);
    println!("habits={}", summary.habit_count);
    println!("completed_days={}", summary.completed_days);
    println!("mood_days={}", summary.mood_days);

    let moods = mood_catalog()
        .iter()
        .map(|mood| format!("{}:{}", mood.id, mood.name))
        .collect::<Vec<_>>()
        .join(",");
    println!("moods={moods}");

    ExitCode::SUCCESS
}
