use std::collections::HashSet;

use chrono::Local;

use habitsync_domain::completion::Completion;
use habitsync_domain::shared::HabitId;

/// Habit ids already completed today, judged on the local calendar day.
pub fn today_completed_habit_ids(completions: &[Completion]) -> HashSet<HabitId> {
    let today = Local::now().date_naive();
    completions
        .iter()
        .filter(|c| c.completed_at().with_timezone(&Local).date_naive() == today)
        .map(|c| c.habit_id().clone())
        .collect()
}
