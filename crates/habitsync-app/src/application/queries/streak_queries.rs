use log::info;

use habitsync_domain::completion::Completion;
use habitsync_domain::habit::Habit;
use habitsync_domain::streak::StreakDomainService;

use crate::application::dtos::HabitStreakDto;

/// Per-habit streak statistics ranked by best streak, descending.
/// Ties keep the habits' fetch order.
pub fn ranked_streaks(habits: &[Habit], completions: &[Completion]) -> Vec<HabitStreakDto> {
    let results: Vec<HabitStreakDto> = StreakDomainService::rank(habits, completions)
        .into_iter()
        .map(|(habit, stats)| HabitStreakDto {
            habit_id: habit.id().as_str().to_string(),
            title: habit.title().to_string(),
            description: habit.description().to_string(),
            frequency: habit.frequency().to_string(),
            current_streak: stats.current_streak,
            best_streak: stats.best_streak,
            total_completions: stats.total_completions,
        })
        .collect();

    info!(
        "[streak] ranked_streaks habits={} completions={}",
        results.len(),
        completions.len()
    );

    results
}

/// Leaderboard head: the `count` best habits by best streak.
pub fn top_streaks(
    habits: &[Habit],
    completions: &[Completion],
    count: usize,
) -> Vec<HabitStreakDto> {
    let mut ranked = ranked_streaks(habits, completions);
    ranked.truncate(count);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use habitsync_domain::habit::Frequency;
    use habitsync_domain::shared::UserId;

    fn habit(user_id: &UserId, title: &str) -> Habit {
        Habit::new(
            user_id.clone(),
            title.to_string(),
            "desc".to_string(),
            Frequency::Daily,
        )
        .unwrap()
    }

    fn completions_on_days(habit: &Habit, offsets: &[i64]) -> Vec<Completion> {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 7, 30, 0).unwrap();
        offsets
            .iter()
            .map(|&o| {
                Completion::new(
                    habit.id().clone(),
                    habit.user_id().clone(),
                    base + Duration::days(o),
                )
            })
            .collect()
    }

    #[test]
    fn test_ranked_streaks_builds_dtos_in_rank_order() {
        let user_id = UserId::new();
        let short = habit(&user_id, "stretch");
        let long = habit(&user_id, "run");

        let mut completions = completions_on_days(&short, &[0]);
        completions.extend(completions_on_days(&long, &[0, 1, 2, 3]));

        let dtos = ranked_streaks(&[short.clone(), long.clone()], &completions);
        assert_eq!(dtos.len(), 2);
        assert_eq!(dtos[0].title, "run");
        assert_eq!(dtos[0].best_streak, 4);
        assert_eq!(dtos[0].frequency, "daily");
        assert_eq!(dtos[1].title, "stretch");
        assert_eq!(dtos[1].total_completions, 1);
    }

    #[test]
    fn test_top_streaks_truncates() {
        let user_id = UserId::new();
        let habits: Vec<Habit> = (0..5).map(|i| habit(&user_id, &format!("h{i}"))).collect();
        let completions = completions_on_days(&habits[3], &[0, 1]);

        let podium = top_streaks(&habits, &completions, 3);
        assert_eq!(podium.len(), 3);
        assert_eq!(podium[0].title, "h3");
    }

    #[test]
    fn test_habit_without_completions_reports_zero() {
        let user_id = UserId::new();
        let lonely = habit(&user_id, "floss");
        let dtos = ranked_streaks(&[lonely], &[]);
        assert_eq!(dtos[0].current_streak, 0);
        assert_eq!(dtos[0].best_streak, 0);
        assert_eq!(dtos[0].total_completions, 0);
    }
}
