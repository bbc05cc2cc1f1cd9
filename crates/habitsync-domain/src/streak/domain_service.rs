use chrono::{DateTime, Utc};

use crate::completion::Completion;
use crate::habit::Habit;

/// Largest gap between successive completions that still extends a
/// streak. Day-and-a-half tolerates same-day and next-day completions
/// plus timezone and clock skew; two full days breaks the run.
const MAX_STREAK_GAP_DAYS: f64 = 1.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Derived per-habit statistics. Never persisted; always recomputed from
/// the completion log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakStats {
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_completions: u32,
}

/// Domain service for streak derivation
/// Contains pure domain logic without infrastructure dependencies
pub struct StreakDomainService;

impl StreakDomainService {
    /// Derive streak statistics from one habit's completion log.
    ///
    /// The log may arrive in any order; it is sorted by timestamp before
    /// the walk. The reported current streak is the last observed run in
    /// the log, deliberately not reconciled against the present moment.
    pub fn compute(completions: &[Completion]) -> StreakStats {
        if completions.is_empty() {
            return StreakStats::default();
        }

        let mut sorted: Vec<&Completion> = completions.iter().collect();
        sorted.sort_by_key(|c| c.completed_at());

        let mut current_run = 0u32;
        let mut best_run = 0u32;
        let mut last_at: Option<DateTime<Utc>> = None;

        for completion in sorted {
            let at = completion.completed_at();
            current_run = match last_at {
                Some(prev) if Self::gap_in_days(prev, at) <= MAX_STREAK_GAP_DAYS => {
                    current_run + 1
                }
                _ => 1,
            };
            best_run = best_run.max(current_run);
            last_at = Some(at);
        }

        StreakStats {
            current_streak: current_run,
            best_streak: best_run,
            total_completions: completions.len() as u32,
        }
    }

    /// Per-habit statistics ranked by best streak, descending. Ties keep
    /// the habits' relative fetch order (stable sort).
    pub fn rank<'a>(
        habits: &'a [Habit],
        completions: &[Completion],
    ) -> Vec<(&'a Habit, StreakStats)> {
        let mut ranked: Vec<(&Habit, StreakStats)> = habits
            .iter()
            .map(|habit| {
                let log: Vec<Completion> = completions
                    .iter()
                    .filter(|c| c.habit_id() == habit.id())
                    .cloned()
                    .collect();
                (habit, Self::compute(&log))
            })
            .collect();

        ranked.sort_by(|a, b| b.1.best_streak.cmp(&a.1.best_streak));
        ranked
    }

    fn gap_in_days(prev: DateTime<Utc>, next: DateTime<Utc>) -> f64 {
        (next - prev).num_milliseconds() as f64 / MILLIS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{HabitId, UserId};
    use chrono::{Duration, TimeZone};

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap() + Duration::days(offset)
    }

    fn log_for(habit_id: &HabitId, user_id: &UserId, offsets: &[i64]) -> Vec<Completion> {
        offsets
            .iter()
            .map(|&o| Completion::new(habit_id.clone(), user_id.clone(), day(o)))
            .collect()
    }

    #[test]
    fn test_empty_log_is_all_zero() {
        assert_eq!(StreakDomainService::compute(&[]), StreakStats::default());
    }

    #[test]
    fn test_three_consecutive_days() {
        let stats = StreakDomainService::compute(&log_for(&HabitId::new(), &UserId::new(), &[0, 1, 2]));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.best_streak, 3);
        assert_eq!(stats.total_completions, 3);
    }

    #[test]
    fn test_gap_resets_current_but_keeps_best() {
        // runs: [day 0, day 1] then reset at day 5
        let stats = StreakDomainService::compute(&log_for(&HabitId::new(), &UserId::new(), &[0, 1, 5]));
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.total_completions, 3);
    }

    #[test]
    fn test_one_day_gap_continues_two_day_gap_resets() {
        let continued = StreakDomainService::compute(&log_for(&HabitId::new(), &UserId::new(), &[0, 1]));
        assert_eq!(continued.current_streak, 2);

        let reset = StreakDomainService::compute(&log_for(&HabitId::new(), &UserId::new(), &[0, 2]));
        assert_eq!(reset.current_streak, 1);
        assert_eq!(reset.best_streak, 1);
    }

    #[test]
    fn test_unsorted_log_is_sorted_before_the_walk() {
        let stats = StreakDomainService::compute(&log_for(&HabitId::new(), &UserId::new(), &[2, 0, 1]));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.best_streak, 3);
    }

    #[test]
    fn test_best_never_below_current() {
        for offsets in [&[0i64][..], &[0, 1, 2], &[0, 1, 5, 6, 7, 8], &[0, 3, 6]] {
            let stats =
                StreakDomainService::compute(&log_for(&HabitId::new(), &UserId::new(), offsets));
            assert!(stats.best_streak >= stats.current_streak);
            assert_eq!(stats.total_completions as usize, offsets.len());
        }
    }

    #[test]
    fn test_same_day_completions_extend_the_run() {
        let habit_id = HabitId::new();
        let user_id = UserId::new();
        let log = vec![
            Completion::new(habit_id.clone(), user_id.clone(), day(0)),
            Completion::new(habit_id.clone(), user_id.clone(), day(0) + Duration::hours(6)),
        ];
        let stats = StreakDomainService::compute(&log);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_ranking_orders_by_best_streak() {
        let user_id = UserId::new();
        let weak = Habit::new(user_id.clone(), "a".into(), "a".into(), crate::habit::Frequency::Daily).unwrap();
        let strong = Habit::new(user_id.clone(), "b".into(), "b".into(), crate::habit::Frequency::Daily).unwrap();

        let mut completions = log_for(weak.id(), &user_id, &[0]);
        completions.extend(log_for(strong.id(), &user_id, &[0, 1, 2]));

        let habits = vec![weak.clone(), strong.clone()];
        let ranked = StreakDomainService::rank(&habits, &completions);
        assert_eq!(ranked[0].0.id(), strong.id());
        assert_eq!(ranked[0].1.best_streak, 3);
        assert_eq!(ranked[1].0.id(), weak.id());
    }

    #[test]
    fn test_ranking_keeps_fetch_order_on_ties() {
        let user_id = UserId::new();
        let first = Habit::new(user_id.clone(), "first".into(), "d".into(), crate::habit::Frequency::Daily).unwrap();
        let second = Habit::new(user_id.clone(), "second".into(), "d".into(), crate::habit::Frequency::Daily).unwrap();

        let mut completions = log_for(first.id(), &user_id, &[0, 1]);
        completions.extend(log_for(second.id(), &user_id, &[3, 4]));

        let habits = vec![first.clone(), second.clone()];
        let ranked = StreakDomainService::rank(&habits, &completions);
        assert_eq!(ranked[0].0.id(), first.id());
        assert_eq!(ranked[1].0.id(), second.id());
    }
}
