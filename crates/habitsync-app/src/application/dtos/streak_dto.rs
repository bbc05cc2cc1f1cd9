use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitStreakDto {
    pub habit_id: String,
    pub title: String,
    pub description: String,
    pub frequency: String,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_completions: u32,
}
