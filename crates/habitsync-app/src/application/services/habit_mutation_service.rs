use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use habitsync_domain::completion::Completion;
use habitsync_domain::habit::{Frequency, Habit};
use habitsync_domain::shared::{DomainError, HabitId, UserId};
use habitsync_domain::store::{DocumentStore, SyncedEntity};

use super::synced_collection::SyncedCollection;
use crate::application::queries::completion_queries::today_completed_habit_ids;

/// Compound writes against the habit and completion collections.
///
/// The store has no transaction primitive; when two documents must move
/// together the service fixes the write order instead and leans on the
/// log-derived statistics to absorb a partial failure.
pub struct HabitMutationService {
    store: Arc<dyn DocumentStore>,
    habits: Arc<SyncedCollection<Habit>>,
    completions: Arc<SyncedCollection<Completion>>,
}

impl HabitMutationService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        habits: Arc<SyncedCollection<Habit>>,
        completions: Arc<SyncedCollection<Completion>>,
    ) -> Self {
        Self {
            store,
            habits,
            completions,
        }
    }

    /// Single document creation; no derived-state side effects.
    pub async fn create_habit(
        &self,
        user_id: &UserId,
        title: &str,
        description: &str,
        frequency: Frequency,
    ) -> Result<HabitId, DomainError> {
        let habit = Habit::new(
            user_id.clone(),
            title.to_string(),
            description.to_string(),
            frequency,
        )?;

        self.store
            .create(Habit::COLLECTION, habit.id().as_str(), habit.to_fields())
            .await?;

        info!("Created habit {} ({})", habit.title(), habit.id());
        Ok(habit.id().clone())
    }

    /// Deletes the habit document only. Its completion records stay
    /// behind as orphans; the log is append-only in this design.
    pub async fn delete_habit(&self, id: &HabitId) -> Result<(), DomainError> {
        self.store.delete(Habit::COLLECTION, id.as_str()).await?;
        info!("Deleted habit {id}");
        Ok(())
    }

    /// Mark a habit complete for today.
    ///
    /// At most one completion per habit per local day: when the cached
    /// log already holds one, the call is a no-op. Otherwise the
    /// completion record is written first and the habit's denormalized
    /// counter second; a failure between the two leaves the counter
    /// stale while the log stays correct, and the statistics self-heal
    /// wherever they are derived from the log.
    pub async fn complete_habit(&self, id: &HabitId, user_id: &UserId) -> Result<(), DomainError> {
        let cached = self.completions.items().await;
        if today_completed_habit_ids(&cached).contains(id) {
            info!("Habit {id} already completed today, skipping");
            return Ok(());
        }

        let habit = self
            .habits
            .items()
            .await
            .into_iter()
            .find(|h| h.id() == id)
            .ok_or_else(|| DomainError::NotFound(format!("Habit {id} is not loaded")))?;

        let now = Utc::now();
        let completion = Completion::new(id.clone(), user_id.clone(), now);
        self.store
            .create(
                Completion::COLLECTION,
                completion.id().as_str(),
                completion.to_fields(),
            )
            .await?;

        let update = Habit::streak_update_fields(habit.streak_count() + 1, now);
        if let Err(e) = self.store.update(Habit::COLLECTION, id.as_str(), update).await {
            // The completion record is already in; the counter catches up
            // on the next log-derived recomputation.
            warn!("Streak counter update failed for habit {id}: {e}");
            return Err(e.into());
        }

        info!("Completed habit {id}");
        Ok(())
    }
}
