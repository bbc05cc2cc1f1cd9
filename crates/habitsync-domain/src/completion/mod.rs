use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::shared::{CompletionId, DomainError, HabitId, UserId};
use crate::store::{ChangeKind, Document, Filter, SyncedEntity};

/// The streaks view pulls the whole per-user log in one fetch; this caps
/// the result set the way the original query does.
const COMPLETION_FETCH_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
struct CompletionFields {
    habit_id: String,
    user_id: String,
    completed_at: DateTime<Utc>,
}

/// One entry of the append-only completion log. Never updated after
/// creation; streak statistics are derived from these records.
#[derive(Debug, Clone)]
pub struct Completion {
    id: CompletionId,
    habit_id: HabitId,
    user_id: UserId,
    completed_at: DateTime<Utc>,
}

impl Completion {
    pub fn new(habit_id: HabitId, user_id: UserId, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: CompletionId::new(),
            habit_id,
            user_id,
            completed_at,
        }
    }

    pub fn restore(
        id: CompletionId,
        habit_id: HabitId,
        user_id: UserId,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            habit_id,
            user_id,
            completed_at,
        }
    }

    pub fn id(&self) -> &CompletionId {
        &self.id
    }

    pub fn habit_id(&self) -> &HabitId {
        &self.habit_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn to_fields(&self) -> Value {
        serde_json::json!({
            "habit_id": self.habit_id.as_str(),
            "user_id": self.user_id.as_str(),
            "completed_at": self.completed_at,
        })
    }

    pub fn from_document(document: &Document) -> Result<Self, DomainError> {
        let fields: CompletionFields = serde_json::from_value(document.fields.clone())
            .map_err(|e| DomainError::Deserialization(e.to_string()))?;

        Ok(Self::restore(
            CompletionId::from_string(&document.id),
            HabitId::from_string(&fields.habit_id),
            UserId::from_string(&fields.user_id),
            fields.completed_at,
        ))
    }
}

impl SyncedEntity for Completion {
    const COLLECTION: &'static str = "habit_completions";

    // Completions are append-only, so only creates invalidate the cache.
    const REFRESH_ON: &'static [ChangeKind] = &[ChangeKind::Create];

    fn scope_filters(user_id: &UserId) -> Vec<Filter> {
        vec![
            Filter::equal("user_id", user_id.as_str()),
            Filter::limit(COMPLETION_FETCH_LIMIT),
        ]
    }

    fn decode(document: &Document) -> Result<Self, DomainError> {
        Self::from_document(document)
    }
}
