use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::value_objects::Frequency;
use crate::shared::{DomainError, HabitId, UserId};
use crate::store::{ChangeKind, Document, Filter, SyncedEntity};

/// Wire shape of a habit document. The single place untyped store fields
/// become typed values.
#[derive(Debug, Deserialize)]
struct HabitFields {
    user_id: String,
    title: String,
    description: String,
    frequency: Frequency,
    streak_count: u32,
    last_completed: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Habit {
    id: HabitId,
    user_id: UserId,
    title: String,
    description: String,
    frequency: Frequency,
    streak_count: u32,
    last_completed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(
        user_id: UserId,
        title: String,
        description: String,
        frequency: Frequency,
    ) -> Result<Self, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::Validation(
                "Habit title cannot be empty".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(DomainError::Validation(
                "Habit description cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: HabitId::new(),
            user_id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            frequency,
            streak_count: 0,
            last_completed_at: now,
            created_at: now,
        })
    }

    pub fn restore(
        id: HabitId,
        user_id: UserId,
        title: String,
        description: String,
        frequency: Frequency,
        streak_count: u32,
        last_completed_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            description,
            frequency,
            streak_count,
            last_completed_at,
            created_at,
        }
    }

    pub fn id(&self) -> &HabitId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Denormalized cache of the current streak. The completion log is
    /// the source of truth; this counter is bumped incrementally on
    /// completion and may lag behind the log-derived value.
    pub fn streak_count(&self) -> u32 {
        self.streak_count
    }

    pub fn last_completed_at(&self) -> DateTime<Utc> {
        self.last_completed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn record_completion(&mut self, completed_at: DateTime<Utc>) {
        self.streak_count += 1;
        self.last_completed_at = completed_at;
    }

    /// Full field bag for document creation.
    pub fn to_fields(&self) -> Value {
        serde_json::json!({
            "user_id": self.user_id.as_str(),
            "title": self.title,
            "description": self.description,
            "frequency": self.frequency,
            "streak_count": self.streak_count,
            "last_completed": self.last_completed_at,
            "created_at": self.created_at,
        })
    }

    /// Partial field set for the denormalized counter update.
    pub fn streak_update_fields(streak_count: u32, completed_at: DateTime<Utc>) -> Value {
        serde_json::json!({
            "streak_count": streak_count,
            "last_completed": completed_at,
        })
    }

    pub fn from_document(document: &Document) -> Result<Self, DomainError> {
        let fields: HabitFields = serde_json::from_value(document.fields.clone())
            .map_err(|e| DomainError::Deserialization(e.to_string()))?;

        Ok(Self::restore(
            HabitId::from_string(&document.id),
            UserId::from_string(&fields.user_id),
            fields.title,
            fields.description,
            fields.frequency,
            fields.streak_count,
            fields.last_completed,
            fields.created_at,
        ))
    }
}

impl SyncedEntity for Habit {
    const COLLECTION: &'static str = "habits";

    const REFRESH_ON: &'static [ChangeKind] =
        &[ChangeKind::Create, ChangeKind::Update, ChangeKind::Delete];

    fn scope_filters(user_id: &UserId) -> Vec<Filter> {
        vec![Filter::equal("user_id", user_id.as_str())]
    }

    fn decode(document: &Document) -> Result<Self, DomainError> {
        Self::from_document(document)
    }
}
