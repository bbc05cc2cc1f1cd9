use std::collections::HashMap;

use async_trait::async_trait;
use log::info;
use tokio::sync::RwLock;

use habitsync_domain::session::{AuthError, AuthGateway, UserIdentity};
use habitsync_domain::shared::UserId;

// The remote service rejects short passwords on its own, independently
// of any client-side validation.
const MIN_REMOTE_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
struct AccountRecord {
    id: UserId,
    email: String,
    password: String,
    display_name: String,
}

/// Account registry keyed by email plus a single current-session slot.
#[derive(Default)]
pub struct MemoryAuthGateway {
    accounts: RwLock<HashMap<String, AccountRecord>>,
    session: RwLock<Option<UserId>>,
}

impl MemoryAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthGateway for MemoryAuthGateway {
    async fn current_session(&self) -> Result<Option<UserIdentity>, AuthError> {
        let session = self.session.read().await;
        let Some(user_id) = session.as_ref() else {
            return Ok(None);
        };

        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|record| &record.id == user_id)
            .map(|record| UserIdentity {
                id: record.id.clone(),
                email: record.email.clone(),
                display_name: record.display_name.clone(),
            }))
    }

    async fn create_account(
        &self,
        account_id: &UserId,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), AuthError> {
        if password.len() < MIN_REMOTE_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(AuthError::DuplicateAccount);
        }

        accounts.insert(
            email.to_string(),
            AccountRecord {
                id: account_id.clone(),
                email: email.to_string(),
                password: password.to_string(),
                display_name: display_name.to_string(),
            },
        );
        info!("Registered account for {email}");
        Ok(())
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let accounts = self.accounts.read().await;
        let record = accounts
            .get(email)
            .filter(|record| record.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        *self.session.write().await = Some(record.id.clone());
        Ok(())
    }

    async fn delete_session(&self) -> Result<(), AuthError> {
        *self.session.write().await = None;
        Ok(())
    }
}
