use async_trait::async_trait;

use crate::shared::{DomainError, UserId};

/// Identity handle returned by the remote auth collaborator.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password does not meet the minimum requirements")]
    WeakPassword,

    #[error("An account with this email already exists")]
    DuplicateAccount,

    #[error("Auth service unavailable: {0}")]
    Unavailable(String),
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                DomainError::InvalidCredentials("Invalid credentials".to_string())
            }
            other => DomainError::Auth(other.to_string()),
        }
    }
}

/// Remote auth service, consumed abstractly.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Identity of the currently active session, or `None` when no
    /// session exists.
    async fn current_session(&self) -> Result<Option<UserIdentity>, AuthError>;

    async fn create_account(
        &self,
        account_id: &UserId,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), AuthError>;

    /// Establish a session for the given credentials.
    async fn create_session(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Destroy the currently active session.
    async fn delete_session(&self) -> Result<(), AuthError>;
}
