use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::RwLock;

use habitsync_domain::session::{AuthGateway, SessionState};
use habitsync_domain::shared::UserId;

const MIN_PASSWORD_LEN: usize = 6;

/// Owns the session lifecycle against the remote auth collaborator.
///
/// An explicit, injectable object rather than ambient global state;
/// every dependent component receives the instance it should observe.
/// Remote failures never cross this boundary as errors: each operation
/// reports a displayable message, or `None` on success. Calls are not
/// mutually exclusive; double-submission is the caller's problem.
pub struct SessionManager {
    auth: Arc<dyn AuthGateway>,
    state: RwLock<SessionState>,
    initialized: AtomicBool,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthGateway>) -> Self {
        Self {
            auth,
            state: RwLock::new(SessionState::Unknown),
            initialized: AtomicBool::new(false),
        }
    }

    /// Resolve the session left over from a previous run. Runs at most
    /// once per manager; later calls are no-ops. Always leaves the
    /// loading state, whatever the collaborator answers.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let resolved = match self.auth.current_session().await {
            Ok(Some(identity)) => {
                info!("Restored session for user {}", identity.id);
                SessionState::Authenticated(identity.id)
            }
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!("Session restore failed: {e}");
                SessionState::Anonymous
            }
        };

        *self.state.write().await = resolved;
    }

    /// Create an account, then sign in with the same credentials.
    pub async fn sign_up(
        &self,
        name: &str,
        surname: &str,
        email: &str,
        password: &str,
    ) -> Option<String> {
        if name.trim().is_empty() || surname.trim().is_empty() {
            return Some("Please fill all required fields".to_string());
        }
        if let Some(message) = validate_credentials(email, password) {
            return Some(message);
        }

        let display_name = format!("{} {}", name.trim(), surname.trim());
        let account_id = UserId::new();
        if let Err(e) = self
            .auth
            .create_account(&account_id, email, password, &display_name)
            .await
        {
            return Some(e.to_string());
        }

        self.sign_in(email, password).await
    }

    /// Establish a remote session and store the resulting identity.
    pub async fn sign_in(&self, email: &str, password: &str) -> Option<String> {
        if let Some(message) = validate_credentials(email, password) {
            return Some(message);
        }

        if let Err(e) = self.auth.create_session(email, password).await {
            return Some(e.to_string());
        }

        match self.auth.current_session().await {
            Ok(Some(identity)) => {
                info!("Signed in as {}", identity.id);
                *self.state.write().await = SessionState::Authenticated(identity.id);
                None
            }
            Ok(None) => Some("Session could not be established".to_string()),
            Err(e) => Some(e.to_string()),
        }
    }

    /// Destroy the remote session. Local state becomes anonymous even
    /// when the remote call fails.
    pub async fn sign_out(&self) -> Option<String> {
        let result = self.auth.delete_session().await;
        *self.state.write().await = SessionState::Anonymous;

        match result {
            Ok(()) => {
                info!("Signed out");
                None
            }
            Err(e) => Some(e.to_string()),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<UserId> {
        self.state.read().await.user_id().cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading()
    }
}

/// Client-side checks; nothing goes over the wire when these fail.
fn validate_credentials(email: &str, password: &str) -> Option<String> {
    if email.trim().is_empty() || password.is_empty() {
        return Some("Please fill all required fields".to_string());
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 6 characters".to_string());
    }
    None
}
