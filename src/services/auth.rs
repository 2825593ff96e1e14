use std::sync::Arc;

use tracing::info;

use crate::backend::dto::{AcceptInviteRequest, LoginRequest, PasswordResetConfirm, SessionResponse};
use crate::backend::ApiClient;
use crate::error::AppError;
use crate::session::{Session, SessionStore};

/// Shortest password the client accepts before talking to the backend.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Client-side password check shared by every password form. Rejections
/// here never reach the network.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirm {
        return Err(AppError::Validation("passwords do not match".to_string()));
    }
    Ok(())
}

/// Login, invite acceptance and password reset. Successful
/// authentication writes the session into the store.
pub struct AuthService {
    api: Arc<dyn ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self { api }
    }

    pub async fn login(
        &self,
        store: &mut SessionStore,
        email: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "email and password are required".to_string(),
            ));
        }
        let resp = self
            .api
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.establish(store, resp).await
    }

    /// Sign-in with a Google id token obtained out of band.
    pub async fn login_google(
        &self,
        store: &mut SessionStore,
        id_token: &str,
    ) -> Result<Session, AppError> {
        let resp = self.api.login_google(id_token).await?;
        self.establish(store, resp).await
    }

    /// Invited user picks a password; logs them straight in.
    pub async fn accept_invite(
        &self,
        store: &mut SessionStore,
        invite_id: &str,
        password: &str,
        confirm: &str,
    ) -> Result<Session, AppError> {
        validate_new_password(password, confirm)?;
        let resp = self
            .api
            .accept_invite(
                invite_id,
                AcceptInviteRequest {
                    password: password.to_string(),
                },
            )
            .await?;
        self.establish(store, resp).await
    }

    pub async fn accept_invite_google(
        &self,
        store: &mut SessionStore,
        invite_id: &str,
        id_token: &str,
    ) -> Result<Session, AppError> {
        let resp = self.api.accept_invite_google(invite_id, id_token).await?;
        self.establish(store, resp).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        if email.trim().is_empty() {
            return Err(AppError::Validation("email is required".to_string()));
        }
        self.api.request_password_reset(email).await
    }

    /// Completes the emailed reset link with a fresh password.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), AppError> {
        validate_new_password(password, confirm)?;
        self.api
            .confirm_password_reset(PasswordResetConfirm {
                token: token.to_string(),
                new_password: password.to_string(),
            })
            .await
    }

    pub fn logout(&self, store: &mut SessionStore) -> Result<(), AppError> {
        info!("logging out");
        store.clear_session()
    }

    async fn establish(
        &self,
        store: &mut SessionStore,
        resp: SessionResponse,
    ) -> Result<Session, AppError> {
        let session = Session {
            token: resp.access_token,
            user_id: resp.user_id,
            role: resp.role,
        };
        store.set_session(session.clone())?;
        info!(user_id = session.user_id, "session established");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short() {
        assert!(validate_new_password("short", "short").is_err());
    }

    #[test]
    fn test_password_mismatch() {
        assert!(validate_new_password("longenough", "different1").is_err());
    }

    #[test]
    fn test_password_ok() {
        assert!(validate_new_password("longenough", "longenough").is_ok());
    }
}
