use std::sync::Arc;

use tracing::info;

use crate::backend::dto::{ChangePasswordRequest, SetPasswordRequest, UserUpdateRequest};
use crate::backend::{ApiClient, ImageUpload};
use crate::error::AppError;
use crate::models::User;
use crate::services::auth::validate_new_password;

/// Profile page actions: personal data, password and avatar.
pub struct ProfileService {
    api: Arc<dyn ApiClient>,
}

impl ProfileService {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self, token: &str, user_id: i64) -> Result<User, AppError> {
        self.api.get_user(token, user_id).await
    }

    pub async fn update(
        &self,
        token: &str,
        user_id: i64,
        name: &str,
        surname: &str,
        email: &str,
    ) -> Result<User, AppError> {
        if name.trim().is_empty() || surname.trim().is_empty() || email.trim().is_empty() {
            return Err(AppError::Validation(
                "name, surname and email are required".to_string(),
            ));
        }
        let user = self
            .api
            .update_user(
                token,
                user_id,
                UserUpdateRequest {
                    name: name.to_string(),
                    surname: surname.to_string(),
                    email: email.to_string(),
                },
            )
            .await?;
        info!(user_id, "profile updated");
        Ok(user)
    }

    /// Change-password form. All checks run client-side first, so a bad
    /// form never produces a request.
    pub async fn change_password(
        &self,
        token: &str,
        user_id: i64,
        old_password: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), AppError> {
        validate_new_password(new_password, confirm)?;
        if new_password == old_password {
            return Err(AppError::Validation(
                "new password must differ from the old one".to_string(),
            ));
        }
        self.api
            .change_password(
                token,
                user_id,
                ChangePasswordRequest {
                    old_password: old_password.to_string(),
                    new_password: new_password.to_string(),
                },
            )
            .await?;
        info!(user_id, "password changed");
        Ok(())
    }

    /// First password for accounts created through Google sign-in.
    pub async fn set_password(
        &self,
        token: &str,
        user_id: i64,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), AppError> {
        validate_new_password(new_password, confirm)?;
        self.api
            .set_password(
                token,
                user_id,
                SetPasswordRequest {
                    new_password: new_password.to_string(),
                },
            )
            .await?;
        info!(user_id, "password set");
        Ok(())
    }

    pub async fn upload_photo(
        &self,
        token: &str,
        user_id: i64,
        image: ImageUpload,
    ) -> Result<User, AppError> {
        self.api.upload_photo(token, user_id, image).await
    }

    pub async fn remove_photo(&self, token: &str, user_id: i64) -> Result<User, AppError> {
        self.api.delete_photo(token, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockApi;

    #[tokio::test]
    async fn test_same_password_rejected_before_request() {
        let api = Arc::new(MockApi::new());
        let profile = ProfileService::new(api.clone());

        let result = profile
            .change_password("tok", 1, "samepass1", "samepass1", "samepass1")
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(api.call_count("change_password"), 0);
    }

    #[tokio::test]
    async fn test_blank_fields_rejected() {
        let api = Arc::new(MockApi::new());
        let profile = ProfileService::new(api.clone());

        let result = profile.update("tok", 1, "", "Anić", "ana@skola.hr").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(api.call_count("update_user"), 0);
    }
}
