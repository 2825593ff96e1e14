use std::sync::Arc;

use tracing::info;

use crate::backend::dto::InviteRequest;
use crate::backend::ApiClient;
use crate::error::AppError;
use crate::models::{Role, User};

/// The lecturer directory: the full user list with client-side search,
/// plus the admin actions (invite, role change).
pub struct LecturerDirectory {
    api: Arc<dyn ApiClient>,
    users: Vec<User>,
}

impl LecturerDirectory {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            users: Vec::new(),
        }
    }

    pub async fn fetch(&mut self, token: &str) -> Result<(), AppError> {
        self.users = self.api.list_users(token).await?;
        Ok(())
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Case-insensitive substring match over full name and email, the
    /// search box behavior. An empty term matches everyone.
    pub fn filter(&self, term: &str) -> Vec<&User> {
        let term = term.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                term.is_empty()
                    || u.display_name().to_lowercase().contains(&term)
                    || u.email.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub async fn invite(
        &self,
        token: &str,
        email: &str,
        name: &str,
        surname: &str,
    ) -> Result<(), AppError> {
        if email.trim().is_empty() {
            return Err(AppError::Validation("email is required".to_string()));
        }
        self.api
            .send_invite(
                token,
                InviteRequest {
                    to_email: email.to_string(),
                    name: name.to_string(),
                    surname: surname.to_string(),
                },
            )
            .await?;
        info!(email, "invite sent");
        Ok(())
    }

    /// Changes a user's role and refreshes the list so the directory
    /// reflects the update.
    pub async fn change_role(&mut self, token: &str, id: i64, role: Role) -> Result<(), AppError> {
        self.api.update_role(token, id, role).await?;
        info!(id, ?role, "role updated");
        self.fetch(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockApi;
    use crate::models::Tag;

    fn user(id: i64, name: &str, surname: &str, email: &str) -> User {
        User {
            id,
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
            role: Role::Lecturer,
            profile_image: None,
            tags: Vec::<Tag>::new(),
        }
    }

    #[tokio::test]
    async fn test_filter_matches_name_and_email() {
        let api = Arc::new(MockApi::new());
        api.users.lock().expect("lock").extend([
            user(1, "Ana", "Anić", "ana@skola.hr"),
            user(2, "Marko", "Marić", "marko@skola.hr"),
        ]);

        let mut dir = LecturerDirectory::new(api);
        dir.fetch("tok").await.expect("fetch");

        assert_eq!(dir.filter("ana").len(), 1);
        assert_eq!(dir.filter("marko@").len(), 1);
        assert_eq!(dir.filter("ANIĆ").len(), 1);
        assert_eq!(dir.filter("").len(), 2);
        assert!(dir.filter("nobody").is_empty());
    }
}
