use crate::session::Session;

/// Every addressable view of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    PasswordResetRequest,
    PasswordResetConfirm { token: String },
    AcceptInvite { invite_id: String },
    Home,
    Lecturers,
    Schedule,
    Editor { problemset_id: Option<i64> },
    Lecture { id: i64 },
    Profile { user_id: i64 },
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["reset-password"] => Route::PasswordResetRequest,
            ["reset-password", token] => Route::PasswordResetConfirm {
                token: (*token).to_string(),
            },
            ["accept-invite", invite_id] => Route::AcceptInvite {
                invite_id: (*invite_id).to_string(),
            },
            ["predavaci"] => Route::Lecturers,
            ["raspored"] => Route::Schedule,
            ["editor"] => Route::Editor {
                problemset_id: None,
            },
            ["editor", id] => match id.parse() {
                Ok(id) => Route::Editor {
                    problemset_id: Some(id),
                },
                Err(_) => Route::NotFound,
            },
            ["lecture", id] => match id.parse() {
                Ok(id) => Route::Lecture { id },
                Err(_) => Route::NotFound,
            },
            ["profile", id] => match id.parse() {
                Ok(user_id) => Route::Profile { user_id },
                Err(_) => Route::NotFound,
            },
            _ => Route::NotFound,
        }
    }

    /// Everything except login, reset and invite acceptance sits behind
    /// the session gate.
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Route::Login
                | Route::PasswordResetRequest
                | Route::PasswordResetConfirm { .. }
                | Route::AcceptInvite { .. }
                | Route::NotFound
        )
    }
}

/// Resolves a path against the session gate: protected routes without a
/// session redirect to login.
pub fn resolve(path: &str, session: Option<&Session>) -> Route {
    let route = Route::parse(path);
    if route.requires_auth() && session.is_none() {
        return Route::Login;
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn session() -> Session {
        Session {
            token: "tok".to_string(),
            user_id: 1,
            role: Role::Admin,
        }
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/predavaci"), Route::Lecturers);
        assert_eq!(Route::parse("/raspored"), Route::Schedule);
        assert_eq!(
            Route::parse("/editor"),
            Route::Editor {
                problemset_id: None
            }
        );
        assert_eq!(
            Route::parse("/editor/12"),
            Route::Editor {
                problemset_id: Some(12)
            }
        );
        assert_eq!(Route::parse("/lecture/69"), Route::Lecture { id: 69 });
        assert_eq!(Route::parse("/profile/4"), Route::Profile { user_id: 4 });
        assert_eq!(
            Route::parse("/accept-invite/abc123"),
            Route::AcceptInvite {
                invite_id: "abc123".to_string()
            }
        );
        assert_eq!(Route::parse("/lecture/not-a-number"), Route::NotFound);
        assert_eq!(Route::parse("/no/such/page"), Route::NotFound);
    }

    #[test]
    fn test_guard_redirects_without_session() {
        assert_eq!(resolve("/", None), Route::Login);
        assert_eq!(resolve("/predavaci", None), Route::Login);
        assert_eq!(resolve("/editor/3", None), Route::Login);
        assert_eq!(resolve("/profile/1", None), Route::Login);
    }

    #[test]
    fn test_guard_passes_public_routes_without_session() {
        assert_eq!(resolve("/login", None), Route::Login);
        assert_eq!(resolve("/reset-password", None), Route::PasswordResetRequest);
        assert_eq!(
            resolve("/accept-invite/xyz", None),
            Route::AcceptInvite {
                invite_id: "xyz".to_string()
            }
        );
    }

    #[test]
    fn test_guard_passes_protected_routes_with_session() {
        let s = session();
        assert_eq!(resolve("/", Some(&s)), Route::Home);
        assert_eq!(resolve("/lecture/7", Some(&s)), Route::Lecture { id: 7 });
    }
}
