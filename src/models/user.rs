use serde::{Deserialize, Serialize};

use crate::models::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lecturer,
    /// Roles this client version does not know about.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Lecturer => write!(f, "lecturer"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub role: Role,
    pub profile_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl User {
    /// "Name Surname" as shown in directory rows.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}
