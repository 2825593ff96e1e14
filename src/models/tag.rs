use serde::{Deserialize, Serialize};

/// Named, colored label attachable to lectures for filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}
