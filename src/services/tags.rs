use std::sync::Arc;

use tracing::info;

use crate::backend::dto::NewTagRequest;
use crate::backend::ApiClient;
use crate::error::AppError;
use crate::models::{Problemset, Tag};

/// Tag management and lecture-tag assignment.
pub struct TagService {
    api: Arc<dyn ApiClient>,
    tags: Vec<Tag>,
}

impl TagService {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            tags: Vec::new(),
        }
    }

    pub async fn fetch(&mut self) -> Result<(), AppError> {
        self.tags = self.api.list_tags().await?;
        Ok(())
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub async fn create(&mut self, name: &str, color: Option<&str>) -> Result<Tag, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("tag name is required".to_string()));
        }
        let tag = self
            .api
            .create_tag(NewTagRequest {
                name: name.to_string(),
                color: color.map(str::to_string),
            })
            .await?;
        info!(id = tag.id, name = %tag.name, "tag created");
        self.fetch().await?;
        Ok(tag)
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        self.api.delete_tag(id).await?;
        info!(id, "tag deleted");
        self.fetch().await
    }

    /// Replaces a lecture's tag set wholesale, the checkbox-dialog
    /// semantics.
    pub async fn assign(&self, lecture_id: i64, tag_ids: &[i64]) -> Result<Vec<Tag>, AppError> {
        self.api.set_lecture_tags(lecture_id, tag_ids).await
    }

    pub async fn tags_for(&self, lecture_id: i64) -> Result<Vec<Tag>, AppError> {
        self.api.lecture_tags(lecture_id).await
    }

    /// All lectures carrying a given tag.
    pub async fn lectures_for(&self, tag_id: i64) -> Result<Vec<Problemset>, AppError> {
        self.api.tag_lectures(tag_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockApi;

    #[tokio::test]
    async fn test_create_refreshes_list() {
        let api = Arc::new(MockApi::new());
        let mut tags = TagService::new(api.clone());

        tags.create("algebra", Some("#ff0000")).await.expect("create");
        assert_eq!(tags.tags().len(), 1);
        assert_eq!(tags.tags()[0].name, "algebra");
        assert_eq!(api.call_count("list_tags"), 1);
    }

    #[tokio::test]
    async fn test_blank_name_rejected_locally() {
        let api = Arc::new(MockApi::new());
        let mut tags = TagService::new(api.clone());

        assert!(tags.create("   ", None).await.is_err());
        assert_eq!(api.call_count("create_tag"), 0);
    }

    #[tokio::test]
    async fn test_assign_replaces_set() {
        let api = Arc::new(MockApi::new());
        let mut tags = TagService::new(api.clone());
        let a = tags.create("a", None).await.expect("tag a");
        let b = tags.create("b", None).await.expect("tag b");

        tags.assign(7, &[a.id]).await.expect("assign");
        let assigned = tags.assign(7, &[b.id]).await.expect("reassign");
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, b.id);
    }
}
