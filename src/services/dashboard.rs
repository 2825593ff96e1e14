use std::sync::Arc;

use tracing::warn;

use crate::backend::ApiClient;
use crate::error::AppError;
use crate::models::{Problemset, ProblemWithLecture};
use crate::session::SessionStore;

/// Home view: the problemset catalogue with client-side search, the
/// per-user recents strip and the problem bank search.
pub struct Dashboard {
    api: Arc<dyn ApiClient>,
    problemsets: Vec<Problemset>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            problemsets: Vec::new(),
        }
    }

    pub async fn fetch(&mut self) -> Result<(), AppError> {
        self.problemsets = self.api.list_problemsets().await?;
        Ok(())
    }

    pub fn problemsets(&self) -> &[Problemset] {
        &self.problemsets
    }

    /// Search box over the catalogue: case-insensitive substring match
    /// on title and group name. Empty term matches everything.
    pub fn filter(&self, term: &str) -> Vec<&Problemset> {
        let term = term.trim().to_lowercase();
        self.problemsets
            .iter()
            .filter(|p| {
                term.is_empty()
                    || p.title.to_lowercase().contains(&term)
                    || p.group_name
                        .as_deref()
                        .is_some_and(|g| g.to_lowercase().contains(&term))
            })
            .collect()
    }

    /// Opens a lecture and records the visit in the recents list.
    pub async fn open_lecture(
        &self,
        store: &mut SessionStore,
        id: i64,
    ) -> Result<Problemset, AppError> {
        let lecture = self.api.lecture_data(id).await?;
        store.record_recent(id)?;
        Ok(lecture)
    }

    /// Resolves the stored recency ids into problemsets, most recent
    /// first. Ids that no longer resolve (deleted on the backend) are
    /// skipped rather than failing the whole strip.
    pub async fn recent(&self, store: &SessionStore) -> Vec<Problemset> {
        let mut out = Vec::new();
        for id in store.recent_lectures() {
            match self.api.get_problemset(id).await {
                Ok(p) => out.push(p),
                Err(e) => warn!(id, "skipping stale recent lecture: {e}"),
            }
        }
        out
    }

    pub async fn download_pdf(&self, id: i64) -> Result<Vec<u8>, AppError> {
        self.api.problemset_pdf(id).await
    }

    /// Backend-side problem search; empty terms fall back to the full
    /// listing instead of hitting the search route.
    pub async fn search_problems(&self, term: &str) -> Result<Vec<ProblemWithLecture>, AppError> {
        let term = term.trim();
        if term.is_empty() {
            return self.api.problems_with_lecture().await;
        }
        self.api.search_problems(term).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockApi;

    fn problemset(id: i64, title: &str, group: Option<&str>) -> Problemset {
        Problemset {
            id,
            title: title.to_string(),
            kind: None,
            part_of: None,
            group_name: group.map(str::to_string),
            raw_latex: None,
            finalized: false,
            problems: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_filter_matches_title_and_group() {
        let api = Arc::new(MockApi::new());
        api.problemsets.lock().expect("lock").extend([
            problemset(1, "Limesi", Some("Napredna")),
            problemset(2, "Derivacije", Some("Početna")),
        ]);

        let mut dash = Dashboard::new(api);
        dash.fetch().await.expect("fetch");

        assert_eq!(dash.filter("limes").len(), 1);
        assert_eq!(dash.filter("početna").len(), 1);
        assert_eq!(dash.filter("").len(), 2);
        assert!(dash.filter("nema").is_empty());
    }
}
