use serde::{Deserialize, Serialize};

/// A titled collection of ordered problems with associated LaTeX source,
/// compiled to PDF. Called "lecture" (predavanje) in parts of the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problemset {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub part_of: Option<String>,
    pub group_name: Option<String>,
    pub raw_latex: Option<String>,
    #[serde(default)]
    pub finalized: bool,
    #[serde(default)]
    pub problems: Vec<ProblemLink>,
}

impl Problemset {
    /// Problems ordered by position, entries without a position last.
    pub fn sorted_problems(&self) -> Vec<&ProblemLink> {
        let mut links: Vec<&ProblemLink> = self.problems.iter().collect();
        links.sort_by_key(|link| link.position.unwrap_or(i64::MAX));
        links
    }
}

/// Association of a problem to a problemset at a given position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemLink {
    pub position: Option<i64>,
    pub problem: Option<Problem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub latex_text: String,
    pub category: Option<String>,
}

/// Problem row from the `/problems/with-lecture` and search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemWithLecture {
    pub id: i64,
    pub latex_text: String,
    pub category: Option<String>,
    pub lecture_title: Option<String>,
}
