use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One cell of the scheduling grid. Edits stay client-side; backend
/// persistence for the schedule was never wired up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub cycle: u32,
    pub week: u32,
    pub group: String,
    pub topic: String,
    pub date: Option<NaiveDate>,
    pub lecturer: Option<String>,
    #[serde(default)]
    pub comments: Vec<String>,
    pub problemset_id: Option<i64>,
}
